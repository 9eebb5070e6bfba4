//! Routers HTTP
//!
//! Todas las rutas de negocio cuelgan de `/api/v1`; `/health` queda en la raíz.

pub mod mini_program_routes;
pub mod park_routes;
pub mod qrcode_routes;
pub mod vehicle_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::json;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::cors_layer;
use crate::state::AppState;

/// Router completo de la aplicación con sus capas
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .nest(
            "/external-vehicles",
            vehicle_routes::create_external_vehicle_router(),
        )
        .nest(
            "/internal-vehicles",
            vehicle_routes::create_internal_vehicle_router(),
        )
        .nest("/non-road", vehicle_routes::create_non_road_router())
        .nest("/parks", park_routes::create_park_router())
        .nest("/renewals", park_routes::create_renewal_router())
        .nest("/qrcodes", qrcode_routes::create_qrcode_router())
        .nest(
            "/mini-program",
            mini_program_routes::create_mini_program_router(),
        );

    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check simple
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
