//! Rutas de códigos QR por parque y tipo de vehículo

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::dto::qrcode_dto::{QrCodeQuery, UpdateQrCodeRequest};
use crate::dto::ApiResponse;
use crate::models::{QrCode, VehicleKind};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_qrcode_router() -> Router<AppState> {
    Router::new()
        .route("/:kind", get(get_qrcode))
        .route("/:kind/update", post(update_qrcode))
}

fn parse_kind(slug: &str) -> Result<VehicleKind, AppError> {
    VehicleKind::from_slug(slug).ok_or_else(|| {
        AppError::BadRequest(format!(
            "unknown QR code type '{}': expected external-vehicle, internal-vehicle or non-road",
            slug
        ))
    })
}

async fn get_qrcode(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<QrCodeQuery>,
) -> Result<Json<ApiResponse<QrCode>>, AppError> {
    let kind = parse_kind(&kind)?;
    let code = state.qrcodes.get(query.park_id, kind).await?;
    Ok(Json(ApiResponse::success(code)))
}

async fn update_qrcode(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<QrCodeQuery>,
    Json(request): Json<UpdateQrCodeRequest>,
) -> Result<Json<ApiResponse<QrCode>>, AppError> {
    let kind = parse_kind(&kind)?;
    let code = state.qrcodes.update(query.park_id, kind, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        code,
        "Código QR actualizado".to_string(),
    )))
}
