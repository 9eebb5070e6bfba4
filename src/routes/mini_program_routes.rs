//! Rutas del mini-programa

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::dto::mini_program_dto::{ScanRequest, ScanResult};
use crate::dto::vehicle_dto::CreateVehicleRequest;
use crate::dto::ApiResponse;
use crate::models::registry::RegistryLookup;
use crate::models::{ExternalVehicle, ExternalVehicleDetails, ThirdPartyVehicleData};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_mini_program_router() -> Router<AppState> {
    Router::new()
        .route("/scan", post(scan))
        .route("/vehicle", post(submit_vehicle))
        .route("/get-car-data", post(get_car_data))
}

async fn scan(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ApiResponse<ScanResult>>, AppError> {
    let result = state.mini_program.scan(&request.qrcode).await?;
    Ok(Json(ApiResponse::success(result)))
}

async fn submit_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest<ExternalVehicleDetails>>,
) -> Result<(StatusCode, Json<ApiResponse<ExternalVehicle>>), AppError> {
    let vehicle = state
        .mini_program
        .submit_vehicle(request.park_id, request.details)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            vehicle,
            "Vehículo enviado, pendiente de auditoría".to_string(),
        )),
    ))
}

async fn get_car_data(
    State(state): State<AppState>,
    Json(lookup): Json<RegistryLookup>,
) -> Result<Json<ApiResponse<ThirdPartyVehicleData>>, AppError> {
    let data = state.mini_program.get_car_data(lookup).await?;
    Ok(Json(ApiResponse::success(data)))
}
