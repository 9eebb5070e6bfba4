//! Rutas de vehículos
//!
//! Los tres tipos comparten CRUD, despacho individual y despacho por lotes;
//! los vehículos externos añaden la auditoría.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::dto::vehicle_dto::{
    AuditVehicleRequest, BatchDispatchRequest, BatchDispatchResponse, CreateVehicleRequest,
    UpdateVehicleRequest, VehicleListQuery,
};
use crate::dto::ApiResponse;
use crate::models::{ExternalVehicle, InternalVehicle, NonRoadMachinery, VehicleRecord};
use crate::repositories::Page;
use crate::services::VehicleWorkflow;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Tipo de vehículo expuesto por HTTP: sabe localizar su flujo en el estado
pub trait RoutedVehicle: VehicleRecord {
    fn workflow(state: &AppState) -> &VehicleWorkflow<Self>;
}

impl RoutedVehicle for ExternalVehicle {
    fn workflow(state: &AppState) -> &VehicleWorkflow<Self> {
        &state.compliance.external
    }
}

impl RoutedVehicle for InternalVehicle {
    fn workflow(state: &AppState) -> &VehicleWorkflow<Self> {
        &state.compliance.internal
    }
}

impl RoutedVehicle for NonRoadMachinery {
    fn workflow(state: &AppState) -> &VehicleWorkflow<Self> {
        &state.compliance.non_road
    }
}

pub fn create_external_vehicle_router() -> Router<AppState> {
    vehicle_router::<ExternalVehicle>().route("/:id/audit", post(audit_external_vehicle))
}

pub fn create_internal_vehicle_router() -> Router<AppState> {
    vehicle_router::<InternalVehicle>()
}

pub fn create_non_road_router() -> Router<AppState> {
    vehicle_router::<NonRoadMachinery>()
}

fn vehicle_router<V: RoutedVehicle>() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle::<V>).get(list_vehicles::<V>))
        .route("/dispatch/batch", post(batch_dispatch::<V>))
        .route(
            "/:id",
            get(get_vehicle::<V>)
                .put(update_vehicle::<V>)
                .delete(delete_vehicle::<V>),
        )
        .route("/:id/dispatch", post(dispatch_vehicle::<V>))
}

async fn create_vehicle<V: RoutedVehicle>(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest<V::Details>>,
) -> Result<(StatusCode, Json<ApiResponse<V>>), AppError> {
    let vehicle = V::workflow(&state)
        .create(request.park_id, request.details)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            vehicle,
            format!("{} creado exitosamente", V::KIND.label()),
        )),
    ))
}

async fn list_vehicles<V: RoutedVehicle>(
    State(state): State<AppState>,
    Query(query): Query<VehicleListQuery>,
) -> Result<Json<ApiResponse<Page<V>>>, AppError> {
    let page = V::workflow(&state)
        .list(query.park_id, query.filters(), query.page_request())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

async fn get_vehicle<V: RoutedVehicle>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<V>>, AppError> {
    let vehicle = V::workflow(&state).get(id).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

async fn update_vehicle<V: RoutedVehicle>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateVehicleRequest<V::Details>>,
) -> Result<Json<ApiResponse<V>>, AppError> {
    let vehicle = V::workflow(&state)
        .update(id, request.version, request.details)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        vehicle,
        format!("{} actualizado exitosamente", V::KIND.label()),
    )))
}

async fn delete_vehicle<V: RoutedVehicle>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    V::workflow(&state).delete(id).await?;
    Ok(Json(ApiResponse::ok(format!(
        "{} eliminado exitosamente",
        V::KIND.label()
    ))))
}

async fn dispatch_vehicle<V: RoutedVehicle>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<V>>, AppError> {
    let vehicle = V::workflow(&state).dispatch(id).await?;
    Ok(Json(ApiResponse::success_with_message(
        vehicle,
        "Despacho registrado".to_string(),
    )))
}

async fn batch_dispatch<V: RoutedVehicle>(
    State(state): State<AppState>,
    Json(request): Json<BatchDispatchRequest>,
) -> Result<Json<ApiResponse<BatchDispatchResponse>>, AppError> {
    let dispatched = V::workflow(&state).batch_dispatch(&request.ids).await?;
    Ok(Json(ApiResponse::success(BatchDispatchResponse { dispatched })))
}

async fn audit_external_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AuditVehicleRequest>,
) -> Result<Json<ApiResponse<ExternalVehicle>>, AppError> {
    let vehicle = state.compliance.external.audit(id, &request.status).await?;
    Ok(Json(ApiResponse::success_with_message(
        vehicle,
        "Estado de auditoría actualizado".to_string(),
    )))
}
