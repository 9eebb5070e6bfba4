//! Rutas de parques y del historial de renovaciones

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::dto::park_dto::{
    CreateParkRequest, ParkCreatedResponse, ParkListQuery, ParkLoginRequest, ParkValidityResponse,
    RenewParkRequest, RenewParkResponse, RenewalListQuery, UpdateParkRequest,
};
use crate::dto::ApiResponse;
use crate::models::{Park, RenewalWithPark};
use crate::repositories::Page;
use crate::services::credentials::IssuedCredentials;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_park_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_park).get(list_parks))
        .route("/login", post(login))
        .route("/:id", get(get_park).put(update_park).delete(delete_park))
        .route("/:id/renew", post(renew_park))
        .route("/:id/download", get(download_park_info))
        .route("/:id/validity", get(check_validity))
        .route("/:id/credentials/reset", post(reset_credentials))
}

pub fn create_renewal_router() -> Router<AppState> {
    Router::new().route("/", get(list_renewals))
}

async fn create_park(
    State(state): State<AppState>,
    Json(request): Json<CreateParkRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ParkCreatedResponse>>), AppError> {
    let created = state.parks.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            created,
            "Parque creado; la contraseña sólo se muestra esta vez".to_string(),
        )),
    ))
}

async fn list_parks(
    State(state): State<AppState>,
    Query(query): Query<ParkListQuery>,
) -> Result<Json<ApiResponse<Page<Park>>>, AppError> {
    let page = state
        .parks
        .list(query.filters(), query.page_request())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

async fn get_park(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Park>>, AppError> {
    let park = state.parks.get(id).await?;
    Ok(Json(ApiResponse::success(park)))
}

async fn update_park(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateParkRequest>,
) -> Result<Json<ApiResponse<Park>>, AppError> {
    let park = state.parks.update(id, request.updates).await?;
    Ok(Json(ApiResponse::success_with_message(
        park,
        "Parque actualizado exitosamente".to_string(),
    )))
}

async fn delete_park(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.parks.delete(id).await?;
    Ok(Json(ApiResponse::ok("Parque eliminado exitosamente".to_string())))
}

async fn renew_park(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<RenewParkRequest>,
) -> Result<Json<ApiResponse<RenewParkResponse>>, AppError> {
    let (park, renewal) = state.parks.renew(id, request.duration_months).await?;
    Ok(Json(ApiResponse::success(RenewParkResponse { park, renewal })))
}

async fn download_park_info(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let body = state.parks.download_info(id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"park_{}.txt\"", id),
            ),
        ],
        body,
    ))
}

async fn check_validity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ParkValidityResponse>>, AppError> {
    let validity = state.parks.check_validity(id).await?;
    Ok(Json(ApiResponse::success(validity)))
}

async fn reset_credentials(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<IssuedCredentials>>, AppError> {
    let credentials = state.parks.reset_credentials(id).await?;
    Ok(Json(ApiResponse::success_with_message(
        credentials,
        "Credenciales regeneradas; la contraseña sólo se muestra esta vez".to_string(),
    )))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<ParkLoginRequest>,
) -> Result<Json<ApiResponse<Park>>, AppError> {
    request.validate()?;
    let park = state
        .parks
        .verify_login(&request.login_account, &request.login_password)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        park,
        "Login exitoso".to_string(),
    )))
}

async fn list_renewals(
    State(state): State<AppState>,
    Query(query): Query<RenewalListQuery>,
) -> Result<Json<ApiResponse<Page<RenewalWithPark>>>, AppError> {
    let page = state
        .parks
        .list_renewals(query.filters(), query.page_request())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}
