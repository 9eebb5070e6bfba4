//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::clients::EnrichmentError;
use crate::utils::validation::VehicleValidationError;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Vehicle validation failed: {0}")]
    VehicleValidation(#[from] VehicleValidationError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid audit status '{0}': expected 'audited' or 'unaudited'")]
    InvalidAuditStatus(String),

    #[error("Vehicle {id} has not been audited and cannot be dispatched")]
    NotAudited { id: i64 },

    #[error("Batch rejected: {} vehicle(s) not audited ({})", .ids.len(), join_ids(.ids))]
    BatchNotAudited { ids: Vec<i64> },

    #[error("Park {park_id} is outside its validity window")]
    ParkExpired { park_id: i64 },

    #[error("Vehicle registry error: {0}")]
    Enrichment(#[from] EnrichmentError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message,
            details: None,
            code: Some(code.to_string()),
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl AppError {
    /// Código estable que acompaña a cada error en la respuesta JSON
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) | AppError::VehicleValidation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InvalidAuditStatus(_) => "INVALID_AUDIT_STATUS",
            AppError::NotAudited { .. } => "NOT_AUDITED",
            AppError::BatchNotAudited { .. } => "BATCH_NOT_AUDITED",
            AppError::ParkExpired { .. } => "PARK_EXPIRED",
            AppError::Enrichment(e) => e.code(),
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Status HTTP asociado al error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_)
            | AppError::VehicleValidation(_)
            | AppError::BadRequest(_)
            | AppError::InvalidAuditStatus(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::ParkExpired { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::NotAudited { .. } | AppError::BatchNotAudited { .. } => {
                StatusCode::CONFLICT
            }
            AppError::Enrichment(
                EnrichmentError::RemoteUnavailable { .. } | EnrichmentError::NotConfigured,
            ) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Enrichment(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let error_response = match &self {
            AppError::Database(e) => {
                log::error!("❌ Database error: {}", e);
                ErrorResponse::new(
                    "Database Error",
                    "An error occurred while accessing the database".to_string(),
                    code,
                )
            }

            AppError::Validation(e) => {
                log::warn!("⚠️ Validation error: {}", e);
                ErrorResponse::new("Validation Error", "The provided data is invalid".to_string(), code)
                    .with_details(json!(e))
            }

            AppError::VehicleValidation(e) => {
                log::warn!("⚠️ Vehicle validation error: {}", e);
                let mut body = ErrorResponse::new("Validation Error", e.to_string(), code);
                if let Some(field) = e.field() {
                    body = body.with_details(json!({ "field": field }));
                }
                body
            }

            AppError::BatchNotAudited { ids } => {
                log::warn!("⚠️ {}", self);
                ErrorResponse::new("Batch Not Audited", self.to_string(), code)
                    .with_details(json!({ "unaudited_ids": ids }))
            }

            AppError::Enrichment(e) => {
                log::error!("❌ Vehicle registry error: {}", e);
                ErrorResponse::new("External API Error", e.to_string(), code)
            }

            AppError::Internal(msg) => {
                log::error!("❌ Internal error: {}", msg);
                ErrorResponse::new(
                    "Internal Server Error",
                    "An unexpected error occurred".to_string(),
                    code,
                )
                .with_details(json!({ "internal_error": msg }))
            }

            other => {
                log::warn!("⚠️ {}", other);
                let title = status.canonical_reason().unwrap_or("Error");
                ErrorResponse::new(title, other.to_string(), code)
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: i64) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} with {} '{}' already exists", resource, field, value))
}

/// Conflicto de versión (bloqueo optimista)
pub fn stale_version_error(resource: &str, id: i64, expected_version: i32) -> AppError {
    AppError::Conflict(format!(
        "{} {} was modified concurrently (expected version {}); reload and retry",
        resource, id, expected_version
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_not_audited_message_lists_ids() {
        let err = AppError::BatchNotAudited { ids: vec![3, 7] };
        assert_eq!(err.to_string(), "Batch rejected: 2 vehicle(s) not audited (3, 7)");
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "BATCH_NOT_AUDITED");
    }

    #[test]
    fn test_validation_errors_map_to_bad_request() {
        let err = AppError::from(VehicleValidationError::InvalidVinLength { actual: 5 });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_remote_unavailable_maps_to_service_unavailable() {
        let err = AppError::from(EnrichmentError::RemoteUnavailable {
            attempts: 3,
            last_error: "connection refused".to_string(),
        });
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
