use serde::{Deserialize, Serialize};

use crate::models::{AuditStatus, DispatchStatus, VehicleFilters};
use crate::repositories::PageRequest;

// Request para crear un vehículo: park_id + datos editables planos
#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest<D> {
    pub park_id: i64,
    #[serde(flatten)]
    pub details: D,
}

// Request para actualizar un vehículo (reemplazo completo con versión leída)
#[derive(Debug, Deserialize)]
pub struct UpdateVehicleRequest<D> {
    pub version: i32,
    #[serde(flatten)]
    pub details: D,
}

// Request de auditoría
#[derive(Debug, Deserialize)]
pub struct AuditVehicleRequest {
    pub status: String,
}

// Request de despacho por lotes
#[derive(Debug, Deserialize)]
pub struct BatchDispatchRequest {
    pub ids: Vec<i64>,
}

// Response de despacho por lotes
#[derive(Debug, Serialize)]
pub struct BatchDispatchResponse {
    pub dispatched: usize,
}

// Query de listado de vehículos
#[derive(Debug, Deserialize)]
pub struct VehicleListQuery {
    pub park_id: i64,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub license_plate: Option<String>,
    pub audit_status: Option<AuditStatus>,
    pub dispatch_status: Option<DispatchStatus>,
    pub emission_standard: Option<String>,
    pub environmental_code: Option<String>,
}

impl VehicleListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }

    pub fn filters(&self) -> VehicleFilters {
        VehicleFilters {
            license_plate: self.license_plate.clone(),
            audit_status: self.audit_status,
            dispatch_status: self.dispatch_status,
            emission_standard: self.emission_standard.clone(),
            environmental_code: self.environmental_code.clone(),
        }
    }
}
