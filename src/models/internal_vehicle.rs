//! Modelo de InternalVehicle
//!
//! Vehículos de transporte internos del parque. Sin control de auditoría.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::vehicle::{
    AuditStatus, DispatchStatus, PlateColor, RoadVehicleRegistration, VehicleKind, VehicleRecord,
};
use crate::utils::validation::{validate_internal_vehicle, VehicleValidationError};

/// Datos editables de un vehículo interno
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(default)]
pub struct InternalVehicleDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub registration: RoadVehicleRegistration,

    pub environmental_code: String,
    pub production_date: String,
    pub local_environmental_code: String,
    pub network_status: String,
    pub vehicle_list_photo: String,
    pub driving_license_photo: String,
    pub vehicle_photo: String,
}

/// InternalVehicle - mapea a la tabla internal_vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InternalVehicle {
    pub id: i64,
    pub park_id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub details: InternalVehicleDetails,
    pub plate_color: Option<PlateColor>,
    pub dispatch_status: DispatchStatus,
    pub dispatch_time: Option<DateTime<Utc>>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VehicleRecord for InternalVehicle {
    type Details = InternalVehicleDetails;

    const KIND: VehicleKind = VehicleKind::InternalVehicle;

    const AUDIT_GATED: bool = false;

    fn new_unsaved(park_id: i64, details: Self::Details, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            park_id,
            details,
            plate_color: None,
            dispatch_status: DispatchStatus::Undispatched,
            dispatch_time: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn park_id(&self) -> i64 {
        self.park_id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }

    fn replace_details(&mut self, details: Self::Details) {
        self.details = details;
    }

    fn validate_registration(&mut self) -> Result<(), VehicleValidationError> {
        self.plate_color = validate_internal_vehicle(&mut self.details.registration)?;
        Ok(())
    }

    fn audit_status(&self) -> Option<AuditStatus> {
        None
    }

    fn dispatch_status(&self) -> DispatchStatus {
        self.dispatch_status
    }

    fn mark_dispatched(&mut self, at: DateTime<Utc>) {
        self.dispatch_status = DispatchStatus::Dispatched;
        self.dispatch_time = Some(at);
        self.updated_at = at;
    }

    fn license_plate(&self) -> &str {
        &self.details.registration.license_plate
    }

    fn emission_standard(&self) -> &str {
        &self.details.registration.emission_standard
    }

    fn environmental_code(&self) -> Option<&str> {
        Some(&self.details.environmental_code)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
