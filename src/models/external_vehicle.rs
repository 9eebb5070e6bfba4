//! Modelo de ExternalVehicle
//!
//! Vehículos de transporte externos (camiones que entran al parque).
//! Son los únicos con control de auditoría y contador de despachos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::vehicle::{
    AuditStatus, DispatchStatus, PlateColor, RoadVehicleRegistration, VehicleKind, VehicleRecord,
};
use crate::utils::validation::{validate_road_vehicle, VehicleValidationError};

/// Datos editables de un vehículo externo
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(default)]
pub struct ExternalVehicleDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub registration: RoadVehicleRegistration,

    pub company_id: Option<i64>,
    pub engine_model: String,
    pub engine_manufacturer: String,
    pub total_mass: Option<f64>,
    pub curb_mass: Option<f64>,
    pub phone: String,
    pub is_obd_enabled: bool,
    pub fleet_name: String,
    pub inbound_cargo_name: String,
    pub inbound_cargo_weight: Option<f64>,
    pub outbound_cargo_name: String,
    pub outbound_cargo_weight: Option<f64>,
    pub network_status: String,
    pub vehicle_photo: String,
    pub driving_license_photo: String,
    pub vehicle_list_photo: String,
}

impl Default for ExternalVehicleDetails {
    fn default() -> Self {
        Self {
            registration: RoadVehicleRegistration::default(),
            company_id: None,
            engine_model: String::new(),
            engine_manufacturer: String::new(),
            total_mass: None,
            curb_mass: None,
            phone: String::new(),
            is_obd_enabled: true,
            fleet_name: String::new(),
            inbound_cargo_name: String::new(),
            inbound_cargo_weight: None,
            outbound_cargo_name: String::new(),
            outbound_cargo_weight: None,
            network_status: String::new(),
            vehicle_photo: String::new(),
            driving_license_photo: String::new(),
            vehicle_list_photo: String::new(),
        }
    }
}

/// ExternalVehicle - mapea a la tabla external_vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExternalVehicle {
    pub id: i64,
    pub park_id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub details: ExternalVehicleDetails,
    pub plate_color: PlateColor,
    pub audit_status: AuditStatus,
    pub dispatch_status: DispatchStatus,
    pub dispatch_count: i32,
    pub dispatch_time: Option<DateTime<Utc>>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VehicleRecord for ExternalVehicle {
    type Details = ExternalVehicleDetails;

    const KIND: VehicleKind = VehicleKind::ExternalVehicle;

    const AUDIT_GATED: bool = true;

    fn new_unsaved(park_id: i64, details: Self::Details, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            park_id,
            details,
            // Se recalcula en validate_registration
            plate_color: PlateColor::BluePlate,
            audit_status: AuditStatus::Unaudited,
            dispatch_status: DispatchStatus::Undispatched,
            dispatch_count: 0,
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
        self.plate_color = validate_road_vehicle(&mut self.details.registration)?;
        Ok(())
    }

    fn audit_status(&self) -> Option<AuditStatus> {
        Some(self.audit_status)
    }

    fn dispatch_status(&self) -> DispatchStatus {
        self.dispatch_status
    }

    fn mark_dispatched(&mut self, at: DateTime<Utc>) {
        self.dispatch_status = DispatchStatus::Dispatched;
        self.dispatch_time = Some(at);
        self.dispatch_count += 1;
        self.updated_at = at;
    }

    fn license_plate(&self) -> &str {
        &self.details.registration.license_plate
    }

    fn emission_standard(&self) -> &str {
        &self.details.registration.emission_standard
    }

    fn environmental_code(&self) -> Option<&str> {
        None
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_details_deserialize_flat_payload() {
        let details: ExternalVehicleDetails = serde_json::from_value(json!({
            "license_plate": "粤A12345",
            "vin": "LSVAU2A37N2123456",
            "fleet_name": "车队一",
            "approved_load_mass": 31000.0
        }))
        .unwrap();

        assert_eq!(details.registration.license_plate, "粤A12345");
        assert_eq!(details.registration.approved_load_mass, Some(31000.0));
        assert_eq!(details.fleet_name, "车队一");
        assert!(details.is_obd_enabled);
    }

    #[test]
    fn test_mark_dispatched_increments_count() {
        let now = Utc::now();
        let mut vehicle = ExternalVehicle::new_unsaved(1, ExternalVehicleDetails::default(), now);
        vehicle.mark_dispatched(now);
        vehicle.mark_dispatched(now);
        assert_eq!(vehicle.dispatch_count, 2);
        assert_eq!(vehicle.dispatch_status, DispatchStatus::Dispatched);
        assert_eq!(vehicle.dispatch_time, Some(now));
    }
}
