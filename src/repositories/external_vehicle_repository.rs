//! Repositorio PostgreSQL de vehículos externos
//!
//! Columnas de la tabla external_vehicles.

use super::pg_vehicle_store::{PgVehicleRow, PgVehicleStore, SqlValue};
use crate::models::{ExternalVehicle, RoadVehicleRegistration};

pub type PgExternalVehicleRepository = PgVehicleStore<ExternalVehicle>;

/// Columnas comunes del permiso de circulación
pub(crate) fn registration_columns(reg: &RoadVehicleRegistration) -> Vec<(&'static str, SqlValue)> {
    vec![
        ("license_plate", SqlValue::Text(reg.license_plate.clone())),
        ("vehicle_type", SqlValue::Text(reg.vehicle_type.clone())),
        ("vin", SqlValue::Text(reg.vin.clone())),
        ("register_date", SqlValue::Text(reg.register_date.clone())),
        ("issue_date", SqlValue::Text(reg.issue_date.clone())),
        ("brand_model", SqlValue::Text(reg.brand_model.clone())),
        ("usage_nature", SqlValue::Text(reg.usage_nature.clone())),
        ("owner", SqlValue::Text(reg.owner.clone())),
        ("address", SqlValue::Text(reg.address.clone())),
        ("fuel_type", SqlValue::Text(reg.fuel_type.clone())),
        ("emission_standard", SqlValue::Text(reg.emission_standard.clone())),
        ("engine_number", SqlValue::Text(reg.engine_number.clone())),
        ("approved_load_mass", SqlValue::OptFloat(reg.approved_load_mass)),
        ("max_towing_mass", SqlValue::OptFloat(reg.max_towing_mass)),
    ]
}

impl PgVehicleRow for ExternalVehicle {
    const HAS_DISPATCH_COUNT: bool = true;
    const HAS_ENVIRONMENTAL_CODE: bool = false;

    fn writable_columns(&self) -> Vec<(&'static str, SqlValue)> {
        let d = &self.details;
        let mut columns = registration_columns(&d.registration);
        columns.extend([
            ("company_id", SqlValue::OptBigInt(d.company_id)),
            ("engine_model", SqlValue::Text(d.engine_model.clone())),
            ("engine_manufacturer", SqlValue::Text(d.engine_manufacturer.clone())),
            ("total_mass", SqlValue::OptFloat(d.total_mass)),
            ("curb_mass", SqlValue::OptFloat(d.curb_mass)),
            ("phone", SqlValue::Text(d.phone.clone())),
            ("is_obd_enabled", SqlValue::Bool(d.is_obd_enabled)),
            ("fleet_name", SqlValue::Text(d.fleet_name.clone())),
            ("inbound_cargo_name", SqlValue::Text(d.inbound_cargo_name.clone())),
            ("inbound_cargo_weight", SqlValue::OptFloat(d.inbound_cargo_weight)),
            ("outbound_cargo_name", SqlValue::Text(d.outbound_cargo_name.clone())),
            ("outbound_cargo_weight", SqlValue::OptFloat(d.outbound_cargo_weight)),
            ("network_status", SqlValue::Text(d.network_status.clone())),
            ("vehicle_photo", SqlValue::Text(d.vehicle_photo.clone())),
            ("driving_license_photo", SqlValue::Text(d.driving_license_photo.clone())),
            ("vehicle_list_photo", SqlValue::Text(d.vehicle_list_photo.clone())),
            ("plate_color", SqlValue::Plate(self.plate_color)),
            ("audit_status", SqlValue::Audit(self.audit_status)),
            ("dispatch_status", SqlValue::Dispatch(self.dispatch_status)),
            ("dispatch_count", SqlValue::Int(self.dispatch_count)),
            ("dispatch_time", SqlValue::OptTimestamp(self.dispatch_time)),
            ("updated_at", SqlValue::Timestamp(self.updated_at)),
        ]);
        columns
    }
}
