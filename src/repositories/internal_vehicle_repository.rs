//! Repositorio PostgreSQL de vehículos internos

use super::external_vehicle_repository::registration_columns;
use super::pg_vehicle_store::{PgVehicleRow, PgVehicleStore, SqlValue};
use crate::models::InternalVehicle;

pub type PgInternalVehicleRepository = PgVehicleStore<InternalVehicle>;

impl PgVehicleRow for InternalVehicle {
    const HAS_DISPATCH_COUNT: bool = false;
    const HAS_ENVIRONMENTAL_CODE: bool = true;

    fn writable_columns(&self) -> Vec<(&'static str, SqlValue)> {
        let d = &self.details;
        let mut columns = registration_columns(&d.registration);
        columns.extend([
            ("environmental_code", SqlValue::Text(d.environmental_code.clone())),
            ("production_date", SqlValue::Text(d.production_date.clone())),
            ("local_environmental_code", SqlValue::Text(d.local_environmental_code.clone())),
            ("network_status", SqlValue::Text(d.network_status.clone())),
            ("vehicle_list_photo", SqlValue::Text(d.vehicle_list_photo.clone())),
            ("driving_license_photo", SqlValue::Text(d.driving_license_photo.clone())),
            ("vehicle_photo", SqlValue::Text(d.vehicle_photo.clone())),
            ("plate_color", SqlValue::OptPlate(self.plate_color)),
            ("dispatch_status", SqlValue::Dispatch(self.dispatch_status)),
            ("dispatch_time", SqlValue::OptTimestamp(self.dispatch_time)),
            ("updated_at", SqlValue::Timestamp(self.updated_at)),
        ]);
        columns
    }
}
