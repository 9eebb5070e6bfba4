//! Repositorio PostgreSQL de maquinaria no de carretera

use super::pg_vehicle_store::{PgVehicleRow, PgVehicleStore, SqlValue};
use crate::models::NonRoadMachinery;

pub type PgNonRoadRepository = PgVehicleStore<NonRoadMachinery>;

impl PgVehicleRow for NonRoadMachinery {
    const HAS_DISPATCH_COUNT: bool = false;
    const HAS_ENVIRONMENTAL_CODE: bool = true;

    fn writable_columns(&self) -> Vec<(&'static str, SqlValue)> {
        let d = &self.details;
        vec![
            ("environmental_code", SqlValue::Text(d.environmental_code.clone())),
            ("pin", SqlValue::Text(d.pin.clone())),
            ("production_date", SqlValue::Text(d.production_date.clone())),
            ("license_plate", SqlValue::Text(d.license_plate.clone())),
            ("emission_standard", SqlValue::Text(d.emission_standard.clone())),
            ("fuel_type", SqlValue::Text(d.fuel_type.clone())),
            ("machinery_type", SqlValue::Text(d.machinery_type.clone())),
            ("machinery_model", SqlValue::Text(d.machinery_model.clone())),
            ("engine_model", SqlValue::Text(d.engine_model.clone())),
            ("engine_manufacturer", SqlValue::Text(d.engine_manufacturer.clone())),
            ("engine_number", SqlValue::Text(d.engine_number.clone())),
            ("engine_power", SqlValue::OptFloat(d.engine_power)),
            ("owner", SqlValue::Text(d.owner.clone())),
            ("environmental_info_number", SqlValue::Text(d.environmental_info_number.clone())),
            ("register_date", SqlValue::Text(d.register_date.clone())),
            ("machinery_manufacturer", SqlValue::Text(d.machinery_manufacturer.clone())),
            ("local_environmental_code", SqlValue::Text(d.local_environmental_code.clone())),
            ("entry_date", SqlValue::Text(d.entry_date.clone())),
            ("whole_machine_photo", SqlValue::Text(d.whole_machine_photo.clone())),
            ("engine_nameplate_photo", SqlValue::Text(d.engine_nameplate_photo.clone())),
            ("environmental_label_photo", SqlValue::Text(d.environmental_label_photo.clone())),
            ("device_photo", SqlValue::Text(d.device_photo.clone())),
            ("dispatch_status", SqlValue::Dispatch(self.dispatch_status)),
            ("dispatch_time", SqlValue::OptTimestamp(self.dispatch_time)),
            ("updated_at", SqlValue::Timestamp(self.updated_at)),
        ]
    }
}
