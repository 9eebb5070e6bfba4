//! Modelo de NonRoadMachinery
//!
//! Maquinaria móvil no de carretera (carretillas, cargadoras...).
//! Se identifica por PIN o código ambiental en lugar de VIN.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::vehicle::{AuditStatus, DispatchStatus, VehicleKind, VehicleRecord};
use crate::utils::validation::{validate_optional_date, VehicleValidationError};

/// Datos editables de una máquina
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(default)]
pub struct NonRoadMachineryDetails {
    pub environmental_code: String,
    pub pin: String,
    pub production_date: String,
    pub license_plate: String,
    pub emission_standard: String,
    pub fuel_type: String,
    pub machinery_type: String,
    pub machinery_model: String,
    pub engine_model: String,
    pub engine_manufacturer: String,
    pub engine_number: String,
    /// kW
    pub engine_power: Option<f64>,
    pub owner: String,
    pub environmental_info_number: String,
    pub register_date: String,
    pub machinery_manufacturer: String,
    pub local_environmental_code: String,
    pub entry_date: String,
    pub whole_machine_photo: String,
    pub engine_nameplate_photo: String,
    pub environmental_label_photo: String,
    pub device_photo: String,
}

/// NonRoadMachinery - mapea a la tabla non_road_machinery
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NonRoadMachinery {
    pub id: i64,
    pub park_id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub details: NonRoadMachineryDetails,
    pub dispatch_status: DispatchStatus,
    pub dispatch_time: Option<DateTime<Utc>>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VehicleRecord for NonRoadMachinery {
    type Details = NonRoadMachineryDetails;

    const KIND: VehicleKind = VehicleKind::NonRoadMachinery;

    const AUDIT_GATED: bool = false;

    fn new_unsaved(park_id: i64, details: Self::Details, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            park_id,
            details,
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

    /// Se exige PIN o código ambiental; las fechas se validan si vienen informadas
    fn validate_registration(&mut self) -> Result<(), VehicleValidationError> {
        let details = &self.details;
        if details.pin.trim().is_empty() && details.environmental_code.trim().is_empty() {
            return Err(VehicleValidationError::MissingField("pin"));
        }
        validate_optional_date("production_date", &details.production_date)?;
        validate_optional_date("register_date", &details.register_date)?;
        validate_optional_date("entry_date", &details.entry_date)?;
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
        &self.details.license_plate
    }

    fn emission_standard(&self) -> &str {
        &self.details.emission_standard
    }

    fn environmental_code(&self) -> Option<&str> {
        Some(&self.details.environmental_code)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
