//! Tipos compartidos por los tres tipos de vehículo
//!
//! Enums de estado (auditoría, despacho, color de placa), el bloque común
//! de datos de registro de vehículos de carretera y el trait `VehicleRecord`
//! que permite al flujo de cumplimiento tratar los tres tipos de forma genérica.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sqlx::{FromRow, Type};

use crate::utils::validation::VehicleValidationError;

/// Color de placa derivado - mapea al ENUM plate_color
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "plate_color", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PlateColor {
    YellowPlate,
    BluePlate,
    GreenPlate,
    GreenYellowPlate,
}

impl PlateColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlateColor::YellowPlate => "yellow-plate",
            PlateColor::BluePlate => "blue-plate",
            PlateColor::GreenPlate => "green-plate",
            PlateColor::GreenYellowPlate => "green-yellow-plate",
        }
    }
}

/// Estado de auditoría - mapea al ENUM audit_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "audit_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    #[default]
    Unaudited,
    Audited,
}

impl AuditStatus {
    /// Interpretar el valor recibido; sólo se aceptan "audited" y "unaudited"
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "audited" => Some(AuditStatus::Audited),
            "unaudited" => Some(AuditStatus::Unaudited),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Unaudited => "unaudited",
            AuditStatus::Audited => "audited",
        }
    }
}

/// Estado de despacho - mapea al ENUM dispatch_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "dispatch_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    #[default]
    Undispatched,
    Dispatched,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchStatus::Undispatched => "undispatched",
            DispatchStatus::Dispatched => "dispatched",
        }
    }
}

/// Tipo de vehículo gestionado - mapea al ENUM vehicle_kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "vehicle_kind", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum VehicleKind {
    ExternalVehicle,
    InternalVehicle,
    NonRoadMachinery,
}

impl VehicleKind {
    /// Nombre legible usado en mensajes de error y logs
    pub fn label(&self) -> &'static str {
        match self {
            VehicleKind::ExternalVehicle => "External vehicle",
            VehicleKind::InternalVehicle => "Internal vehicle",
            VehicleKind::NonRoadMachinery => "Non-road machinery",
        }
    }

    /// Segmento de ruta y de contenido QR (`external-vehicle`, `internal-vehicle`, `non-road`)
    pub fn slug(&self) -> &'static str {
        match self {
            VehicleKind::ExternalVehicle => "external-vehicle",
            VehicleKind::InternalVehicle => "internal-vehicle",
            VehicleKind::NonRoadMachinery => "non-road",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "external-vehicle" => Some(VehicleKind::ExternalVehicle),
            "internal-vehicle" => Some(VehicleKind::InternalVehicle),
            "non-road" => Some(VehicleKind::NonRoadMachinery),
            _ => None,
        }
    }

    /// Tabla PostgreSQL que almacena este tipo
    pub fn table(&self) -> &'static str {
        match self {
            VehicleKind::ExternalVehicle => "external_vehicles",
            VehicleKind::InternalVehicle => "internal_vehicles",
            VehicleKind::NonRoadMachinery => "non_road_machinery",
        }
    }
}

/// Datos de registro (permiso de circulación) de un vehículo de carretera
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(default)]
pub struct RoadVehicleRegistration {
    pub license_plate: String,
    pub vehicle_type: String,
    pub vin: String,
    pub register_date: String,
    pub issue_date: String,
    pub brand_model: String,
    pub usage_nature: String,
    pub owner: String,
    pub address: String,
    pub fuel_type: String,
    pub emission_standard: String,
    pub engine_number: String,
    pub approved_load_mass: Option<f64>,
    pub max_towing_mass: Option<f64>,
}

/// Filtros de listado; los de texto son coincidencia parcial, los de estado exactos
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleFilters {
    pub license_plate: Option<String>,
    pub audit_status: Option<AuditStatus>,
    pub dispatch_status: Option<DispatchStatus>,
    pub emission_standard: Option<String>,
    pub environmental_code: Option<String>,
}

impl VehicleFilters {
    /// Normalizar: strings vacíos cuentan como filtro ausente
    pub fn normalized(self) -> Self {
        fn non_empty(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }
        Self {
            license_plate: non_empty(self.license_plate),
            audit_status: self.audit_status,
            dispatch_status: self.dispatch_status,
            emission_standard: non_empty(self.emission_standard),
            environmental_code: non_empty(self.environmental_code),
        }
    }

    /// Evaluar los filtros contra un registro (usado por el almacén en memoria)
    pub fn matches<V: VehicleRecord>(&self, park_id: i64, vehicle: &V) -> bool {
        if vehicle.park_id() != park_id {
            return false;
        }
        if let Some(plate) = &self.license_plate {
            if !vehicle.license_plate().contains(plate.as_str()) {
                return false;
            }
        }
        if let Some(status) = self.audit_status {
            if vehicle.audit_status() != Some(status) {
                return false;
            }
        }
        if let Some(status) = self.dispatch_status {
            if vehicle.dispatch_status() != status {
                return false;
            }
        }
        if let Some(standard) = &self.emission_standard {
            if vehicle.emission_standard() != standard {
                return false;
            }
        }
        if let Some(code) = &self.environmental_code {
            match vehicle.environmental_code() {
                Some(value) if value.contains(code.as_str()) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Comportamiento común de los tres tipos de vehículo.
///
/// `Details` es la parte editable del registro (lo que llega en create/update);
/// el resto (id, estados, contadores, versión) lo gestiona el flujo de cumplimiento.
pub trait VehicleRecord:
    Clone + Send + Sync + Serialize + DeserializeOwned + std::fmt::Debug + 'static
{
    type Details: Clone + Send + Sync + Serialize + DeserializeOwned + std::fmt::Debug + 'static;

    const KIND: VehicleKind;

    /// El despacho exige `audit_status == audited`
    const AUDIT_GATED: bool;

    /// Construir un registro aún no persistido (id 0, versión 0)
    fn new_unsaved(park_id: i64, details: Self::Details, now: DateTime<Utc>) -> Self;

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
    fn park_id(&self) -> i64;
    fn version(&self) -> i32;
    fn set_version(&mut self, version: i32);

    /// Reemplazar los datos editables conservando identidad y estados
    fn replace_details(&mut self, details: Self::Details);

    /// Aplicar el motor de reglas y las derivaciones (color de placa, masa por defecto)
    fn validate_registration(&mut self) -> Result<(), VehicleValidationError>;

    /// `None` para tipos sin control de auditoría
    fn audit_status(&self) -> Option<AuditStatus>;
    fn dispatch_status(&self) -> DispatchStatus;

    /// Registrar un despacho en `at`
    fn mark_dispatched(&mut self, at: DateTime<Utc>);

    fn license_plate(&self) -> &str;
    fn emission_standard(&self) -> &str;
    fn environmental_code(&self) -> Option<&str>;

    /// Actualizar `updated_at`
    fn touch(&mut self, now: DateTime<Utc>);
}
