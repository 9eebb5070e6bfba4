//! Motor de reglas de validación de vehículos
//!
//! Funciones puras que validan o derivan campos de registro de vehículos:
//! matrícula, color de placa, VIN, tipo de vehículo, fechas, campos
//! obligatorios y masa por defecto. Ninguna función hace I/O.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::models::vehicle::{PlateColor, RoadVehicleRegistration};

/// Masa autorizada por defecto (kg) cuando no se informa ninguna masa
pub const DEFAULT_APPROVED_LOAD_MASS: f64 = 40000.0;

/// Longitud exacta del VIN
pub const VIN_LENGTH: usize = 17;

/// Carácter final obligatorio del tipo de vehículo ("车")
pub const VEHICLE_CLASS_SUFFIX: char = '车';

const HEAVY_OR_MEDIUM_MARKERS: [&str; 4] = ["重型", "中型", "heavy", "medium"];
const LIGHT_MARKERS: [&str; 2] = ["轻型", "light"];

lazy_static! {
    // Primer carácter: cualquier letra (incluye abreviaturas provinciales),
    // segundo: A-Z mayúscula, resto: 5-6 alfanuméricos ASCII.
    static ref PLATE_PATTERN: Regex =
        Regex::new(r"^\p{L}[A-Z][A-Za-z0-9]{5,6}$").expect("plate pattern is valid");
    static ref DATE_PATTERN: Regex =
        Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid");
}

/// Fallo de validación de un campo de vehículo
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VehicleValidationError {
    #[error("license_plate must be 7 or 8 characters long (got {actual})")]
    InvalidPlateLength { actual: usize },

    #[error("license_plate '{0}' is malformed: the second character must be an uppercase letter A-Z followed by 5-6 letters or digits")]
    InvalidPlateFormat(String),

    #[error("vin must be exactly 17 characters long (got {actual})")]
    InvalidVinLength { actual: usize },

    #[error("vehicle_type '{0}' must end with the vehicle class marker '车'")]
    InvalidVehicleTypeSuffix(String),

    #[error("{field} must use the YYYY-MM-DD format (got '{value}')")]
    InvalidDateFormat { field: &'static str, value: String },

    #[error("{field} is not a real calendar date (got '{value}')")]
    InvalidDateValue { field: &'static str, value: String },

    #[error("{0} is required")]
    MissingField(&'static str),
}

impl VehicleValidationError {
    /// Nombre del campo que provocó el fallo
    pub fn field(&self) -> Option<&'static str> {
        match self {
            VehicleValidationError::InvalidPlateLength { .. }
            | VehicleValidationError::InvalidPlateFormat(_) => Some("license_plate"),
            VehicleValidationError::InvalidVinLength { .. } => Some("vin"),
            VehicleValidationError::InvalidVehicleTypeSuffix(_) => Some("vehicle_type"),
            VehicleValidationError::InvalidDateFormat { field, .. }
            | VehicleValidationError::InvalidDateValue { field, .. } => Some(field),
            VehicleValidationError::MissingField(field) => Some(field),
        }
    }
}

pub type ValidationResult = Result<(), VehicleValidationError>;

/// Validar longitud y formato de la matrícula
pub fn validate_license_plate(plate: &str) -> ValidationResult {
    let len = plate.chars().count();
    if len != 7 && len != 8 {
        return Err(VehicleValidationError::InvalidPlateLength { actual: len });
    }

    if !PLATE_PATTERN.is_match(plate) {
        return Err(VehicleValidationError::InvalidPlateFormat(plate.to_string()));
    }

    Ok(())
}

/// Derivar el color de placa a partir de la matrícula y el tipo de vehículo.
///
/// Reglas por prioridad (la primera que aplica gana):
/// 1. 8 caracteres y el 8º es letra → verde-amarilla (nueva energía)
/// 2. 8 caracteres y el 8º es dígito → verde (nueva energía)
/// 3. 7 caracteres y tipo pesado/mediano → amarilla
/// 4. 7 caracteres y tipo ligero → azul
/// 5. en otro caso → azul
pub fn classify_plate_color(plate: &str, vehicle_type: &str) -> PlateColor {
    let chars: Vec<char> = plate.chars().collect();

    if chars.len() == 8 {
        let last = chars[7];
        if last.is_ascii_alphabetic() {
            return PlateColor::GreenYellowPlate;
        }
        if last.is_ascii_digit() {
            return PlateColor::GreenPlate;
        }
    }

    if chars.len() == 7 {
        let vehicle_type = vehicle_type.to_lowercase();
        if HEAVY_OR_MEDIUM_MARKERS.iter().any(|m| vehicle_type.contains(m)) {
            return PlateColor::YellowPlate;
        }
        if LIGHT_MARKERS.iter().any(|m| vehicle_type.contains(m)) {
            return PlateColor::BluePlate;
        }
    }

    PlateColor::BluePlate
}

/// Validar longitud del VIN (sin checksum)
pub fn validate_vin(vin: &str) -> ValidationResult {
    let len = vin.chars().count();
    if len != VIN_LENGTH {
        return Err(VehicleValidationError::InvalidVinLength { actual: len });
    }
    Ok(())
}

/// Validar que el tipo de vehículo termine con el marcador de clase
pub fn validate_vehicle_type(vehicle_type: &str) -> ValidationResult {
    if vehicle_type.chars().last() != Some(VEHICLE_CLASS_SUFFIX) {
        return Err(VehicleValidationError::InvalidVehicleTypeSuffix(
            vehicle_type.to_string(),
        ));
    }
    Ok(())
}

/// Validar fecha YYYY-MM-DD: primero el formato léxico, luego el calendario
pub fn validate_date(field: &'static str, value: &str) -> ValidationResult {
    if !DATE_PATTERN.is_match(value) {
        return Err(VehicleValidationError::InvalidDateFormat {
            field,
            value: value.to_string(),
        });
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        VehicleValidationError::InvalidDateValue {
            field,
            value: value.to_string(),
        }
    })?;

    Ok(())
}

/// Validar una fecha sólo si viene informada
pub fn validate_optional_date(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Ok(());
    }
    validate_date(field, value)
}

/// Campos obligatorios de texto, en orden de comprobación
pub struct RequiredFields<'a> {
    pub brand_model: &'a str,
    pub usage_nature: &'a str,
    pub owner: &'a str,
    pub address: &'a str,
}

/// Validar campos obligatorios y aplicar la masa por defecto.
///
/// Si ni `approved_load_mass` ni `max_towing_mass` vienen informadas,
/// `approved_load_mass` pasa a 40000.0. No es un fallo.
pub fn validate_required_fields(
    fields: RequiredFields<'_>,
    approved_load_mass: &mut Option<f64>,
    max_towing_mass: &Option<f64>,
) -> ValidationResult {
    let checks = [
        ("brand_model", fields.brand_model),
        ("usage_nature", fields.usage_nature),
        ("owner", fields.owner),
        ("address", fields.address),
    ];
    for (name, value) in checks {
        validate_not_empty(name, value)?;
    }

    apply_mass_default(approved_load_mass, max_towing_mass);
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(VehicleValidationError::MissingField(field));
    }
    Ok(())
}

/// Garantizar que al menos una masa quede informada
pub fn apply_mass_default(approved_load_mass: &mut Option<f64>, max_towing_mass: &Option<f64>) {
    if approved_load_mass.is_none() && max_towing_mass.is_none() {
        *approved_load_mass = Some(DEFAULT_APPROVED_LOAD_MASS);
    }
}

/// Validación completa de un vehículo de carretera de origen externo.
///
/// Orden fijo: matrícula → VIN → tipo → fecha de registro → fecha de
/// expedición → campos obligatorios. El primer fallo corta el resto.
/// Devuelve el color de placa derivado.
pub fn validate_road_vehicle(
    registration: &mut RoadVehicleRegistration,
) -> Result<PlateColor, VehicleValidationError> {
    validate_license_plate(&registration.license_plate)?;
    validate_vin(&registration.vin)?;
    validate_vehicle_type(&registration.vehicle_type)?;
    validate_date("register_date", &registration.register_date)?;
    validate_date("issue_date", &registration.issue_date)?;
    validate_required_fields(
        RequiredFields {
            brand_model: &registration.brand_model,
            usage_nature: &registration.usage_nature,
            owner: &registration.owner,
            address: &registration.address,
        },
        &mut registration.approved_load_mass,
        &registration.max_towing_mass,
    )?;

    Ok(classify_plate_color(
        &registration.license_plate,
        &registration.vehicle_type,
    ))
}

/// Perfil ligero para vehículos internos: la matrícula y las fechas son
/// opcionales, pero si vienen informadas deben ser válidas.
/// Devuelve el color de placa sólo cuando hay matrícula.
pub fn validate_internal_vehicle(
    registration: &mut RoadVehicleRegistration,
) -> Result<Option<PlateColor>, VehicleValidationError> {
    let has_plate = !registration.license_plate.trim().is_empty();
    if has_plate {
        validate_license_plate(&registration.license_plate)?;
    }
    validate_vin(&registration.vin)?;
    validate_optional_date("register_date", &registration.register_date)?;
    validate_optional_date("issue_date", &registration.issue_date)?;
    apply_mass_default(
        &mut registration.approved_load_mass,
        &registration.max_towing_mass,
    );

    Ok(has_plate.then(|| {
        classify_plate_color(&registration.license_plate, &registration.vehicle_type)
    }))
}
