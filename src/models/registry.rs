//! Datos del registro de vehículos de terceros
//!
//! Formato de intercambio con el servicio externo de consulta de
//! listas de vehículos (emisiones, motor, combustible).

use serde::{Deserialize, Serialize};

/// Consulta enviada al registro externo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryLookup {
    pub license_plate: String,
    pub vin: String,
    pub engine_number: String,
    pub vehicle_type: String,
}

/// Cuerpo de la petición tal y como lo espera el proveedor
#[derive(Debug, Serialize)]
pub struct RegistryRequestBody<'a> {
    pub park_id: &'a str,
    pub car_number: &'a str,
    pub vin: &'a str,
    pub motor: &'a str,
    #[serde(rename = "VehicleType")]
    pub vehicle_type: &'a str,
}

/// Respuesta del proveedor: `state == 1` indica éxito
#[derive(Debug, Deserialize)]
pub struct RegistryResponseBody {
    pub state: i32,
    #[serde(default)]
    pub data: Option<RegistryResponseData>,
    #[serde(default)]
    pub errmsg: String,
}

/// Datos crudos del proveedor (nombres de campo originales)
///
/// El proveedor envía `type` como código numérico; no se usa y se ignora.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegistryResponseData {
    pub oss: String,
    pub pfjd: String,
    pub vin: String,
    pub motor_company: String,
    pub motor_xh: String,
    pub cpys: String,
    pub rllx: String,
}

/// Datos canónicos del vehículo devueltos al llamante
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ThirdPartyVehicleData {
    pub oss_url: String,
    pub emission_standard: String,
    pub vin: String,
    pub engine_manufacturer: String,
    pub engine_model: String,
    pub plate_color: String,
    pub fuel_type: String,
}

impl From<RegistryResponseData> for ThirdPartyVehicleData {
    fn from(data: RegistryResponseData) -> Self {
        Self {
            oss_url: data.oss,
            emission_standard: data.pfjd,
            vin: data.vin,
            engine_manufacturer: data.motor_company,
            engine_model: data.motor_xh,
            plate_color: data.cpys,
            fuel_type: data.rllx,
        }
    }
}
