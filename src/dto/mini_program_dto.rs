use serde::{Deserialize, Serialize};

use crate::models::VehicleKind;

// Request de escaneo de código QR ("park:<id>" o "park:<id>:<tipo>:<token>")
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub qrcode: String,
}

// Resultado del escaneo
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScanResult {
    pub park_id: i64,
    pub park_name: String,
    pub vehicle_kind: Option<VehicleKind>,
    pub fields_config: Option<serde_json::Value>,
}
