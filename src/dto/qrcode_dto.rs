use serde::Deserialize;

// Query de códigos QR (?park_id=)
#[derive(Debug, Deserialize)]
pub struct QrCodeQuery {
    pub park_id: i64,
}

// Request de actualización de código QR
#[derive(Debug, Default, Deserialize)]
pub struct UpdateQrCodeRequest {
    #[serde(default)]
    pub regenerate: bool,
    pub fields_config: Option<serde_json::Value>,
    pub is_enabled: Option<bool>,
}
