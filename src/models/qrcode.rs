//! Códigos QR de parque
//!
//! Cada parque tiene como máximo un código por tipo de vehículo. El contenido
//! es `park:<park_id>:<tipo>:<token>` y `fields_config` describe qué campos
//! pide el mini-programa al escanearlo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::vehicle::VehicleKind;

/// Código QR - mapea a la tabla qr_codes
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct QrCode {
    pub id: i64,
    pub park_id: i64,
    pub kind: VehicleKind,
    pub content: String,
    pub is_enabled: bool,
    pub fields_config: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cambios aplicables a un código existente; `None` deja el campo intacto
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QrCodeChanges {
    pub content: Option<String>,
    pub fields_config: Option<serde_json::Value>,
    pub is_enabled: Option<bool>,
}

impl QrCodeChanges {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.fields_config.is_none() && self.is_enabled.is_none()
    }
}

impl QrCode {
    pub fn apply(&mut self, changes: &QrCodeChanges, at: DateTime<Utc>) {
        if let Some(content) = &changes.content {
            self.content = content.clone();
        }
        if let Some(fields_config) = &changes.fields_config {
            self.fields_config = fields_config.clone();
        }
        if let Some(is_enabled) = changes.is_enabled {
            self.is_enabled = is_enabled;
        }
        self.updated_at = at;
    }

    /// Un escaneo sólo es aceptado si coincide con el contenido vigente
    pub fn accepts(&self, scanned: &str) -> bool {
        self.is_enabled && self.content == scanned
    }
}
