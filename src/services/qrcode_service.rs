//! Códigos QR de parque por tipo de vehículo
//!
//! El primer acceso genera el código; regenerarlo invalida el contenido
//! anterior, de modo que un QR impreso antiguo deja de aceptarse al escanear.

use std::sync::Arc;

use chrono::Utc;

use crate::dto::qrcode_dto::UpdateQrCodeRequest;
use crate::models::{QrCode, QrCodeChanges, VehicleKind};
use crate::repositories::ParkStore;
use crate::services::credentials::generate_secret_key;
use crate::utils::errors::{AppError, AppResult};

/// Prefijo del contenido del código QR de un parque
pub const PARK_QR_PREFIX: &str = "park:";

/// Contenido interpretado de un QR escaneado
#[derive(Debug, Clone, PartialEq)]
pub struct ParkQrContent {
    pub park_id: i64,
    /// `None` para el formato simple `park:<id>`
    pub kind: Option<VehicleKind>,
}

/// Interpretar `park:<id>` o `park:<id>:<tipo>:<token>`
pub fn parse_park_qrcode(qrcode: &str) -> AppResult<ParkQrContent> {
    let invalid = || AppError::BadRequest(format!("invalid park QR code '{}'", qrcode));

    let rest = qrcode
        .trim()
        .strip_prefix(PARK_QR_PREFIX)
        .ok_or_else(invalid)?;
    let mut parts = rest.split(':');

    let park_id = parts
        .next()
        .and_then(|id| id.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(invalid)?;

    let kind = match (parts.next(), parts.next(), parts.next()) {
        (None, _, _) => None,
        (Some(slug), Some(token), None) if !token.is_empty() => {
            Some(VehicleKind::from_slug(slug).ok_or_else(invalid)?)
        }
        _ => return Err(invalid()),
    };

    Ok(ParkQrContent { park_id, kind })
}

/// Contenido aleatorio nuevo para un código
pub fn generate_qr_content(park_id: i64, kind: VehicleKind) -> String {
    format!(
        "{}{}:{}:{}",
        PARK_QR_PREFIX,
        park_id,
        kind.slug(),
        generate_secret_key()
    )
}

fn qrcode_not_found(park_id: i64, kind: VehicleKind) -> AppError {
    AppError::NotFound(format!(
        "QR code '{}' for park '{}' not found",
        kind.slug(),
        park_id
    ))
}

#[derive(Clone)]
pub struct QrCodeService {
    store: Arc<dyn ParkStore>,
}

impl QrCodeService {
    pub fn new(store: Arc<dyn ParkStore>) -> Self {
        Self { store }
    }

    /// Código vigente del parque para `kind`; se genera en el primer acceso
    pub async fn get(&self, park_id: i64, kind: VehicleKind) -> AppResult<QrCode> {
        if let Some(code) = self.store.find_qrcode(park_id, kind).await? {
            return Ok(code);
        }

        let content = generate_qr_content(park_id, kind);
        match self
            .store
            .insert_qrcode(park_id, kind, &content, Utc::now())
            .await
        {
            Ok(code) => {
                log::info!("🔳 Código QR {} generado para el parque {}", kind.slug(), park_id);
                Ok(code)
            }
            // Otra petición lo generó a la vez
            Err(AppError::Conflict(_)) => self
                .store
                .find_qrcode(park_id, kind)
                .await?
                .ok_or_else(|| qrcode_not_found(park_id, kind)),
            Err(e) => Err(e),
        }
    }

    /// Regenerar contenido, cambiar `fields_config` o activar/desactivar
    pub async fn update(
        &self,
        park_id: i64,
        kind: VehicleKind,
        request: UpdateQrCodeRequest,
    ) -> AppResult<QrCode> {
        let changes = QrCodeChanges {
            content: request
                .regenerate
                .then(|| generate_qr_content(park_id, kind)),
            fields_config: request.fields_config,
            is_enabled: request.is_enabled,
        };
        if changes.is_empty() {
            return Err(AppError::BadRequest(
                "nothing to update: set regenerate, fields_config or is_enabled".to_string(),
            ));
        }
        if changes
            .fields_config
            .as_ref()
            .is_some_and(|config| !config.is_object())
        {
            return Err(AppError::BadRequest(
                "fields_config must be a JSON object".to_string(),
            ));
        }

        self.get(park_id, kind).await?;
        let code = self
            .store
            .update_qrcode(park_id, kind, &changes, Utc::now())
            .await?;

        log::info!(
            "🔳 Código QR {} del parque {} actualizado (regenerado: {})",
            kind.slug(),
            park_id,
            changes.content.is_some()
        );
        Ok(code)
    }

    /// Comprobar que un QR escaneado es el vigente y está activo
    pub async fn resolve_scan(
        &self,
        park_id: i64,
        kind: VehicleKind,
        scanned: &str,
    ) -> AppResult<QrCode> {
        let code = self.store.find_qrcode(park_id, kind).await?;
        match code {
            Some(code) if code.accepts(scanned) => Ok(code),
            _ => {
                log::warn!("⚠️ QR {} del parque {} rechazado", kind.slug(), park_id);
                Err(AppError::BadRequest(
                    "QR code is disabled or has been replaced".to_string(),
                ))
            }
        }
    }
}
