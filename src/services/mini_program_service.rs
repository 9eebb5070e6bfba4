//! Flujos del mini-programa
//!
//! Escaneo del código QR del parque, envío de vehículos externos desde el
//! móvil y consulta de datos de registro de terceros. El envío pasa por el
//! mismo motor de validación que el alta administrativa.

use crate::clients::VehicleRegistryClient;
use crate::dto::mini_program_dto::ScanResult;
use crate::models::registry::RegistryLookup;
use crate::models::{ExternalVehicle, ExternalVehicleDetails, ThirdPartyVehicleData};
use crate::services::compliance_service::VehicleWorkflow;
use crate::services::park_service::ParkService;
use crate::services::qrcode_service::{parse_park_qrcode, QrCodeService};
use crate::utils::errors::{AppError, AppResult};

#[derive(Clone)]
pub struct MiniProgramService {
    parks: ParkService,
    qrcodes: QrCodeService,
    external: VehicleWorkflow<ExternalVehicle>,
    registry: VehicleRegistryClient,
}

impl MiniProgramService {
    pub fn new(
        parks: ParkService,
        qrcodes: QrCodeService,
        external: VehicleWorkflow<ExternalVehicle>,
        registry: VehicleRegistryClient,
    ) -> Self {
        Self {
            parks,
            qrcodes,
            external,
            registry,
        }
    }

    /// Escaneo del QR: el parque debe existir y estar en vigor. Un QR con tipo
    /// debe coincidir con el código vigente y activo de ese tipo.
    pub async fn scan(&self, qrcode: &str) -> AppResult<ScanResult> {
        let scanned = parse_park_qrcode(qrcode)?;
        let park = self.parks.ensure_valid(scanned.park_id).await?;

        let code = match scanned.kind {
            Some(kind) => Some(
                self.qrcodes
                    .resolve_scan(park.id, kind, qrcode.trim())
                    .await?,
            ),
            None => None,
        };

        log::info!("📱 QR escaneado para el parque {}", park.id);
        Ok(ScanResult {
            park_id: park.id,
            park_name: park.name,
            vehicle_kind: code.as_ref().map(|c| c.kind),
            fields_config: code.map(|c| c.fields_config),
        })
    }

    /// Envío de un vehículo externo: comprobación de validez y alta estándar
    pub async fn submit_vehicle(
        &self,
        park_id: i64,
        details: ExternalVehicleDetails,
    ) -> AppResult<ExternalVehicle> {
        self.parks.ensure_valid(park_id).await?;

        let vehicle = self.external.create(park_id, details).await?;
        log::info!(
            "📱 Vehículo externo {} enviado desde el mini-programa (parque {})",
            vehicle.id,
            park_id
        );
        Ok(vehicle)
    }

    /// Datos canónicos del vehículo desde el registro de terceros
    pub async fn get_car_data(&self, lookup: RegistryLookup) -> AppResult<ThirdPartyVehicleData> {
        if lookup.license_plate.trim().is_empty() {
            return Err(AppError::BadRequest("license_plate is required".to_string()));
        }
        Ok(self.registry.fetch_vehicle_data(&lookup).await?)
    }
}
