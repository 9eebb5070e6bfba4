//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Se construye una sola vez al arrancar.

use std::sync::Arc;

use crate::clients::VehicleRegistryClient;
use crate::config::AppConfig;
use crate::repositories::Stores;
use crate::services::{ComplianceService, MiniProgramService, ParkService, QrCodeService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub compliance: ComplianceService,
    pub parks: ParkService,
    pub qrcodes: QrCodeService,
    pub mini_program: MiniProgramService,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, stores: Stores, registry: VehicleRegistryClient) -> Self {
        let compliance = ComplianceService::new(&stores);
        let parks = ParkService::new(Arc::clone(&stores.parks), config.park.clone());
        let qrcodes = QrCodeService::new(Arc::clone(&stores.parks));
        let mini_program = MiniProgramService::new(
            parks.clone(),
            qrcodes.clone(),
            compliance.external.clone(),
            registry,
        );

        Self {
            config,
            compliance,
            parks,
            qrcodes,
            mini_program,
        }
    }
}
