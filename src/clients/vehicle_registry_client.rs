//! Cliente HTTP del registro de vehículos de terceros
//!
//! Consulta los datos canónicos de un vehículo (emisiones, motor, combustible)
//! a partir de matrícula + VIN + número de motor + tipo de vehículo.
//!
//! Política de reintentos: sólo los fallos de transporte (conexión, timeout)
//! se reintentan, con espera exponencial de 1s, 2s, ... entre intentos.
//! Un status HTTP no exitoso o un `state != 1` del proveedor son terminales.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::registry::{
    RegistryLookup, RegistryRequestBody, RegistryResponseBody, ThirdPartyVehicleData,
};

/// Ruta del endpoint de consulta en el proveedor
pub const LOOKUP_PATH: &str = "/get_car_data";

/// Errores del cliente de enriquecimiento
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnrichmentError {
    #[error("vehicle registry answered with HTTP status {status}")]
    RemoteHttp { status: u16 },

    #[error("vehicle registry rejected the lookup: {message}")]
    RemoteBusiness { message: String },

    #[error("vehicle registry unreachable after {attempts} attempt(s): {last_error}")]
    RemoteUnavailable { attempts: u32, last_error: String },

    #[error("vehicle registry returned an unreadable payload: {0}")]
    InvalidPayload(String),

    #[error("vehicle registry base URL is not configured")]
    NotConfigured,
}

impl EnrichmentError {
    pub fn code(&self) -> &'static str {
        match self {
            EnrichmentError::RemoteHttp { .. } => "REMOTE_HTTP_ERROR",
            EnrichmentError::RemoteBusiness { .. } => "REMOTE_BUSINESS_ERROR",
            EnrichmentError::RemoteUnavailable { .. } => "REMOTE_UNAVAILABLE",
            EnrichmentError::InvalidPayload(_) => "REMOTE_INVALID_PAYLOAD",
            EnrichmentError::NotConfigured => "REMOTE_NOT_CONFIGURED",
        }
    }
}

/// Respuesta HTTP cruda del proveedor
#[derive(Debug, Clone)]
pub struct TransportReply {
    pub status: u16,
    pub body: String,
}

/// Fallo a nivel de transporte (reintentable)
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Transporte HTTP hacia el proveedor; permite sustituirlo en tests
#[async_trait]
pub trait RegistryTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        body: &RegistryRequestBody<'_>,
    ) -> Result<TransportReply, TransportError>;
}

/// Transporte real basado en reqwest
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RegistryTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &RegistryRequestBody<'_>,
    ) -> Result<TransportReply, TransportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(TransportReply { status, body })
    }
}

/// Configuración del cliente
#[derive(Debug, Clone)]
pub struct RegistryClientConfig {
    pub base_url: String,
    pub park_id: String,
    pub timeout: Duration,
    pub max_attempts: u32,
}

impl Default for RegistryClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            park_id: String::new(),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
        }
    }
}

/// Cliente del registro de vehículos
#[derive(Clone)]
pub struct VehicleRegistryClient {
    transport: Arc<dyn RegistryTransport>,
    config: RegistryClientConfig,
}

impl VehicleRegistryClient {
    pub fn new(transport: Arc<dyn RegistryTransport>, config: RegistryClientConfig) -> Self {
        Self { transport, config }
    }

    /// Crear el cliente con el transporte reqwest
    pub fn with_reqwest(config: RegistryClientConfig) -> Result<Self, reqwest::Error> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Espera antes del siguiente intento: 2^(attempt-1) segundos
    pub fn backoff(attempt: u32) -> Duration {
        Duration::from_secs(1u64 << attempt.saturating_sub(1).min(16))
    }

    /// Consultar los datos canónicos de un vehículo
    pub async fn fetch_vehicle_data(
        &self,
        lookup: &RegistryLookup,
    ) -> Result<ThirdPartyVehicleData, EnrichmentError> {
        if self.config.base_url.trim().is_empty() {
            return Err(EnrichmentError::NotConfigured);
        }

        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), LOOKUP_PATH);
        let body = RegistryRequestBody {
            park_id: &self.config.park_id,
            car_number: &lookup.license_plate,
            vin: &lookup.vin,
            motor: &lookup.engine_number,
            vehicle_type: &lookup.vehicle_type,
        };

        let max_attempts = self.config.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            info!(
                "🔍 Consultando registro de vehículos para {} (intento {}/{})",
                lookup.license_plate, attempt, max_attempts
            );

            let outcome =
                tokio::time::timeout(self.config.timeout, self.transport.post_json(&url, &body))
                    .await;

            let reply = match outcome {
                Ok(Ok(reply)) => reply,
                Ok(Err(e)) => {
                    last_error = e.to_string();
                    warn!("⚠️ Fallo de transporte en intento {}: {}", attempt, last_error);
                    self.wait_before_retry(attempt, max_attempts).await;
                    continue;
                }
                Err(_) => {
                    last_error = format!("timed out after {:?}", self.config.timeout);
                    warn!("⏰ Timeout en intento {}: {}", attempt, last_error);
                    self.wait_before_retry(attempt, max_attempts).await;
                    continue;
                }
            };

            return Self::interpret_reply(reply);
        }

        warn!(
            "❌ Registro de vehículos no disponible tras {} intentos",
            max_attempts
        );
        Err(EnrichmentError::RemoteUnavailable {
            attempts: max_attempts,
            last_error,
        })
    }

    async fn wait_before_retry(&self, attempt: u32, max_attempts: u32) {
        if attempt < max_attempts {
            tokio::time::sleep(Self::backoff(attempt)).await;
        }
    }

    fn interpret_reply(reply: TransportReply) -> Result<ThirdPartyVehicleData, EnrichmentError> {
        if !(200..300).contains(&reply.status) {
            warn!("❌ Registro de vehículos respondió HTTP {}", reply.status);
            return Err(EnrichmentError::RemoteHttp {
                status: reply.status,
            });
        }

        let parsed: RegistryResponseBody = serde_json::from_str(&reply.body)
            .map_err(|e| EnrichmentError::InvalidPayload(e.to_string()))?;

        if parsed.state != 1 {
            warn!("❌ Registro de vehículos rechazó la consulta: {}", parsed.errmsg);
            return Err(EnrichmentError::RemoteBusiness {
                message: parsed.errmsg,
            });
        }

        let data = parsed
            .data
            .ok_or_else(|| EnrichmentError::InvalidPayload("missing data object".to_string()))?;

        info!("✅ Datos de registro obtenidos para VIN {}", data.vin);
        Ok(data.into())
    }
}
