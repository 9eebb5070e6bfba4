//! Configuración de variables de entorno
//!
//! `AppConfig` se construye una sola vez al arrancar y se comparte con el
//! resto de componentes. `from_lookup` acepta cualquier fuente de claves para
//! que los tests no toquen el entorno real del proceso.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::clients::RegistryClientConfig;
use crate::config::database::DatabaseConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOGIN_URL: &str = "http://localhost:8080/login";
pub const DEFAULT_VALIDITY_MONTHS: u32 = 12;

/// Errores al cargar la configuración
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing required configuration key {0}")]
    Missing(&'static str),

    #[error("invalid value '{value}' for configuration key {key}")]
    Invalid { key: &'static str, value: String },
}

/// Parámetros del ciclo de vida de parques
#[derive(Debug, Clone)]
pub struct ParkSettings {
    pub default_validity_months: u32,
    pub login_url: String,
    pub credential_hash_cost: u32,
}

impl Default for ParkSettings {
    fn default() -> Self {
        Self {
            default_validity_months: DEFAULT_VALIDITY_MONTHS,
            login_url: DEFAULT_LOGIN_URL.to_string(),
            credential_hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Configuración de la aplicación
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub log_level: tracing::Level,
    /// Vacío = CORS permisivo
    pub cors_origins: Vec<String>,
    /// `None` = almacén en memoria
    pub database: Option<DatabaseConfig>,
    pub registry: RegistryClientConfig,
    pub park: ParkSettings,
}

impl AppConfig {
    /// Cargar desde las variables de entorno del proceso
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Cargar desde una función de búsqueda arbitraria
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database = match get("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 20)?,
                min_connections: parse_or(&get, "DB_MIN_CONNECTIONS", 1)?,
                connect_timeout: Duration::from_secs(parse_or(&get, "DB_CONNECT_TIMEOUT_SECS", 30)?),
                ..DatabaseConfig::default()
            }),
            None => None,
        };

        let base_url = get("THIRD_PARTY_BASE_URL").unwrap_or_default();
        let park_id = get("THIRD_PARTY_PARK_ID").unwrap_or_default();
        if !base_url.is_empty() && park_id.is_empty() {
            return Err(ConfigError::Missing("THIRD_PARTY_PARK_ID"));
        }
        let max_attempts: u32 = parse_or(&get, "THIRD_PARTY_MAX_ATTEMPTS", 3)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "THIRD_PARTY_MAX_ATTEMPTS",
                value: max_attempts.to_string(),
            });
        }
        let registry = RegistryClientConfig {
            base_url,
            park_id,
            timeout: Duration::from_secs(parse_or(&get, "THIRD_PARTY_TIMEOUT_SECS", 30)?),
            max_attempts,
        };

        let credential_hash_cost: u32 =
            parse_or(&get, "PARK_CREDENTIAL_HASH_COST", bcrypt::DEFAULT_COST)?;
        // bcrypt sólo acepta costes entre 4 y 31
        if !(4..=31).contains(&credential_hash_cost) {
            return Err(ConfigError::Invalid {
                key: "PARK_CREDENTIAL_HASH_COST",
                value: credential_hash_cost.to_string(),
            });
        }
        let park = ParkSettings {
            default_validity_months: parse_or(
                &get,
                "PARK_DEFAULT_VALIDITY_MONTHS",
                DEFAULT_VALIDITY_MONTHS,
            )?,
            login_url: get("PARK_LOGIN_URL").unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string()),
            credential_hash_cost,
        };

        Ok(Self {
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
            log_level: parse_or(&get, "LOG_LEVEL", tracing::Level::INFO)?,
            cors_origins: get("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            database,
            registry,
            park,
        })
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
