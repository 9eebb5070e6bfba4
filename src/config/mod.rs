//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos, variables de entorno
//! y parámetros de parques y del registro de terceros.

pub mod database;
pub mod environment;

pub use database::DatabaseConfig;
pub use environment::{AppConfig, ConfigError, ParkSettings};
