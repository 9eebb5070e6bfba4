//! Utilidades del sistema
//!
//! Este módulo contiene el manejo de errores y el motor de reglas
//! de validación de vehículos.

pub mod errors;
pub mod validation;

pub use errors::{AppError, AppResult};
