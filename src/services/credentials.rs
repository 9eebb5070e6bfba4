//! Generación de credenciales de parque
//!
//! Clave secreta para la firma HMAC del plugin y par cuenta/contraseña
//! numérico de 5 dígitos. La contraseña sólo se guarda como hash bcrypt.

use rand::Rng;
use serde::Serialize;

use crate::utils::errors::{AppError, AppResult};

/// Longitud de la cuenta y de la contraseña generadas
pub const CREDENTIAL_DIGITS: usize = 5;

/// Bytes aleatorios de la clave secreta (32 caracteres hex)
pub const SECRET_KEY_BYTES: usize = 16;

/// Credenciales en claro, devueltas una única vez al emitirlas
#[derive(Debug, Clone, Serialize)]
pub struct IssuedCredentials {
    pub login_account: String,
    pub login_password: String,
}

/// Clave secreta aleatoria en hexadecimal
pub fn generate_secret_key() -> String {
    let mut bytes = [0u8; SECRET_KEY_BYTES];
    rand::thread_rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Código numérico aleatorio de `CREDENTIAL_DIGITS` dígitos (puede empezar por 0)
pub fn generate_numeric_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CREDENTIAL_DIGITS)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Hash bcrypt de la contraseña
pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    bcrypt::hash(password, cost)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verificar contraseña contra su hash; un hash corrupto cuenta como no válido
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            log::warn!("⚠️ Hash de contraseña ilegible: {}", e);
            false
        }
    }
}
