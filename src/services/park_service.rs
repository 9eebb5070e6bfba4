//! Ciclo de vida de parques (inquilinos)
//!
//! Alta con credenciales y clave secreta, renovación con historial,
//! comprobación de validez y verificación de login.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Months, Utc};
use validator::Validate;

use crate::config::ParkSettings;
use crate::dto::park_dto::{CreateParkRequest, ParkCreatedResponse, ParkValidityResponse};
use crate::models::{NewPark, Park, ParkFilters, ParkUpdate, RenewalFilters, RenewalRecord, RenewalWithPark};
use crate::repositories::{Page, PageRequest, ParkStore};
use crate::services::credentials::{
    generate_numeric_code, generate_secret_key, hash_password, verify_password, IssuedCredentials,
};
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Intentos para encontrar una cuenta de acceso libre
const ACCOUNT_GENERATION_ATTEMPTS: usize = 20;

/// Formato de fechas en el texto de descarga
const DOWNLOAD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone)]
pub struct ParkService {
    store: Arc<dyn ParkStore>,
    settings: ParkSettings,
}

impl ParkService {
    pub fn new(store: Arc<dyn ParkStore>, settings: ParkSettings) -> Self {
        Self { store, settings }
    }

    /// Alta de parque: genera clave secreta y credenciales.
    /// Ventana por defecto: desde ahora hasta ahora + `default_validity_months`.
    pub async fn create(&self, request: CreateParkRequest) -> AppResult<ParkCreatedResponse> {
        request.validate()?;

        let now = Utc::now();
        let start_time = request.start_time.unwrap_or(now);
        let end_time = match request.end_time {
            Some(end) => end,
            None => start_time
                .checked_add_months(Months::new(self.settings.default_validity_months))
                .ok_or_else(|| AppError::BadRequest("start_time is out of range".to_string()))?,
        };
        if end_time <= start_time {
            return Err(AppError::BadRequest(
                "end_time must be later than start_time".to_string(),
            ));
        }

        let credentials = self.issue_credentials().await?;
        let login_password_hash =
            hash_password(&credentials.login_password, self.settings.credential_hash_cost)?;

        let park = self
            .store
            .insert(NewPark {
                name: request.name,
                code: request.code,
                secret_key: generate_secret_key(),
                start_time,
                end_time,
                province: request.province,
                city: request.city,
                district: request.district,
                industry: request.industry,
                remark: request.remark,
                contact_name: request.contact_name,
                contact_phone: request.contact_phone,
                login_account: credentials.login_account.clone(),
                login_password_hash,
                login_url: self.settings.login_url.clone(),
            })
            .await?;

        log::info!(
            "🏭 Parque {} '{}' creado (válido hasta {})",
            park.id,
            park.code,
            park.end_time
        );
        Ok(ParkCreatedResponse { park, credentials })
    }

    pub async fn get(&self, id: i64) -> AppResult<Park> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Park", id))
    }

    pub async fn list(&self, filters: ParkFilters, page: PageRequest) -> AppResult<Page<Park>> {
        self.store.list(&filters, page).await
    }

    /// Actualización parcial restringida a la lista blanca de `ParkUpdate`
    pub async fn update(&self, id: i64, updates: Vec<ParkUpdate>) -> AppResult<Park> {
        if updates.is_empty() {
            return Err(AppError::BadRequest("updates must not be empty".to_string()));
        }
        if updates
            .iter()
            .any(|u| matches!(u, ParkUpdate::Name(n) if n.trim().is_empty()))
        {
            return Err(AppError::BadRequest("park name must not be empty".to_string()));
        }

        let updates = last_update_per_field(updates);
        let park = self.store.apply_updates(id, &updates, Utc::now()).await?;
        let fields: Vec<&str> = updates.iter().map(|u| u.column()).collect();
        log::info!("📝 Parque {} actualizado: {:?}", id, fields);
        Ok(park)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(not_found_error("Park", id));
        }
        log::info!("🗑️ Parque {} eliminado", id);
        Ok(())
    }

    /// Renovar `duration_months` meses de calendario sobre el `end_time` actual
    pub async fn renew(&self, id: i64, duration_months: u32) -> AppResult<(Park, RenewalRecord)> {
        if duration_months == 0 {
            return Err(AppError::BadRequest(
                "duration_months must be at least 1".to_string(),
            ));
        }

        let (park, record) = self.store.renew(id, duration_months, Utc::now()).await?;
        log::info!(
            "🔄 Parque {} renovado {} mes(es): {} → {}",
            id,
            duration_months,
            record.old_end_time,
            record.new_end_time
        );
        Ok((park, record))
    }

    pub async fn list_renewals(
        &self,
        filters: RenewalFilters,
        page: PageRequest,
    ) -> AppResult<Page<RenewalWithPark>> {
        self.store.list_renewals(&filters, page).await
    }

    pub async fn check_validity(&self, id: i64) -> AppResult<ParkValidityResponse> {
        self.check_validity_at(id, Utc::now()).await
    }

    pub async fn check_validity_at(
        &self,
        id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<ParkValidityResponse> {
        let park = self.get(id).await?;
        Ok(ParkValidityResponse {
            park_id: park.id,
            valid: park.is_valid_at(now),
            start_time: park.start_time,
            end_time: park.end_time,
        })
    }

    /// Precondición para operaciones de un parque: existe y está en su ventana
    pub async fn ensure_valid(&self, id: i64) -> AppResult<Park> {
        let park = self.get(id).await?;
        if !park.is_valid_at(Utc::now()) {
            log::warn!("⛔ Parque {} fuera de su periodo de validez", id);
            return Err(AppError::ParkExpired { park_id: id });
        }
        Ok(park)
    }

    /// Texto descargable con los datos de acceso del parque.
    /// La contraseña no se puede recuperar: sólo se muestra al emitirla.
    pub async fn download_info(&self, id: i64) -> AppResult<String> {
        let park = self.get(id).await?;
        let login_url = if park.login_url.is_empty() {
            &self.settings.login_url
        } else {
            &park.login_url
        };

        let lines = [
            format!("车场名称: {}", park.name),
            format!("车场编号: {}", park.code),
            format!("密钥: {}", park.secret_key),
            format!("创建时间: {}", park.created_at.timestamp()),
            format!("开始时间: {}", park.start_time.format(DOWNLOAD_TIME_FORMAT)),
            format!("结束时间: {}", park.end_time.format(DOWNLOAD_TIME_FORMAT)),
            format!("登陆网址: {}", login_url),
            format!("账号: {}", park.login_account),
            "密码: 仅在创建或重置凭据时显示一次".to_string(),
        ];
        Ok(lines.join("\n") + "\n")
    }

    /// Emitir un nuevo par cuenta/contraseña; la contraseña se devuelve en claro una vez
    pub async fn reset_credentials(&self, id: i64) -> AppResult<IssuedCredentials> {
        // Comprobar existencia antes de generar
        self.get(id).await?;

        let credentials = self.issue_credentials().await?;
        let hash = hash_password(&credentials.login_password, self.settings.credential_hash_cost)?;
        self.store
            .replace_credentials(id, &credentials.login_account, &hash, Utc::now())
            .await?;

        log::info!("🔑 Credenciales del parque {} regeneradas", id);
        Ok(credentials)
    }

    /// Login de parque: credenciales y después ventana de validez
    pub async fn verify_login(&self, account: &str, password: &str) -> AppResult<Park> {
        let invalid = || AppError::Unauthorized("invalid login account or password".to_string());

        let park = self
            .store
            .find_by_login_account(account)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &park.login_password_hash) {
            log::warn!("⚠️ Login fallido para la cuenta {}", account);
            return Err(invalid());
        }

        if !park.is_valid_at(Utc::now()) {
            log::warn!("⛔ Login rechazado: parque {} caducado", park.id);
            return Err(AppError::ParkExpired { park_id: park.id });
        }

        log::info!("✅ Login correcto para el parque {}", park.id);
        Ok(park)
    }

    async fn issue_credentials(&self) -> AppResult<IssuedCredentials> {
        for _ in 0..ACCOUNT_GENERATION_ATTEMPTS {
            let account = generate_numeric_code();
            if self.store.find_by_login_account(&account).await?.is_none() {
                return Ok(IssuedCredentials {
                    login_account: account,
                    login_password: generate_numeric_code(),
                });
            }
        }
        Err(AppError::Internal(
            "could not allocate a free login account".to_string(),
        ))
    }
}

/// Si varias actualizaciones tocan el mismo campo gana la última
fn last_update_per_field(updates: Vec<ParkUpdate>) -> Vec<ParkUpdate> {
    let mut seen = HashSet::new();
    let mut kept: Vec<ParkUpdate> = updates
        .into_iter()
        .rev()
        .filter(|u| seen.insert(u.column()))
        .collect();
    kept.reverse();
    kept
}
