//! Flujo de cumplimiento de vehículos
//!
//! Orquesta alta → validación → persistencia, la transición de auditoría y
//! los despachos (individual y por lotes). Cada transición relee el registro
//! antes de decidir y escribe con compare-and-swap de versión; los conflictos
//! se devuelven al llamante sin reintento automático.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use crate::models::{
    AuditStatus, ExternalVehicle, InternalVehicle, NonRoadMachinery, VehicleFilters, VehicleRecord,
};
use crate::repositories::{BatchDispatchOutcome, Page, PageRequest, Stores, VehicleStore};
use crate::utils::errors::{not_found_error, stale_version_error, AppError, AppResult};

/// Flujo de cumplimiento para un tipo de vehículo
pub struct VehicleWorkflow<V: VehicleRecord> {
    store: Arc<dyn VehicleStore<V>>,
}

impl<V: VehicleRecord> Clone for VehicleWorkflow<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<V: VehicleRecord> VehicleWorkflow<V> {
    pub fn new(store: Arc<dyn VehicleStore<V>>) -> Self {
        Self { store }
    }

    /// Validar y persistir un vehículo nuevo (sin auditar, sin despachar)
    pub async fn create(&self, park_id: i64, details: V::Details) -> AppResult<V> {
        if park_id <= 0 {
            return Err(AppError::BadRequest("park_id is required".to_string()));
        }

        let mut vehicle = V::new_unsaved(park_id, details, Utc::now());
        if let Err(e) = vehicle.validate_registration() {
            log::warn!("⚠️ {} rechazado en el alta: {}", V::KIND.label(), e);
            return Err(e.into());
        }

        let stored = self.store.insert(vehicle).await?;
        log::info!(
            "✅ {} {} creado en parque {} (matrícula '{}')",
            V::KIND.label(),
            stored.id(),
            stored.park_id(),
            stored.license_plate()
        );
        Ok(stored)
    }

    pub async fn get(&self, id: i64) -> AppResult<V> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error(V::KIND.label(), id))
    }

    pub async fn list(
        &self,
        park_id: i64,
        filters: VehicleFilters,
        page: PageRequest,
    ) -> AppResult<Page<V>> {
        self.store.list(park_id, &filters.normalized(), page).await
    }

    /// Reemplazar los datos editables. Se revalida el registro completo y se
    /// exige la versión leída por el llamante.
    pub async fn update(&self, id: i64, version: i32, details: V::Details) -> AppResult<V> {
        let mut vehicle = self.get(id).await?;
        if vehicle.version() != version {
            log::warn!(
                "⚠️ {} {}: versión {} obsoleta (actual {})",
                V::KIND.label(),
                id,
                version,
                vehicle.version()
            );
            return Err(stale_version_error(V::KIND.label(), id, version));
        }

        vehicle.replace_details(details);
        vehicle.validate_registration()?;
        vehicle.touch(Utc::now());

        let updated = self.store.update(vehicle, version).await?;
        log::info!(
            "📝 {} {} actualizado (versión {})",
            V::KIND.label(),
            id,
            updated.version()
        );
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(not_found_error(V::KIND.label(), id));
        }
        log::info!("🗑️ {} {} eliminado", V::KIND.label(), id);
        Ok(())
    }

    /// Despacho individual. Para tipos con control de auditoría exige `audited`.
    /// Cada llamada incrementa el contador y actualiza `dispatch_time`.
    pub async fn dispatch(&self, id: i64) -> AppResult<V> {
        let mut vehicle = self.get(id).await?;

        if V::AUDIT_GATED && vehicle.audit_status() != Some(AuditStatus::Audited) {
            log::warn!("⚠️ {} {} no auditado, despacho rechazado", V::KIND.label(), id);
            return Err(AppError::NotAudited { id });
        }

        let version = vehicle.version();
        vehicle.mark_dispatched(Utc::now());
        let dispatched = self.store.update(vehicle, version).await?;

        log::info!(
            "🚀 {} {} despachado (parque {})",
            V::KIND.label(),
            id,
            dispatched.park_id()
        );
        Ok(dispatched)
    }

    /// Despacho por lotes todo-o-nada sobre los ids existentes; los inexistentes
    /// se ignoran. Devuelve el número de registros despachados.
    pub async fn batch_dispatch(&self, ids: &[i64]) -> AppResult<usize> {
        let targets: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        if targets.is_empty() {
            return Ok(0);
        }

        let outcome = self
            .store
            .dispatch_batch(&targets, Utc::now(), V::AUDIT_GATED)
            .await?;

        match outcome {
            BatchDispatchOutcome::Dispatched { count } => {
                if count < targets.len() {
                    log::warn!(
                        "⚠️ Lote de {}: {} id(s) inexistentes ignorados",
                        V::KIND.label(),
                        targets.len() - count
                    );
                }
                log::info!("🚀 {} {} registro(s) despachados en lote", count, V::KIND.label());
                Ok(count)
            }
            BatchDispatchOutcome::NotAudited { ids } => {
                log::warn!(
                    "⚠️ Lote rechazado: {} {} sin auditar {:?}",
                    ids.len(),
                    V::KIND.label(),
                    ids
                );
                Err(AppError::BatchNotAudited { ids })
            }
        }
    }
}

impl VehicleWorkflow<ExternalVehicle> {
    /// Fijar el estado de auditoría; sin restricción sobre el estado actual
    pub async fn audit(&self, id: i64, requested: &str) -> AppResult<ExternalVehicle> {
        let status = AuditStatus::parse(requested)
            .ok_or_else(|| AppError::InvalidAuditStatus(requested.to_string()))?;

        let mut vehicle = self.get(id).await?;
        let version = vehicle.version;
        vehicle.audit_status = status;
        vehicle.touch(Utc::now());

        let audited = self.store.update(vehicle, version).await?;
        log::info!(
            "🔎 Vehículo externo {} marcado como {} (parque {})",
            id,
            status.as_str(),
            audited.park_id
        );
        Ok(audited)
    }
}

/// Servicio de cumplimiento para los tres tipos de vehículo
#[derive(Clone)]
pub struct ComplianceService {
    pub external: VehicleWorkflow<ExternalVehicle>,
    pub internal: VehicleWorkflow<InternalVehicle>,
    pub non_road: VehicleWorkflow<NonRoadMachinery>,
}

impl ComplianceService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            external: VehicleWorkflow::new(Arc::clone(&stores.external)),
            internal: VehicleWorkflow::new(Arc::clone(&stores.internal)),
            non_road: VehicleWorkflow::new(Arc::clone(&stores.non_road)),
        }
    }
}
