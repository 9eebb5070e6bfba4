//! Almacenes en memoria
//!
//! Misma semántica que los repositorios PostgreSQL (CAS de versión,
//! despacho por lotes todo-o-nada, renovación atómica). Cada operación
//! se ejecuta bajo un único lock de escritura o lectura.

use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{BatchDispatchOutcome, Page, PageRequest, ParkStore, VehicleStore};
use crate::models::{
    AuditStatus, NewPark, Park, ParkFilters, ParkUpdate, QrCode, QrCodeChanges, RenewalFilters,
    RenewalRecord, RenewalWithPark, VehicleFilters, VehicleKind, VehicleRecord,
};
use crate::utils::errors::{conflict_error, not_found_error, stale_version_error, AppError, AppResult};

/// Tabla en memoria con ids autoincrementales
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Paginar resultados ya filtrados, más recientes primero
fn paginate<T: Clone>(matching: Vec<&T>, request: PageRequest) -> Page<T> {
    let total = matching.len() as i64;
    let items = matching
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.limit() as usize)
        .cloned()
        .collect();
    Page::new(items, total, request)
}

/// Almacén en memoria para un tipo de vehículo
pub struct MemoryVehicleStore<V> {
    table: RwLock<Table<V>>,
    _kind: PhantomData<fn() -> V>,
}

impl<V> MemoryVehicleStore<V> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::default()),
            _kind: PhantomData,
        }
    }
}

impl<V> Default for MemoryVehicleStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V: VehicleRecord> VehicleStore<V> for MemoryVehicleStore<V> {
    async fn insert(&self, mut vehicle: V) -> AppResult<V> {
        let mut table = self.table.write().await;
        let id = table.allocate_id();
        vehicle.set_id(id);
        table.rows.insert(id, vehicle.clone());
        Ok(vehicle)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<V>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(
        &self,
        park_id: i64,
        filters: &VehicleFilters,
        page: PageRequest,
    ) -> AppResult<Page<V>> {
        let table = self.table.read().await;
        let matching: Vec<&V> = table
            .rows
            .values()
            .rev()
            .filter(|v| filters.matches(park_id, *v))
            .collect();
        Ok(paginate(matching, page))
    }

    async fn update(&self, mut vehicle: V, expected_version: i32) -> AppResult<V> {
        let mut table = self.table.write().await;
        let id = vehicle.id();
        let stored = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| not_found_error(V::KIND.label(), id))?;

        if stored.version() != expected_version {
            return Err(stale_version_error(V::KIND.label(), id, expected_version));
        }

        vehicle.set_version(expected_version + 1);
        *stored = vehicle.clone();
        Ok(vehicle)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn dispatch_batch(
        &self,
        ids: &[i64],
        at: DateTime<Utc>,
        require_audited: bool,
    ) -> AppResult<BatchDispatchOutcome> {
        let mut table = self.table.write().await;
        // Los ids inexistentes se ignoran
        let targets: BTreeSet<i64> = ids
            .iter()
            .copied()
            .filter(|id| table.rows.contains_key(id))
            .collect();

        if require_audited {
            let unaudited: Vec<i64> = targets
                .iter()
                .copied()
                .filter(|id| {
                    table
                        .rows
                        .get(id)
                        .map_or(true, |v| v.audit_status() != Some(AuditStatus::Audited))
                })
                .collect();
            if !unaudited.is_empty() {
                return Ok(BatchDispatchOutcome::NotAudited { ids: unaudited });
            }
        }

        for id in &targets {
            if let Some(vehicle) = table.rows.get_mut(id) {
                vehicle.mark_dispatched(at);
                let next = vehicle.version() + 1;
                vehicle.set_version(next);
            }
        }

        Ok(BatchDispatchOutcome::Dispatched {
            count: targets.len(),
        })
    }
}

#[derive(Default)]
struct ParkTables {
    parks: Table<Park>,
    renewals: Table<RenewalRecord>,
    qrcodes: Table<QrCode>,
}

/// Almacén en memoria de parques
#[derive(Default)]
pub struct MemoryParkStore {
    inner: RwLock<ParkTables>,
}

impl MemoryParkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParkStore for MemoryParkStore {
    async fn insert(&self, park: NewPark) -> AppResult<Park> {
        let mut inner = self.inner.write().await;

        if inner.parks.rows.values().any(|p| p.code == park.code) {
            return Err(conflict_error("Park", "code", &park.code));
        }
        if inner
            .parks
            .rows
            .values()
            .any(|p| p.login_account == park.login_account)
        {
            return Err(conflict_error("Park", "login_account", &park.login_account));
        }

        let now = Utc::now();
        let id = inner.parks.allocate_id();
        let stored = Park {
            id,
            name: park.name,
            code: park.code,
            secret_key: park.secret_key,
            start_time: park.start_time,
            end_time: park.end_time,
            province: park.province,
            city: park.city,
            district: park.district,
            industry: park.industry,
            remark: park.remark,
            contact_name: park.contact_name,
            contact_phone: park.contact_phone,
            login_account: park.login_account,
            login_password_hash: park.login_password_hash,
            login_url: park.login_url,
            created_at: now,
            updated_at: now,
        };
        inner.parks.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Park>> {
        Ok(self.inner.read().await.parks.rows.get(&id).cloned())
    }

    async fn find_by_login_account(&self, account: &str) -> AppResult<Option<Park>> {
        let inner = self.inner.read().await;
        Ok(inner
            .parks
            .rows
            .values()
            .find(|p| p.login_account == account)
            .cloned())
    }

    async fn list(&self, filters: &ParkFilters, page: PageRequest) -> AppResult<Page<Park>> {
        let inner = self.inner.read().await;
        let matching: Vec<&Park> = inner
            .parks
            .rows
            .values()
            .rev()
            .filter(|p| filters.matches(p))
            .collect();
        Ok(paginate(matching, page))
    }

    async fn apply_updates(
        &self,
        id: i64,
        updates: &[ParkUpdate],
        at: DateTime<Utc>,
    ) -> AppResult<Park> {
        let mut inner = self.inner.write().await;
        let park = inner
            .parks
            .rows
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Park", id))?;

        for update in updates {
            park.apply_update(update);
        }
        park.updated_at = at;
        Ok(park.clone())
    }

    async fn replace_credentials(
        &self,
        id: i64,
        login_account: &str,
        login_password_hash: &str,
        at: DateTime<Utc>,
    ) -> AppResult<Park> {
        let mut inner = self.inner.write().await;

        if inner
            .parks
            .rows
            .values()
            .any(|p| p.id != id && p.login_account == login_account)
        {
            return Err(conflict_error("Park", "login_account", login_account));
        }

        let park = inner
            .parks
            .rows
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Park", id))?;
        park.login_account = login_account.to_string();
        park.login_password_hash = login_password_hash.to_string();
        park.updated_at = at;
        Ok(park.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let removed = inner.parks.rows.remove(&id).is_some();
        if removed {
            inner.renewals.rows.retain(|_, r| r.park_id != id);
            inner.qrcodes.rows.retain(|_, q| q.park_id != id);
        }
        Ok(removed)
    }

    async fn renew(
        &self,
        id: i64,
        duration_months: u32,
        at: DateTime<Utc>,
    ) -> AppResult<(Park, RenewalRecord)> {
        let mut inner = self.inner.write().await;
        let duration = i32::try_from(duration_months)
            .map_err(|_| AppError::BadRequest("duration_months is too large".to_string()))?;

        let park = inner
            .parks
            .rows
            .get(&id)
            .ok_or_else(|| not_found_error("Park", id))?;
        let old_end_time = park.end_time;
        let new_end_time = park.renewed_end_time(duration_months).ok_or_else(|| {
            AppError::BadRequest("renewal would overflow the supported date range".to_string())
        })?;

        let record_id = inner.renewals.allocate_id();
        let record = RenewalRecord {
            id: record_id,
            park_id: id,
            old_end_time,
            new_end_time,
            duration_months: duration,
            renewal_time: at,
            created_at: at,
        };

        let park = inner
            .parks
            .rows
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Park", id))?;
        park.end_time = new_end_time;
        park.updated_at = at;
        let park = park.clone();

        inner.renewals.rows.insert(record_id, record.clone());
        Ok((park, record))
    }

    async fn list_renewals(
        &self,
        filters: &RenewalFilters,
        page: PageRequest,
    ) -> AppResult<Page<RenewalWithPark>> {
        let inner = self.inner.read().await;
        let joined: Vec<RenewalWithPark> = inner
            .renewals
            .rows
            .values()
            .rev()
            .filter_map(|record| {
                let park = inner.parks.rows.get(&record.park_id)?;
                filters.matches(park).then(|| RenewalWithPark {
                    record: record.clone(),
                    park_name: park.name.clone(),
                    park_code: park.code.clone(),
                })
            })
            .collect();
        Ok(paginate(joined.iter().collect(), page))
    }

    async fn find_qrcode(&self, park_id: i64, kind: VehicleKind) -> AppResult<Option<QrCode>> {
        let inner = self.inner.read().await;
        Ok(inner
            .qrcodes
            .rows
            .values()
            .find(|q| q.park_id == park_id && q.kind == kind)
            .cloned())
    }

    async fn insert_qrcode(
        &self,
        park_id: i64,
        kind: VehicleKind,
        content: &str,
        at: DateTime<Utc>,
    ) -> AppResult<QrCode> {
        let mut inner = self.inner.write().await;
        if !inner.parks.rows.contains_key(&park_id) {
            return Err(not_found_error("Park", park_id));
        }
        if inner
            .qrcodes
            .rows
            .values()
            .any(|q| q.park_id == park_id && q.kind == kind)
        {
            return Err(conflict_error("QR code", "type", kind.slug()));
        }

        let id = inner.qrcodes.allocate_id();
        let stored = QrCode {
            id,
            park_id,
            kind,
            content: content.to_string(),
            is_enabled: true,
            fields_config: serde_json::Value::Object(serde_json::Map::new()),
            created_at: at,
            updated_at: at,
        };
        inner.qrcodes.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_qrcode(
        &self,
        park_id: i64,
        kind: VehicleKind,
        changes: &QrCodeChanges,
        at: DateTime<Utc>,
    ) -> AppResult<QrCode> {
        let mut inner = self.inner.write().await;
        let code = inner
            .qrcodes
            .rows
            .values_mut()
            .find(|q| q.park_id == park_id && q.kind == kind)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "QR code '{}' for park '{}' not found",
                    kind.slug(),
                    park_id
                ))
            })?;
        code.apply(changes, at);
        Ok(code.clone())
    }
}
