//! Repositorios (capa de persistencia)
//!
//! Define los contratos de almacenamiento (`VehicleStore`, `ParkStore`) y sus
//! implementaciones: PostgreSQL con sqlx y un almacén en memoria con la misma
//! semántica para tests y para arrancar sin base de datos.

pub mod external_vehicle_repository;
pub mod internal_vehicle_repository;
pub mod memory;
pub mod non_road_repository;
pub mod park_repository;
pub mod pg_vehicle_store;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::models::{
    ExternalVehicle, InternalVehicle, NewPark, NonRoadMachinery, Park, ParkFilters, ParkUpdate,
    QrCode, QrCodeChanges, RenewalFilters, RenewalRecord, RenewalWithPark, VehicleFilters,
    VehicleKind, VehicleRecord,
};
use crate::utils::errors::AppResult;

pub use external_vehicle_repository::PgExternalVehicleRepository;
pub use internal_vehicle_repository::PgInternalVehicleRepository;
pub use memory::{MemoryParkStore, MemoryVehicleStore};
pub use non_road_repository::PgNonRoadRepository;
pub use park_repository::PgParkRepository;
pub use pg_vehicle_store::PgVehicleStore;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Parámetros de paginación (página 1-based)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Aplicar valores por defecto y límites
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

/// Página de resultados con el total sin paginar
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
        }
    }
}

/// Resultado de un despacho por lotes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchDispatchOutcome {
    /// Todos los registros existentes fueron despachados
    Dispatched { count: usize },
    /// Algún registro no está auditado; nada se modificó
    NotAudited { ids: Vec<i64> },
}

/// Almacén de un tipo de vehículo
#[async_trait]
pub trait VehicleStore<V: VehicleRecord>: Send + Sync {
    /// Insertar y devolver el registro con id asignado
    async fn insert(&self, vehicle: V) -> AppResult<V>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<V>>;

    async fn list(
        &self,
        park_id: i64,
        filters: &VehicleFilters,
        page: PageRequest,
    ) -> AppResult<Page<V>>;

    /// Compare-and-swap: falla con `Conflict` si la versión almacenada no es
    /// `expected_version`. En éxito la versión queda en `expected_version + 1`.
    async fn update(&self, vehicle: V, expected_version: i32) -> AppResult<V>;

    /// `false` si el id no existía
    async fn delete(&self, id: i64) -> AppResult<bool>;

    /// Comprobación de auditoría y actualización masiva en una sola unidad atómica.
    /// Los ids inexistentes se ignoran.
    async fn dispatch_batch(
        &self,
        ids: &[i64],
        at: DateTime<Utc>,
        require_audited: bool,
    ) -> AppResult<BatchDispatchOutcome>;
}

/// Almacén de parques y su historial de renovaciones
#[async_trait]
pub trait ParkStore: Send + Sync {
    /// Falla con `Conflict` si el código o la cuenta de acceso ya existen
    async fn insert(&self, park: NewPark) -> AppResult<Park>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Park>>;

    async fn find_by_login_account(&self, account: &str) -> AppResult<Option<Park>>;

    async fn list(&self, filters: &ParkFilters, page: PageRequest) -> AppResult<Page<Park>>;

    async fn apply_updates(
        &self,
        id: i64,
        updates: &[ParkUpdate],
        at: DateTime<Utc>,
    ) -> AppResult<Park>;

    async fn replace_credentials(
        &self,
        id: i64,
        login_account: &str,
        login_password_hash: &str,
        at: DateTime<Utc>,
    ) -> AppResult<Park>;

    /// `false` si el id no existía; elimina también sus renovaciones y códigos QR
    async fn delete(&self, id: i64) -> AppResult<bool>;

    /// Ampliar `end_time` y anotar el `RenewalRecord` en una sola transacción
    async fn renew(
        &self,
        id: i64,
        duration_months: u32,
        at: DateTime<Utc>,
    ) -> AppResult<(Park, RenewalRecord)>;

    async fn list_renewals(
        &self,
        filters: &RenewalFilters,
        page: PageRequest,
    ) -> AppResult<Page<RenewalWithPark>>;

    async fn find_qrcode(&self, park_id: i64, kind: VehicleKind) -> AppResult<Option<QrCode>>;

    /// `NotFound` si el parque no existe, `Conflict` si ya hay un código de ese tipo
    async fn insert_qrcode(
        &self,
        park_id: i64,
        kind: VehicleKind,
        content: &str,
        at: DateTime<Utc>,
    ) -> AppResult<QrCode>;

    /// `NotFound` si el parque no tiene código de ese tipo
    async fn update_qrcode(
        &self,
        park_id: i64,
        kind: VehicleKind,
        changes: &QrCodeChanges,
        at: DateTime<Utc>,
    ) -> AppResult<QrCode>;
}

/// Conjunto de almacenes usado por los servicios
#[derive(Clone)]
pub struct Stores {
    pub external: Arc<dyn VehicleStore<ExternalVehicle>>,
    pub internal: Arc<dyn VehicleStore<InternalVehicle>>,
    pub non_road: Arc<dyn VehicleStore<NonRoadMachinery>>,
    pub parks: Arc<dyn ParkStore>,
}

impl Stores {
    /// Almacenes respaldados por PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            external: Arc::new(PgExternalVehicleRepository::new(pool.clone())),
            internal: Arc::new(PgInternalVehicleRepository::new(pool.clone())),
            non_road: Arc::new(PgNonRoadRepository::new(pool.clone())),
            parks: Arc::new(PgParkRepository::new(pool)),
        }
    }

    /// Almacenes en memoria (tests y modo sin base de datos)
    pub fn in_memory() -> Self {
        Self {
            external: Arc::new(MemoryVehicleStore::<ExternalVehicle>::new()),
            internal: Arc::new(MemoryVehicleStore::<InternalVehicle>::new()),
            non_road: Arc::new(MemoryVehicleStore::<NonRoadMachinery>::new()),
            parks: Arc::new(MemoryParkStore::new()),
        }
    }
}
