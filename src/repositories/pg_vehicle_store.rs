//! Almacén PostgreSQL genérico para vehículos
//!
//! Cada tipo de vehículo describe sus columnas con `PgVehicleRow`; este módulo
//! construye el SQL (insert, CAS update, listado filtrado, despacho por lotes)
//! con `QueryBuilder`.

use std::collections::BTreeSet;
use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};

use super::{BatchDispatchOutcome, Page, PageRequest, VehicleStore};
use crate::models::{AuditStatus, DispatchStatus, PlateColor, VehicleFilters, VehicleRecord};
use crate::utils::errors::{not_found_error, stale_version_error, AppResult};

/// Valor a enlazar en una consulta dinámica
#[derive(Debug, Clone)]
pub enum SqlValue {
    Text(String),
    OptFloat(Option<f64>),
    OptBigInt(Option<i64>),
    BigInt(i64),
    Int(i32),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    OptTimestamp(Option<DateTime<Utc>>),
    Plate(PlateColor),
    OptPlate(Option<PlateColor>),
    Audit(AuditStatus),
    Dispatch(DispatchStatus),
}

impl SqlValue {
    fn bind<'qb, 'args: 'qb>(
        self,
        sep: &mut Separated<'qb, 'args, Postgres, &'static str>,
        unseparated: bool,
    ) {
        macro_rules! bind {
            ($v:expr) => {
                if unseparated {
                    sep.push_bind_unseparated($v);
                } else {
                    sep.push_bind($v);
                }
            };
        }
        match self {
            SqlValue::Text(v) => bind!(v),
            SqlValue::OptFloat(v) => bind!(v),
            SqlValue::OptBigInt(v) => bind!(v),
            SqlValue::BigInt(v) => bind!(v),
            SqlValue::Int(v) => bind!(v),
            SqlValue::Bool(v) => bind!(v),
            SqlValue::Timestamp(v) => bind!(v),
            SqlValue::OptTimestamp(v) => bind!(v),
            SqlValue::Plate(v) => bind!(v),
            SqlValue::OptPlate(v) => bind!(v),
            SqlValue::Audit(v) => bind!(v),
            SqlValue::Dispatch(v) => bind!(v),
        }
    }
}

/// Descripción de columnas de un tipo de vehículo
pub trait PgVehicleRow: VehicleRecord + for<'r> FromRow<'r, PgRow> + Unpin {
    /// El tipo lleva contador `dispatch_count`
    const HAS_DISPATCH_COUNT: bool;
    /// El tipo lleva columna `environmental_code`
    const HAS_ENVIRONMENTAL_CODE: bool;

    /// Columnas escribibles (todo salvo id, park_id, version y created_at)
    fn writable_columns(&self) -> Vec<(&'static str, SqlValue)>;
}

/// Almacén PostgreSQL para el tipo `V`
pub struct PgVehicleStore<V> {
    pool: PgPool,
    _kind: PhantomData<fn() -> V>,
}

impl<V> PgVehicleStore<V> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _kind: PhantomData,
        }
    }
}

impl<V: PgVehicleRow> PgVehicleStore<V> {
    fn table() -> &'static str {
        V::KIND.table()
    }

    /// Añadir el WHERE de listado
    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, park_id: i64, filters: &VehicleFilters) {
        builder.push(" WHERE park_id = ").push_bind(park_id);

        if let Some(plate) = &filters.license_plate {
            builder
                .push(" AND strpos(license_plate, ")
                .push_bind(plate.clone())
                .push(") > 0");
        }
        if let Some(status) = filters.audit_status {
            if V::AUDIT_GATED {
                builder.push(" AND audit_status = ").push_bind(status);
            } else {
                builder.push(" AND FALSE");
            }
        }
        if let Some(status) = filters.dispatch_status {
            builder.push(" AND dispatch_status = ").push_bind(status);
        }
        if let Some(standard) = &filters.emission_standard {
            builder
                .push(" AND emission_standard = ")
                .push_bind(standard.clone());
        }
        if let Some(code) = &filters.environmental_code {
            if V::HAS_ENVIRONMENTAL_CODE {
                builder
                    .push(" AND strpos(environmental_code, ")
                    .push_bind(code.clone())
                    .push(") > 0");
            } else {
                builder.push(" AND FALSE");
            }
        }
    }
}

#[async_trait]
impl<V: PgVehicleRow> VehicleStore<V> for PgVehicleStore<V> {
    async fn insert(&self, vehicle: V) -> AppResult<V> {
        let mut columns = vehicle.writable_columns();
        columns.push(("park_id", SqlValue::BigInt(vehicle.park_id())));
        columns.push(("version", SqlValue::Int(vehicle.version())));

        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {} (", Self::table()));
        builder.push(names.join(", "));
        builder.push(", created_at) VALUES (");
        {
            let mut sep = builder.separated(", ");
            for (_, value) in columns {
                value.bind(&mut sep, false);
            }
            sep.push_bind(Utc::now());
        }
        builder.push(") RETURNING *");

        let stored = builder
            .build_query_as::<V>()
            .fetch_one(&self.pool)
            .await?;

        log::debug!("💾 {} {} insertado", V::KIND.label(), stored.id());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<V>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", Self::table());
        let vehicle = sqlx::query_as::<_, V>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }

    async fn list(
        &self,
        park_id: i64,
        filters: &VehicleFilters,
        page: PageRequest,
    ) -> AppResult<Page<V>> {
        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", Self::table()));
        Self::push_filters(&mut count_query, park_id, filters);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT * FROM {}", Self::table()));
        Self::push_filters(&mut query, park_id, filters);
        query
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = query.build_query_as::<V>().fetch_all(&self.pool).await?;
        Ok(Page::new(items, total, page))
    }

    async fn update(&self, vehicle: V, expected_version: i32) -> AppResult<V> {
        let id = vehicle.id();
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("UPDATE {} SET ", Self::table()));
        {
            let mut sep = builder.separated(", ");
            for (name, value) in vehicle.writable_columns() {
                sep.push(format!("{} = ", name));
                value.bind(&mut sep, true);
            }
            sep.push("version = version + 1");
        }
        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND version = ")
            .push_bind(expected_version)
            .push(" RETURNING *");

        let updated = builder
            .build_query_as::<V>()
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(vehicle) => Ok(vehicle),
            None => {
                // Distinguir registro inexistente de versión obsoleta
                let exists_sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", Self::table());
                let exists: bool = sqlx::query_scalar(&exists_sql)
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;
                if exists {
                    Err(stale_version_error(V::KIND.label(), id, expected_version))
                } else {
                    Err(not_found_error(V::KIND.label(), id))
                }
            }
        }
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", Self::table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn dispatch_batch(
        &self,
        ids: &[i64],
        at: DateTime<Utc>,
        require_audited: bool,
    ) -> AppResult<BatchDispatchOutcome> {
        let targets: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        if targets.is_empty() {
            return Ok(BatchDispatchOutcome::Dispatched { count: 0 });
        }
        let mut tx = self.pool.begin().await?;

        // Bloquear las filas para que la comprobación y la actualización vean el mismo estado
        let select_sql = if V::AUDIT_GATED {
            format!(
                "SELECT id, audit_status FROM {} WHERE id = ANY($1) ORDER BY id FOR UPDATE",
                Self::table()
            )
        } else {
            format!(
                "SELECT id FROM {} WHERE id = ANY($1) ORDER BY id FOR UPDATE",
                Self::table()
            )
        };
        let rows = sqlx::query(&select_sql)
            .bind(&targets)
            .fetch_all(&mut *tx)
            .await?;

        let mut found = BTreeSet::new();
        let mut unaudited = Vec::new();
        for row in &rows {
            let id: i64 = row.try_get("id")?;
            found.insert(id);
            if require_audited && V::AUDIT_GATED {
                let status: AuditStatus = row.try_get("audit_status")?;
                if status != AuditStatus::Audited {
                    unaudited.push(id);
                }
            }
        }

        if !unaudited.is_empty() {
            tx.rollback().await?;
            return Ok(BatchDispatchOutcome::NotAudited { ids: unaudited });
        }

        let counter = if V::HAS_DISPATCH_COUNT {
            ", dispatch_count = dispatch_count + 1"
        } else {
            ""
        };
        let update_sql = format!(
            "UPDATE {} SET dispatch_status = $1, dispatch_time = $2, updated_at = $2, version = version + 1{} WHERE id = ANY($3)",
            Self::table(),
            counter
        );
        let result = sqlx::query(&update_sql)
            .bind(DispatchStatus::Dispatched)
            .bind(at)
            .bind(found.into_iter().collect::<Vec<_>>())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(BatchDispatchOutcome::Dispatched {
            count: result.rows_affected() as usize,
        })
    }
}
