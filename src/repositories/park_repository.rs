//! Repositorio PostgreSQL de parques y renovaciones

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{Page, PageRequest, ParkStore};
use crate::models::{
    NewPark, Park, ParkFilters, ParkUpdate, QrCode, QrCodeChanges, RenewalFilters, RenewalRecord,
    RenewalWithPark, VehicleKind,
};
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};

pub struct PgParkRepository {
    pool: PgPool,
}

impl PgParkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Traducir violaciones de unicidad a `Conflict`
    fn map_unique_violation(e: sqlx::Error, code: &str, login_account: &str) -> AppError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return match db_err.constraint() {
                    Some("parks_login_account_key") => {
                        conflict_error("Park", "login_account", login_account)
                    }
                    _ => conflict_error("Park", "code", code),
                };
            }
        }
        AppError::Database(e)
    }

    fn push_park_filters(builder: &mut QueryBuilder<'_, Postgres>, name: Option<&str>, code: Option<&str>) {
        builder.push(" WHERE TRUE");
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            builder
                .push(" AND strpos(p.name, ")
                .push_bind(name.to_string())
                .push(") > 0");
        }
        if let Some(code) = code.filter(|c| !c.is_empty()) {
            builder
                .push(" AND strpos(p.code, ")
                .push_bind(code.to_string())
                .push(") > 0");
        }
    }
}

#[async_trait]
impl ParkStore for PgParkRepository {
    async fn insert(&self, park: NewPark) -> AppResult<Park> {
        let now = Utc::now();
        let stored = sqlx::query_as::<_, Park>(
            r#"
            INSERT INTO parks (name, code, secret_key, start_time, end_time, province, city, district,
                               industry, remark, contact_name, contact_phone, login_account,
                               login_password_hash, login_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
            RETURNING *
            "#,
        )
        .bind(&park.name)
        .bind(&park.code)
        .bind(&park.secret_key)
        .bind(park.start_time)
        .bind(park.end_time)
        .bind(&park.province)
        .bind(&park.city)
        .bind(&park.district)
        .bind(&park.industry)
        .bind(&park.remark)
        .bind(&park.contact_name)
        .bind(&park.contact_phone)
        .bind(&park.login_account)
        .bind(&park.login_password_hash)
        .bind(&park.login_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_unique_violation(e, &park.code, &park.login_account))?;

        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Park>> {
        let park = sqlx::query_as::<_, Park>("SELECT * FROM parks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(park)
    }

    async fn find_by_login_account(&self, account: &str) -> AppResult<Option<Park>> {
        let park = sqlx::query_as::<_, Park>("SELECT * FROM parks WHERE login_account = $1")
            .bind(account)
            .fetch_optional(&self.pool)
            .await?;
        Ok(park)
    }

    async fn list(&self, filters: &ParkFilters, page: PageRequest) -> AppResult<Page<Park>> {
        let mut count_query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM parks p");
        Self::push_park_filters(&mut count_query, filters.name.as_deref(), filters.code.as_deref());
        let total: i64 = count_query.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT p.* FROM parks p");
        Self::push_park_filters(&mut query, filters.name.as_deref(), filters.code.as_deref());
        query
            .push(" ORDER BY p.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = query.build_query_as::<Park>().fetch_all(&self.pool).await?;
        Ok(Page::new(items, total, page))
    }

    async fn apply_updates(
        &self,
        id: i64,
        updates: &[ParkUpdate],
        at: DateTime<Utc>,
    ) -> AppResult<Park> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE parks SET ");
        {
            let mut sep = builder.separated(", ");
            for update in updates {
                sep.push(format!("{} = ", update.column()));
                sep.push_bind_unseparated(update.value().to_string());
            }
            sep.push("updated_at = ");
            sep.push_bind_unseparated(at);
        }
        builder.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        builder
            .build_query_as::<Park>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("Park", id))
    }

    async fn replace_credentials(
        &self,
        id: i64,
        login_account: &str,
        login_password_hash: &str,
        at: DateTime<Utc>,
    ) -> AppResult<Park> {
        sqlx::query_as::<_, Park>(
            r#"
            UPDATE parks
            SET login_account = $2, login_password_hash = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(login_account)
        .bind(login_password_hash)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_unique_violation(e, "", login_account))?
        .ok_or_else(|| not_found_error("Park", id))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        // renewal_records y qr_codes se eliminan en cascada
        let result = sqlx::query("DELETE FROM parks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn renew(
        &self,
        id: i64,
        duration_months: u32,
        at: DateTime<Utc>,
    ) -> AppResult<(Park, RenewalRecord)> {
        let duration = i32::try_from(duration_months)
            .map_err(|_| AppError::BadRequest("duration_months is too large".to_string()))?;

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Park>("SELECT * FROM parks WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Park", id))?;

        let old_end_time = current.end_time;
        let new_end_time = current.renewed_end_time(duration_months).ok_or_else(|| {
            AppError::BadRequest("renewal would overflow the supported date range".to_string())
        })?;

        let park = sqlx::query_as::<_, Park>(
            "UPDATE parks SET end_time = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(new_end_time)
        .bind(at)
        .fetch_one(&mut *tx)
        .await?;

        let record = sqlx::query_as::<_, RenewalRecord>(
            r#"
            INSERT INTO renewal_records (park_id, old_end_time, new_end_time, duration_months, renewal_time, created_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(old_end_time)
        .bind(new_end_time)
        .bind(duration)
        .bind(at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((park, record))
    }

    async fn list_renewals(
        &self,
        filters: &RenewalFilters,
        page: PageRequest,
    ) -> AppResult<Page<RenewalWithPark>> {
        let mut count_query: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) FROM renewal_records r JOIN parks p ON p.id = r.park_id",
        );
        Self::push_park_filters(
            &mut count_query,
            filters.park_name.as_deref(),
            filters.park_code.as_deref(),
        );
        let total: i64 = count_query.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT r.*, p.name AS park_name, p.code AS park_code FROM renewal_records r JOIN parks p ON p.id = r.park_id",
        );
        Self::push_park_filters(
            &mut query,
            filters.park_name.as_deref(),
            filters.park_code.as_deref(),
        );
        query
            .push(" ORDER BY r.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = query
            .build_query_as::<RenewalWithPark>()
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(items, total, page))
    }

    async fn find_qrcode(&self, park_id: i64, kind: VehicleKind) -> AppResult<Option<QrCode>> {
        let code = sqlx::query_as::<_, QrCode>(
            "SELECT * FROM qr_codes WHERE park_id = $1 AND kind = $2",
        )
        .bind(park_id)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;
        Ok(code)
    }

    async fn insert_qrcode(
        &self,
        park_id: i64,
        kind: VehicleKind,
        content: &str,
        at: DateTime<Utc>,
    ) -> AppResult<QrCode> {
        sqlx::query_as::<_, QrCode>(
            r#"
            INSERT INTO qr_codes (park_id, kind, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(park_id)
        .bind(kind)
        .bind(content)
        .bind(at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                not_found_error("Park", park_id)
            }
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                conflict_error("QR code", "type", kind.slug())
            }
            _ => AppError::Database(e),
        })
    }

    async fn update_qrcode(
        &self,
        park_id: i64,
        kind: VehicleKind,
        changes: &QrCodeChanges,
        at: DateTime<Utc>,
    ) -> AppResult<QrCode> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE qr_codes SET ");
        {
            let mut sep = builder.separated(", ");
            if let Some(content) = &changes.content {
                sep.push("content = ");
                sep.push_bind_unseparated(content.clone());
            }
            if let Some(fields_config) = &changes.fields_config {
                sep.push("fields_config = ");
                sep.push_bind_unseparated(fields_config.clone());
            }
            if let Some(is_enabled) = changes.is_enabled {
                sep.push("is_enabled = ");
                sep.push_bind_unseparated(is_enabled);
            }
            sep.push("updated_at = ");
            sep.push_bind_unseparated(at);
        }
        builder
            .push(" WHERE park_id = ")
            .push_bind(park_id)
            .push(" AND kind = ")
            .push_bind(kind)
            .push(" RETURNING *");

        builder
            .build_query_as::<QrCode>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "QR code '{}' for park '{}' not found",
                    kind.slug(),
                    park_id
                ))
            })
    }
}
