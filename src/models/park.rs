//! Modelo de Park (inquilino)
//!
//! Un parque industrial con su ventana de validez, credenciales de acceso
//! y el historial inmutable de renovaciones.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Park principal - mapea a la tabla parks
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Park {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub secret_key: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub province: String,
    pub city: String,
    pub district: String,
    pub industry: String,
    pub remark: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub login_account: String,
    #[serde(skip_serializing, default)]
    pub login_password_hash: String,
    pub login_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Park {
    /// Un parque es válido si `start_time <= now < end_time`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now < self.end_time
    }

    /// Nueva fecha de fin tras renovar `months` meses de calendario.
    /// Si el día no existe en el mes destino se ajusta al último día del mes.
    pub fn renewed_end_time(&self, months: u32) -> Option<DateTime<Utc>> {
        self.end_time.checked_add_months(Months::new(months))
    }

    /// Aplicar una actualización de la lista blanca
    pub fn apply_update(&mut self, update: &ParkUpdate) {
        let (slot, value) = match update {
            ParkUpdate::Name(v) => (&mut self.name, v),
            ParkUpdate::Province(v) => (&mut self.province, v),
            ParkUpdate::City(v) => (&mut self.city, v),
            ParkUpdate::District(v) => (&mut self.district, v),
            ParkUpdate::Industry(v) => (&mut self.industry, v),
            ParkUpdate::Remark(v) => (&mut self.remark, v),
            ParkUpdate::ContactName(v) => (&mut self.contact_name, v),
            ParkUpdate::ContactPhone(v) => (&mut self.contact_phone, v),
        };
        *slot = value.clone();
    }
}

/// Campos modificables de un parque; cualquier otro campo se rechaza al deserializar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ParkUpdate {
    Name(String),
    Province(String),
    City(String),
    District(String),
    Industry(String),
    Remark(String),
    ContactName(String),
    ContactPhone(String),
}

impl ParkUpdate {
    /// Columna PostgreSQL afectada
    pub fn column(&self) -> &'static str {
        match self {
            ParkUpdate::Name(_) => "name",
            ParkUpdate::Province(_) => "province",
            ParkUpdate::City(_) => "city",
            ParkUpdate::District(_) => "district",
            ParkUpdate::Industry(_) => "industry",
            ParkUpdate::Remark(_) => "remark",
            ParkUpdate::ContactName(_) => "contact_name",
            ParkUpdate::ContactPhone(_) => "contact_phone",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            ParkUpdate::Name(v)
            | ParkUpdate::Province(v)
            | ParkUpdate::City(v)
            | ParkUpdate::District(v)
            | ParkUpdate::Industry(v)
            | ParkUpdate::Remark(v)
            | ParkUpdate::ContactName(v)
            | ParkUpdate::ContactPhone(v) => v,
        }
    }
}

/// Datos necesarios para insertar un parque nuevo
#[derive(Debug, Clone)]
pub struct NewPark {
    pub name: String,
    pub code: String,
    pub secret_key: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub province: String,
    pub city: String,
    pub district: String,
    pub industry: String,
    pub remark: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub login_account: String,
    pub login_password_hash: String,
    pub login_url: String,
}

/// Filtros de listado de parques (coincidencia parcial)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParkFilters {
    pub name: Option<String>,
    pub code: Option<String>,
}

impl ParkFilters {
    pub fn matches(&self, park: &Park) -> bool {
        let name_ok = self
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .map_or(true, |n| park.name.contains(n));
        let code_ok = self
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .map_or(true, |c| park.code.contains(c));
        name_ok && code_ok
    }
}

/// Registro de renovación - historial inmutable, sólo se inserta
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RenewalRecord {
    pub id: i64,
    pub park_id: i64,
    pub old_end_time: DateTime<Utc>,
    pub new_end_time: DateTime<Utc>,
    pub duration_months: i32,
    pub renewal_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Renovación junto con los datos del parque para listados
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RenewalWithPark {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub record: RenewalRecord,
    pub park_name: String,
    pub park_code: String,
}

/// Filtros del historial de renovaciones
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenewalFilters {
    pub park_name: Option<String>,
    pub park_code: Option<String>,
}

impl RenewalFilters {
    pub fn matches(&self, park: &Park) -> bool {
        ParkFilters {
            name: self.park_name.clone(),
            code: self.park_code.clone(),
        }
        .matches(park)
    }
}
