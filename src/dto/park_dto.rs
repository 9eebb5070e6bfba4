use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Park, ParkFilters, ParkUpdate, RenewalFilters, RenewalRecord};
use crate::repositories::PageRequest;
use crate::services::credentials::IssuedCredentials;

// Request para crear un parque
#[derive(Debug, Deserialize, Validate)]
pub struct CreateParkRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 50))]
    pub code: String,

    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate(length(max = 50))]
    pub province: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub city: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub district: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub industry: String,
    #[serde(default)]
    pub remark: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub contact_name: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub contact_phone: String,
}

// Response de alta: el parque y las credenciales en claro (única vez)
#[derive(Debug, Serialize)]
pub struct ParkCreatedResponse {
    pub park: Park,
    pub credentials: IssuedCredentials,
}

// Request de actualización parcial (lista blanca de campos)
#[derive(Debug, Deserialize)]
pub struct UpdateParkRequest {
    pub updates: Vec<ParkUpdate>,
}

// Request de renovación
#[derive(Debug, Deserialize)]
pub struct RenewParkRequest {
    pub duration_months: u32,
}

// Response de renovación
#[derive(Debug, Serialize)]
pub struct RenewParkResponse {
    pub park: Park,
    pub renewal: RenewalRecord,
}

// Response de validez
#[derive(Debug, Serialize)]
pub struct ParkValidityResponse {
    pub park_id: i64,
    pub valid: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

// Request de login de parque
#[derive(Debug, Deserialize, Validate)]
pub struct ParkLoginRequest {
    #[validate(length(min = 1))]
    pub login_account: String,
    #[validate(length(min = 1))]
    pub login_password: String,
}

// Query de listado de parques
#[derive(Debug, Deserialize)]
pub struct ParkListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub name: Option<String>,
    pub code: Option<String>,
}

impl ParkListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }

    pub fn filters(&self) -> ParkFilters {
        ParkFilters {
            name: self.name.clone(),
            code: self.code.clone(),
        }
    }
}

// Query de historial de renovaciones
#[derive(Debug, Deserialize)]
pub struct RenewalListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub park_name: Option<String>,
    pub park_code: Option<String>,
}

impl RenewalListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }

    pub fn filters(&self) -> RenewalFilters {
        RenewalFilters {
            park_name: self.park_name.clone(),
            park_code: self.park_code.clone(),
        }
    }
}
