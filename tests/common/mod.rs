//! Utilidades compartidas por los tests de integración

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use park_vehicle_ledger::clients::{RegistryClientConfig, VehicleRegistryClient};
use park_vehicle_ledger::config::{AppConfig, ParkSettings};
use park_vehicle_ledger::dto::park_dto::CreateParkRequest;
use park_vehicle_ledger::models::{
    ExternalVehicleDetails, InternalVehicleDetails, NonRoadMachineryDetails,
    RoadVehicleRegistration,
};
use park_vehicle_ledger::repositories::Stores;
use park_vehicle_ledger::services::{ComplianceService, ParkService, QrCodeService};
use park_vehicle_ledger::AppState;

/// Coste bcrypt mínimo para que los tests sean rápidos
pub const TEST_HASH_COST: u32 = 4;

pub fn test_park_settings() -> ParkSettings {
    ParkSettings {
        credential_hash_cost: TEST_HASH_COST,
        ..ParkSettings::default()
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::from_lookup(|_| None).expect("default config");
    config.park = test_park_settings();
    config
}

/// Estado completo sobre almacenes en memoria y sin registro de terceros
pub fn test_state() -> AppState {
    let registry = VehicleRegistryClient::with_reqwest(RegistryClientConfig::default())
        .expect("reqwest client");
    AppState::new(Arc::new(test_config()), Stores::in_memory(), registry)
}

pub fn park_service(stores: &Stores) -> ParkService {
    ParkService::new(Arc::clone(&stores.parks), test_park_settings())
}

pub fn qrcode_service(stores: &Stores) -> QrCodeService {
    QrCodeService::new(Arc::clone(&stores.parks))
}

pub fn compliance_service(stores: &Stores) -> ComplianceService {
    ComplianceService::new(stores)
}

pub fn park_request(code: &str) -> CreateParkRequest {
    CreateParkRequest {
        name: format!("园区 {}", code),
        code: code.to_string(),
        start_time: None,
        end_time: None,
        province: "河北省".to_string(),
        city: "唐山市".to_string(),
        district: String::new(),
        industry: "钢铁".to_string(),
        remark: String::new(),
        contact_name: "张三".to_string(),
        contact_phone: "13800000000".to_string(),
    }
}

/// Parque cuya ventana ya terminó
pub fn expired_park_request(code: &str) -> CreateParkRequest {
    let now = Utc::now();
    CreateParkRequest {
        start_time: Some(now - Duration::days(400)),
        end_time: Some(now - Duration::days(1)),
        ..park_request(code)
    }
}

/// Parque cuya ventana empieza en el futuro
pub fn future_park_request(code: &str, start: DateTime<Utc>) -> CreateParkRequest {
    CreateParkRequest {
        start_time: Some(start),
        end_time: Some(start + Duration::days(30)),
        ..park_request(code)
    }
}

pub fn registration(plate: &str, vehicle_type: &str) -> RoadVehicleRegistration {
    RoadVehicleRegistration {
        license_plate: plate.to_string(),
        vehicle_type: vehicle_type.to_string(),
        vin: "LZZ1CLVB6JA123456".to_string(),
        register_date: "2020-05-01".to_string(),
        issue_date: "2020-05-10".to_string(),
        brand_model: "解放 CA4250".to_string(),
        usage_nature: "货运".to_string(),
        owner: "唐山物流有限公司".to_string(),
        address: "河北省唐山市路北区".to_string(),
        fuel_type: "柴油".to_string(),
        emission_standard: "国六".to_string(),
        engine_number: "E1234567".to_string(),
        approved_load_mass: None,
        max_towing_mass: None,
    }
}

pub fn external_details(plate: &str) -> ExternalVehicleDetails {
    ExternalVehicleDetails {
        registration: registration(plate, "重型半挂牵引车"),
        fleet_name: "一号车队".to_string(),
        ..ExternalVehicleDetails::default()
    }
}

pub fn internal_details(plate: &str, environmental_code: &str) -> InternalVehicleDetails {
    InternalVehicleDetails {
        registration: registration(plate, "轻型厢式货车"),
        environmental_code: environmental_code.to_string(),
        ..InternalVehicleDetails::default()
    }
}

pub fn non_road_details(pin: &str) -> NonRoadMachineryDetails {
    NonRoadMachineryDetails {
        pin: pin.to_string(),
        machinery_type: "装载机".to_string(),
        emission_standard: "国四".to_string(),
        ..NonRoadMachineryDetails::default()
    }
}
