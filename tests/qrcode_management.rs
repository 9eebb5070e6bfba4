//! Códigos QR de parque sobre almacenes en memoria

mod common;

use common::{compliance_service, expired_park_request, park_request, park_service, qrcode_service};
use park_vehicle_ledger::clients::{RegistryClientConfig, VehicleRegistryClient};
use park_vehicle_ledger::dto::qrcode_dto::UpdateQrCodeRequest;
use park_vehicle_ledger::models::VehicleKind;
use park_vehicle_ledger::repositories::{ParkStore, Stores};
use park_vehicle_ledger::services::MiniProgramService;
use park_vehicle_ledger::utils::AppError;
use serde_json::json;

#[tokio::test]
async fn test_first_get_generates_one_code_per_kind() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    let qrcodes = qrcode_service(&stores);
    let park = parks.create(park_request("QR001")).await.unwrap().park;

    let external = qrcodes.get(park.id, VehicleKind::ExternalVehicle).await.unwrap();
    assert_eq!(external.park_id, park.id);
    assert!(external.is_enabled);
    assert!(external
        .content
        .starts_with(&format!("park:{}:external-vehicle:", park.id)));
    assert_eq!(external.fields_config, json!({}));

    let again = qrcodes.get(park.id, VehicleKind::ExternalVehicle).await.unwrap();
    assert_eq!(again, external);

    let non_road = qrcodes.get(park.id, VehicleKind::NonRoadMachinery).await.unwrap();
    assert_ne!(non_road.id, external.id);
    assert!(non_road.content.contains(":non-road:"));

    assert!(matches!(
        qrcodes.get(4040, VehicleKind::ExternalVehicle).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_update_regenerates_and_stores_fields_config() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    let qrcodes = qrcode_service(&stores);
    let park = parks.create(park_request("QR001")).await.unwrap().park;
    let original = qrcodes.get(park.id, VehicleKind::InternalVehicle).await.unwrap();

    let regenerated = qrcodes
        .update(
            park.id,
            VehicleKind::InternalVehicle,
            UpdateQrCodeRequest {
                regenerate: true,
                ..UpdateQrCodeRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(regenerated.id, original.id);
    assert_ne!(regenerated.content, original.content);

    let configured = qrcodes
        .update(
            park.id,
            VehicleKind::InternalVehicle,
            UpdateQrCodeRequest {
                fields_config: Some(json!({ "vin": true, "fleet_name": false })),
                ..UpdateQrCodeRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(configured.content, regenerated.content);
    assert_eq!(configured.fields_config["vin"], true);

    let err = qrcodes
        .update(park.id, VehicleKind::InternalVehicle, UpdateQrCodeRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = qrcodes
        .update(
            park.id,
            VehicleKind::InternalVehicle,
            UpdateQrCodeRequest {
                fields_config: Some(json!(["vin"])),
                ..UpdateQrCodeRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_scan_accepts_only_current_enabled_code() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    let qrcodes = qrcode_service(&stores);
    let compliance = compliance_service(&stores);
    let registry = VehicleRegistryClient::with_reqwest(RegistryClientConfig::default()).unwrap();
    let mini = MiniProgramService::new(
        parks.clone(),
        qrcodes.clone(),
        compliance.external.clone(),
        registry,
    );

    let park = parks.create(park_request("QR001")).await.unwrap().park;
    qrcodes
        .update(
            park.id,
            VehicleKind::ExternalVehicle,
            UpdateQrCodeRequest {
                fields_config: Some(json!({ "engine_number": true })),
                ..UpdateQrCodeRequest::default()
            },
        )
        .await
        .unwrap();
    let old = qrcodes.get(park.id, VehicleKind::ExternalVehicle).await.unwrap();

    let scanned = mini.scan(&old.content).await.unwrap();
    assert_eq!(scanned.park_id, park.id);
    assert_eq!(scanned.vehicle_kind, Some(VehicleKind::ExternalVehicle));
    assert_eq!(scanned.fields_config, Some(json!({ "engine_number": true })));

    // El formato simple sigue aceptándose sin tipo
    let plain = mini.scan(&format!("park:{}", park.id)).await.unwrap();
    assert_eq!(plain.vehicle_kind, None);

    let fresh = qrcodes
        .update(
            park.id,
            VehicleKind::ExternalVehicle,
            UpdateQrCodeRequest {
                regenerate: true,
                ..UpdateQrCodeRequest::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        mini.scan(&old.content).await.unwrap_err(),
        AppError::BadRequest(_)
    ));
    assert!(mini.scan(&fresh.content).await.is_ok());

    qrcodes
        .update(
            park.id,
            VehicleKind::ExternalVehicle,
            UpdateQrCodeRequest {
                is_enabled: Some(false),
                ..UpdateQrCodeRequest::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        mini.scan(&fresh.content).await.unwrap_err(),
        AppError::BadRequest(_)
    ));
}

#[tokio::test]
async fn test_scan_of_expired_park_fails_before_code_check() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    let qrcodes = qrcode_service(&stores);
    let compliance = compliance_service(&stores);
    let registry = VehicleRegistryClient::with_reqwest(RegistryClientConfig::default()).unwrap();
    let mini = MiniProgramService::new(
        parks.clone(),
        qrcodes.clone(),
        compliance.external.clone(),
        registry,
    );

    let expired = parks.create(expired_park_request("OLD01")).await.unwrap().park;
    let code = qrcodes.get(expired.id, VehicleKind::NonRoadMachinery).await.unwrap();

    assert!(matches!(
        mini.scan(&code.content).await.unwrap_err(),
        AppError::ParkExpired { .. }
    ));
}

#[tokio::test]
async fn test_deleting_park_removes_its_codes() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    let qrcodes = qrcode_service(&stores);
    let park = parks.create(park_request("QR001")).await.unwrap().park;
    qrcodes.get(park.id, VehicleKind::ExternalVehicle).await.unwrap();

    parks.delete(park.id).await.unwrap();

    assert!(stores
        .parks
        .find_qrcode(park.id, VehicleKind::ExternalVehicle)
        .await
        .unwrap()
        .is_none());
}
