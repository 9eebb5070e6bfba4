//! Ciclo de vida de parques sobre almacenes en memoria

mod common;

use std::sync::Arc;

use chrono::{Duration, Months, Utc};
use common::{
    compliance_service, expired_park_request, external_details, future_park_request,
    park_request, park_service,
};
use park_vehicle_ledger::clients::{RegistryClientConfig, VehicleRegistryClient};
use park_vehicle_ledger::models::{ParkFilters, ParkUpdate, RenewalFilters};
use park_vehicle_ledger::repositories::{PageRequest, Stores};
use park_vehicle_ledger::services::{MiniProgramService, QrCodeService};
use park_vehicle_ledger::utils::AppError;

#[tokio::test]
async fn test_create_park_issues_credentials_and_default_window() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);

    let created = parks.create(park_request("TS001")).await.unwrap();
    let park = &created.park;

    assert_eq!(created.credentials.login_account.len(), 5);
    assert_eq!(created.credentials.login_password.len(), 5);
    assert_eq!(park.login_account, created.credentials.login_account);
    assert_ne!(park.login_password_hash, created.credentials.login_password);
    assert_eq!(park.secret_key.len(), 32);
    assert_eq!(
        park.end_time,
        park.start_time.checked_add_months(Months::new(12)).unwrap()
    );
    assert!(park.is_valid_at(Utc::now()));
}

#[tokio::test]
async fn test_create_park_rejects_duplicate_code_and_bad_window() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);

    parks.create(park_request("TS001")).await.unwrap();
    let err = parks.create(park_request("TS001")).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let now = Utc::now();
    let mut request = park_request("TS002");
    request.start_time = Some(now);
    request.end_time = Some(now - Duration::days(1));
    let err = parks.create(request).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let mut request = park_request("TS003");
    request.name = String::new();
    let err = parks.create(request).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_renew_extends_end_time_and_records_history() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    let created = parks.create(park_request("TS001")).await.unwrap();
    let original_end = created.park.end_time;

    let (park, record) = parks.renew(created.park.id, 6).await.unwrap();
    let expected_end = original_end.checked_add_months(Months::new(6)).unwrap();

    assert_eq!(park.end_time, expected_end);
    assert_eq!(record.park_id, park.id);
    assert_eq!(record.old_end_time, original_end);
    assert_eq!(record.new_end_time, expected_end);
    assert_eq!(record.duration_months, 6);

    let history = parks
        .list_renewals(RenewalFilters::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(history.total, 1);
    assert_eq!(history.items[0].park_code, "TS001");
    assert_eq!(history.items[0].record.id, record.id);
}

#[tokio::test]
async fn test_renew_rejects_zero_months_and_unknown_park() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    let created = parks.create(park_request("TS001")).await.unwrap();

    let err = parks.renew(created.park.id, 0).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = parks.renew(9999, 3).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let history = parks
        .list_renewals(RenewalFilters::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(history.total, 0);
}

#[tokio::test]
async fn test_renewal_history_filters_by_park() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    let a = parks.create(park_request("ALPHA")).await.unwrap();
    let b = parks.create(park_request("BETA")).await.unwrap();

    parks.renew(a.park.id, 1).await.unwrap();
    parks.renew(b.park.id, 2).await.unwrap();
    parks.renew(b.park.id, 3).await.unwrap();

    let beta = parks
        .list_renewals(
            RenewalFilters {
                park_name: None,
                park_code: Some("BET".to_string()),
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(beta.total, 2);
    assert!(beta.items.iter().all(|r| r.record.park_id == b.park.id));

    // Eliminar un parque elimina su historial
    parks.delete(b.park.id).await.unwrap();
    let all = parks
        .list_renewals(RenewalFilters::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total, 1);
}

#[tokio::test]
async fn test_validity_window() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);

    let active = parks.create(park_request("ACTIVE")).await.unwrap();
    let expired = parks.create(expired_park_request("EXPIRED")).await.unwrap();
    let future = parks
        .create(future_park_request("FUTURE", Utc::now() + Duration::days(10)))
        .await
        .unwrap();

    assert!(parks.check_validity(active.park.id).await.unwrap().valid);
    assert!(!parks.check_validity(expired.park.id).await.unwrap().valid);
    assert!(!parks.check_validity(future.park.id).await.unwrap().valid);

    let end = active.park.end_time;
    assert!(!parks.check_validity_at(active.park.id, end).await.unwrap().valid);

    assert!(parks.ensure_valid(active.park.id).await.is_ok());
    assert!(matches!(
        parks.ensure_valid(expired.park.id).await.unwrap_err(),
        AppError::ParkExpired { park_id } if park_id == expired.park.id
    ));
}

#[tokio::test]
async fn test_renewing_expired_park_restores_validity() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    let expired = parks.create(expired_park_request("EXPIRED")).await.unwrap();

    parks.renew(expired.park.id, 12).await.unwrap();
    assert!(parks.check_validity(expired.park.id).await.unwrap().valid);
}

#[tokio::test]
async fn test_whitelisted_update() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    let created = parks.create(park_request("TS001")).await.unwrap();

    let updated = parks
        .update(
            created.park.id,
            vec![
                ParkUpdate::ContactPhone("13900000000".to_string()),
                ParkUpdate::Remark("新备注".to_string()),
            ],
        )
        .await
        .unwrap();
    assert_eq!(updated.contact_phone, "13900000000");
    assert_eq!(updated.remark, "新备注");
    assert_eq!(updated.code, "TS001");
    assert_eq!(updated.end_time, created.park.end_time);

    let updated = parks
        .update(
            created.park.id,
            vec![
                ParkUpdate::City("保定市".to_string()),
                ParkUpdate::City("石家庄市".to_string()),
            ],
        )
        .await
        .unwrap();
    assert_eq!(updated.city, "石家庄市");

    assert!(matches!(
        parks.update(created.park.id, vec![]).await.unwrap_err(),
        AppError::BadRequest(_)
    ));
    assert!(matches!(
        parks
            .update(created.park.id, vec![ParkUpdate::Name("  ".to_string())])
            .await
            .unwrap_err(),
        AppError::BadRequest(_)
    ));
    assert!(matches!(
        parks
            .update(404, vec![ParkUpdate::City("保定市".to_string())])
            .await
            .unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_list_parks_with_filters() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    for code in ["HB-01", "HB-02", "SD-01"] {
        parks.create(park_request(code)).await.unwrap();
    }

    let hebei = parks
        .list(
            ParkFilters {
                name: None,
                code: Some("HB".to_string()),
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(hebei.total, 2);
    assert_eq!(hebei.items[0].code, "HB-02");
}

#[tokio::test]
async fn test_login_checks_credentials_then_validity() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    let active = parks.create(park_request("ACTIVE")).await.unwrap();
    let expired = parks.create(expired_park_request("EXPIRED")).await.unwrap();

    let park = parks
        .verify_login(
            &active.credentials.login_account,
            &active.credentials.login_password,
        )
        .await
        .unwrap();
    assert_eq!(park.id, active.park.id);

    let err = parks
        .verify_login(&active.credentials.login_account, "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let err = parks.verify_login("00000x", "12345").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let err = parks
        .verify_login(
            &expired.credentials.login_account,
            &expired.credentials.login_password,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ParkExpired { .. }));
}

#[tokio::test]
async fn test_reset_credentials_invalidates_old_password() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    let created = parks.create(park_request("TS001")).await.unwrap();

    let fresh = parks.reset_credentials(created.park.id).await.unwrap();
    assert_eq!(fresh.login_account.len(), 5);

    let park = parks
        .verify_login(&fresh.login_account, &fresh.login_password)
        .await
        .unwrap();
    assert_eq!(park.id, created.park.id);

    // La cuenta nueva nunca coincide con una cuenta en uso
    assert_ne!(fresh.login_account, created.credentials.login_account);
    assert!(parks
        .verify_login(
            &created.credentials.login_account,
            &created.credentials.login_password
        )
        .await
        .is_err());
}

#[tokio::test]
async fn test_download_info_lists_access_data() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    let created = parks.create(park_request("TS001")).await.unwrap();

    let text = parks.download_info(created.park.id).await.unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 9);
    assert_eq!(lines[0], "车场名称: 园区 TS001");
    assert_eq!(lines[1], "车场编号: TS001");
    assert_eq!(lines[2], format!("密钥: {}", created.park.secret_key));
    assert_eq!(
        lines[3],
        format!("创建时间: {}", created.park.created_at.timestamp())
    );
    assert_eq!(
        lines[4],
        format!(
            "开始时间: {}",
            created.park.start_time.format("%Y-%m-%d %H:%M:%S")
        )
    );
    assert_eq!(lines[6], "登陆网址: http://localhost:8080/login");
    assert_eq!(
        lines[7],
        format!("账号: {}", created.credentials.login_account)
    );
    assert!(!text.contains(&created.park.login_password_hash));
}

#[tokio::test]
async fn test_mini_program_scan_and_submit_respect_validity() {
    let stores = Stores::in_memory();
    let parks = park_service(&stores);
    let compliance = compliance_service(&stores);
    let registry = VehicleRegistryClient::with_reqwest(RegistryClientConfig::default()).unwrap();
    let qrcodes = QrCodeService::new(Arc::clone(&stores.parks));
    let mini = MiniProgramService::new(
        parks.clone(),
        qrcodes,
        compliance.external.clone(),
        registry,
    );

    let active = parks.create(park_request("ACTIVE")).await.unwrap();
    let expired = parks.create(expired_park_request("EXPIRED")).await.unwrap();

    let scanned = mini
        .scan(&format!("park:{}", active.park.id))
        .await
        .unwrap();
    assert_eq!(scanned.park_id, active.park.id);
    assert_eq!(scanned.park_name, active.park.name);

    assert!(matches!(
        mini.scan(&format!("park:{}", expired.park.id))
            .await
            .unwrap_err(),
        AppError::ParkExpired { .. }
    ));
    assert!(matches!(
        mini.scan("garbage").await.unwrap_err(),
        AppError::BadRequest(_)
    ));
    assert!(matches!(
        mini.scan("park:4040").await.unwrap_err(),
        AppError::NotFound(_)
    ));

    let vehicle = mini
        .submit_vehicle(active.park.id, external_details("冀B12345"))
        .await
        .unwrap();
    assert_eq!(vehicle.park_id, active.park.id);

    let err = mini
        .submit_vehicle(expired.park.id, external_details("冀B54321"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ParkExpired { .. }));
}
