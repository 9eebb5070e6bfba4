//! Tests HTTP sobre el router completo con almacenes en memoria

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use park_vehicle_ledger::build_router;

fn create_test_app() -> Router {
    build_router(common::test_state())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn create_park(app: &Router, code: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/parks",
        Some(json!({ "name": format!("园区 {}", code), "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"].clone()
}

fn external_vehicle_json(park_id: i64, plate: &str) -> Value {
    json!({
        "park_id": park_id,
        "license_plate": plate,
        "vehicle_type": "重型半挂牵引车",
        "vin": "LZZ1CLVB6JA123456",
        "register_date": "2020-05-01",
        "issue_date": "2020-05-10",
        "brand_model": "解放 CA4250",
        "usage_nature": "货运",
        "owner": "唐山物流有限公司",
        "address": "河北省唐山市路北区",
        "emission_standard": "国六"
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "park_vehicle_ledger");
}

#[tokio::test]
async fn test_external_vehicle_lifecycle_over_http() {
    let app = create_test_app();
    let park = create_park(&app, "HTTP01").await;
    let park_id = park["park"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/external-vehicles",
        Some(external_vehicle_json(park_id, "冀B12345")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let vehicle = &body["data"];
    let id = vehicle["id"].as_i64().unwrap();
    assert_eq!(vehicle["plate_color"], "yellow-plate");
    assert_eq!(vehicle["audit_status"], "unaudited");
    assert_eq!(vehicle["approved_load_mass"], 40000.0);
    assert_eq!(vehicle["is_obd_enabled"], true);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/external-vehicles/{}/dispatch", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "NOT_AUDITED");

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/external-vehicles/{}/audit", id),
        Some(json!({ "status": "audited" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/external-vehicles/{}/dispatch", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dispatch_status"], "dispatched");
    assert_eq!(body["data"]["dispatch_count"], 1);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/external-vehicles?park_id={}&page=1&page_size=5&audit_status=audited", park_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["page_size"], 5);
}

#[tokio::test]
async fn test_validation_error_names_field() {
    let app = create_test_app();
    let mut payload = external_vehicle_json(1, "冀B12345");
    payload["vehicle_type"] = json!("重型半挂牵引");

    let (status, body) = send(&app, Method::POST, "/api/v1/external-vehicles", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["field"], "vehicle_type");
}

#[tokio::test]
async fn test_audit_rejects_unknown_status_over_http() {
    let app = create_test_app();
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/v1/external-vehicles",
        Some(external_vehicle_json(1, "冀B12345")),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/external-vehicles/{}/audit", id),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_dispatch_over_http() {
    let app = create_test_app();
    let mut ids = Vec::new();
    for plate in ["冀B10001", "冀B10002"] {
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/v1/external-vehicles",
            Some(external_vehicle_json(1, plate)),
        )
        .await;
        ids.push(body["data"]["id"].as_i64().unwrap());
    }
    send(
        &app,
        Method::POST,
        &format!("/api/v1/external-vehicles/{}/audit", ids[0]),
        Some(json!({ "status": "audited" })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/external-vehicles/dispatch/batch",
        Some(json!({ "ids": ids })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BATCH_NOT_AUDITED");
    assert_eq!(body["details"]["unaudited_ids"], json!([ids[1]]));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/external-vehicles/dispatch/batch",
        Some(json!({ "ids": [ids[0], 987654] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dispatched"], 1);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/external-vehicles/dispatch/batch",
        Some(json!({ "ids": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dispatched"], 0);
}

#[tokio::test]
async fn test_update_with_stale_version_conflicts() {
    let app = create_test_app();
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/v1/external-vehicles",
        Some(external_vehicle_json(1, "冀B12345")),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let mut update = external_vehicle_json(1, "冀B123456");
    update["version"] = json!(0);
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/external-vehicles/{}", id),
        Some(update.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["plate_color"], "green-plate");
    assert_eq!(body["data"]["version"], 1);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/external-vehicles/{}", id),
        Some(update),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_internal_and_non_road_routes() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/internal-vehicles",
        Some(json!({
            "park_id": 1,
            "vin": "LZZ1CLVB6JA123456",
            "vehicle_type": "轻型厢式货车",
            "environmental_code": "HB-0001"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["plate_color"], Value::Null);
    let internal_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/internal-vehicles/{}/dispatch", internal_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/non-road",
        Some(json!({ "park_id": 1, "pin": "PIN-0001", "machinery_type": "装载机" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let machine_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/non-road/{}", machine_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/non-road/{}", machine_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_park_routes() {
    let app = create_test_app();
    let created = create_park(&app, "PARK01").await;
    let id = created["park"]["id"].as_i64().unwrap();
    assert!(created["park"].get("login_password_hash").is_none());
    let account = created["credentials"]["login_account"].as_str().unwrap().to_string();
    let password = created["credentials"]["login_password"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/parks/{}", id),
        Some(json!({ "updates": [{ "field": "city", "value": "唐山市" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["city"], "唐山市");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/parks/{}", id),
        Some(json!({ "updates": [{ "field": "secret_key", "value": "x" }] })),
    )
    .await;
    assert!(status.is_client_error());

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/parks/{}/renew", id),
        Some(json!({ "duration_months": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["renewal"]["duration_months"], 6);

    let (status, body) = send(&app, Method::GET, "/api/v1/renewals?park_code=PARK", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["park_code"], "PARK01");

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/parks/{}/validity", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], true);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/parks/login",
        Some(json!({ "login_account": account, "login_password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/parks/login",
        Some(json!({ "login_account": account, "login_password": "00000x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, bytes) = send_raw(
        &app,
        Method::GET,
        &format!("/api/v1/parks/{}/download", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("车场编号: PARK01"));
    assert!(text.contains(&format!("账号: {}", account)));

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/parks/{}/credentials/reset", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["login_password"].as_str().unwrap().len(), 5);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/parks/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &format!("/api/v1/parks/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mini_program_routes() {
    let app = create_test_app();
    let created = create_park(&app, "MINI01").await;
    let id = created["park"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/mini-program/scan",
        Some(json!({ "qrcode": format!("park:{}", id) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["park_id"], id);
    assert_eq!(body["data"]["park_name"], "园区 MINI01");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/mini-program/vehicle",
        Some(external_vehicle_json(id, "冀B12345D")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["plate_color"], "green-yellow-plate");

    // Sin THIRD_PARTY_BASE_URL el enriquecimiento no está disponible
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/mini-program/get-car-data",
        Some(json!({
            "license_plate": "冀B12345",
            "vin": "LZZ1CLVB6JA123456",
            "engine_number": "E1234567",
            "vehicle_type": "重型半挂牵引车"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "REMOTE_NOT_CONFIGURED");
}

#[tokio::test]
async fn test_qrcode_routes() {
    let app = create_test_app();
    let created = create_park(&app, "QR01").await;
    let id = created["park"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/qrcodes/non-road?park_id={}", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["kind"], "non-road-machinery");
    assert_eq!(body["data"]["is_enabled"], true);
    let first_content = body["data"]["content"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/qrcodes/non-road/update?park_id={}", id),
        Some(json!({ "regenerate": true, "fields_config": { "pin": true } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["data"]["content"], first_content.as_str());
    assert_eq!(body["data"]["fields_config"]["pin"], true);
    let current = body["data"]["content"].clone();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/mini-program/scan",
        Some(json!({ "qrcode": current })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["vehicle_kind"], "non-road-machinery");
    assert_eq!(body["data"]["fields_config"]["pin"], true);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/mini-program/scan",
        Some(json!({ "qrcode": first_content })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/v1/qrcodes/bus?park_id={}", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/qrcodes/external-vehicle?park_id=99999",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_expired_park_is_rejected_by_mini_program() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/parks",
        Some(json!({
            "name": "过期园区",
            "code": "OLD01",
            "start_time": "2020-01-01T00:00:00Z",
            "end_time": "2021-01-01T00:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["park"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/mini-program/scan",
        Some(json!({ "qrcode": format!("park:{}", id) })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "PARK_EXPIRED");
}
