//! Integration tests for all API endpoints.
//!
//! Each test boots the full Axum router (same assembly as `main.rs`)
//! using `tower::ServiceExt::oneshot` — no live server needed.
//! `build_test_app()` wires an in-memory SQLite pool (schema applied),
//! a fresh Prometheus registry, and the complete `Router<()>`.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use device_monitor::api::{router, AppState};
use device_monitor::db::create_pool;
use device_monitor::metrics::AppMetrics;
use device_monitor::repository::TelemetryRepository;

// ---- Helpers ----------------------------------------------------------------

async fn build_test_app() -> Router {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    router(AppState {
        repo: Arc::new(TelemetryRepository::new(pool)),
        metrics: Arc::new(AppMetrics::new().unwrap()),
    })
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Register a device and return its id (1, 2, ... per app).
async fn register_device(app: &Router, body: &str) -> StatusCode {
    app.clone()
        .oneshot(json_request(Method::POST, "/devices", body))
        .await
        .unwrap()
        .status()
}

async fn record_reading(app: &Router, device_id: i64, status: &str, temperature: f64) {
    let body = format!(
        r#"{{"device_id":{},"status":"{}","temperature":{}}}"#,
        device_id, status, temperature
    );
    let resp = app
        .clone()
        .oneshot(json_request(Method::POST, "/readings", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

const BASE_DEVICE: &str =
    r#"{"name":"chiller-1","type":"hvac","location":"roof","status":"active"}"#;

// ---- Devices ----------------------------------------------------------------

#[tokio::test]
async fn created_device_is_retrievable_with_supplied_category() {
    let app = build_test_app().await;
    let status = register_device(
        &app,
        r#"{"name":"cam-3","type":"camera","location":"lobby","status":"active","category":"Security"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let json = body_json(app.oneshot(get("/devices")).await.unwrap().into_body()).await;
    let devices = json.as_array().unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0]["name"], "cam-3");
    assert_eq!(devices[0]["type"], "camera");
    assert_eq!(devices[0]["category"], "Security");
}

#[tokio::test]
async fn created_device_without_category_defaults_to_general() {
    let app = build_test_app().await;
    assert_eq!(register_device(&app, BASE_DEVICE).await, StatusCode::CREATED);

    let json = body_json(app.oneshot(get("/devices")).await.unwrap().into_body()).await;
    assert_eq!(json[0]["category"], "General");
}

#[tokio::test]
async fn each_missing_required_field_is_named_in_400() {
    let cases = [
        (r#"{"type":"t","location":"l","status":"s"}"#, "name"),
        (r#"{"name":"n","location":"l","status":"s"}"#, "type"),
        (r#"{"name":"n","type":"t","status":"s"}"#, "location"),
        (r#"{"name":"n","type":"t","location":"l"}"#, "status"),
    ];

    for (body, field) in cases {
        let app = build_test_app().await;
        let resp = app
            .oneshot(json_request(Method::POST, "/devices", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp.into_body()).await;
        assert_eq!(json["error"], format!("Missing field: {}", field));
    }
}

// ---- Readings ---------------------------------------------------------------

#[tokio::test]
async fn reading_for_unknown_device_is_404_and_creates_no_row() {
    let app = build_test_app().await;

    let resp = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/readings",
            r#"{"device_id":7,"status":"ok","temperature":30}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["error"], "Device ID not found");

    let listing = body_json(
        app.clone()
            .oneshot(get("/readings/7"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(listing.as_array().unwrap().len(), 0);

    let all = body_json(app.oneshot(get("/readings")).await.unwrap().into_body()).await;
    assert_eq!(all.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn successive_readings_get_server_timestamps_ordered_newest_first() {
    let app = build_test_app().await;
    register_device(&app, BASE_DEVICE).await;
    record_reading(&app, 1, "first", 10.0).await;
    record_reading(&app, 1, "second", 20.0).await;

    let json = body_json(app.oneshot(get("/readings")).await.unwrap().into_body()).await;
    let readings = json.as_array().unwrap();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0]["status"], "second");
    assert_eq!(readings[1]["status"], "first");

    // Timestamps are server-assigned RFC 3339 UTC and non-increasing in
    // a descending listing.
    let newest = readings[0]["timestamp"].as_str().unwrap();
    let oldest = readings[1]["timestamp"].as_str().unwrap();
    chrono::DateTime::parse_from_rfc3339(newest).unwrap();
    assert!(newest >= oldest);
}

#[tokio::test]
async fn update_with_no_valid_fields_is_rejected_and_changes_nothing() {
    let app = build_test_app().await;
    register_device(&app, BASE_DEVICE).await;
    record_reading(&app, 1, "ok", 50.0).await;

    let before = body_json(
        app.clone()
            .oneshot(get("/readings/1"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;

    let resp = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/readings/1",
            r#"{"label":"east wing"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp.into_body()).await;
    assert_eq!(json["error"], "No valid fields to update provided");

    let after = body_json(app.oneshot(get("/readings/1")).await.unwrap().into_body()).await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn partial_update_touches_only_the_supplied_field() {
    let app = build_test_app().await;
    register_device(&app, BASE_DEVICE).await;
    record_reading(&app, 1, "ok", 50.0).await;

    let before = body_json(
        app.clone()
            .oneshot(get("/readings/1"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;

    let resp = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/readings/1",
            r#"{"temperature":95.5}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp.into_body()).await["message"],
        "Reading 1 updated successfully"
    );

    let after = body_json(app.oneshot(get("/readings/1")).await.unwrap().into_body()).await;
    assert_eq!(after[0]["temperature"], 95.5);
    assert_eq!(after[0]["status"], before[0]["status"]);
    assert_eq!(after[0]["device_id"], before[0]["device_id"]);
    assert_eq!(after[0]["timestamp"], before[0]["timestamp"]);
}

#[tokio::test]
async fn update_of_unknown_reading_is_404() {
    let app = build_test_app().await;
    let resp = app
        .oneshot(json_request(
            Method::PUT,
            "/readings/55",
            r#"{"status":"ok"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp.into_body()).await["error"], "Reading not found");
}

#[tokio::test]
async fn listing_readings_for_silent_device_is_empty_array_not_404() {
    let app = build_test_app().await;
    register_device(&app, BASE_DEVICE).await;

    // Registered device with no readings, and an id that matches no
    // device at all: both are 200 with an empty array.
    for uri in ["/readings/1", "/readings/999"] {
        let resp = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp.into_body()).await;
        assert_eq!(json.as_array().unwrap().len(), 0);
    }
}

// ---- Details ----------------------------------------------------------------

#[tokio::test]
async fn details_joins_device_with_its_readings_only() {
    let app = build_test_app().await;
    register_device(&app, BASE_DEVICE).await;
    register_device(
        &app,
        r#"{"name":"cam-1","type":"camera","location":"lobby","status":"active"}"#,
    )
    .await;
    record_reading(&app, 1, "ok", 21.0).await;
    record_reading(&app, 2, "ok", 22.0).await;
    record_reading(&app, 1, "warm", 31.0).await;

    let resp = app.clone().oneshot(get("/devices/1/details")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;

    assert_eq!(json["device"]["device_id"], 1);
    assert_eq!(json["device"]["name"], "chiller-1");
    let readings = json["readings"].as_array().unwrap();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0]["status"], "warm"); // newest first
    assert!(readings.iter().all(|r| r["device_id"] == 1));

    let resp = app.oneshot(get("/devices/42/details")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp.into_body()).await["error"], "Device not found");
}

// ---- Diagnostics ------------------------------------------------------------

#[tokio::test]
async fn standard_diagnostics_flags_three_hot_readings() {
    let app = build_test_app().await;
    register_device(&app, BASE_DEVICE).await;
    for temp in [85.0, 90.0, 81.0, 50.0, 50.0] {
        record_reading(&app, 1, "ok", temp).await;
    }

    let resp = app.oneshot(get("/devices/1/diagnostics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp.into_body()).await;

    assert_eq!(json["device_id"], 1);
    assert_eq!(json["recent_readings_count"], 5);
    assert_eq!(json["high_temperature_flags"], 3);
    assert_eq!(json["fault_flags"], 0);
    assert_eq!(
        json["recommendation"],
        "High temperature detected in multiple readings. Recommend checking HVAC system."
    );
}

#[tokio::test]
async fn ai_diagnose_distinguishes_missing_device_from_missing_data() {
    let app = build_test_app().await;
    register_device(&app, BASE_DEVICE).await;

    let no_data = app.clone().oneshot(get("/ai/diagnose/1")).await.unwrap();
    assert_eq!(no_data.status(), StatusCode::NOT_FOUND);
    let no_data_err = body_json(no_data.into_body()).await["error"].clone();
    assert_eq!(no_data_err, "No readings found for this device");

    let no_device = app.oneshot(get("/ai/diagnose/99")).await.unwrap();
    assert_eq!(no_device.status(), StatusCode::NOT_FOUND);
    let no_device_err = body_json(no_device.into_body()).await["error"].clone();
    assert_eq!(no_device_err, "Device not found");

    assert_ne!(no_data_err, no_device_err);
}

#[tokio::test]
async fn ai_diagnose_uses_strict_threshold_where_standard_is_inclusive() {
    let app = build_test_app().await;
    register_device(&app, BASE_DEVICE).await;
    for temp in [80.0, 85.0, 90.0] {
        record_reading(&app, 1, "ok", temp).await;
    }

    // Exactly three readings at 80+: enough for the standard profile
    // (>= 3) but not the strict one (> 3).
    let standard = body_json(
        app.clone()
            .oneshot(get("/devices/1/diagnostics"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(standard["high_temperature_flags"], 3);
    assert_eq!(
        standard["recommendation"],
        "High temperature detected in multiple readings. Recommend checking HVAC system."
    );

    let strict = body_json(app.oneshot(get("/ai/diagnose/1")).await.unwrap().into_body()).await;
    assert_eq!(strict["high_temperature_events"], 3);
    assert_eq!(strict["recommendation"], "Device is operating normally.");
}

#[tokio::test]
async fn ai_diagnose_reports_hardware_advice_past_strict_fault_threshold() {
    let app = build_test_app().await;
    register_device(&app, BASE_DEVICE).await;
    for status in ["fault", "Fault: relay", "FAULT", "ok"] {
        record_reading(&app, 1, status, 20.0).await;
    }

    let json = body_json(app.oneshot(get("/ai/diagnose/1")).await.unwrap().into_body()).await;
    assert_eq!(json["fault_events"], 3);
    assert_eq!(
        json["recommendation"],
        "Multiple fault statuses detected. Recommend inspecting device hardware."
    );
}

// ---- Ambient endpoints ------------------------------------------------------

#[tokio::test]
async fn health_returns_plain_ok() {
    let app = build_test_app().await;
    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp.into_body()).await, "ok");
}

#[tokio::test]
async fn metrics_expose_counters_that_track_operations() {
    let app = build_test_app().await;
    register_device(&app, BASE_DEVICE).await;
    record_reading(&app, 1, "ok", 20.0).await;

    let resp = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let text = body_text(resp.into_body()).await;

    assert!(text.contains("device_monitor_devices_registered_total 1"));
    assert!(text.contains("device_monitor_readings_recorded_total 1"));
}
