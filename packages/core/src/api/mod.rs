//! HTTP surface: route table and shared state.

pub mod devices;
pub mod diagnostics;
pub mod health;
pub mod metrics;
pub mod readings;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::metrics::AppMetrics;
use crate::repository::TelemetryRepository;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<TelemetryRepository>,
    pub metrics: Arc<AppMetrics>,
}

/// Assemble the full route table — the same assembly the binary serves
/// and the integration tests drive.
///
/// `GET /readings/:id` takes a device id while `PUT /readings/:id` takes
/// a reading id; the split is part of the inherited API contract.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(metrics::render))
        .route(
            "/devices",
            get(devices::list_devices).post(devices::create_device),
        )
        .route("/devices/:device_id/details", get(devices::device_details))
        .route(
            "/devices/:device_id/diagnostics",
            get(diagnostics::run_diagnostics),
        )
        .route(
            "/readings",
            get(readings::list_readings).post(readings::create_reading),
        )
        .route(
            "/readings/:id",
            get(readings::device_readings).put(readings::update_reading),
        )
        .route("/ai/diagnose/:device_id", get(diagnostics::ai_diagnose))
        .with_state(state)
}
