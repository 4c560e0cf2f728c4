//! Diagnostic summary endpoints.
//!
//! Routes:
//! - `GET /devices/:id/diagnostics` — five-reading window, inclusive
//!   thresholds
//! - `GET /ai/diagnose/:id`         — ten-reading window, strict
//!   thresholds, empty history is its own 404
//!
//! Thin handlers over `crate::diagnostics`; each maps the shared report
//! into its own historical payload shape.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::diagnostics::{
    evaluate, DiagnosticProfile, DiagnosticReport, DiagnosticsError,
};
use crate::error::ApiError;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct DeviceDiagnostics {
    pub device_id: i64,
    pub recent_readings_count: usize,
    pub high_temperature_flags: usize,
    pub fault_flags: usize,
    pub recommendation: String,
}

#[derive(Debug, Serialize)]
pub struct AiDiagnosis {
    pub device_id: i64,
    pub recent_readings_count: usize,
    pub high_temperature_events: usize,
    pub fault_events: usize,
    pub recommendation: String,
}

/// `GET /devices/:id/diagnostics`.
pub async fn run_diagnostics(
    State(state): State<AppState>,
    Path(device_id): Path<i64>,
) -> Result<Json<DeviceDiagnostics>, ApiError> {
    let report = diagnose(&state, device_id, &DiagnosticProfile::standard()).await?;

    Ok(Json(DeviceDiagnostics {
        device_id,
        recent_readings_count: report.readings_considered,
        high_temperature_flags: report.high_temp_count,
        fault_flags: report.fault_count,
        recommendation: report.recommendation.to_string(),
    }))
}

/// `GET /ai/diagnose/:id`.
pub async fn ai_diagnose(
    State(state): State<AppState>,
    Path(device_id): Path<i64>,
) -> Result<Json<AiDiagnosis>, ApiError> {
    let report = diagnose(&state, device_id, &DiagnosticProfile::extended()).await?;

    Ok(Json(AiDiagnosis {
        device_id,
        recent_readings_count: report.readings_considered,
        high_temperature_events: report.high_temp_count,
        fault_events: report.fault_count,
        recommendation: report.recommendation.to_string(),
    }))
}

/// Shared resolve-then-evaluate path: the device must exist before its
/// history is inspected, so "device missing" and "device has no data"
/// stay distinguishable.
async fn diagnose(
    state: &AppState,
    device_id: i64,
    profile: &DiagnosticProfile,
) -> Result<DiagnosticReport, ApiError> {
    if !state.repo.device_exists(device_id).await? {
        return Err(ApiError::NotFound("Device not found".to_string()));
    }

    let window = state.repo.recent_readings(device_id, profile.window).await?;
    let report = evaluate(profile, &window).map_err(|err| match err {
        DiagnosticsError::NoReadings => ApiError::NotFound(err.to_string()),
    })?;

    state.metrics.diagnostics_runs_total.inc();
    Ok(report)
}
