//! Reading log endpoints.
//!
//! Routes:
//! - `GET  /readings`     — every reading, newest first
//! - `POST /readings`     — record a reading (timestamp is server-assigned)
//! - `GET  /readings/:id` — readings for a device (`:id` is a device id)
//! - `PUT  /readings/:id` — partial update (`:id` is a reading id)
//!
//! `GET /readings/:id` deliberately does not check that the device
//! exists; an unknown device yields an empty array, unlike
//! `/devices/:id/details`.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::repository::{Reading, ReadingPatch};
use crate::validation::{f64_field, i64_field, require_fields, str_field};

use super::AppState;

/// Required keys for `POST /readings`.
const REQUIRED_READING_FIELDS: &[&str] = &["device_id", "status", "temperature"];

/// `GET /readings` — every reading across all devices, newest first.
pub async fn list_readings(
    State(state): State<AppState>,
) -> Result<Json<Vec<Reading>>, ApiError> {
    let readings = state.repo.list_readings().await?;
    Ok(Json(readings))
}

/// `POST /readings` — record a reading against an existing device.
///
/// Validation runs before the existence check, and the existence check
/// before the insert; a rejected request writes nothing.
pub async fn create_reading(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    require_fields(&body, REQUIRED_READING_FIELDS)?;
    let device_id = i64_field(&body, "device_id")?;
    let status = str_field(&body, "status")?;
    let temperature = f64_field(&body, "temperature")?;

    if !state.repo.device_exists(device_id).await? {
        return Err(ApiError::NotFound("Device ID not found".to_string()));
    }

    state
        .repo
        .insert_reading(device_id, &status, temperature)
        .await?;
    state.metrics.readings_recorded_total.inc();
    tracing::debug!(device_id, temperature, "reading recorded");

    Ok(Json(serde_json::json!({ "message": "Reading recorded" })))
}

/// `PUT /readings/:id` — update `status` and/or `temperature` of one
/// reading. Unrecognized keys are ignored; `device_id` and `timestamp`
/// can never be changed.
pub async fn update_reading(
    State(state): State<AppState>,
    Path(reading_id): Path<i64>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let patch = ReadingPatch {
        status: match body.get("status") {
            Some(_) => Some(str_field(&body, "status")?),
            None => None,
        },
        temperature: match body.get("temperature") {
            Some(_) => Some(f64_field(&body, "temperature")?),
            None => None,
        },
    };

    if patch.is_empty() {
        return Err(ApiError::NoUpdatableFields);
    }

    let updated = state.repo.update_reading(reading_id, &patch).await?;
    if !updated {
        return Err(ApiError::NotFound("Reading not found".to_string()));
    }
    state.metrics.readings_updated_total.inc();

    Ok(Json(serde_json::json!({
        "message": format!("Reading {} updated successfully", reading_id)
    })))
}

/// `GET /readings/:id` — readings for one device, newest first.
pub async fn device_readings(
    State(state): State<AppState>,
    Path(device_id): Path<i64>,
) -> Result<Json<Vec<Reading>>, ApiError> {
    let readings = state.repo.list_readings_for_device(device_id).await?;
    Ok(Json(readings))
}
