//! Device registry endpoints.
//!
//! Routes:
//! - `GET  /devices`             — list all devices
//! - `POST /devices`             — register a device
//! - `GET  /devices/:id/details` — one device plus all its readings
//!
//! Devices are never updated or deleted; the registry only grows.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::repository::{Device, NewDevice, Reading, DEFAULT_CATEGORY};
use crate::validation::{require_fields, str_field};

use super::AppState;

/// Required keys for `POST /devices`. Presence only; empty strings pass.
const REQUIRED_DEVICE_FIELDS: &[&str] = &["name", "type", "location", "status"];

/// `GET /devices` — every registered device, including `category`.
pub async fn list_devices(
    State(state): State<AppState>,
) -> Result<Json<Vec<Device>>, ApiError> {
    let devices = state.repo.list_devices().await?;
    Ok(Json(devices))
}

/// `POST /devices` — register a device. `category` is optional and
/// defaults to "General".
pub async fn create_device(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_fields(&body, REQUIRED_DEVICE_FIELDS)?;

    let category = if body.contains_key("category") {
        str_field(&body, "category")?
    } else {
        DEFAULT_CATEGORY.to_string()
    };

    let device = NewDevice {
        name: str_field(&body, "name")?,
        device_type: str_field(&body, "type")?,
        location: str_field(&body, "location")?,
        status: str_field(&body, "status")?,
        category,
    };

    let id = state.repo.insert_device(&device).await?;
    state.metrics.devices_registered_total.inc();
    tracing::info!(device_id = id, "device registered");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Device added successfully" })),
    ))
}

// ---- Device details ----

/// Device payload inside `/details` — `id` is surfaced as `device_id`.
#[derive(Debug, Serialize)]
pub struct DeviceDetail {
    pub device_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub location: String,
    pub status: String,
    pub category: String,
}

impl From<Device> for DeviceDetail {
    fn from(device: Device) -> Self {
        Self {
            device_id: device.id,
            name: device.name,
            device_type: device.device_type,
            location: device.location,
            status: device.status,
            category: device.category,
        }
    }
}

/// Reading payload inside `/details` — `id` is surfaced as `reading_id`.
#[derive(Debug, Serialize)]
pub struct ReadingDetail {
    pub reading_id: i64,
    pub device_id: i64,
    pub status: String,
    pub temperature: f64,
    pub timestamp: String,
}

impl From<Reading> for ReadingDetail {
    fn from(reading: Reading) -> Self {
        Self {
            reading_id: reading.id,
            device_id: reading.device_id,
            status: reading.status,
            temperature: reading.temperature,
            timestamp: reading.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeviceWithReadings {
    pub device: DeviceDetail,
    pub readings: Vec<ReadingDetail>,
}

/// `GET /devices/:id/details` — the device plus all its readings,
/// newest first.
pub async fn device_details(
    State(state): State<AppState>,
    Path(device_id): Path<i64>,
) -> Result<Json<DeviceWithReadings>, ApiError> {
    let device = state
        .repo
        .get_device(device_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Device not found".to_string()))?;

    let readings = state.repo.list_readings_for_device(device_id).await?;

    Ok(Json(DeviceWithReadings {
        device: device.into(),
        readings: readings.into_iter().map(Into::into).collect(),
    }))
}
