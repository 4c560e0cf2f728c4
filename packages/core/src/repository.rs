//! Database repository for devices and readings.
//!
//! All SQLite read/write logic lives here. Handlers call into
//! [`TelemetryRepository`]; each method is a single statement, so the
//! storage layer's own locking is the only serialisation involved and a
//! failed request never leaves a partial write behind.
//!
//! Readings are always returned newest first. Timestamps are stored as
//! fixed-width RFC 3339 UTC strings, so ordering the TEXT column orders
//! chronologically; `id DESC` breaks ties in favour of the most recent
//! insert.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::diagnostics::ReadingSample;

/// Category applied when a device is registered without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// A monitored device. `type` is the wire name of `device_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub location: String,
    pub status: String,
    pub category: String,
}

/// A timestamped status/temperature reading attached to a device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub id: i64,
    pub device_id: i64,
    pub status: String,
    pub temperature: f64,
    pub timestamp: String,
}

/// Fields accepted when registering a device.
#[derive(Debug, Clone)]
pub struct NewDevice {
    pub name: String,
    pub device_type: String,
    pub location: String,
    pub status: String,
    pub category: String,
}

/// Partial update for a reading; only present fields are applied.
/// `device_id` and `timestamp` are immutable and have no slot here.
#[derive(Debug, Clone, Default)]
pub struct ReadingPatch {
    pub status: Option<String>,
    pub temperature: Option<f64>,
}

impl ReadingPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.temperature.is_none()
    }
}

fn device_from_row(row: &SqliteRow) -> Option<Device> {
    Some(Device {
        id: row.try_get("id").ok()?,
        name: row.try_get("name").ok()?,
        device_type: row.try_get("type").ok()?,
        location: row.try_get("location").ok()?,
        status: row.try_get("status").ok()?,
        category: row.try_get("category").ok()?,
    })
}

fn reading_from_row(row: &SqliteRow) -> Option<Reading> {
    Some(Reading {
        id: row.try_get("id").ok()?,
        device_id: row.try_get("device_id").ok()?,
        status: row.try_get("status").ok()?,
        temperature: row.try_get("temperature").ok()?,
        timestamp: row.try_get("timestamp").ok()?,
    })
}

/// Repository for reading and writing devices and readings.
pub struct TelemetryRepository {
    pool: SqlitePool,
}

impl TelemetryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---- Devices ----

    /// Insert a device. Returns the new row id.
    pub async fn insert_device(&self, device: &NewDevice) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO devices (name, type, location, status, category)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&device.name)
        .bind(&device.device_type)
        .bind(&device.location)
        .bind(&device.status)
        .bind(&device.category)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// List every registered device in insertion order.
    pub async fn list_devices(&self) -> Result<Vec<Device>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, name, type, location, status, category FROM devices",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(device_from_row).collect())
    }

    /// Fetch a single device, `None` when the id is unknown.
    pub async fn get_device(&self, id: i64) -> Result<Option<Device>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, name, type, location, status, category FROM devices WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().and_then(device_from_row))
    }

    /// `true` when a device with this id exists.
    pub async fn device_exists(&self, id: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT id FROM devices WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    // ---- Readings ----

    /// Insert a reading stamped with the current UTC time.
    /// Returns the new row id.
    pub async fn insert_reading(
        &self,
        device_id: i64,
        status: &str,
        temperature: f64,
    ) -> Result<i64, sqlx::Error> {
        // Micros keeps the string fixed-width; variable-width fractions
        // would not sort lexicographically.
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let result = sqlx::query(
            "INSERT INTO readings (device_id, status, temperature, timestamp)
             VALUES (?, ?, ?, ?)",
        )
        .bind(device_id)
        .bind(status)
        .bind(temperature)
        .bind(&timestamp)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Every reading across all devices, newest first.
    pub async fn list_readings(&self) -> Result<Vec<Reading>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, device_id, status, temperature, timestamp
             FROM readings
             ORDER BY timestamp DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(reading_from_row).collect())
    }

    /// Readings for one device, newest first. An unknown device simply
    /// yields an empty list — existence is not checked here.
    pub async fn list_readings_for_device(
        &self,
        device_id: i64,
    ) -> Result<Vec<Reading>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, device_id, status, temperature, timestamp
             FROM readings
             WHERE device_id = ?
             ORDER BY timestamp DESC, id DESC",
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(reading_from_row).collect())
    }

    /// Fetch a single reading, `None` when the id is unknown.
    pub async fn get_reading(&self, id: i64) -> Result<Option<Reading>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, device_id, status, temperature, timestamp
             FROM readings WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().and_then(reading_from_row))
    }

    /// Apply the present fields of `patch` to a reading.
    /// Returns `false` when the reading id is unknown.
    pub async fn update_reading(
        &self,
        id: i64,
        patch: &ReadingPatch,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE readings
             SET status = COALESCE(?, status),
                 temperature = COALESCE(?, temperature)
             WHERE id = ?",
        )
        .bind(&patch.status)
        .bind(patch.temperature)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The `limit` most recent readings for a device, newest first,
    /// reduced to the fields the diagnostic evaluator consumes.
    pub async fn recent_readings(
        &self,
        device_id: i64,
        limit: u32,
    ) -> Result<Vec<ReadingSample>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT status, temperature, timestamp
             FROM readings
             WHERE device_id = ?
             ORDER BY timestamp DESC, id DESC
             LIMIT ?",
        )
        .bind(device_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let samples = rows
            .iter()
            .filter_map(|row| {
                Some(ReadingSample {
                    status: row.try_get("status").ok()?,
                    temperature: row.try_get("temperature").ok()?,
                    timestamp: row.try_get("timestamp").ok()?,
                })
            })
            .collect();

        Ok(samples)
    }
}
