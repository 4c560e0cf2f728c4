//! Request-body field validation helpers.
//!
//! Create/update bodies arrive as raw JSON objects rather than typed
//! structs so the response can name the first missing key. Presence is
//! checked for every required key before any value is read or any row
//! written.

use serde_json::{Map, Value};

use crate::error::ApiError;

/// Check that every required key is present, reporting the first absent
/// one. Values are not inspected; an empty string still passes.
pub fn require_fields(data: &Map<String, Value>, required: &[&str]) -> Result<(), ApiError> {
    for field in required {
        if !data.contains_key(*field) {
            return Err(ApiError::MissingField((*field).to_string()));
        }
    }
    Ok(())
}

/// Extract a string field, rejecting present-but-mistyped values.
pub fn str_field(data: &Map<String, Value>, key: &str) -> Result<String, ApiError> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ApiError::InvalidField(key.to_string()))
}

/// Extract an integer field.
pub fn i64_field(data: &Map<String, Value>, key: &str) -> Result<i64, ApiError> {
    data.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::InvalidField(key.to_string()))
}

/// Extract a numeric field. Accepts both `21` and `21.5`.
pub fn f64_field(data: &Map<String, Value>, key: &str) -> Result<f64, ApiError> {
    data.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ApiError::InvalidField(key.to_string()))
}
