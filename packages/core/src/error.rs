//! Unified request-level error type.
//!
//! Every handler returns `ApiError` and lets axum render it: validation
//! failures map to 400, missing entities to 404, storage failures to 500.
//! The response body is always `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required key was absent from the request body.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A key was present but held a value of the wrong JSON type.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// A partial update carried none of the recognized fields.
    #[error("No valid fields to update provided")]
    NoUpdatableFields,

    /// The referenced device or reading does not exist. The message is
    /// entity-specific and part of the response contract.
    #[error("{0}")]
    NotFound(String),

    /// Unclassified storage failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_)
            | ApiError::InvalidField(_)
            | ApiError::NoUpdatableFields => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
