//! Liveness endpoint.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;

/// `GET /health` — always `200 ok`, never cached.
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))],
        "ok",
    )
}
