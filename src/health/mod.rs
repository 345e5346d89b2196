//! Liveness endpoint.
//!
//! # Design Decisions
//! - Answered locally, the upstream is never consulted
//! - Always 200 while the process serves requests

use axum::http::StatusCode;
use axum::response::IntoResponse;

/// `GET /health`
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
