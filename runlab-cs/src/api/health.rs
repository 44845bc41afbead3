//! Health check endpoint

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// GET /healthz
///
/// Liveness only; does not touch the database. No authentication.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/healthz", get(health_check))
}
