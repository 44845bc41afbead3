//! Liveness probes

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub ok: bool,
    pub message: &'static str,
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        ok: true,
        message: "alive",
    })
}

/// GET /health - plain text `ok`
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
