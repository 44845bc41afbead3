//! runlab-cs library - Composition Store service
//!
//! Stores runs (external id, item count, composition list) in SQLite and
//! exposes upsert, point-read, latest and list endpoints.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use crate::error::{ApiError, ApiResult};
pub use crate::service::RunService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Upsert and query service over the database pool
    pub service: RunService,
    /// Shared secret expected in `x-api-key` on write endpoints
    pub api_key: Arc<str>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            service: RunService::new(db),
            api_key: api_key.into(),
        }
    }
}

/// Build application router
///
/// Only `POST /v1/runs` requires the API key; health and reads are public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let upsert = post(api::upsert_run).route_layer(middleware::from_fn_with_state(
        state.clone(),
        api::require_api_key,
    ));

    Router::new()
        .route("/v1/runs", get(api::list_runs).merge(upsert))
        .route("/v1/runs/latest", get(api::get_latest_run))
        .route("/v1/runs/:id", get(api::get_run))
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
