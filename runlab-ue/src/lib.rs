//! runlab-ue library - Upload Echo service
//!
//! Stateless receiver used by clients to measure upload round-trip latency.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;

pub use crate::config::UeConfig;
pub use crate::error::UploadError;

/// Build application router
pub fn build_router(config: &UeConfig) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health))
        .route("/upload", post(api::upload))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
