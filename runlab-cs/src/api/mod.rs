//! HTTP API handlers for runlab-cs

pub mod auth;
pub mod health;
pub mod runs;

pub use auth::require_api_key;
pub use health::health_routes;
pub use runs::{get_latest_run, get_run, list_runs, upsert_run};
