//! API module for shared HTTP API functionality
//!
//! Contains ONLY pure functions and shared types. Each service wraps these
//! with its own axum middleware.

pub mod auth;

pub use auth::{validate_api_key, ApiAuthError, API_KEY_HEADER};
