//! # runlab Common Library
//!
//! Shared code for the runlab services:
//! - Error types
//! - Layered configuration (CLI, environment, TOML file, compiled defaults)
//! - Database bootstrap for the composition store (`sqlx` feature)
//! - Shared-secret API key check
//! - Clock helpers

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
