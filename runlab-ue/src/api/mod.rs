//! HTTP API handlers for runlab-ue

pub mod health;
pub mod upload;

pub use health::{health, root};
pub use upload::upload;
