//! Shared-secret API key validation
//!
//! Write endpoints require the `x-api-key` header to equal the configured
//! secret. There is no other authentication scheme.

use thiserror::Error;

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiAuthError {
    /// Header absent or not valid UTF-8
    #[error("Missing {API_KEY_HEADER} header")]
    MissingKey,

    /// Header present but does not match the shared secret
    #[error("Invalid API key")]
    InvalidKey,
}

/// Check a provided key against the shared secret
pub fn validate_api_key(provided: Option<&str>, expected: &str) -> Result<(), ApiAuthError> {
    let provided = provided.ok_or(ApiAuthError::MissingKey)?;

    if constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(ApiAuthError::InvalidKey)
    }
}

// Comparison time depends only on the lengths, not on where bytes differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
