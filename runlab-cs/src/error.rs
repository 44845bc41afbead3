//! Error types for runlab-cs
//!
//! Maps the error taxonomy onto HTTP status codes:
//! authentication → 401, malformed input → 422, unknown run → 404,
//! anything else → 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use runlab_common::api::ApiAuthError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or wrong shared secret (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] ApiAuthError),

    /// Request failed validation (422)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// runlab-common error
    #[error("Common error: {0}")]
    Common(#[from] runlab_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use runlab_common::Error as CommonError;

        let (status, error_code, message) = match self {
            ApiError::Unauthorized(err) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string())
            }
            ApiError::Validation(msg) | ApiError::Common(CommonError::InvalidInput(msg)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                msg,
            ),
            ApiError::Common(CommonError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::Common(ref err) => {
                error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    err.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
