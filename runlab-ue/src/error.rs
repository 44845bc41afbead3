//! Error types for runlab-ue

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Upload request errors
#[derive(Debug, Error)]
pub enum UploadError {
    /// A required form field was not sent (422)
    #[error("Missing required form field: {0}")]
    MissingField(&'static str),

    /// Request is not a multipart form at all (422)
    #[error("Invalid multipart request: {0}")]
    Rejected(#[from] MultipartRejection),

    /// Multipart stream failed mid-read; status comes from axum
    /// (413 when the body limit is hit, 400 for a malformed stream)
    #[error("Failed to read multipart body: {0}")]
    Read(#[from] MultipartError),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            UploadError::MissingField(_) => (StatusCode::UNPROCESSABLE_ENTITY, "MISSING_FIELD"),
            UploadError::Rejected(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_MULTIPART"),
            UploadError::Read(err) => (err.status(), "READ_ERROR"),
        };

        let body = Json(json!({
            "ok": false,
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
