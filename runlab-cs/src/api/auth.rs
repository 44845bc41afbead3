//! API key middleware for write endpoints
//!
//! Runs before the handler's extractors, so a request with a bad key is
//! rejected with 401 even if its body would also fail validation.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use runlab_common::api::{validate_api_key, API_KEY_HEADER};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// Reject requests whose `x-api-key` header does not match the shared secret
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = validate_api_key(provided, &state.api_key) {
        warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
        return Err(e.into());
    }

    Ok(next.run(request).await)
}
