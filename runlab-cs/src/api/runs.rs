//! Run upsert and query endpoints
//!
//! - `POST /v1/runs`: upsert (API key required, see `auth`)
//! - `GET /v1/runs/latest`: most recently created run
//! - `GET /v1/runs/:id`: run by external id
//! - `GET /v1/runs?limit=N`: recent run summaries

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::{RunPayload, RunRecord, RunSummary};
use crate::service::{UpsertStatus, DEFAULT_LIST_LIMIT};
use crate::AppState;

/// Query parameters for listing runs
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

/// POST /v1/runs
///
/// Replaces the run's full state and echoes the validated payload.
/// Body decoding failures are reported as validation errors (422).
pub async fn upsert_run(
    State(state): State<AppState>,
    payload: Result<Json<RunPayload>, JsonRejection>,
) -> ApiResult<Json<RunPayload>> {
    let Json(payload) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let outcome = state.service.upsert_run(&payload).await?;

    let verb = match outcome.status {
        UpsertStatus::Created => "Created",
        UpsertStatus::Updated => "Updated",
    };
    info!(
        "{} run {} ({} items, {} composition entries)",
        verb,
        payload.id,
        payload.items_processed,
        payload.composition.len()
    );

    Ok(Json(payload))
}

/// GET /v1/runs/latest
pub async fn get_latest_run(State(state): State<AppState>) -> ApiResult<Json<RunRecord>> {
    let record = state.service.latest_run().await?;
    Ok(Json(record))
}

/// GET /v1/runs/:id
pub async fn get_run(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> ApiResult<Json<RunRecord>> {
    let record = state.service.get_run(&run_id).await?;
    Ok(Json(record))
}

/// GET /v1/runs?limit=N
pub async fn list_runs(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<RunSummary>>> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;

    let runs = state.service.list_runs(query.limit).await?;
    Ok(Json(runs))
}
