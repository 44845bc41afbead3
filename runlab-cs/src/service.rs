//! Upsert and query services over the record store
//!
//! The upsert is a create-or-replace of a run's full state. Count update and
//! composition replace happen in one transaction: either the whole new state
//! is visible or none of it is.

use crate::db::runs;
use crate::models::{RunPayload, RunRecord, RunSummary};
use runlab_common::{Error, Result};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

/// Default page size for `list_runs`
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Largest accepted page size; bigger requests are clamped
pub const MAX_LIST_LIMIT: i64 = 1000;

/// Whether an upsert created a run or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStatus {
    Created,
    Updated,
}

/// Result of a successful upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub pk: i64,
    pub status: UpsertStatus,
    /// Composition entries removed by the replace (always 0 on create)
    pub entries_removed: u64,
}

/// Run upsert/query service
#[derive(Clone)]
pub struct RunService {
    db: SqlitePool,
}

impl RunService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Create the run if absent, otherwise replace its count and composition
    ///
    /// Validation runs first; an invalid payload never opens a transaction.
    /// The first statement inside the transaction is a write, so SQLite
    /// takes its write lock up front and concurrent upserts of the same id
    /// are serialized rather than interleaved.
    pub async fn upsert_run(&self, payload: &RunPayload) -> Result<UpsertOutcome> {
        payload
            .validate()
            .map_err(|e| Error::InvalidInput(e.to_string()))?;

        let mut tx = self.db.begin().await?;

        let outcome = match runs::update_run_count(&mut tx, &payload.id, payload.items_processed)
            .await?
        {
            Some(pk) => {
                let entries_removed = runs::delete_composition(&mut tx, pk).await?;
                UpsertOutcome {
                    pk,
                    status: UpsertStatus::Updated,
                    entries_removed,
                }
            }
            None => {
                let pk = runs::insert_run(&mut tx, &payload.id, payload.items_processed).await?;
                UpsertOutcome {
                    pk,
                    status: UpsertStatus::Created,
                    entries_removed: 0,
                }
            }
        };

        runs::insert_composition(&mut tx, outcome.pk, &payload.composition).await?;

        tx.commit().await?;

        debug!(
            "Upserted run {} (pk {}, {:?}, {} entries removed, {} inserted)",
            payload.id,
            outcome.pk,
            outcome.status,
            outcome.entries_removed,
            payload.composition.len()
        );

        Ok(outcome)
    }

    /// Fetch a run and its composition by external id
    pub async fn get_run(&self, run_id: &str) -> Result<RunRecord> {
        let mut tx = self.db.begin().await?;

        let record = match runs::find_run_pk(&mut tx, run_id).await? {
            Some(pk) => load_record(&mut tx, pk).await?,
            None => None,
        };

        tx.commit().await?;

        record.ok_or_else(|| Error::NotFound(format!("No such run: {}", run_id)))
    }

    /// Fetch the run with the highest surrogate key
    ///
    /// "Latest" means most recently created; updating a run does not move it.
    pub async fn latest_run(&self) -> Result<RunRecord> {
        let mut tx = self.db.begin().await?;

        let record = match runs::latest_run_pk(&mut tx).await? {
            Some(pk) => load_record(&mut tx, pk).await?,
            None => None,
        };

        tx.commit().await?;

        record.ok_or_else(|| Error::NotFound("Store is empty".to_string()))
    }

    /// Summaries of recent runs, newest first
    ///
    /// `limit` must be at least 1; values above `MAX_LIST_LIMIT` are clamped.
    pub async fn list_runs(&self, limit: i64) -> Result<Vec<RunSummary>> {
        if limit < 1 {
            return Err(Error::InvalidInput(format!(
                "limit: must be >= 1, got {}",
                limit
            )));
        }

        let mut conn = self.db.acquire().await?;
        runs::list_recent(&mut conn, limit.min(MAX_LIST_LIMIT)).await
    }
}

async fn load_record(conn: &mut SqliteConnection, pk: i64) -> Result<Option<RunRecord>> {
    let Some(row) = runs::load_run(conn, pk).await? else {
        return Ok(None);
    };
    let composition = runs::load_composition(conn, pk).await?;

    Ok(Some(RunRecord {
        pk: row.pk,
        id: row.run_id,
        items_processed: row.items_processed,
        composition,
    }))
}
