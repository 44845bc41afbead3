//! Record store: runs and their composition entries
//!
//! Every function takes a `&mut SqliteConnection` so callers can compose
//! several of them inside one transaction (`&mut *tx`). None of them open
//! transactions on their own.

use crate::models::{CompositionEntry, RunSummary};
use runlab_common::Result;
use sqlx::SqliteConnection;

/// Run row without its composition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRow {
    pub pk: i64,
    pub run_id: String,
    pub items_processed: i64,
}

/// Look up a run's surrogate key by external id
pub async fn find_run_pk(conn: &mut SqliteConnection, run_id: &str) -> Result<Option<i64>> {
    let pk = sqlx::query_scalar("SELECT pk FROM runs WHERE run_id = ?")
        .bind(run_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(pk)
}

/// Insert a new run, returning its freshly assigned surrogate key
pub async fn insert_run(
    conn: &mut SqliteConnection,
    run_id: &str,
    items_processed: i64,
) -> Result<i64> {
    let pk = sqlx::query_scalar(
        r#"
        INSERT INTO runs (run_id, items_processed, created_at, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        RETURNING pk
        "#,
    )
    .bind(run_id)
    .bind(items_processed)
    .fetch_one(&mut *conn)
    .await?;

    Ok(pk)
}

/// Update a run's count in place
///
/// Returns the run's surrogate key, or `None` if no run has this id. The
/// surrogate key is never changed, so recency rank is unaffected.
pub async fn update_run_count(
    conn: &mut SqliteConnection,
    run_id: &str,
    items_processed: i64,
) -> Result<Option<i64>> {
    let pk = sqlx::query_scalar(
        r#"
        UPDATE runs
        SET items_processed = ?, updated_at = CURRENT_TIMESTAMP
        WHERE run_id = ?
        RETURNING pk
        "#,
    )
    .bind(items_processed)
    .bind(run_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(pk)
}

/// Delete every composition entry of a run, returning how many were removed
pub async fn delete_composition(conn: &mut SqliteConnection, run_pk: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM composition_entries WHERE run_pk = ?")
        .bind(run_pk)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Insert composition entries for a run, keeping their order
pub async fn insert_composition(
    conn: &mut SqliteConnection,
    run_pk: i64,
    entries: &[CompositionEntry],
) -> Result<()> {
    for (position, entry) in entries.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO composition_entries (run_pk, position, material, percentage)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(run_pk)
        .bind(position as i64)
        .bind(&entry.material)
        .bind(entry.percentage)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Load a run row by surrogate key
pub async fn load_run(conn: &mut SqliteConnection, run_pk: i64) -> Result<Option<RunRow>> {
    let row: Option<(i64, String, i64)> =
        sqlx::query_as("SELECT pk, run_id, items_processed FROM runs WHERE pk = ?")
            .bind(run_pk)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(row.map(|(pk, run_id, items_processed)| RunRow {
        pk,
        run_id,
        items_processed,
    }))
}

/// Load a run's composition in submission order
pub async fn load_composition(
    conn: &mut SqliteConnection,
    run_pk: i64,
) -> Result<Vec<CompositionEntry>> {
    let rows: Vec<(String, f64)> = sqlx::query_as(
        r#"
        SELECT material, percentage
        FROM composition_entries
        WHERE run_pk = ?
        ORDER BY position ASC
        "#,
    )
    .bind(run_pk)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(material, percentage)| CompositionEntry {
            material,
            percentage,
        })
        .collect())
}

/// Surrogate key of the most recently inserted run
pub async fn latest_run_pk(conn: &mut SqliteConnection) -> Result<Option<i64>> {
    let pk = sqlx::query_scalar("SELECT pk FROM runs ORDER BY pk DESC LIMIT 1")
        .fetch_optional(&mut *conn)
        .await?;

    Ok(pk)
}

/// Summaries of the `limit` most recently inserted runs, newest first
pub async fn list_recent(conn: &mut SqliteConnection, limit: i64) -> Result<Vec<RunSummary>> {
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT run_id, items_processed FROM runs ORDER BY pk DESC LIMIT ?")
            .bind(limit)
            .fetch_all(&mut *conn)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(id, items_processed)| RunSummary {
            id,
            items_processed,
        })
        .collect())
}
