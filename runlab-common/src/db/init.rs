//! Database initialization
//!
//! Opens the pool named by a sqlx connection string and creates the
//! composition store tables if they are missing. Table creation is
//! idempotent; there is no migration framework.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Pool size for file-backed databases
pub const MAX_CONNECTIONS: u32 = 10;

/// How long a connection waits on SQLite's write lock before failing
pub const BUSY_TIMEOUT_MS: u64 = 5000;

/// Open the database and ensure the schema exists
///
/// Pragmas are set through connect options so they apply to every pooled
/// connection, not just the first one.
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    let in_memory = is_in_memory(database_url);

    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

    if !in_memory {
        // WAL lets readers proceed while one writer holds the lock
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    // Each in-memory connection is its own database, so keep exactly one
    // connection alive for the life of the pool
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
    };

    let pool = pool_options.connect_with(options).await?;

    create_runs_table(&pool).await?;
    create_composition_entries_table(&pool).await?;

    info!(
        "Opened database {} ({})",
        redact_url(database_url),
        if in_memory { "in-memory" } else { "file" }
    );

    Ok(pool)
}

async fn create_runs_table(pool: &SqlitePool) -> Result<()> {
    // AUTOINCREMENT: surrogate keys are strictly increasing and never reused,
    // which is what "latest" ordering relies on
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS runs (
            pk INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id TEXT NOT NULL UNIQUE,
            items_processed INTEGER NOT NULL CHECK (items_processed >= 0),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_composition_entries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS composition_entries (
            pk INTEGER PRIMARY KEY AUTOINCREMENT,
            run_pk INTEGER NOT NULL REFERENCES runs(pk) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            material TEXT NOT NULL CHECK (length(material) > 0),
            percentage REAL NOT NULL CHECK (percentage >= 0 AND percentage <= 100)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_composition_entries_run ON composition_entries(run_pk, position)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Strip the query string so connection parameters never reach the logs
fn redact_url(database_url: &str) -> &str {
    database_url
        .split_once('?')
        .map(|(base, _)| base)
        .unwrap_or(database_url)
}
