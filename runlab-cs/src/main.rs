//! runlab-cs (Composition Store) - Main entry point
//!
//! Resolves configuration, opens the database, and serves the run API.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use runlab_common::config::TomlConfig;
use runlab_cs::config::{CliOverrides, CsConfig};
use runlab_cs::{build_router, db, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for runlab-cs
#[derive(Parser, Debug)]
#[command(name = "runlab-cs")]
#[command(about = "Composition store service for runlab")]
#[command(version)]
struct Args {
    /// Shared secret required in the x-api-key header for writes
    #[arg(long)]
    api_key: Option<String>,

    /// sqlx connection string, e.g. sqlite://runlab.db?mode=rwc
    #[arg(long)]
    database_url: Option<String>,

    /// Address to listen on
    #[arg(short, long)]
    bind: Option<std::net::SocketAddr>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runlab_cs=info,runlab_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting runlab Composition Store (runlab-cs) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();

    let file_config = TomlConfig::load_or_default(args.config.as_deref());
    let cli = CliOverrides {
        api_key: args.api_key,
        database_url: args.database_url,
        bind_addr: args.bind,
    };
    let config = CsConfig::resolve(cli, &file_config).context("Invalid configuration")?;

    let pool = db::init_database(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    let state = AppState::new(pool.clone(), config.api_key.as_str());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("runlab-cs listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/healthz", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
