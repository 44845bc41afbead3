//! runlab-ue (Upload Echo) - Main entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use runlab_common::config::TomlConfig;
use runlab_ue::build_router;
use runlab_ue::config::{CliOverrides, UeConfig};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for runlab-ue
#[derive(Parser, Debug)]
#[command(name = "runlab-ue")]
#[command(about = "Upload timing echo service for runlab")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(short, long)]
    bind: Option<std::net::SocketAddr>,

    /// Largest accepted request body in bytes
    #[arg(long)]
    max_upload_bytes: Option<usize>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runlab_ue=info,runlab_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting runlab Upload Echo (runlab-ue) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();

    let file_config = TomlConfig::load_or_default(args.config.as_deref());
    let cli = CliOverrides {
        bind_addr: args.bind,
        max_upload_bytes: args.max_upload_bytes,
    };
    let config = UeConfig::resolve(cli, &file_config).context("Invalid configuration")?;

    let app = build_router(&config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("runlab-ue listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

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
