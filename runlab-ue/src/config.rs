//! runlab-ue specific configuration

use runlab_common::config::{resolve_setting, TomlConfig};
use runlab_common::{Error, Result};
use std::net::SocketAddr;
use tracing::info;

pub const BIND_ENV: &str = "RUNLAB_UE_BIND";
pub const MAX_UPLOAD_ENV: &str = "RUNLAB_UE_MAX_UPLOAD";

pub const DEFAULT_BIND: &str = "0.0.0.0:8001";

/// 64 MiB; axum's own default of 2 MiB is too small for camera frames
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind_addr: Option<SocketAddr>,
    pub max_upload_bytes: Option<usize>,
}

/// Upload echo configuration
#[derive(Debug, Clone)]
pub struct UeConfig {
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
}

impl Default for UeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8001)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UeConfig {
    /// Resolve every setting: CLI > environment > config file > default
    pub fn resolve(cli: CliOverrides, file: &TomlConfig) -> Result<Self> {
        let defaults = Self::default();

        let file_bind = file
            .ue_bind
            .as_deref()
            .map(str::parse::<SocketAddr>)
            .transpose()
            .map_err(|e| Error::Config(format!("ue_bind: {}", e)))?;
        let bind_addr = resolve_setting(cli.bind_addr, BIND_ENV, file_bind, defaults.bind_addr)?;
        info!("Bind address from {}", bind_addr.source);

        let max_upload_bytes = resolve_setting(
            cli.max_upload_bytes,
            MAX_UPLOAD_ENV,
            file.max_upload_bytes,
            defaults.max_upload_bytes,
        )?;
        if max_upload_bytes.value == 0 {
            return Err(Error::Config("max_upload_bytes must be > 0".to_string()));
        }
        info!(
            "Upload limit {} bytes (from {})",
            max_upload_bytes.value, max_upload_bytes.source
        );

        Ok(Self {
            bind_addr: bind_addr.value,
            max_upload_bytes: max_upload_bytes.value,
        })
    }
}
