//! runlab-cs specific configuration
//!
//! Resolved once at startup and handed to the router; handlers never read
//! the environment themselves.

use runlab_common::config::{
    resolve_setting, SettingSource, TomlConfig, DEFAULT_API_KEY, DEFAULT_DATABASE_URL,
};
use runlab_common::{Error, Result};
use std::fmt;
use std::net::SocketAddr;
use tracing::{info, warn};

pub const API_KEY_ENV: &str = "RUNLAB_API_KEY";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const BIND_ENV: &str = "RUNLAB_CS_BIND";

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_key: Option<String>,
    pub database_url: Option<String>,
    pub bind_addr: Option<SocketAddr>,
}

/// Composition store configuration
#[derive(Clone)]
pub struct CsConfig {
    pub api_key: String,
    pub database_url: String,
    pub bind_addr: SocketAddr,
}

// Keeps the secret out of logs and panic messages
impl fmt::Debug for CsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsConfig")
            .field("api_key", &"<redacted>")
            .field("database_url", &self.database_url)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl CsConfig {
    /// Resolve every setting: CLI > environment > config file > default
    pub fn resolve(cli: CliOverrides, file: &TomlConfig) -> Result<Self> {
        let api_key = resolve_setting(
            cli.api_key,
            API_KEY_ENV,
            file.api_key.clone(),
            DEFAULT_API_KEY.to_string(),
        )?;
        if api_key.value.is_empty() {
            return Err(Error::Config("API key must not be empty".to_string()));
        }
        if api_key.value == DEFAULT_API_KEY {
            warn!(
                "Using the built-in development API key; set {} for anything but local use",
                API_KEY_ENV
            );
        } else {
            info!("API key from {}", api_key.source);
        }

        let database_url = resolve_setting(
            cli.database_url,
            DATABASE_URL_ENV,
            file.database_url.clone(),
            DEFAULT_DATABASE_URL.to_string(),
        )?;
        log_source("Database URL", database_url.source);

        let file_bind = file
            .cs_bind
            .as_deref()
            .map(str::parse::<SocketAddr>)
            .transpose()
            .map_err(|e| Error::Config(format!("cs_bind: {}", e)))?;
        let default_bind: SocketAddr = DEFAULT_BIND
            .parse()
            .map_err(|e| Error::Config(format!("default bind address: {}", e)))?;
        let bind_addr = resolve_setting(cli.bind_addr, BIND_ENV, file_bind, default_bind)?;
        log_source("Bind address", bind_addr.source);

        Ok(Self {
            api_key: api_key.value,
            database_url: database_url.value,
            bind_addr: bind_addr.value,
        })
    }
}

fn log_source(setting: &str, source: SettingSource) {
    info!("{} from {}", setting, source);
}
