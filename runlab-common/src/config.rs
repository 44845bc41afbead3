//! Configuration loading and layered setting resolution
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable config file never stops startup; it is logged and
//! the remaining sources are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "RUNLAB_CONFIG";

/// Local-development shared secret. Startup warns when it is in effect.
pub const DEFAULT_API_KEY: &str = "dev-secret";

/// Local-development database: a SQLite file in the working directory
pub const DEFAULT_DATABASE_URL: &str = "sqlite://runlab.db?mode=rwc";

/// Contents of `config.toml`
///
/// All keys are optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Shared secret expected in the `x-api-key` header
    pub api_key: Option<String>,
    /// sqlx connection string for the composition store
    pub database_url: Option<String>,
    /// Composition store listen address
    pub cs_bind: Option<String>,
    /// Upload echo listen address
    pub ue_bind: Option<String>,
    /// Upload echo request body limit in bytes
    pub max_upload_bytes: Option<usize>,
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load the config file if one can be found, otherwise return empty config
    ///
    /// An explicitly named file that fails to load is reported as a warning,
    /// same as a broken default file.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let Some(path) = config_file_path(explicit) else {
            debug!("No config file found, using CLI/environment/defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                debug!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Locate the config file
///
/// Order: explicit path, `RUNLAB_CONFIG`, user config dir, then
/// `/etc/runlab/config.toml` on Linux. Only the explicit path and the
/// environment override are returned without an existence check.
pub fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("runlab").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/runlab/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Where a resolved setting came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingSource {
    CommandLine,
    Environment,
    ConfigFile,
    Default,
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SettingSource::CommandLine => "command line",
            SettingSource::Environment => "environment",
            SettingSource::ConfigFile => "config file",
            SettingSource::Default => "default",
        };
        f.write_str(label)
    }
}

/// A setting value together with its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: SettingSource,
}

/// Resolve one setting following the CLI > env > file > default order
///
/// Environment values are parsed with `FromStr`; a value that does not parse
/// is a configuration error rather than a silent fallback.
pub fn resolve_setting<T>(
    cli_arg: Option<T>,
    env_var_name: &str,
    file_value: Option<T>,
    default: T,
) -> Result<Resolved<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    // Priority 1: Command-line argument
    if let Some(value) = cli_arg {
        return Ok(Resolved {
            value,
            source: SettingSource::CommandLine,
        });
    }

    // Priority 2: Environment variable
    if let Ok(raw) = std::env::var(env_var_name) {
        let value = raw.parse::<T>().map_err(|e| {
            Error::Config(format!("{} has invalid value {:?}: {}", env_var_name, raw, e))
        })?;
        return Ok(Resolved {
            value,
            source: SettingSource::Environment,
        });
    }

    // Priority 3: TOML config file
    if let Some(value) = file_value {
        return Ok(Resolved {
            value,
            source: SettingSource::ConfigFile,
        });
    }

    // Priority 4: Compiled default
    Ok(Resolved {
        value: default,
        source: SettingSource::Default,
    })
}
