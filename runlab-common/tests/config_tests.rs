//! Integration tests for layered configuration
//!
//! Tests that manipulate process environment are marked with #[serial] so
//! they do not race each other.

use runlab_common::config::{
    config_file_path, resolve_setting, SettingSource, TomlConfig, CONFIG_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::io::Write;

const TEST_VAR: &str = "RUNLAB_TEST_SETTING";

#[test]
#[serial]
fn test_environment_beats_file_and_default() {
    env::set_var(TEST_VAR, "from-env");

    let resolved = resolve_setting(
        None,
        TEST_VAR,
        Some("from-file".to_string()),
        "default".to_string(),
    )
    .unwrap();

    env::remove_var(TEST_VAR);

    assert_eq!(resolved.value, "from-env");
    assert_eq!(resolved.source, SettingSource::Environment);
}

#[test]
#[serial]
fn test_cli_beats_environment() {
    env::set_var(TEST_VAR, "from-env");

    let resolved = resolve_setting(
        Some("from-cli".to_string()),
        TEST_VAR,
        None,
        "default".to_string(),
    )
    .unwrap();

    env::remove_var(TEST_VAR);

    assert_eq!(resolved.value, "from-cli");
    assert_eq!(resolved.source, SettingSource::CommandLine);
}

#[test]
#[serial]
fn test_unparsable_environment_value_is_config_error() {
    env::set_var(TEST_VAR, "not-a-number");

    let result = resolve_setting::<usize>(None, TEST_VAR, Some(5), 1);

    env::remove_var(TEST_VAR);

    let err = result.unwrap_err();
    assert!(err.to_string().contains(TEST_VAR), "unexpected error: {}", err);
}

#[test]
fn test_load_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "api_key = \"from-file\"").unwrap();
    writeln!(file, "max_upload_bytes = 2048").unwrap();

    let config = TomlConfig::load(file.path()).unwrap();

    assert_eq!(config.api_key.as_deref(), Some("from-file"));
    assert_eq!(config.max_upload_bytes, Some(2048));
    assert!(config.database_url.is_none());
}

#[test]
fn test_missing_explicit_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let config = TomlConfig::load_or_default(Some(&missing));

    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_malformed_file_falls_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "api_key = [not toml").unwrap();

    let config = TomlConfig::load_or_default(Some(file.path()));

    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_config_env_var_names_file() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/runlab-from-env.toml");

    let path = config_file_path(None);

    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(
        path.as_deref(),
        Some(std::path::Path::new("/tmp/runlab-from-env.toml"))
    );
}
