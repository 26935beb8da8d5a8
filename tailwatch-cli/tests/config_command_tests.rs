//! Integration tests for `tailwatch config` command.
//!
//! Tests config loading and validation with real TOML files.

use std::fs;
use tempfile::TempDir;

use tailwatch_core::config::TailwatchConfig;

#[tokio::test]
async fn test_config_validate_valid_toml() {
    // Given: A valid config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("tailwatch.toml");

    let valid_config = r#"
[general]
log_level = "info"
log_format = "json"

[remote]
mode = "ssh"
host = "web-01.example.com"
port = 2222

[access_log]
line_count = 1000
skip_codes = [404]

[error_log]
enabled = false
"#;

    fs::write(&config_path, valid_config).expect("should write config");

    // When: Loading the config
    let result = TailwatchConfig::load(&config_path).await;

    // Then: Should succeed with file values and defaults merged
    let config = result.expect("valid config should load successfully");
    assert_eq!(config.remote.port, 2222);
    assert_eq!(config.access_log.skip_codes, vec![404]);
    assert_eq!(config.access_log.log_path, "/var/log/apache2/access.log");
    assert!(!config.error_log.enabled);
}

#[tokio::test]
async fn test_config_validate_malformed_toml() {
    // Given: A malformed TOML file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");

    fs::write(&config_path, "[general\nlog_level = \"info\"\n").expect("should write bad config");

    // When: Loading the config
    let result = TailwatchConfig::load(&config_path).await;

    // Then: Should fail
    assert!(result.is_err(), "malformed TOML should fail to load");
}

#[tokio::test]
async fn test_config_validate_missing_file() {
    // Given: A nonexistent file path
    let config_path = std::path::PathBuf::from("/nonexistent/tailwatch.toml");

    // When: Loading the config
    let result = TailwatchConfig::load(&config_path).await;

    // Then: Should fail with a not-found message
    let err = result.expect_err("missing file should fail to load");
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_config_validate_empty_file_uses_defaults() {
    // Given: An empty config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("empty.toml");
    fs::write(&config_path, "").expect("should write empty file");

    // When: Loading the config
    let result = TailwatchConfig::load(&config_path).await;

    // Then: Defaults apply
    let config = result.expect("empty config should load with defaults");
    assert_eq!(config.access_log.line_count, 50_000);
    assert_eq!(config.error_log.message_count, 100);
}

#[tokio::test]
async fn test_config_validate_rejects_shell_metacharacters_in_path() {
    // Given: A log path that would break out of the remote command
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("tailwatch.toml");
    fs::write(
        &config_path,
        "[access_log]\nlog_path = \"/var/log/access.log; rm -rf /\"\n",
    )
    .expect("should write config");

    // When: Loading the config
    let result = TailwatchConfig::load(&config_path).await;

    // Then: Should fail naming the field
    let err = result.expect_err("unsafe path should be rejected");
    assert!(err.to_string().contains("access_log.log_path"));
}

#[tokio::test]
async fn test_config_validate_rejects_zero_message_count() {
    // Given: An error log section asking for zero messages
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("tailwatch.toml");
    fs::write(&config_path, "[error_log]\nmessage_count = 0\n").expect("should write config");

    // When: Loading the config
    let result = TailwatchConfig::load(&config_path).await;

    // Then: Should fail
    let err = result.expect_err("zero count should be rejected");
    assert!(err.to_string().contains("error_log.message_count"));
}
