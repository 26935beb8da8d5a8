//! End-to-end tests for the `tailwatch` binary.
//!
//! Runs the compiled binary in `local` mode against temporary log files.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

const ACCESS_LINES: &str = "\
10.0.0.1 - - [10/Oct/2000:13:55:36 -0700] \"GET /missing.png HTTP/1.1\" 404 210 \"-\" \"Mozilla/5.0\"
10.0.0.2 - - [10/Oct/2000:13:55:37 -0700] \"GET /index.html HTTP/1.1\" 200 5120 \"-\" \"Mozilla/5.0\"
10.0.0.3 - - [10/Oct/2000:13:55:38 -0700] \"GET /wp-login.php HTTP/1.1\" 404 210 \"-\" \"Mozilla/5.0\"
10.0.0.4 - - [10/Oct/2000:13:55:39 -0700] \"POST /api/orders HTTP/1.1\" 502 0 \"https://shop.example.com/cart\" \"Mozilla/5.0\"
";

const ERROR_LINES: &str = "\
2024/03/01 08:00:01 [notice] 1#1: signal process started
2024/03/01 08:00:02 [error] 7#7: *42 upstream timed out (110: Connection timed out), client: 203.0.113.9, server: shop.example.com
";

fn write_config(dir: &Path, extra: &str) -> std::path::PathBuf {
    let access = dir.join("access.log");
    let error = dir.join("error.log");
    fs::write(&access, ACCESS_LINES).expect("should write access log");
    fs::write(&error, ERROR_LINES).expect("should write error log");

    let config_path = dir.join("tailwatch.toml");
    let config = format!(
        r#"
[general]
log_level = "warn"

[remote]
mode = "local"

[access_log]
log_path = "{}"

[error_log]
log_path = "{}"
{}
"#,
        access.display(),
        error.display(),
        extra
    );
    fs::write(&config_path, config).expect("should write config");
    config_path
}

fn tailwatch(config_path: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tailwatch"))
        .arg("--config")
        .arg(config_path)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("should run tailwatch binary")
}

#[test]
fn test_fetch_json_outputs_records_from_both_sources() {
    // Given: Local access and error logs
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = write_config(temp_dir.path(), "");

    // When: Fetching as JSON
    let output = tailwatch(&config_path, &["fetch", "--output", "json"]);

    // Then: Success, with access records first then error records
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let records = parsed.as_array().expect("should be a record array");

    let titles: Vec<&str> = records
        .iter()
        .map(|r| r["title"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(titles, ["404", "502", "notice", "warning"]);
    assert_eq!(records[1]["extra_fields"][2]["value"], "https://shop.example.com/cart");
    assert_eq!(records[3]["message"], "upstream timed out (110: Connection timed out)");
}

#[test]
fn test_fetch_single_source_text_output() {
    // Given: Both sources configured
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = write_config(temp_dir.path(), "");

    // When: Fetching only the error log
    let output = tailwatch(&config_path, &["fetch", "--source", "error"]);

    // Then: Only error log records are printed
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("upstream timed out"));
    assert!(!stdout.contains("missing.png"));
    assert!(stdout.contains("2 record(s)"));
}

#[test]
fn test_fetch_invalid_config_exits_with_config_code() {
    // Given: A config with an unsupported remote mode
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("tailwatch.toml");
    fs::write(&config_path, "[remote]\nmode = \"telnet\"\n").expect("should write config");

    // When: Fetching
    let output = tailwatch(&config_path, &["fetch"]);

    // Then: Exit code 2 and an error on stderr
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("remote.mode"));
}

#[test]
fn test_fetch_missing_vuln_list_exits_with_config_code() {
    // Given: A vuln list path that does not exist
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = write_config(temp_dir.path(), "");
    let content = fs::read_to_string(&config_path).expect("should read config");
    let content = content.replace(
        "[general]\n",
        "[general]\nvuln_list_path = \"/nonexistent/vuln.txt\"\n",
    );
    fs::write(&config_path, content).expect("should rewrite config");

    // When: Fetching
    let output = tailwatch(&config_path, &["fetch"]);

    // Then: Exit code 2
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_config_validate_reports_valid_file() {
    // Given: A valid local config
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = write_config(temp_dir.path(), "");

    // When: Validating
    let output = tailwatch(&config_path, &["config", "validate", "--output", "json"]);

    // Then: valid = true
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(parsed["valid"], true);
}
