//! Configuration system tests
//!
//! Tests configuration loading, validation, and environment overrides
//! through the CLI surface.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Test fixture for configuration testing
struct ConfigFile {
    _temp_dir: TempDir,
    config_path: PathBuf,
}

impl ConfigFile {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        Self {
            _temp_dir: temp_dir,
            config_path,
        }
    }

    fn write(&self, content: &str) {
        fs::write(&self.config_path, content).unwrap();
    }

    fn path(&self) -> &str {
        self.config_path.to_str().unwrap()
    }
}

fn service_cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("learnstyle-service").unwrap()
}

// ─────────────────────────────────────────────────────────────────
// Valid Configuration Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_minimal_config() {
    let fixture = ConfigFile::new();
    fixture.write(
        r#"
[server]
bind_addr = "127.0.0.1:8000"

[artifacts]

[logging]
"#,
    );

    service_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .success();
}

#[test]
fn test_full_config() {
    let fixture = ConfigFile::new();
    fixture.write(
        r#"
[server]
bind_addr = "0.0.0.0:8080"
cors_allowed_origins = ["https://learn.example.com", "http://localhost:5173"]
worker_threads = 4

[artifacts]
assignments_path = "/srv/learnstyle/user_features_with_clusters.csv"
model_path = "/srv/learnstyle/kmeans_model.bin"
scaler_path = "/srv/learnstyle/scaler.bin"
catalog_path = "/srv/learnstyle/personas.toml"

[logging]
level = "debug"
file = "/tmp/learnstyle.log"
max_file_size_mb = 50
max_files = 3
json_format = false
"#,
    );

    service_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .success();
}

// ─────────────────────────────────────────────────────────────────
// Invalid Configuration Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_invalid_bind_addr() {
    let fixture = ConfigFile::new();
    fixture.write(
        r#"
[server]
bind_addr = "not-an-address"
"#,
    );

    service_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("bind_addr"));
}

#[test]
fn test_invalid_cors_origin() {
    let fixture = ConfigFile::new();
    fixture.write(
        r#"
[server]
cors_allowed_origins = ["learn.example.com"]
"#,
    );

    service_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("origin"));
}

#[test]
fn test_invalid_log_level() {
    let fixture = ConfigFile::new();
    fixture.write(
        r#"
[logging]
level = "shouty"
"#,
    );

    service_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("log level"));
}

#[test]
fn test_malformed_toml() {
    let fixture = ConfigFile::new();
    fixture.write("[server\nbind_addr = ");

    service_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────
// Config Init Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_init_creates_valid_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("service.toml");

    service_cmd()
        .arg("config")
        .arg("init")
        .arg("--path")
        .arg(path.to_str().unwrap())
        .assert()
        .success();

    assert!(path.exists());

    // The generated file must itself validate
    service_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(path.to_str().unwrap())
        .assert()
        .success();
}

#[test]
fn test_config_init_refuses_overwrite_without_force() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("service.toml");
    fs::write(&path, "# existing").unwrap();

    service_cmd()
        .arg("config")
        .arg("init")
        .arg("--path")
        .arg(path.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicates::str::contains("--force"));
}

// ─────────────────────────────────────────────────────────────────
// Environment Override Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_env_override_rejected_when_invalid() {
    let fixture = ConfigFile::new();
    fixture.write(
        r#"
[server]
bind_addr = "127.0.0.1:8000"
"#,
    );

    // A bad env override must fail validation even though the file is fine
    service_cmd()
        .env("LEARNSTYLE_BIND_ADDR", "nonsense")
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure();
}

#[test]
fn test_env_override_applied_to_show() {
    service_cmd()
        .env("LEARNSTYLE_ASSIGNMENTS_PATH", "/override/assignments.csv")
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicates::str::contains("/override/assignments.csv"));
}
