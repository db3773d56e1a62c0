//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// A service config file written to a temp directory, pointing the
/// artifact paths at the shared fixtures.
pub struct ConfigFixture {
    _temp_dir: TempDir,
    pub config_path: PathBuf,
}

impl ConfigFixture {
    /// Config with all three fixture artifacts and the bundled catalog.
    pub fn with_fixture_artifacts() -> Self {
        Self::build(fixture_path("assignments.csv"), None)
    }

    /// Config whose catalog override omits cluster 3.
    pub fn with_incomplete_catalog() -> Self {
        Self::build(
            fixture_path("assignments.csv"),
            Some(fixture_path("personas_missing_cluster.toml")),
        )
    }

    /// Config pointing at a nonexistent assignment table.
    pub fn with_missing_assignments() -> Self {
        Self::build(PathBuf::from("/nonexistent/assignments.csv"), None)
    }

    fn build(assignments: PathBuf, catalog: Option<PathBuf>) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let catalog_line = catalog
            .map(|p| format!("catalog_path = \"{}\"\n", p.display()))
            .unwrap_or_default();

        let content = format!(
            r#"
[server]
bind_addr = "127.0.0.1:0"
cors_allowed_origins = ["http://localhost:5173"]

[artifacts]
assignments_path = "{}"
model_path = "{}"
scaler_path = "{}"
{}
[logging]
level = "warn"
"#,
            assignments.display(),
            fixture_path("kmeans_model.bin").display(),
            fixture_path("scaler.bin").display(),
            catalog_line,
        );

        fs::write(&config_path, content).unwrap();
        Self {
            _temp_dir: temp_dir,
            config_path,
        }
    }

    pub fn path(&self) -> &str {
        self.config_path.to_str().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_fixture_artifacts_exist() {
        for name in ["assignments.csv", "kmeans_model.bin", "scaler.bin"] {
            assert!(fixture_path(name).exists(), "{} fixture should exist", name);
        }
    }
}
