//! Configuration system for the learnstyle service
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (LEARNSTYLE_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerSettings,

    /// Precomputed artifact locations
    pub artifacts: ArtifactSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to bind (host:port)
    pub bind_addr: String,

    /// Front-end origins allowed to call the API cross-origin,
    /// with credentials
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,

    /// Tokio worker threads (0 = auto-detect)
    pub worker_threads: u32,
}

/// Locations of the artifacts produced by the offline clustering pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactSettings {
    /// Cluster-assignment table (CSV keyed by user_id with a `cluster` column)
    pub assignments_path: String,

    /// Serialized clustering model (opaque blob, held for a future
    /// predictive path)
    pub model_path: String,

    /// Serialized feature scaler (opaque blob, same status as the model)
    pub scaler_path: String,

    /// Optional persona catalog override; the bundled catalog is used
    /// when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

// Default implementations

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            artifacts: ArtifactSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
            worker_threads: 0, // Auto-detect
        }
    }
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            assignments_path: "data/user_features_with_clusters.csv".to_string(),
            model_path: "artifacts/kmeans_model.bin".to_string(),
            scaler_path: "artifacts/scaler.bin".to_string(),
            catalog_path: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        let config_file = Self::find_config_file(config_path)?;
        if let Some(path) = config_file {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: e.to_string(),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let expanded = shellexpand::tilde(path);
            let path = PathBuf::from(expanded.as_ref());
            if path.exists() {
                return Ok(Some(path));
            } else {
                return Err(Error::config_not_found(path));
            }
        }

        // Search in standard locations
        let search_paths = [
            // Current directory
            PathBuf::from("learnstyle.toml"),
            PathBuf::from("config.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("learnstyle").join("service.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".learnstyle").join("service.toml"))
                .unwrap_or_default(),
            // System config (Linux)
            PathBuf::from("/etc/learnstyle/service.toml"),
        ];

        for path in &search_paths {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Server settings
        if let Ok(val) = std::env::var("LEARNSTYLE_BIND_ADDR") {
            self.server.bind_addr = val;
        }
        if let Ok(val) = std::env::var("LEARNSTYLE_CORS_ORIGINS") {
            self.server.cors_allowed_origins = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(val) = std::env::var("LEARNSTYLE_WORKER_THREADS") {
            if let Ok(n) = val.parse() {
                self.server.worker_threads = n;
            }
        }

        // Artifact settings
        if let Ok(val) = std::env::var("LEARNSTYLE_ASSIGNMENTS_PATH") {
            self.artifacts.assignments_path = val;
        }
        if let Ok(val) = std::env::var("LEARNSTYLE_MODEL_PATH") {
            self.artifacts.model_path = val;
        }
        if let Ok(val) = std::env::var("LEARNSTYLE_SCALER_PATH") {
            self.artifacts.scaler_path = val;
        }
        if let Ok(val) = std::env::var("LEARNSTYLE_CATALOG_PATH") {
            self.artifacts.catalog_path = Some(val);
        }

        // Logging settings
        if let Ok(val) = std::env::var("LEARNSTYLE_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("LEARNSTYLE_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("LEARNSTYLE_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.artifacts.assignments_path = expand_path(&self.artifacts.assignments_path);
        self.artifacts.model_path = expand_path(&self.artifacts.model_path);
        self.artifacts.scaler_path = expand_path(&self.artifacts.scaler_path);

        if let Some(ref path) = self.artifacts.catalog_path {
            self.artifacts.catalog_path = Some(expand_path(path));
        }
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        // Validate bind address
        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(Error::config_field_invalid(
                "server.bind_addr",
                format!(
                    "Invalid bind_addr '{}'. Expected host:port, e.g. 127.0.0.1:8000",
                    self.server.bind_addr
                ),
            ));
        }

        // Validate CORS origins
        for origin in &self.server.cors_allowed_origins {
            if !origin.starts_with("http://") && !origin.starts_with("https://") {
                return Err(Error::config_field_invalid(
                    "server.cors_allowed_origins",
                    format!(
                        "Invalid CORS origin '{}'. Origins must start with http:// or https://",
                        origin
                    ),
                ));
            }
            if origin.ends_with('/') {
                return Err(Error::config_field_invalid(
                    "server.cors_allowed_origins",
                    format!(
                        "Invalid CORS origin '{}'. Origins must not have a trailing slash",
                        origin
                    ),
                ));
            }
        }

        // Validate artifact paths are set
        if self.artifacts.assignments_path.is_empty() {
            return Err(Error::config_field_invalid(
                "artifacts.assignments_path",
                "assignments_path cannot be empty",
            ));
        }
        if self.artifacts.model_path.is_empty() {
            return Err(Error::config_field_invalid(
                "artifacts.model_path",
                "model_path cannot be empty",
            ));
        }
        if self.artifacts.scaler_path.is_empty() {
            return Err(Error::config_field_invalid(
                "artifacts.scaler_path",
                "scaler_path cannot be empty",
            ));
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Get the bind address as a SocketAddr (validated by `load`)
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .map_err(|_| Error::Config(format!("Invalid bind_addr '{}'", self.server.bind_addr)))
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<()> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".learnstyle")
                .join("service.toml")
        });

    // Check if file exists
    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    // Create parent directories
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
    }

    // Generate default config with comments
    let config_content = generate_default_config();

    // Write the file
    fs::write(&config_path, config_content)
        .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

    println!("Configuration file created: {}", config_path.display());
    Ok(())
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# Learnstyle Service Configuration
# https://github.com/learnstyle/service

[server]
# Socket address to bind
bind_addr = "127.0.0.1:8000"

# Front-end origins allowed to call the API cross-origin (credentials
# included). Origins must not have a trailing slash.
cors_allowed_origins = ["http://localhost:5173"]

# Tokio worker threads (0 = auto-detect)
worker_threads = 0

[artifacts]
# Cluster-assignment table produced by the offline clustering pipeline.
# CSV keyed by user_id with at least a `cluster` column.
assignments_path = "data/user_features_with_clusters.csv"

# Serialized clustering model. Loaded and fingerprinted at startup but not
# exercised by the read path; held for a future predictive endpoint.
model_path = "artifacts/kmeans_model.bin"

# Serialized feature scaler (same status as the model)
scaler_path = "artifacts/scaler.bin"

# Persona catalog override (comment out to use the bundled catalog)
# catalog_path = "config/personas.toml"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.learnstyle/logs/service.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#.to_string()
}
