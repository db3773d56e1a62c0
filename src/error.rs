//! Error types for the learnstyle service
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - A closed resolution taxonomy (invalid input / user not found /
//!   catalog inconsistency / artifacts unavailable)
//! - HTTP status mapping and a public-message policy
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,

    // Artifact errors (3xx)
    ArtifactMissing = 300,
    ArtifactCorrupt = 301,
    ArtifactUnavailable = 302,

    // Resolution errors (4xx)
    InvalidInput = 400,
    UserNotFound = 401,
    CatalogInconsistency = 402,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Artifact errors
            400..=499 => 40, // Resolution errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the service
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {}", .path.display())]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {}", .path.display())]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Artifact Errors
    // ─────────────────────────────────────────────────────────────

    /// An expected artifact file does not exist
    #[error("Artifact not found: {}", .path.display())]
    ArtifactMissing { path: PathBuf },

    /// An artifact exists but could not be read or parsed
    #[error("Artifact corrupt: {}: {reason}", .path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },

    /// The artifact store failed to load at startup and every request
    /// is answered with a server fault until the process restarts
    #[error("Artifact store unavailable: {reason}")]
    ArtifactUnavailable { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Resolution Errors
    // ─────────────────────────────────────────────────────────────

    /// Malformed request input, rejected before any store lookup
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The user id is valid but has no cluster assignment. Expected and
    /// common: the user had too few recorded interactions to be clustered.
    #[error("User {user_id} has no recorded cluster assignment")]
    UserNotFound { user_id: i64 },

    /// A cluster exists in the assignment table but has no persona
    /// definition. Signals a data-pipeline bug, not a client error.
    #[error("Cluster {cluster_id} has no persona definition")]
    CatalogInconsistency { cluster_id: u32 },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::Io(_) => ErrorCode::IoRead,
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::ArtifactMissing { .. } => ErrorCode::ArtifactMissing,
            Error::ArtifactCorrupt { .. } => ErrorCode::ArtifactCorrupt,
            Error::ArtifactUnavailable { .. } => ErrorCode::ArtifactUnavailable,

            Error::InvalidInput { .. } => ErrorCode::InvalidInput,
            Error::UserNotFound { .. } => ErrorCode::UserNotFound,
            Error::CatalogInconsistency { .. } => ErrorCode::CatalogInconsistency,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Whether the error is the caller's fault (no retry useful)
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput { .. } | Error::UserNotFound { .. }
        )
    }

    /// HTTP status this error maps to when surfaced by the API
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidInput { .. } => 422,
            Error::UserNotFound { .. } => 404,
            // Everything else is a server-side fault. Internal details are
            // logged, not echoed to the caller.
            _ => 500,
        }
    }

    /// Message safe to echo to an API caller.
    ///
    /// Client faults carry their real message; server faults collapse to a
    /// generic one so cluster ids and file paths stay out of responses.
    pub fn public_message(&self) -> String {
        match self {
            Error::InvalidInput { message } => message.clone(),
            Error::UserNotFound { user_id } => format!(
                "User {} has no recorded cluster assignment. The user may \
                 have fewer interactions than the clustering pipeline's \
                 minimum threshold.",
                user_id
            ),
            _ => "Internal server error".to_string(),
        }
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'learnstyle-service config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'learnstyle-service config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values. See documentation for valid options."
            ),

            Error::ArtifactMissing { .. } => Some(
                "Check the [artifacts] paths in your configuration and that the clustering pipeline has published its outputs."
            ),
            Error::ArtifactCorrupt { .. } => Some(
                "The artifact file is unreadable or malformed. Re-export it from the clustering pipeline."
            ),
            Error::ArtifactUnavailable { .. } => Some(
                "Fix the artifact paths or contents and restart the service. Run 'learnstyle-service artifacts validate' to check them."
            ),

            Error::CatalogInconsistency { .. } => Some(
                "The persona catalog is out of sync with the cluster assignments. Add a catalog entry for the missing cluster."
            ),

            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            code.as_str(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        let code = self.code();
        format!("[{}] {}", code.as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors (for ergonomic error creation)
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an artifact missing error
    pub fn artifact_missing(path: impl Into<PathBuf>) -> Self {
        Error::ArtifactMissing { path: path.into() }
    }

    /// Create an artifact corrupt error
    pub fn artifact_corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::ArtifactCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
