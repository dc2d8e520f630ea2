//! Core error types for lockin-core.
//!
//! The session state machine itself has no fatal conditions; these errors
//! come from the edges: storage, configuration files and the focus service.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lockin-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Focus service errors
    #[error("Focus service error: {0}")]
    Focus(#[from] FocusError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// The data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// A write was rejected by the backing store
    #[error("Write rejected for key '{key}'")]
    WriteRejected { key: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Errors talking to an HTTP focus service.
///
/// Callers that feed the session controller never see these: every variant
/// collapses to an unavailable (unfocused) reading.
#[derive(Error, Debug)]
pub enum FocusError {
    /// The configured endpoint is not a valid http(s) URL
    #[error("Invalid focus endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    /// Transport failure or timeout
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Unexpected status {0}")]
    Status(u16),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
