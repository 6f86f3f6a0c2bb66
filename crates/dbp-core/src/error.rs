//! Error types for dbp-core

use thiserror::Error;

/// Core error type for dbpatch
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Version string has an empty or non-numeric component
    #[error("[C001] Malformed version '{version}': {reason}")]
    MalformedVersion { version: String, reason: String },

    /// C002: Configuration file not found
    #[error("[C002] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C003: Failed to parse configuration file
    #[error("[C003] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// C004: Invalid configuration value
    #[error("[C004] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C005: IO error with file path context
    #[error("[C005] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ConfigParseError {
            message: err.to_string(),
        }
    }
}
