use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error types for the audiod daemon.
///
/// Covers everything that can go wrong outside of a single request:
/// configuration loading, the D-Bus export and daemon signal handling.
/// Audio server connection failures are retried, not reported here. Per-request failures use
/// [`AudioError`](crate::services::AudioError) instead.
#[derive(Error, Debug)]
pub enum AudiodError {
    /// Configuration validation error
    #[error("configuration validation failed for '{component}': {details}")]
    ConfigValidation {
        /// Component that failed validation
        component: String,
        /// Validation error details
        details: String,
    },

    /// I/O operation error
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// Standard I/O operation error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParseError {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// D-Bus export or client call failed
    #[error("D-Bus: {0}")]
    Bus(#[from] zbus::Error),
}

/// A specialized `Result` type for audiod operations.
pub type Result<T> = std::result::Result<T, AudiodError>;

impl AudiodError {
    /// Creates a TOML parsing error with optional file path context.
    pub fn toml_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        AudiodError::TomlParseError {
            location,
            details: error.to_string(),
        }
    }

    /// Creates an I/O error carrying the path it happened on.
    pub fn io_at(error: impl std::fmt::Display, path: &Path) -> Self {
        AudiodError::IoError {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }
}
