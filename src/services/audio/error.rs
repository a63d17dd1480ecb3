use std::path::PathBuf;

use super::port::PortError;

/// Terminal failures of an inbound audio request
///
/// None of these are retried; the caller turns them into a typed reply.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The audio server connection is not established yet
    #[error("Not yet initialized")]
    NotReady,

    /// Malformed or out-of-range request
    #[error("Invalid parameter '{field}': {reason}")]
    Validation {
        /// Offending parameter
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// The requested value equals the current one
    #[error("{0}")]
    NoOpRequested(String),

    /// No device suitable for the request was found
    #[error("No {0} found")]
    DeviceNotFound(String),

    /// The audio server reported failure or went away
    #[error("Audio server failure: {0}")]
    UpstreamFailure(#[from] PortError),

    /// Feedback sample missing or unreadable
    #[error("Sample '{}' unusable: {details}", path.display())]
    Resource {
        /// Sample path
        path: PathBuf,
        /// I/O error details
        details: String,
    },
}

impl AudioError {
    /// Shorthand for a [`AudioError::Validation`] error
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AudioError::Validation {
            field,
            reason: reason.into(),
        }
    }
}
