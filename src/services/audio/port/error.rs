/// Audio Control Port errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    /// Connecting to the audio server failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The connection went away before the operation completed
    #[error("connection to the audio server was lost")]
    Disconnected,

    /// The server reported failure for an operation
    #[error("{operation} failed: {details}")]
    OperationFailed {
        /// Operation that failed
        operation: &'static str,
        /// What the server or the transfer reported
        details: String,
    },
}

impl PortError {
    /// Shorthand for an [`PortError::OperationFailed`] with server details.
    pub fn failed(operation: &'static str, details: impl Into<String>) -> Self {
        PortError::OperationFailed {
            operation,
            details: details.into(),
        }
    }
}
