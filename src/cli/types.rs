use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Error, Debug)]
pub enum CliError {
    /// The daemon answered with a typed error.
    ///
    /// `kind` is the last component of the D-Bus error name, e.g.
    /// `DeviceNotFound`.
    #[error("{kind}: {message}")]
    Daemon {
        /// Error kind
        kind: String,
        /// Message sent by the daemon
        message: String,
    },

    /// The bus or the daemon could not be reached.
    #[error("D-Bus error: {0}")]
    Bus(zbus::Error),

    /// Invalid arguments were provided to a command.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// An error occurred in the configuration system.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Output could not be serialized.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<zbus::Error> for CliError {
    fn from(error: zbus::Error) -> Self {
        match error {
            zbus::Error::MethodError(name, description, _) => CliError::Daemon {
                kind: name
                    .as_str()
                    .rsplit('.')
                    .next()
                    .unwrap_or_default()
                    .to_string(),
                message: description.unwrap_or_default(),
            },
            other => CliError::Bus(other),
        }
    }
}

/// Type alias for command execution results.
///
/// Successful commands return the text to print, which may be empty.
pub type CommandResult = Result<String, CliError>;
