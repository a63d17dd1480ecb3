mod log_level;

pub use log_level::{LogFormat, LogLevel};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// General configuration settings for the daemon.
///
/// Controls how much is logged and where it goes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct GeneralConfig {
    /// Logging level for the daemon. `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Console log output format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Also write logs to daily rotated files in the state directory.
    #[serde(default)]
    pub log_to_file: bool,
}
