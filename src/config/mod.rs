//! Daemon configuration.
//!
//! Defines the TOML schema for audiod: logging, the PulseAudio connection,
//! the D-Bus export and the feedback sample store. Every field has a
//! default so an absent or empty file yields a working daemon.

mod bus;
mod feedback;
mod general;
mod loading;
mod paths;
mod pulse;

pub use bus::{BusConfig, BusType};
pub use feedback::FeedbackConfig;
pub use general::{GeneralConfig, LogFormat, LogLevel};
pub use paths::ConfigPaths;
pub use pulse::PulseConfig;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Main configuration structure for audiod.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct Config {
    /// General daemon settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// PulseAudio connection settings.
    #[serde(default)]
    pub pulse: PulseConfig,

    /// D-Bus export settings.
    #[serde(default)]
    pub bus: BusConfig,

    /// Feedback sound settings.
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

#[cfg(test)]
mod tests;
