use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which message bus the daemon exports itself on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusType {
    /// The system-wide bus, for a daemon started by the init system.
    #[default]
    System,
    /// The per-login session bus.
    Session,
}

/// D-Bus export settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct BusConfig {
    /// Bus to claim the service name on.
    #[serde(default)]
    pub bus_type: BusType,
}

impl BusConfig {
    /// Bus to use, with `--session` taking precedence over the file.
    pub fn resolve(&self, session_override: bool) -> BusType {
        if session_override {
            BusType::Session
        } else {
            self.bus_type
        }
    }
}
