use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// PulseAudio connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PulseConfig {
    /// Application name announced to the audio server.
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Server address. The PulseAudio default lookup is used when unset.
    #[serde(default)]
    pub server: Option<String>,

    /// Delay before the first reconnect attempt, in milliseconds.
    #[serde(default = "default_reconnect_initial_ms")]
    pub reconnect_initial_ms: u64,

    /// Upper bound of the doubling reconnect delay, in milliseconds.
    #[serde(default = "default_reconnect_max_ms")]
    pub reconnect_max_ms: u64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            server: None,
            reconnect_initial_ms: default_reconnect_initial_ms(),
            reconnect_max_ms: default_reconnect_max_ms(),
        }
    }
}

fn default_reconnect_initial_ms() -> u64 {
    500
}

fn default_reconnect_max_ms() -> u64 {
    10_000
}

fn default_client_name() -> String {
    format!("AudioServiceContext:{}", std::process::id())
}
