use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Feedback sound settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FeedbackConfig {
    /// Directory holding `<name>.pcm` samples (mono, S16LE, 44100 Hz).
    #[serde(default = "default_sample_dir")]
    pub sample_dir: PathBuf,

    /// Samples uploaded to the audio server at startup without playing them.
    #[serde(default)]
    pub preload: Vec<String>,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            sample_dir: default_sample_dir(),
            preload: Vec::new(),
        }
    }
}

fn default_sample_dir() -> PathBuf {
    PathBuf::from("/usr/share/systemsounds")
}
