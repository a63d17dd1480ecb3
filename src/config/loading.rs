use std::{fs, io::ErrorKind, path::Path};

use tracing::{debug, info};

use super::Config;
use crate::{AudiodError, Result, services::audio::feedback::validate_sample_name};

impl Config {
    /// Loads the configuration from a TOML file.
    ///
    /// A missing file is not an error: the defaults are returned so the
    /// daemon can start on a system that never had a config written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The TOML content is invalid
    /// - The content does not match the configuration schema
    pub fn load(path: &Path) -> Result<Config> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(e) => return Err(AudiodError::io_at(e, path)),
        };

        debug!("Loading config from {}", path.display());
        Self::parse(&content, Some(path))
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    /// Returns an error if the TOML is malformed or does not match the schema
    pub fn parse(content: &str, origin: Option<&Path>) -> Result<Config> {
        let value: toml::Value =
            toml::from_str(content).map_err(|e| AudiodError::toml_parse(e, origin))?;

        let config: Config = value
            .try_into()
            .map_err(|e| AudiodError::ConfigValidation {
                component: "config parsing".to_string(),
                details: format!("Configuration validation failed: {e}"),
            })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.pulse.client_name.trim().is_empty() {
            return Err(AudiodError::ConfigValidation {
                component: "pulse".to_string(),
                details: "client_name must not be empty".to_string(),
            });
        }

        if self.pulse.reconnect_initial_ms == 0
            || self.pulse.reconnect_initial_ms > self.pulse.reconnect_max_ms
        {
            return Err(AudiodError::ConfigValidation {
                component: "pulse".to_string(),
                details: "reconnect_initial_ms must be positive and not above reconnect_max_ms"
                    .to_string(),
            });
        }

        for name in &self.feedback.preload {
            validate_sample_name(name).map_err(|e| AudiodError::ConfigValidation {
                component: "feedback".to_string(),
                details: format!("invalid sample name in preload list: {e}"),
            })?;
        }

        Ok(())
    }
}
