//! Unit tests for config module
//!
//! Tests configuration types, defaults, and parsing.
//! No filesystem dependencies - all in-memory.

#![allow(clippy::panic)]

use std::path::PathBuf;

use crate::{
    AudiodError,
    config::{BusType, Config, LogFormat, LogLevel},
};

#[test]
fn config_default() {
    let config = Config::default();

    assert_eq!(config.general.log_level, LogLevel::Info);
    assert_eq!(config.general.log_format, LogFormat::Pretty);
    assert!(!config.general.log_to_file);
    assert_eq!(config.bus.bus_type, BusType::System);
    assert_eq!(
        config.feedback.sample_dir,
        PathBuf::from("/usr/share/systemsounds")
    );
    assert!(config.feedback.preload.is_empty());
    assert!(config.pulse.server.is_none());
}

#[test]
fn config_empty_toml() {
    let config = Config::parse("", None).unwrap();

    assert_eq!(config.general, Config::default().general);
    assert_eq!(config.feedback, Config::default().feedback);
}

#[test]
fn config_full_toml() {
    let toml_str = r#"
        [general]
        log_level = "debug"
        log_format = "json"
        log_to_file = true

        [pulse]
        client_name = "audiod-test"
        server = "unix:/run/pulse/native"

        [bus]
        bus_type = "session"

        [feedback]
        sample_dir = "/opt/sounds"
        preload = ["click", "alert"]
    "#;

    let config = Config::parse(toml_str, None).unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.general.log_format, LogFormat::Json);
    assert!(config.general.log_to_file);
    assert_eq!(config.pulse.client_name, "audiod-test");
    assert_eq!(config.pulse.server.as_deref(), Some("unix:/run/pulse/native"));
    assert_eq!(config.bus.bus_type, BusType::Session);
    assert_eq!(config.feedback.sample_dir, PathBuf::from("/opt/sounds"));
    assert_eq!(config.feedback.preload, vec!["click", "alert"]);
}

#[test]
fn config_rejects_malformed_toml() {
    let result = Config::parse("[general\nlog_level = ", None);

    assert!(matches!(result, Err(AudiodError::TomlParseError { .. })));
}

#[test]
fn config_rejects_unknown_log_level() {
    let result = Config::parse("[general]\nlog_level = \"loud\"", None);

    assert!(matches!(result, Err(AudiodError::ConfigValidation { .. })));
}

#[test]
fn config_rejects_path_in_preload_name() {
    let result = Config::parse("[feedback]\npreload = [\"../etc/passwd\"]", None);

    assert!(matches!(result, Err(AudiodError::ConfigValidation { .. })));
}

#[test]
fn config_rejects_preload_names_the_pipeline_rejects() {
    for name in [".hidden", "sounds\\\\click", ""] {
        let result = Config::parse(&format!("[feedback]\npreload = [\"{name}\"]"), None);

        assert!(
            matches!(result, Err(AudiodError::ConfigValidation { .. })),
            "{name:?} was accepted"
        );
    }
}

#[test]
fn session_flag_overrides_configured_bus() {
    let config = Config::default();

    assert_eq!(config.bus.resolve(false), BusType::System);
    assert_eq!(config.bus.resolve(true), BusType::Session);

    let session = Config::parse("[bus]\nbus_type = \"session\"", None).unwrap();
    assert_eq!(session.bus.resolve(false), BusType::Session);
}

#[test]
fn config_rejects_inverted_reconnect_bounds() {
    let result = Config::parse(
        "[pulse]\nreconnect_initial_ms = 5000\nreconnect_max_ms = 100",
        None,
    );

    assert!(matches!(result, Err(AudiodError::ConfigValidation { .. })));
}

#[test]
fn config_rejects_empty_client_name() {
    let result = Config::parse("[pulse]\nclient_name = \"  \"", None);

    assert!(matches!(result, Err(AudiodError::ConfigValidation { .. })));
}

#[test]
fn log_level_display_matches_serde_names() {
    for level in [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ] {
        let parsed =
            Config::parse(&format!("[general]\nlog_level = \"{level}\""), None).unwrap();
        assert_eq!(parsed.general.log_level, level);
    }
}

#[test]
fn log_format_from_env_value() {
    assert_eq!(LogFormat::from_env_value("json"), LogFormat::Json);
    assert_eq!(LogFormat::from_env_value("JSON"), LogFormat::Json);
    assert_eq!(LogFormat::from_env_value("pretty"), LogFormat::Pretty);
    assert_eq!(LogFormat::from_env_value("whatever"), LogFormat::Pretty);
}

#[test]
fn config_schema_lists_sections() {
    let schema = schemars::schema_for!(Config);
    let json = serde_json::to_string(&schema).unwrap();

    for section in ["general", "pulse", "bus", "feedback"] {
        assert!(json.contains(section), "schema is missing {section}");
    }
}
