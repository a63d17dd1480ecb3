//! Unit tests for CLI module
//!
//! Tests argument parsing, formatting, and error mapping.
//! No bus connection or daemon is needed.

use clap::Parser;

use crate::cli::{
    Cli, CliError, Command, ConfigAction, Toggle, VolumeAction, config_schema,
    formatting::{format_error, format_status_plain},
};
use crate::services::AudioStatus;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("audiod").chain(args.iter().copied())).unwrap()
}

#[test]
fn no_subcommand_runs_the_daemon() {
    let cli = parse(&[]);
    assert!(cli.is_daemon());
    assert!(parse(&["daemon"]).is_daemon());
    assert!(!parse(&["status"]).is_daemon());
}

#[test]
fn global_options_apply_to_subcommands() {
    let cli = parse(&["status", "--json", "--session", "-c", "/tmp/audiod.toml"]);

    assert!(cli.session);
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/audiod.toml")));
    assert_eq!(
        cli.command,
        Some(Command::Status {
            json: true,
            watch: false
        })
    );
}

#[test]
fn volume_subcommands_parse() {
    assert_eq!(
        parse(&["volume", "set", "40"]).command,
        Some(Command::Volume {
            action: VolumeAction::Set { percent: 40 }
        })
    );
    assert_eq!(
        parse(&["volume", "set", "-3"]).command,
        Some(Command::Volume {
            action: VolumeAction::Set { percent: -3 }
        })
    );
    assert_eq!(
        parse(&["volume", "up"]).command,
        Some(Command::Volume {
            action: VolumeAction::Up
        })
    );
}

#[test]
fn toggles_parse_and_convert() {
    assert_eq!(
        parse(&["mute", "on"]).command,
        Some(Command::Mute { state: Toggle::On })
    );
    assert!(bool::from(Toggle::On));
    assert!(!bool::from(Toggle::Off));
    assert!(Cli::try_parse_from(["audiod", "mic-mute", "maybe"]).is_err());
}

#[test]
fn call_mode_and_feedback_flags() {
    assert_eq!(
        parse(&["call-mode", "--in-call", "--speaker"]).command,
        Some(Command::CallMode {
            in_call: true,
            speaker: true
        })
    );
    assert_eq!(
        parse(&["feedback", "click", "--no-play", "--sink", "sink.bt"]).command,
        Some(Command::Feedback {
            name: String::from("click"),
            no_play: true,
            sink: Some(String::from("sink.bt")),
        })
    );
    assert_eq!(
        parse(&["config", "schema"]).command,
        Some(Command::Config {
            action: ConfigAction::Schema
        })
    );
}

#[test]
fn status_text_lists_every_field() {
    let status = AudioStatus {
        volume: 66,
        mute: true,
        in_call: false,
        speaker_mode: true,
        mic_mute: false,
    };

    assert_eq!(
        format_status_plain(&status),
        "volume: 66%\nmute: on\nin call: off\nspeaker: on\nmic mute: off"
    );
}

#[test]
fn format_error_wraps_in_red() {
    let formatted = format_error("boom");
    assert!(formatted.contains("boom"));
    assert!(formatted.starts_with("\x1b[1m\x1b[31m"));
}

#[test]
fn schema_is_valid_json() {
    let schema = config_schema().unwrap();
    let value: serde_json::Value = serde_json::from_str(&schema).unwrap();
    assert!(value["properties"]["feedback"].is_object());
}

#[test]
fn transport_errors_stay_bus_errors() {
    let error = CliError::from(zbus::Error::InterfaceNotFound);
    assert!(matches!(error, CliError::Bus(_)));
}
