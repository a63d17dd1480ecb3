//! Command-line interface.
//!
//! `audiod` without a subcommand (or with `daemon`) runs the service; every
//! other subcommand is a client talking to a running daemon over D-Bus.

mod client;
pub mod formatting;
mod types;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use client::{config_command, config_schema, execute};
pub use types::{CliError, CommandResult};

/// Audio routing and feedback daemon
#[derive(Parser, Debug)]
#[command(name = "audiod", version)]
#[command(about = "Audio routing and feedback daemon")]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Use the session bus instead of the configured one
    #[arg(long, global = true)]
    pub session: bool,

    /// Subcommand; runs the daemon when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Whether this invocation runs the daemon
    pub fn is_daemon(&self) -> bool {
        matches!(self.command, None | Some(Command::Daemon))
    }
}

/// Top-level subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the audio service
    Daemon,
    /// Show the current status
    Status {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Keep printing every status change
        #[arg(long)]
        watch: bool,
    },
    /// Change the output volume
    Volume {
        /// What to do
        #[command(subcommand)]
        action: VolumeAction,
    },
    /// Mute or unmute the output
    Mute {
        /// New state
        state: Toggle,
    },
    /// Route audio for a call or back to media playback
    CallMode {
        /// Route through the voice call profile
        #[arg(long)]
        in_call: bool,
        /// Prefer the loudspeaker
        #[arg(long)]
        speaker: bool,
    },
    /// Mute or unmute the microphone
    MicMute {
        /// New state
        state: Toggle,
    },
    /// Play a feedback sound
    Feedback {
        /// Sample name
        name: String,
        /// Only upload the sample
        #[arg(long)]
        no_play: bool,
        /// Sink to play on instead of the default sink
        #[arg(long)]
        sink: Option<String>,
    },
    /// Configuration helpers
    Config {
        /// What to do
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Volume subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum VolumeAction {
    /// Set the volume in percent
    Set {
        /// 0..=100
        #[arg(allow_negative_numbers = true)]
        percent: i32,
    },
    /// One step up
    Up,
    /// One step down
    Down,
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the JSON schema of the config file
    Schema,
    /// Print the default config file location
    Path,
}

/// On/off argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Enable
    On,
    /// Disable
    Off,
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> Self {
        toggle == Toggle::On
    }
}
