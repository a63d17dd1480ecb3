use futures::StreamExt;
use schemars::schema_for;

use super::{
    Command, ConfigAction, VolumeAction,
    formatting::{format_description, format_status},
    types::{CliError, CommandResult},
};
use crate::{
    config::{Config, ConfigPaths},
    services::{AudioStatus, bus::AudioProxy},
};

/// JSON schema of the config file, pretty-printed
///
/// # Errors
/// Returns error if the schema cannot be serialized
pub fn config_schema() -> CommandResult {
    Ok(serde_json::to_string_pretty(&schema_for!(Config))?)
}

/// Run a client subcommand against the daemon
///
/// # Errors
/// Returns error if the daemon is unreachable or rejects the request
pub async fn execute(command: Command, proxy: &AudioProxy<'_>) -> CommandResult {
    match command {
        Command::Daemon => Err(CliError::InvalidArguments(String::from(
            "daemon is not a client command",
        ))),
        Command::Status { json, watch } => status(proxy, json, watch).await,
        Command::Volume { action } => {
            match action {
                VolumeAction::Set { percent } => proxy.set_volume(percent).await?,
                VolumeAction::Up => proxy.volume_up().await?,
                VolumeAction::Down => proxy.volume_down().await?,
            }
            Ok(format!("volume: {}%", proxy.get_status().await?.volume))
        }
        Command::Mute { state } => {
            proxy.set_mute(state.into()).await?;
            Ok(String::new())
        }
        Command::CallMode { in_call, speaker } => {
            proxy.set_call_mode(in_call, speaker).await?;
            Ok(String::new())
        }
        Command::MicMute { state } => {
            proxy.set_mic_mute(state.into()).await?;
            Ok(String::new())
        }
        Command::Feedback {
            name,
            no_play,
            sink,
        } => {
            proxy
                .play_feedback(&name, !no_play, sink.as_deref().unwrap_or_default())
                .await?;
            Ok(String::new())
        }
        Command::Config { action } => config_command(action),
    }
}

/// Run a config subcommand; needs no daemon
///
/// # Errors
/// Returns error if the config location is unknown
pub fn config_command(action: ConfigAction) -> CommandResult {
    match action {
        ConfigAction::Schema => config_schema(),
        ConfigAction::Path => ConfigPaths::main_config()
            .map(|path| path.display().to_string())
            .map_err(|e| CliError::ConfigError(e.to_string())),
    }
}

async fn status(proxy: &AudioProxy<'_>, json: bool, watch: bool) -> CommandResult {
    let render = |status: AudioStatus| -> CommandResult {
        if json {
            Ok(serde_json::to_string(&status)?)
        } else {
            Ok(format_status(&status))
        }
    };

    if !watch {
        return render(proxy.get_status().await?);
    }

    let mut changes = proxy.receive_status_changed().await?;
    println!("{}", render(proxy.get_status().await?)?);
    if !json {
        println!("{}", format_description("Waiting for changes, Ctrl-C to stop"));
    }

    while let Some(signal) = changes.next().await {
        let args = signal.args()?;
        println!("{}", render(*args.status())?);
    }

    Ok(String::new())
}
