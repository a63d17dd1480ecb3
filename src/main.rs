//! audiod - audio routing and feedback daemon
//!
//! Without a subcommand the binary runs the daemon. Every other subcommand
//! is a client that talks to a running daemon over D-Bus.

use std::{error::Error, path::PathBuf, process};

use audiod::{
    cli::{self, Cli, CliError, Command, formatting::format_error},
    config::{Config, ConfigPaths},
    daemon,
    services::bus::{self, AudioProxy},
    tracing_config,
};
use clap::Parser;
use tracing::{Instrument, Level, span};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.is_daemon() {
        return run_daemon(cli.config, cli.session).await;
    }

    tracing_config::init_cli_mode()?;

    match run_client(cli).await {
        Ok(output) => {
            if !output.trim().is_empty() {
                println!("{output}");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format_error(&e.to_string()));
            process::exit(1);
        }
    }
}

fn config_path(explicit: Option<PathBuf>) -> Result<PathBuf, std::io::Error> {
    match explicit {
        Some(path) => Ok(path),
        None => ConfigPaths::main_config(),
    }
}

async fn run_client(cli: Cli) -> cli::CommandResult {
    let Some(command) = cli.command else {
        return Err(CliError::InvalidArguments(String::from("missing subcommand")));
    };

    if let Command::Config { action } = command {
        return cli::config_command(action);
    }

    let config = if cli.session {
        Config::default()
    } else {
        let path = config_path(cli.config).map_err(|e| CliError::ConfigError(e.to_string()))?;
        Config::load(&path).map_err(|e| CliError::ConfigError(e.to_string()))?
    };
    let bus_type = config.bus.resolve(cli.session);

    let connection = bus::connect(bus_type).await?;
    let proxy = AudioProxy::new(&connection).await?;
    cli::execute(command, &proxy).await
}

async fn run_daemon(config: Option<PathBuf>, session: bool) -> Result<(), Box<dyn Error>> {
    let config = Config::load(&config_path(config)?)?;
    let _guard = tracing_config::init(&config.general)?;

    daemon::run(config, session)
        .instrument(span!(Level::INFO, "audiod"))
        .await?;
    Ok(())
}
