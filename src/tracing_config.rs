use std::env;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ConfigPaths, GeneralConfig, LogFormat};

/// Initialize tracing for the daemon
///
/// Uses `RUST_LOG` if set, otherwise the configured log level.
/// `AUDIOD_LOG_FORMAT` overrides the configured console format.
/// When `log_to_file` is enabled logs are also written to daily rotated
/// files in the state directory; the returned guard must be kept alive for
/// the file writer to flush.
///
/// # Errors
/// Returns error if the log directory cannot be created or a global
/// subscriber is already installed
pub fn init(general: &GeneralConfig) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    const DAYS_TO_KEEP: usize = 7;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(general.log_level.to_string()));

    let format = env::var("AUDIOD_LOG_FORMAT")
        .map(|value| LogFormat::from_env_value(&value))
        .unwrap_or(general.log_format);

    let (file_writer, guard) = if general.log_to_file {
        let file_appender = tracing_appender::rolling::Builder::new()
            .rotation(tracing_appender::rolling::Rotation::DAILY)
            .max_log_files(DAYS_TO_KEEP)
            .filename_prefix("audiod")
            .filename_suffix("log")
            .build(ConfigPaths::log_dir()?)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        (Some(non_blocking), Some(guard))
    } else {
        (None, None)
    };

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .compact()
            .with_target(true)
            .with_level(true)
            .with_writer(writer)
            .with_ansi(false)
    });

    let registry = tracing_subscriber::registry().with(env_filter).with(file_layer);

    match format {
        LogFormat::Json => {
            registry
                .with(fmt::layer().json().with_target(true).with_level(true))
                .try_init()?;
        }
        LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(true)
                        .with_thread_names(true),
                )
                .try_init()?;
        }
    }

    Ok(guard)
}

/// Initialize minimal tracing for client subcommands
///
/// Only warnings and errors go to stderr so command output stays clean.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init_cli_mode() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    Ok(())
}
