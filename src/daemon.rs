//! Daemon lifecycle: bus export, PulseAudio attach and shutdown.
//!
//! The bus interface is exported before the audio server is reachable, so
//! clients get `NotReady` instead of a missing service while the port is
//! still connecting.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};

use crate::{
    Result,
    config::{Config, PulseConfig},
    services::{
        AudioService, PulsePort,
        audio::{AudioControlPort, PortError},
        bus::{self, spawn_status_forwarding},
    },
};

/// Doubling delay between attempts to reach the audio server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay after the first failed attempt
    pub initial_backoff: Duration,
    /// Upper bound of the delay
    pub max_backoff: Duration,
}

impl ReconnectPolicy {
    /// Policy configured in `[pulse]`
    pub fn from_config(config: &PulseConfig) -> Self {
        Self {
            initial_backoff: Duration::from_millis(config.reconnect_initial_ms),
            max_backoff: Duration::from_millis(config.reconnect_max_ms),
        }
    }

    fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_backoff)
    }
}

/// Connect with `connect` until a port attaches to `service`.
///
/// Connection and attach failures are logged and retried; this only returns
/// once the service is ready.
pub async fn attach_with_retry<P, F, Fut>(
    service: &AudioService,
    policy: ReconnectPolicy,
    mut connect: F,
) -> Arc<P>
where
    P: AudioControlPort,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<P, PortError>>,
{
    let mut delay = policy.initial_backoff;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match connect().await {
            Ok(port) => {
                let port = Arc::new(port);
                match service.attach_port(port.clone()).await {
                    Ok(()) => {
                        info!(attempt, "Audio port attached");
                        return port;
                    }
                    Err(e) => warn!(attempt, error = %e, retry_in = ?delay, "Could not attach audio port"),
                }
            }
            Err(e) => {
                warn!(attempt, error = %e, retry_in = ?delay, "Could not connect to the audio server");
            }
        }

        tokio::time::sleep(delay).await;
        delay = policy.next_delay(delay);
    }
}

/// Run the daemon until SIGINT or SIGTERM.
///
/// `session` forces the session bus over the configured one.
///
/// # Errors
/// Returns error if the bus name cannot be claimed or signal handlers
/// cannot be installed
pub async fn run(config: Config, session: bool) -> Result<()> {
    info!("Starting audiod");

    let service = Arc::new(AudioService::new(&config.feedback.sample_dir));
    let connection = bus::serve(Arc::clone(&service), config.bus.resolve(session)).await?;
    let forwarding = spawn_status_forwarding(&connection, &service);

    let attaching = {
        let service = Arc::clone(&service);
        let policy = ReconnectPolicy::from_config(&config.pulse);
        let pulse = config.pulse.clone();
        let preload = config.feedback.preload.clone();

        tokio::spawn(async move {
            let port = attach_with_retry(&service, policy, || PulsePort::connect(&pulse)).await;
            let cached = service.preload(&preload).await;
            info!(cached, "Feedback samples preloaded");
            port
        })
    };

    wait_for_shutdown().await?;

    info!("Shutting down");
    forwarding.abort();
    if attaching.is_finished() {
        match attaching.await {
            Ok(port) => port.shutdown().await,
            Err(e) => warn!(error = %e, "Audio port task failed"),
        }
    } else {
        attaching.abort();
    }
    Ok(())
}

async fn wait_for_shutdown() -> std::io::Result<()> {
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }

    Ok(())
}
