//! Audio Control Port backed by a PulseAudio client connection.

use std::sync::{Mutex, PoisonError};

use async_stream::stream;
use async_trait::async_trait;
use futures::{StreamExt, stream::BoxStream};
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    task::JoinHandle,
};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};

/// PulseAudio backend implementation
pub mod backend;

use backend::{CommandSender, ListSender, PulseBackend, PulseCommand, Reply};

use crate::{
    config::PulseConfig,
    services::audio::port::{
        AudioControlPort, CardSnapshot, Enumeration, MediaRole, PortError, PortEvent,
        SampleFormat, SampleSource, SinkSnapshot, SourceSnapshot,
    },
};

/// PulseAudio implementation of [`AudioControlPort`]
///
/// Every request is forwarded to the backend thread and awaited on its own
/// reply channel.
pub struct PulsePort {
    command_tx: CommandSender,
    events_tx: broadcast::Sender<PortEvent>,
    monitoring_handle: Mutex<Option<JoinHandle<()>>>,
}

impl PulsePort {
    /// Connect to the PulseAudio server
    ///
    /// # Errors
    /// Returns error if the context cannot be created or never becomes ready
    pub async fn connect(config: &PulseConfig) -> Result<Self, PortError> {
        const EVENTS_BUFFER_SIZE: usize = 100;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(EVENTS_BUFFER_SIZE);
        let (ready_tx, ready_rx) = oneshot::channel();

        let monitoring_handle = PulseBackend::spawn_monitoring_task(
            config.clone(),
            command_rx,
            events_tx.clone(),
            ready_tx,
        );

        ready_rx.await.map_err(|_| {
            PortError::ConnectionFailed(String::from("PulseAudio backend exited during startup"))
        })??;

        info!(server = ?config.server, "PulseAudio port ready");

        Ok(Self {
            command_tx,
            events_tx,
            monitoring_handle: Mutex::new(Some(monitoring_handle)),
        })
    }

    /// Gracefully shutdown the backend thread
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(PulseCommand::Shutdown);

        let handle = self
            .monitoring_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "PulseAudio backend did not stop cleanly");
            }
        }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> PulseCommand,
    ) -> Result<T, PortError> {
        let (reply, reply_rx) = oneshot::channel();
        self.command_tx
            .send(build(reply))
            .map_err(|_| PortError::Disconnected)?;
        reply_rx.await.map_err(|_| PortError::Disconnected)?
    }

    fn enumerate<T: Send + 'static>(
        &self,
        build: impl FnOnce(ListSender<T>) -> PulseCommand,
    ) -> Result<Enumeration<T>, PortError> {
        let (list_tx, list_rx) = mpsc::unbounded_channel();
        self.command_tx
            .send(build(list_tx))
            .map_err(|_| PortError::Disconnected)?;
        Ok(UnboundedReceiverStream::new(list_rx).boxed())
    }
}

impl Drop for PulsePort {
    fn drop(&mut self) {
        let _ = self.command_tx.send(PulseCommand::Shutdown);
    }
}

#[async_trait]
impl AudioControlPort for PulsePort {
    async fn enumerate_cards(&self) -> Result<Enumeration<CardSnapshot>, PortError> {
        self.enumerate(PulseCommand::EnumerateCards)
    }

    async fn enumerate_sinks(&self) -> Result<Enumeration<SinkSnapshot>, PortError> {
        self.enumerate(PulseCommand::EnumerateSinks)
    }

    async fn enumerate_sources(&self) -> Result<Enumeration<SourceSnapshot>, PortError> {
        self.enumerate(PulseCommand::EnumerateSources)
    }

    async fn set_card_profile(&self, card: &str, profile: &str) -> Result<(), PortError> {
        self.request(|reply| PulseCommand::SetCardProfile {
            card: card.to_string(),
            profile: profile.to_string(),
            reply,
        })
        .await
    }

    async fn set_sink_port(&self, sink: &str, port: &str) -> Result<(), PortError> {
        self.request(|reply| PulseCommand::SetSinkPort {
            sink: sink.to_string(),
            port: port.to_string(),
            reply,
        })
        .await
    }

    async fn set_source_port(&self, source: &str, port: &str) -> Result<(), PortError> {
        self.request(|reply| PulseCommand::SetSourcePort {
            source: source.to_string(),
            port: port.to_string(),
            reply,
        })
        .await
    }

    async fn set_source_mute(&self, source: &str, muted: bool) -> Result<(), PortError> {
        self.request(|reply| PulseCommand::SetSourceMute {
            source: source.to_string(),
            muted,
            reply,
        })
        .await
    }

    async fn set_sink_volume(&self, sink: &str, volume: u32) -> Result<(), PortError> {
        self.request(|reply| PulseCommand::SetSinkVolume {
            sink: sink.to_string(),
            volume,
            reply,
        })
        .await
    }

    async fn set_sink_mute(&self, sink: &str, muted: bool) -> Result<(), PortError> {
        self.request(|reply| PulseCommand::SetSinkMute {
            sink: sink.to_string(),
            muted,
            reply,
        })
        .await
    }

    async fn default_sink_name(&self) -> Result<Option<String>, PortError> {
        self.request(PulseCommand::DefaultSinkName).await
    }

    async fn upload_sample(
        &self,
        name: &str,
        format: SampleFormat,
        source: Box<dyn SampleSource>,
    ) -> Result<(), PortError> {
        self.request(|reply| PulseCommand::UploadSample {
            name: name.to_string(),
            format,
            source,
            reply,
        })
        .await
    }

    async fn play_sample(
        &self,
        name: &str,
        sink: &str,
        volume: u32,
        role: MediaRole,
    ) -> Result<(), PortError> {
        self.request(|reply| PulseCommand::PlaySample {
            name: name.to_string(),
            sink: sink.to_string(),
            volume,
            role,
            reply,
        })
        .await
    }

    fn events(&self) -> BoxStream<'static, PortEvent> {
        let mut events_rx = self.events_tx.subscribe();
        stream! {
            loop {
                match events_rx.recv().await {
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Port event subscriber lagged, skipped {skipped} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
        .boxed()
    }
}
