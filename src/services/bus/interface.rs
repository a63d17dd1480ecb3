use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use zbus::{Connection, interface, object_server::SignalEmitter};

use super::{OBJECT_PATH, error::BusError};
use crate::services::audio::{AudioService, AudioStatus};

/// `org.audiod.Audio1` served on top of [`AudioService`]
pub struct AudioBus {
    service: Arc<AudioService>,
}

impl AudioBus {
    /// Expose `service` on the bus
    pub fn new(service: Arc<AudioService>) -> Self {
        Self { service }
    }
}

#[interface(name = "org.audiod.Audio1")]
impl AudioBus {
    /// Current volume, mute, call and microphone state
    async fn get_status(&self) -> Result<AudioStatus, BusError> {
        Ok(self.service.status()?)
    }

    async fn set_volume(&self, volume: i32) -> Result<(), BusError> {
        Ok(self.service.set_volume(volume).await?)
    }

    async fn set_mute(&self, mute: bool) -> Result<(), BusError> {
        Ok(self.service.set_mute(mute).await?)
    }

    async fn volume_up(&self) -> Result<(), BusError> {
        Ok(self.service.volume_up().await?)
    }

    async fn volume_down(&self) -> Result<(), BusError> {
        Ok(self.service.volume_down().await?)
    }

    async fn set_call_mode(&self, in_call: bool, speaker_mode: bool) -> Result<(), BusError> {
        Ok(self.service.set_call_mode(in_call, speaker_mode).await?)
    }

    async fn set_mic_mute(&self, mute: bool) -> Result<(), BusError> {
        Ok(self.service.set_mic_mute(mute).await?)
    }

    /// Play a feedback sound; an empty `sink` means the default sink
    async fn play_feedback(&self, name: &str, play: bool, sink: &str) -> Result<(), BusError> {
        let sink = (!sink.is_empty()).then(|| sink.to_string());
        self.service.play_feedback(name, sink, play).await?;
        Ok(())
    }

    /// Emitted after every confirmed or server-reported change
    #[zbus(signal)]
    async fn status_changed(emitter: &SignalEmitter<'_>, status: AudioStatus) -> zbus::Result<()>;
}

/// Forward status notifications as `StatusChanged` signals
pub fn spawn_status_forwarding(
    connection: &Connection,
    service: &AudioService,
) -> JoinHandle<()> {
    let connection = connection.clone();
    let mut updates = Box::pin(service.subscribe());

    tokio::spawn(async move {
        let iface_ref = match connection
            .object_server()
            .interface::<_, AudioBus>(OBJECT_PATH)
            .await
        {
            Ok(iface_ref) => iface_ref,
            Err(e) => {
                warn!(error = %e, "Audio interface not served, status signals disabled");
                return;
            }
        };

        while let Some(status) = updates.next().await {
            if let Err(e) = AudioBus::status_changed(iface_ref.signal_emitter(), status).await {
                warn!(error = %e, "Failed to emit StatusChanged");
            }
        }
        debug!("Status forwarding finished");
    })
}
