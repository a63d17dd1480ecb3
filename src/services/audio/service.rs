use std::{
    path::PathBuf,
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::{
    error::AudioError,
    feedback::{FeedbackOutcome, FeedbackPipeline, FeedbackRequest, SampleCache},
    port::{AudioControlPort, ListEntry, PortError, PortEvent, SinkReport},
    routing::{CallModeCascade, RoutingIntent, push_mic_mute},
    state::{AudioStatus, DeviceState, DeviceStateManager},
    volume,
};

/// Audio control service
///
/// Owns the Device State Manager and the Sample Cache and serves every
/// inbound operation. Until a port is attached all operations fail with
/// [`AudioError::NotReady`].
pub struct AudioService {
    port: OnceLock<Arc<dyn AudioControlPort>>,
    state: Arc<DeviceStateManager>,
    feedback: FeedbackPipeline,
    monitoring_handle: Mutex<Option<JoinHandle<()>>>,
}

impl AudioService {
    /// Create a service reading feedback samples from `sample_dir`
    pub fn new(sample_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: OnceLock::new(),
            state: Arc::new(DeviceStateManager::new()),
            feedback: FeedbackPipeline::new(sample_dir, Arc::new(SampleCache::new())),
            monitoring_handle: Mutex::new(None),
        }
    }

    /// Whether a port is attached
    pub fn is_ready(&self) -> bool {
        self.port.get().is_some()
    }

    /// Device State Manager shared with the event monitor
    pub fn state(&self) -> &Arc<DeviceStateManager> {
        &self.state
    }

    /// Sample Cache shared by feedback requests
    pub fn sample_cache(&self) -> &Arc<SampleCache> {
        self.feedback.cache()
    }

    fn port(&self) -> Result<&Arc<dyn AudioControlPort>, AudioError> {
        self.port.get().ok_or(AudioError::NotReady)
    }

    /// Make the service ready.
    ///
    /// Reads the default sink once, then keeps following server events on a
    /// background task. A second port is ignored.
    ///
    /// # Errors
    /// Returns [`AudioError::UpstreamFailure`] if the initial query fails
    #[instrument(skip_all)]
    pub async fn attach_port(&self, port: Arc<dyn AudioControlPort>) -> Result<(), AudioError> {
        if self.is_ready() {
            warn!("Audio port already attached, ignoring");
            return Ok(());
        }

        let mut events = port.events();

        if let Some(report) = prime_default_sink(port.as_ref()).await? {
            self.state.observe_server_reported_sink_change(&report);
        }

        if self.port.set(port).is_err() {
            warn!("Audio port attached concurrently, ignoring");
            return Ok(());
        }

        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                match event {
                    PortEvent::DefaultSinkChanged(report) => {
                        info!(sink = %report.name, "Default sink changed");
                        state.observe_server_reported_sink_change(&report);
                    }
                    PortEvent::SinkPropertiesChanged(report) => {
                        state.observe_server_reported_sink_change(&report);
                    }
                }
            }
            debug!("Audio port event stream ended");
        });

        *self
            .monitoring_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);

        info!(status = ?self.state.status(), "Audio service ready");
        Ok(())
    }

    /// Current status
    ///
    /// # Errors
    /// Returns [`AudioError::NotReady`] before a port is attached
    pub fn status(&self) -> Result<AudioStatus, AudioError> {
        self.port()?;
        Ok(self.state.status())
    }

    /// Stream of status notifications
    ///
    /// Open before a port is attached: the bus forwarder subscribes at
    /// startup so that the status primed by [`attach_port`](Self::attach_port)
    /// is its first notification. Nothing is yielded while not ready.
    pub fn subscribe(&self) -> impl Stream<Item = AudioStatus> + Send + 'static {
        self.state.subscribe()
    }

    /// Set the output volume in percent.
    ///
    /// # Errors
    /// - [`AudioError::NotReady`] before a port is attached
    /// - [`AudioError::Validation`] outside 0..=100
    /// - [`AudioError::NoOpRequested`] when the volume already has this value
    /// - [`AudioError::DeviceNotFound`] without a default sink
    /// - [`AudioError::UpstreamFailure`] when the server rejects the change
    #[instrument(skip(self))]
    pub async fn set_volume(&self, volume: i32) -> Result<(), AudioError> {
        let port = self.port()?;

        let percent = u8::try_from(volume)
            .ok()
            .filter(|percent| *percent <= volume::MAX_PERCENT)
            .ok_or_else(|| {
                AudioError::validation("volume", format!("{volume} is outside 0..=100"))
            })?;

        if self.state.snapshot().volume == percent {
            return Err(AudioError::NoOpRequested(format!(
                "Volume is already {percent}"
            )));
        }

        self.push_volume(port.as_ref(), percent)
            .await
            .inspect_err(|e| warn!(error = %e, "setVolume failed"))
    }

    /// Step the volume up by one key press
    ///
    /// # Errors
    /// Same as [`set_volume`](Self::set_volume), except that the top is a silent no-op
    #[instrument(skip(self))]
    pub async fn volume_up(&self) -> Result<(), AudioError> {
        let port = self.port()?;
        let Some(target) = volume::step_up(self.state.snapshot().volume) else {
            debug!("Volume already at the top");
            return Ok(());
        };

        self.push_volume(port.as_ref(), target)
            .await
            .inspect_err(|e| warn!(error = %e, "volumeUp failed"))
    }

    /// Step the volume down by one key press
    ///
    /// # Errors
    /// Same as [`set_volume`](Self::set_volume), except that silence is a silent no-op
    #[instrument(skip(self))]
    pub async fn volume_down(&self) -> Result<(), AudioError> {
        let port = self.port()?;
        let Some(target) = volume::step_down(self.state.snapshot().volume) else {
            debug!("Volume already at zero");
            return Ok(());
        };

        self.push_volume(port.as_ref(), target)
            .await
            .inspect_err(|e| warn!(error = %e, "volumeDown failed"))
    }

    /// Mute or unmute the default sink.
    ///
    /// Requesting the current value succeeds without touching the server.
    ///
    /// # Errors
    /// - [`AudioError::NotReady`] before a port is attached
    /// - [`AudioError::DeviceNotFound`] without a default sink
    /// - [`AudioError::UpstreamFailure`] when the server rejects the change
    #[instrument(skip(self))]
    pub async fn set_mute(&self, muted: bool) -> Result<(), AudioError> {
        let port = self.port()?;
        let snapshot = self.state.snapshot();
        if snapshot.muted == muted {
            debug!("Mute already {muted}");
            return Ok(());
        }

        let result: Result<(), AudioError> = async {
            let sink = default_sink(&snapshot)?;
            self.state.begin_pending_mute(muted);
            port.set_sink_mute(&sink, muted).await?;
            self.state.apply_confirmed_mute(muted);
            Ok(())
        }
        .await;

        result.inspect_err(|e| {
            self.state.discard_pending();
            warn!(error = %e, "setMute failed");
        })
    }

    /// Route audio for a call or back to media playback.
    ///
    /// Requesting the current mode succeeds without touching the server.
    ///
    /// # Errors
    /// - [`AudioError::NotReady`] before a port is attached
    /// - [`AudioError::DeviceNotFound`] when a voice-capable device is missing
    /// - [`AudioError::UpstreamFailure`] when a mutation fails or the connection drops
    #[instrument(skip(self))]
    pub async fn set_call_mode(&self, in_call: bool, speaker_mode: bool) -> Result<(), AudioError> {
        let port = self.port()?;
        let snapshot = self.state.snapshot();
        if snapshot.in_call == in_call && snapshot.speaker_mode == speaker_mode {
            debug!("Call mode unchanged");
            return Ok(());
        }

        let intent = RoutingIntent {
            in_call,
            speaker_mode,
            mic_muted: snapshot.mic_muted,
        };

        let report = CallModeCascade::new(port.as_ref(), intent)
            .run()
            .await
            .inspect_err(|e| warn!(error = %e, "setCallMode failed"))?;

        debug!(?report, "Call mode applied");
        self.state
            .apply_call_mode(intent.in_call, intent.speaker_mode, intent.mic_muted);
        Ok(())
    }

    /// Mute or unmute the microphone
    ///
    /// # Errors
    /// - [`AudioError::NotReady`] before a port is attached
    /// - [`AudioError::DeviceNotFound`] without a routing source
    /// - [`AudioError::UpstreamFailure`] when the mutation fails or the connection drops
    #[instrument(skip(self))]
    pub async fn set_mic_mute(&self, mic_muted: bool) -> Result<(), AudioError> {
        let port = self.port()?;

        let changed = push_mic_mute(port.as_ref(), mic_muted)
            .await
            .inspect_err(|e| warn!(error = %e, "setMicMute failed"))?;

        debug!(changed, "Microphone mute applied");
        self.state.apply_mic_mute(mic_muted);
        Ok(())
    }

    /// Upload a feedback sample if needed and optionally play it
    ///
    /// # Errors
    /// - [`AudioError::NotReady`] before a port is attached
    /// - [`AudioError::Validation`] for a bad sample name
    /// - [`AudioError::Resource`] when the sample file is missing or empty
    /// - [`AudioError::DeviceNotFound`] when no sink can be resolved
    /// - [`AudioError::UpstreamFailure`] when the server rejects upload or playback
    pub async fn play_feedback(
        &self,
        name: &str,
        sink: Option<String>,
        play: bool,
    ) -> Result<FeedbackOutcome, AudioError> {
        let port = self.port()?;

        let request = FeedbackRequest {
            sample_name: name.to_string(),
            sink_override: sink,
            should_play: play,
        };

        self.feedback
            .run(
                port.as_ref(),
                request,
                self.state.snapshot().default_sink_name,
            )
            .await
            .inspect_err(|e| warn!(error = %e, name, "playFeedback failed"))
    }

    /// Upload `names` without playing them.
    ///
    /// Failures are logged and skipped. Returns how many samples are cached.
    pub async fn preload(&self, names: &[String]) -> usize {
        for name in names {
            if let Err(e) = self.play_feedback(name, None, false).await {
                warn!(error = %e, name, "Could not preload feedback sample");
            }
        }
        self.sample_cache().len()
    }

    async fn push_volume(
        &self,
        port: &dyn AudioControlPort,
        percent: u8,
    ) -> Result<(), AudioError> {
        let sink = default_sink(&self.state.snapshot())?;

        self.state.begin_pending_volume(percent);
        if let Err(e) = port
            .set_sink_volume(&sink, volume::percent_to_units(percent))
            .await
        {
            self.state.discard_pending();
            return Err(e.into());
        }

        self.state.apply_confirmed_volume(percent);
        Ok(())
    }
}

impl Drop for AudioService {
    fn drop(&mut self) {
        let handle = self
            .monitoring_handle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

fn default_sink(state: &DeviceState) -> Result<String, AudioError> {
    state
        .default_sink_name
        .clone()
        .ok_or_else(|| AudioError::DeviceNotFound(String::from("default sink")))
}

async fn prime_default_sink(port: &dyn AudioControlPort) -> Result<Option<SinkReport>, PortError> {
    let Some(name) = port.default_sink_name().await? else {
        warn!("Audio server reports no default sink");
        return Ok(None);
    };

    let mut sinks = port.enumerate_sinks().await?;
    let mut found = None;
    while let Some(entry) = sinks.next().await {
        match entry {
            ListEntry::Item(sink) if found.is_none() && sink.name == name => {
                found = Some(SinkReport::from(&sink));
            }
            ListEntry::Item(_) => {}
            ListEntry::End => return Ok(found),
            ListEntry::Failed(e) => return Err(e),
        }
    }

    Err(PortError::Disconnected)
}
