use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use zbus::zvariant::Type;

use super::{port::SinkReport, volume};

/// Last confirmed device state
///
/// `volume` and `muted` only ever hold values the audio server confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceState {
    /// Output volume in percent
    pub volume: u8,
    /// Output mute
    pub muted: bool,
    /// Microphone mute
    pub mic_muted: bool,
    /// Call routing active
    pub in_call: bool,
    /// Loudspeaker routing requested
    pub speaker_mode: bool,
    /// Name of the server's default sink
    pub default_sink_name: Option<String>,
    /// Index of the server's default sink
    pub default_sink_index: Option<u32>,
}

/// Public status shape returned by `getStatus` and pushed to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type)]
#[serde(rename_all = "camelCase")]
pub struct AudioStatus {
    /// Output volume in percent
    pub volume: u32,
    /// Output mute
    pub mute: bool,
    /// Call routing active
    pub in_call: bool,
    /// Loudspeaker routing requested
    pub speaker_mode: bool,
    /// Microphone mute
    pub mic_mute: bool,
}

impl From<&DeviceState> for AudioStatus {
    fn from(state: &DeviceState) -> Self {
        Self {
            volume: u32::from(state.volume),
            mute: state.muted,
            in_call: state.in_call,
            speaker_mode: state.speaker_mode,
            mic_mute: state.mic_muted,
        }
    }
}

/// Mutations sent to the server but not yet confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingChanges {
    /// Requested volume in percent
    pub volume: Option<u8>,
    /// Requested output mute
    pub mute: Option<bool>,
}

#[derive(Debug, Default)]
struct Inner {
    state: DeviceState,
    pending: PendingChanges,
}

/// Owner of [`DeviceState`]
///
/// All writes go through one lock, so concurrent requests observe a single
/// order of confirmed changes. Every write notifies subscribers with the
/// full status.
#[derive(Debug)]
pub struct DeviceStateManager {
    inner: Mutex<Inner>,
    status_tx: broadcast::Sender<AudioStatus>,
}

impl Default for DeviceStateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceStateManager {
    /// Create a manager holding the default state
    pub fn new() -> Self {
        const STATUS_BUFFER_SIZE: usize = 64;

        let (status_tx, _) = broadcast::channel(STATUS_BUFFER_SIZE);
        Self {
            inner: Mutex::new(Inner::default()),
            status_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> DeviceState {
        self.lock().state.clone()
    }

    /// Current status in its public shape
    pub fn status(&self) -> AudioStatus {
        AudioStatus::from(&self.lock().state)
    }

    /// Unconfirmed mutations
    pub fn pending(&self) -> PendingChanges {
        self.lock().pending
    }

    /// Record a volume change that was sent to the server
    pub fn begin_pending_volume(&self, volume: u8) {
        self.lock().pending.volume = Some(volume);
    }

    /// Record a mute change that was sent to the server
    pub fn begin_pending_mute(&self, muted: bool) {
        self.lock().pending.mute = Some(muted);
    }

    /// Forget pending mutations after the server rejected them
    pub fn discard_pending(&self) {
        self.lock().pending = PendingChanges::default();
    }

    /// Apply a volume the server confirmed
    pub fn apply_confirmed_volume(&self, volume: u8) {
        self.update(|inner| {
            inner.state.volume = volume.min(volume::MAX_PERCENT);
            inner.pending.volume = None;
        });
    }

    /// Apply an output mute the server confirmed
    pub fn apply_confirmed_mute(&self, muted: bool) {
        self.update(|inner| {
            inner.state.muted = muted;
            inner.pending.mute = None;
        });
    }

    /// Apply the outcome of a successful call-mode cascade
    pub fn apply_call_mode(&self, in_call: bool, speaker_mode: bool, mic_muted: bool) {
        self.update(|inner| {
            inner.state.in_call = in_call;
            inner.state.speaker_mode = speaker_mode;
            inner.state.mic_muted = mic_muted;
        });
    }

    /// Apply a microphone mute the server confirmed
    pub fn apply_mic_mute(&self, mic_muted: bool) {
        self.update(|inner| inner.state.mic_muted = mic_muted);
    }

    /// Take in a default sink change or an out-of-band volume/mute change.
    ///
    /// Subscribers are only notified when the public status changed, so a
    /// burst of identical server events does not flood them.
    pub fn observe_server_reported_sink_change(&self, report: &SinkReport) {
        let (before, after) = {
            let mut inner = self.lock();
            let before = AudioStatus::from(&inner.state);

            inner.state.default_sink_name = Some(report.name.clone());
            inner.state.default_sink_index = Some(report.index);
            inner.state.volume = volume::units_to_percent(report.volume);
            inner.state.muted = report.muted;

            (before, AudioStatus::from(&inner.state))
        };

        debug!(
            sink = %report.name,
            volume = after.volume,
            muted = after.mute,
            "Server reported sink state"
        );

        // Servers repeat sink events for unrelated property changes; only a
        // visible status change is worth a notification.
        if before != after {
            self.notify(after);
        }
    }

    /// Stream of status notifications
    ///
    /// Yields one item per confirmed or server-reported change.
    pub fn subscribe(&self) -> impl Stream<Item = AudioStatus> + Send + 'static {
        use async_stream::stream;

        let mut status_rx = self.status_tx.subscribe();
        stream! {
            loop {
                match status_rx.recv().await {
                    Ok(status) => yield status,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Status subscriber lagged, skipped {skipped} updates");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    fn update(&self, apply: impl FnOnce(&mut Inner)) {
        let status = {
            let mut inner = self.lock();
            apply(&mut inner);
            AudioStatus::from(&inner.state)
        };
        self.notify(status);
    }

    fn notify(&self, status: AudioStatus) {
        let _ = self.status_tx.send(status);
    }
}
