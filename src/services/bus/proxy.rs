//! Client side of `org.audiod.Audio1`, used by the CLI.

use zbus::proxy;

use crate::services::audio::AudioStatus;

/// Audio control daemon.
#[proxy(
    default_service = "org.audiod.Audio",
    interface = "org.audiod.Audio1",
    default_path = "/org/audiod/Audio"
)]
pub trait Audio {
    /// Current volume, mute, call and microphone state.
    fn get_status(&self) -> zbus::Result<AudioStatus>;

    /// Set the output volume in percent (0..=100).
    fn set_volume(&self, volume: i32) -> zbus::Result<()>;

    /// Mute or unmute the output.
    fn set_mute(&self, mute: bool) -> zbus::Result<()>;

    /// Step the volume up.
    fn volume_up(&self) -> zbus::Result<()>;

    /// Step the volume down.
    fn volume_down(&self) -> zbus::Result<()>;

    /// Route audio for a call or back to media playback.
    fn set_call_mode(&self, in_call: bool, speaker_mode: bool) -> zbus::Result<()>;

    /// Mute or unmute the microphone.
    fn set_mic_mute(&self, mute: bool) -> zbus::Result<()>;

    /// Play a feedback sound.
    ///
    /// # Arguments
    /// * `name` - Sample name
    /// * `play` - False to only upload
    /// * `sink` - Sink to play on; empty for the default sink
    fn play_feedback(&self, name: &str, play: bool, sink: &str) -> zbus::Result<()>;

    /// Emitted after every status change.
    #[zbus(signal)]
    fn status_changed(&self, status: AudioStatus) -> zbus::Result<()>;
}
