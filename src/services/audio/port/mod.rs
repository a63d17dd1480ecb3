//! Audio Control Port: the asynchronous enumeration and mutation surface of
//! the audio server that the routing and feedback logic is written against.

mod error;
mod types;

#[cfg(test)]
pub(crate) mod fake;

use std::io;

use async_trait::async_trait;
use futures::stream::BoxStream;

pub use error::PortError;
pub use types::{
    CardProfile, CardSnapshot, FEEDBACK_SAMPLE_FORMAT, ListEntry, MediaRole, Port,
    PortAvailability, PortEvent, SampleEncoding, SampleFormat, SinkReport, SinkSnapshot,
    SourceSnapshot,
};

/// Stream of one enumeration pass, terminated by [`ListEntry::End`] or [`ListEntry::Failed`]
pub type Enumeration<T> = BoxStream<'static, ListEntry<T>>;

/// Byte source pulled by the port while uploading a sample.
///
/// The server decides the chunk sizes; the port calls [`pull`](Self::pull)
/// with each requested size until [`is_complete`](Self::is_complete).
pub trait SampleSource: Send + 'static {
    /// Exact number of bytes the upload announces.
    fn declared_len(&self) -> usize;

    /// Reads up to `requested` bytes, never past the declared length.
    ///
    /// # Errors
    /// Returns error if the underlying read fails or ends early
    fn pull(&mut self, requested: usize) -> io::Result<Vec<u8>>;

    /// Whether every declared byte has been handed out.
    fn is_complete(&self) -> bool;
}

/// Asynchronous access to the audio server.
///
/// Every method is a suspension point. Mutations resolve once the server
/// confirms them; enumerations yield descriptors as they arrive.
#[async_trait]
pub trait AudioControlPort: Send + Sync + 'static {
    /// Enumerate all cards
    ///
    /// # Errors
    /// Returns error if the request cannot reach the server
    async fn enumerate_cards(&self) -> Result<Enumeration<CardSnapshot>, PortError>;

    /// Enumerate all sinks
    ///
    /// # Errors
    /// Returns error if the request cannot reach the server
    async fn enumerate_sinks(&self) -> Result<Enumeration<SinkSnapshot>, PortError>;

    /// Enumerate all sources
    ///
    /// # Errors
    /// Returns error if the request cannot reach the server
    async fn enumerate_sources(&self) -> Result<Enumeration<SourceSnapshot>, PortError>;

    /// Activate a card profile
    ///
    /// # Errors
    /// Returns error if the server rejects the change or the connection drops
    async fn set_card_profile(&self, card: &str, profile: &str) -> Result<(), PortError>;

    /// Activate a sink port
    ///
    /// # Errors
    /// Returns error if the server rejects the change or the connection drops
    async fn set_sink_port(&self, sink: &str, port: &str) -> Result<(), PortError>;

    /// Activate a source port
    ///
    /// # Errors
    /// Returns error if the server rejects the change or the connection drops
    async fn set_source_port(&self, source: &str, port: &str) -> Result<(), PortError>;

    /// Mute or unmute a source
    ///
    /// # Errors
    /// Returns error if the server rejects the change or the connection drops
    async fn set_source_mute(&self, source: &str, muted: bool) -> Result<(), PortError>;

    /// Set the volume of every channel of a sink, in server units
    ///
    /// # Errors
    /// Returns error if the server rejects the change or the connection drops
    async fn set_sink_volume(&self, sink: &str, volume: u32) -> Result<(), PortError>;

    /// Mute or unmute a sink
    ///
    /// # Errors
    /// Returns error if the server rejects the change or the connection drops
    async fn set_sink_mute(&self, sink: &str, muted: bool) -> Result<(), PortError>;

    /// Name of the server's default sink, if any
    ///
    /// # Errors
    /// Returns error if the connection drops
    async fn default_sink_name(&self) -> Result<Option<String>, PortError>;

    /// Upload a sample into the server's sample cache.
    ///
    /// Resolves once the server has accepted all `source.declared_len()` bytes.
    ///
    /// # Errors
    /// Returns error if reading the source fails or the server rejects the upload
    async fn upload_sample(
        &self,
        name: &str,
        format: SampleFormat,
        source: Box<dyn SampleSource>,
    ) -> Result<(), PortError>;

    /// Play a previously uploaded sample.
    ///
    /// Resolves once the server accepted the request, not when playback ends.
    ///
    /// # Errors
    /// Returns error if the server refuses the request or the connection drops
    async fn play_sample(
        &self,
        name: &str,
        sink: &str,
        volume: u32,
        role: MediaRole,
    ) -> Result<(), PortError>;

    /// Unsolicited default-sink notifications
    fn events(&self) -> BoxStream<'static, PortEvent>;
}
