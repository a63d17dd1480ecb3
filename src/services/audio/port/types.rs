use std::fmt;

use super::PortError;

/// Availability of a port as reported by the audio server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PortAvailability {
    /// The server does not know whether anything is plugged in.
    #[default]
    Unknown,
    /// The jack is unplugged; the port must never be selected.
    No,
    /// The jack is plugged in.
    Yes,
}

impl PortAvailability {
    /// Whether a port with this availability may be selected.
    pub fn is_selectable(self) -> bool {
        self != PortAvailability::No
    }
}

/// Port descriptor on a sink or source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    /// Port name, e.g. `output-speaker`
    pub name: String,
    /// Server-assigned priority, higher wins
    pub priority: u32,
    /// Plug state
    pub available: PortAvailability,
}

impl Port {
    /// Create a port descriptor
    pub fn new(name: impl Into<String>, priority: u32, available: PortAvailability) -> Self {
        Self {
            name: name.into(),
            priority,
            available,
        }
    }
}

/// Card profile descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardProfile {
    /// Profile name, e.g. `voicecall`
    pub name: String,
    /// Server-assigned priority, higher wins
    pub priority: u32,
    /// Whether the profile can currently be activated
    pub available: bool,
}

impl CardProfile {
    /// Create an available profile descriptor
    pub fn new(name: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            priority,
            available: true,
        }
    }
}

/// A card as reported by one enumeration pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSnapshot {
    /// Card name
    pub name: String,
    /// All profiles the card offers
    pub profiles: Vec<CardProfile>,
    /// Name of the profile active at query time
    pub active_profile: Option<String>,
}

/// A sink as reported by one enumeration pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSnapshot {
    /// Sink name
    pub name: String,
    /// Server index
    pub index: u32,
    /// Output ports
    pub ports: Vec<Port>,
    /// Name of the port active at query time
    pub active_port: Option<String>,
    /// Average channel volume in server units
    pub volume: u32,
    /// Mute flag
    pub muted: bool,
}

/// A source as reported by one enumeration pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSnapshot {
    /// Source name
    pub name: String,
    /// Server index
    pub index: u32,
    /// Input ports
    pub ports: Vec<Port>,
    /// Name of the port active at query time
    pub active_port: Option<String>,
    /// Mute flag
    pub muted: bool,
    /// Index of the sink this source monitors, if it is a monitor source
    pub monitor_of_sink: Option<u32>,
}

/// One entry of an enumeration.
///
/// Every enumeration ends with exactly one [`ListEntry::End`] or
/// [`ListEntry::Failed`]. A stream that finishes without either was cut short
/// by a lost connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEntry<T> {
    /// A device descriptor
    Item(T),
    /// Batch completion marker
    End,
    /// The server reported an error for the listing
    Failed(PortError),
}

/// Default sink properties carried by server events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReport {
    /// Sink name
    pub name: String,
    /// Server index
    pub index: u32,
    /// Average channel volume in server units
    pub volume: u32,
    /// Mute flag
    pub muted: bool,
}

impl From<&SinkSnapshot> for SinkReport {
    fn from(sink: &SinkSnapshot) -> Self {
        Self {
            name: sink.name.clone(),
            index: sink.index,
            volume: sink.volume,
            muted: sink.muted,
        }
    }
}

/// Unsolicited notifications from the audio server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortEvent {
    /// The server switched its default output device
    DefaultSinkChanged(SinkReport),
    /// Volume or mute of the default output device changed out-of-band
    SinkPropertiesChanged(SinkReport),
}

/// Sample encoding used for uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEncoding {
    /// Signed 16-bit little-endian PCM
    S16Le,
}

/// Format contract of an uploaded sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleFormat {
    /// Sample encoding
    pub encoding: SampleEncoding,
    /// Frames per second
    pub rate: u32,
    /// Interleaved channel count
    pub channels: u8,
}

/// Format of every feedback sample: mono, S16LE, 44.1 kHz.
pub const FEEDBACK_SAMPLE_FORMAT: SampleFormat = SampleFormat {
    encoding: SampleEncoding::S16Le,
    rate: 44100,
    channels: 1,
};

/// Media role hint attached to playback requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaRole {
    /// Short event sound; lets the server duck concurrent audio
    Event,
}

impl MediaRole {
    /// Value of the `media.role` property
    pub fn as_str(self) -> &'static str {
        match self {
            MediaRole::Event => "event",
        }
    }
}

impl fmt::Display for MediaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
