use std::{cell::RefCell, collections::HashMap, rc::Rc};

use libpulse_binding::stream::Stream;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::services::audio::port::{
    CardSnapshot, ListEntry, MediaRole, PortError, PortEvent, SampleFormat, SampleSource,
    SinkSnapshot, SourceSnapshot,
};

/// Completion of one request
pub type Reply<T> = oneshot::Sender<Result<T, PortError>>;

/// Receiving side of one enumeration pass
pub type ListSender<T> = mpsc::UnboundedSender<ListEntry<T>>;

/// Channel sender for server events
pub type EventSender = broadcast::Sender<PortEvent>;

/// Channel sender for backend commands
pub type CommandSender = mpsc::UnboundedSender<PulseCommand>;

/// Receiving side of the backend command channel
pub type CommandReceiver = mpsc::UnboundedReceiver<PulseCommand>;

pub(super) type InternalCommandSender = mpsc::UnboundedSender<InternalCommand>;

/// Identifier of an in-flight sample upload
pub(super) type UploadId = u64;

/// Requests sent to the backend thread
pub enum PulseCommand {
    /// Enumerate cards
    EnumerateCards(ListSender<CardSnapshot>),
    /// Enumerate sinks
    EnumerateSinks(ListSender<SinkSnapshot>),
    /// Enumerate sources
    EnumerateSources(ListSender<SourceSnapshot>),
    /// Activate a card profile
    SetCardProfile {
        /// Card name
        card: String,
        /// Profile name
        profile: String,
        /// Completion
        reply: Reply<()>,
    },
    /// Activate a sink port
    SetSinkPort {
        /// Sink name
        sink: String,
        /// Port name
        port: String,
        /// Completion
        reply: Reply<()>,
    },
    /// Activate a source port
    SetSourcePort {
        /// Source name
        source: String,
        /// Port name
        port: String,
        /// Completion
        reply: Reply<()>,
    },
    /// Mute or unmute a source
    SetSourceMute {
        /// Source name
        source: String,
        /// Mute state
        muted: bool,
        /// Completion
        reply: Reply<()>,
    },
    /// Set every channel of a sink to one volume
    SetSinkVolume {
        /// Sink name
        sink: String,
        /// Volume in server units
        volume: u32,
        /// Completion
        reply: Reply<()>,
    },
    /// Mute or unmute a sink
    SetSinkMute {
        /// Sink name
        sink: String,
        /// Mute state
        muted: bool,
        /// Completion
        reply: Reply<()>,
    },
    /// Query the default sink name
    DefaultSinkName(Reply<Option<String>>),
    /// Upload a sample into the server's sample cache
    UploadSample {
        /// Sample name
        name: String,
        /// Sample format
        format: SampleFormat,
        /// Byte source pulled in server-sized chunks
        source: Box<dyn SampleSource>,
        /// Completion
        reply: Reply<()>,
    },
    /// Play a cached sample
    PlaySample {
        /// Sample name
        name: String,
        /// Sink name
        sink: String,
        /// Volume in server units
        volume: u32,
        /// Media role hint
        role: MediaRole,
        /// Completion
        reply: Reply<()>,
    },
    /// Shutdown backend
    Shutdown,
}

/// Follow-up work scheduled from inside libpulse callbacks
pub(super) enum InternalCommand {
    /// Context state changed
    CheckConnection,
    /// Server facility changed; the default sink may be different
    RefreshDefaultSink,
    /// Server reported this default sink name
    ReportDefaultSink(String),
    /// A sink changed
    SinkChanged(u32),
    /// Channel count of the target sink is known
    ApplySinkVolume {
        sink: String,
        channels: u8,
        volume: u32,
        reply: Reply<()>,
    },
    /// Reading or writing an upload failed
    AbortUpload { id: UploadId, error: PortError },
    /// Upload stream reached a terminal state
    ReapUpload(UploadId),
}

/// Default sink as last seen by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct DefaultSink {
    pub name: String,
    pub index: u32,
}

pub(super) type DefaultSinkStore = Rc<RefCell<Option<DefaultSink>>>;

/// One in-flight upload
pub(super) struct UploadSlot {
    pub stream: Rc<RefCell<Stream>>,
    pub reply: Rc<RefCell<Option<Reply<()>>>>,
}

/// State owned by the backend thread
pub(super) struct BackendState {
    pub events_tx: EventSender,
    pub internal_tx: InternalCommandSender,
    pub default_sink: DefaultSinkStore,
    pub uploads: HashMap<UploadId, UploadSlot>,
    next_upload_id: UploadId,
}

impl BackendState {
    pub fn new(events_tx: EventSender, internal_tx: InternalCommandSender) -> Self {
        Self {
            events_tx,
            internal_tx,
            default_sink: Rc::new(RefCell::new(None)),
            uploads: HashMap::new(),
            next_upload_id: 0,
        }
    }

    pub fn next_upload_id(&mut self) -> UploadId {
        self.next_upload_id += 1;
        self.next_upload_id
    }
}
