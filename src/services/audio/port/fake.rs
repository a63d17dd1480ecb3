//! In-memory port recording every call, for tests.

use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_stream::stream;
use async_trait::async_trait;
use futures::{StreamExt, stream::BoxStream};
use tokio::sync::broadcast;

use super::{
    AudioControlPort, CardProfile, CardSnapshot, Enumeration, ListEntry, MediaRole, Port,
    PortAvailability, PortError, PortEvent, SampleFormat, SampleSource, SinkSnapshot,
    SourceSnapshot,
};
use crate::services::audio::{routing::policy, volume};

/// Calls the fake received, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortCall {
    EnumerateCards,
    EnumerateSinks,
    EnumerateSources,
    SetCardProfile { card: String, profile: String },
    SetSinkPort { sink: String, port: String },
    SetSourcePort { source: String, port: String },
    SetSourceMute { source: String, muted: bool },
    SetSinkVolume { sink: String, volume: u32 },
    SetSinkMute { sink: String, muted: bool },
    DefaultSinkName,
    UploadSample { name: String, format: SampleFormat, bytes: Vec<u8> },
    PlaySample { name: String, sink: String, volume: u32, role: MediaRole },
}

impl PortCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            PortCall::EnumerateCards
                | PortCall::EnumerateSinks
                | PortCall::EnumerateSources
                | PortCall::DefaultSinkName
        )
    }
}

#[derive(Debug, Default)]
struct FakeState {
    cards: Vec<CardSnapshot>,
    sinks: Vec<SinkSnapshot>,
    sources: Vec<SourceSnapshot>,
    default_sink: Option<String>,
    calls: Vec<PortCall>,
    failing: HashSet<&'static str>,
    truncated: bool,
    listing_error: bool,
    disconnected: bool,
}

pub struct FakePort {
    state: Mutex<FakeState>,
    events_tx: broadcast::Sender<PortEvent>,
    upload_chunk: usize,
}

impl Default for FakePort {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePort {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(FakeState::default()),
            events_tx,
            upload_chunk: 3,
        }
    }

    /// Voice card, handset sink, built-in mic source and its monitor.
    pub fn handset() -> Self {
        let port = Self::new();
        {
            let mut state = port.lock();
            state.cards = vec![
                CardSnapshot {
                    name: String::from("card.usb"),
                    profiles: vec![CardProfile::new("output:analog-stereo", 50)],
                    active_profile: Some(String::from("output:analog-stereo")),
                },
                CardSnapshot {
                    name: String::from("card.modem"),
                    profiles: vec![
                        CardProfile::new("default", 100),
                        CardProfile::new(policy::VOICE_CALL_PROFILE, 10),
                    ],
                    active_profile: Some(String::from("default")),
                },
            ];
            state.sinks = vec![sink(
                "sink.primary",
                0,
                vec![
                    Port::new(policy::EARPIECE_PORT, 0, PortAvailability::Unknown),
                    Port::new(policy::SPEAKER_PORT, 10, PortAvailability::Unknown),
                    Port::new(policy::WIRED_HEADSET_PORT, 5, PortAvailability::No),
                ],
                policy::SPEAKER_PORT,
            )];
            state.sources = vec![
                SourceSnapshot {
                    name: String::from("sink.primary.monitor"),
                    index: 0,
                    ports: vec![Port::new(policy::BUILTIN_MIC_PORT, 0, PortAvailability::Unknown)],
                    active_port: None,
                    muted: false,
                    monitor_of_sink: Some(0),
                },
                SourceSnapshot {
                    name: String::from("source.primary"),
                    index: 1,
                    ports: vec![
                        Port::new(policy::BUILTIN_MIC_PORT, 10, PortAvailability::Unknown),
                        Port::new(policy::HEADSET_MIC_PORT, 5, PortAvailability::No),
                    ],
                    active_port: Some(String::from(policy::BUILTIN_MIC_PORT)),
                    muted: false,
                    monitor_of_sink: None,
                },
            ];
            state.default_sink = Some(String::from("sink.primary"));
        }
        port
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_cards(&self, cards: Vec<CardSnapshot>) {
        self.lock().cards = cards;
    }

    pub fn set_sinks(&self, sinks: Vec<SinkSnapshot>) {
        self.lock().sinks = sinks;
    }

    pub fn set_sources(&self, sources: Vec<SourceSnapshot>) {
        self.lock().sources = sources;
    }

    pub fn set_default_sink(&self, name: Option<&str>) {
        self.lock().default_sink = name.map(String::from);
    }

    /// Make every call of `operation` report failure
    pub fn fail(&self, operation: &'static str) {
        self.lock().failing.insert(operation);
    }

    /// End enumerations without their end marker
    pub fn truncate_enumerations(&self) {
        self.lock().truncated = true;
    }

    /// End enumerations with a server-reported error instead of their end marker
    pub fn fail_listings(&self) {
        self.lock().listing_error = true;
    }

    /// Fail every call as if the connection was lost
    pub fn disconnect(&self) {
        self.lock().disconnected = true;
    }

    pub fn calls(&self) -> Vec<PortCall> {
        self.lock().calls.clone()
    }

    pub fn mutations(&self) -> Vec<PortCall> {
        self.calls().into_iter().filter(PortCall::is_mutation).collect()
    }

    pub fn uploads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, PortCall::UploadSample { .. }))
            .count()
    }

    pub fn plays(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, PortCall::PlaySample { .. }))
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn sink(&self, name: &str) -> Option<SinkSnapshot> {
        self.lock().sinks.iter().find(|s| s.name == name).cloned()
    }

    pub fn source(&self, name: &str) -> Option<SourceSnapshot> {
        self.lock().sources.iter().find(|s| s.name == name).cloned()
    }

    pub fn emit(&self, event: PortEvent) {
        let _ = self.events_tx.send(event);
    }

    fn record(&self, operation: &'static str, call: PortCall) -> Result<(), PortError> {
        let mut state = self.lock();
        if state.disconnected {
            return Err(PortError::Disconnected);
        }
        state.calls.push(call);
        if state.failing.contains(operation) {
            return Err(PortError::failed(operation, "rejected by fake server"));
        }
        Ok(())
    }

    fn listing<T: Send + 'static>(&self, items: Vec<T>) -> Enumeration<T> {
        let (truncated, listing_error) = {
            let state = self.lock();
            (state.truncated, state.listing_error)
        };
        let mut entries: Vec<ListEntry<T>> = items.into_iter().map(ListEntry::Item).collect();
        if listing_error {
            entries.push(ListEntry::Failed(PortError::failed(
                "enumerate",
                "listing rejected by fake server",
            )));
        } else if !truncated {
            entries.push(ListEntry::End);
        }
        futures::stream::iter(entries).boxed()
    }
}

pub fn sink(name: &str, index: u32, ports: Vec<Port>, active: &str) -> SinkSnapshot {
    SinkSnapshot {
        name: name.to_string(),
        index,
        ports,
        active_port: Some(active.to_string()),
        volume: volume::percent_to_units(50),
        muted: false,
    }
}

#[async_trait]
impl AudioControlPort for FakePort {
    async fn enumerate_cards(&self) -> Result<Enumeration<CardSnapshot>, PortError> {
        self.record("enumerate", PortCall::EnumerateCards)?;
        let cards = self.lock().cards.clone();
        Ok(self.listing(cards))
    }

    async fn enumerate_sinks(&self) -> Result<Enumeration<SinkSnapshot>, PortError> {
        self.record("enumerate", PortCall::EnumerateSinks)?;
        let sinks = self.lock().sinks.clone();
        Ok(self.listing(sinks))
    }

    async fn enumerate_sources(&self) -> Result<Enumeration<SourceSnapshot>, PortError> {
        self.record("enumerate", PortCall::EnumerateSources)?;
        let sources = self.lock().sources.clone();
        Ok(self.listing(sources))
    }

    async fn set_card_profile(&self, card: &str, profile: &str) -> Result<(), PortError> {
        self.record(
            "set card profile",
            PortCall::SetCardProfile {
                card: card.to_string(),
                profile: profile.to_string(),
            },
        )?;
        if let Some(entry) = self.lock().cards.iter_mut().find(|c| c.name == card) {
            entry.active_profile = Some(profile.to_string());
        }
        Ok(())
    }

    async fn set_sink_port(&self, sink: &str, port: &str) -> Result<(), PortError> {
        self.record(
            "set sink port",
            PortCall::SetSinkPort {
                sink: sink.to_string(),
                port: port.to_string(),
            },
        )?;
        if let Some(entry) = self.lock().sinks.iter_mut().find(|s| s.name == sink) {
            entry.active_port = Some(port.to_string());
        }
        Ok(())
    }

    async fn set_source_port(&self, source: &str, port: &str) -> Result<(), PortError> {
        self.record(
            "set source port",
            PortCall::SetSourcePort {
                source: source.to_string(),
                port: port.to_string(),
            },
        )?;
        if let Some(entry) = self.lock().sources.iter_mut().find(|s| s.name == source) {
            entry.active_port = Some(port.to_string());
        }
        Ok(())
    }

    async fn set_source_mute(&self, source: &str, muted: bool) -> Result<(), PortError> {
        self.record(
            "set source mute",
            PortCall::SetSourceMute {
                source: source.to_string(),
                muted,
            },
        )?;
        if let Some(entry) = self.lock().sources.iter_mut().find(|s| s.name == source) {
            entry.muted = muted;
        }
        Ok(())
    }

    async fn set_sink_volume(&self, sink: &str, volume: u32) -> Result<(), PortError> {
        self.record(
            "set sink volume",
            PortCall::SetSinkVolume {
                sink: sink.to_string(),
                volume,
            },
        )?;
        if let Some(entry) = self.lock().sinks.iter_mut().find(|s| s.name == sink) {
            entry.volume = volume;
        }
        Ok(())
    }

    async fn set_sink_mute(&self, sink: &str, muted: bool) -> Result<(), PortError> {
        self.record(
            "set sink mute",
            PortCall::SetSinkMute {
                sink: sink.to_string(),
                muted,
            },
        )?;
        if let Some(entry) = self.lock().sinks.iter_mut().find(|s| s.name == sink) {
            entry.muted = muted;
        }
        Ok(())
    }

    async fn default_sink_name(&self) -> Result<Option<String>, PortError> {
        self.record("default sink", PortCall::DefaultSinkName)?;
        Ok(self.lock().default_sink.clone())
    }

    async fn upload_sample(
        &self,
        name: &str,
        format: SampleFormat,
        mut source: Box<dyn SampleSource>,
    ) -> Result<(), PortError> {
        let mut bytes = Vec::with_capacity(source.declared_len());
        while !source.is_complete() {
            let chunk = source
                .pull(self.upload_chunk)
                .map_err(|e| PortError::failed("upload sample", e.to_string()))?;
            bytes.extend(chunk);
        }

        self.record(
            "upload sample",
            PortCall::UploadSample {
                name: name.to_string(),
                format,
                bytes,
            },
        )
    }

    async fn play_sample(
        &self,
        name: &str,
        sink: &str,
        volume: u32,
        role: MediaRole,
    ) -> Result<(), PortError> {
        self.record(
            "play sample",
            PortCall::PlaySample {
                name: name.to_string(),
                sink: sink.to_string(),
                volume,
                role,
            },
        )
    }

    fn events(&self) -> BoxStream<'static, PortEvent> {
        let mut events_rx = self.events_tx.subscribe();
        stream! {
            loop {
                match events_rx.recv().await {
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
        .boxed()
    }
}
