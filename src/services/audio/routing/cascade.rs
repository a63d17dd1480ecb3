//! Call-mode orchestration: cards, then sinks, then sources.

use futures::StreamExt;
use tracing::{debug, info, instrument};

use super::policy::{
    Decision, InputChange, RoutingIntent, choose_card_profile, choose_input_port,
    choose_output_port,
};
use crate::services::audio::{
    error::AudioError,
    port::{AudioControlPort, Enumeration, ListEntry, PortError, SourceSnapshot},
};

/// Progress of one cascade run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStage {
    /// Looking for the voice card
    EnumeratingCards,
    /// Looking for the voice sink
    EnumeratingSinks,
    /// Looking for the routing source
    EnumeratingSources,
    /// Terminal
    Completed,
}

/// Mutations a successful cascade performed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CascadeReport {
    /// Profile activated on the voice card
    pub card_profile: Option<String>,
    /// Port activated on the voice sink
    pub sink_port: Option<String>,
    /// Changes applied to the routing source
    pub source: Option<InputChange>,
}

/// One enumeration pass of one device class.
///
/// The first matching descriptor decides; everything after it in the same
/// pass is ignored. Lives only as long as the pass.
struct StagePass<D> {
    decision_taken: bool,
    decision: Option<(String, Decision<D>)>,
}

impl<D> StagePass<D> {
    fn new() -> Self {
        Self {
            decision_taken: false,
            decision: None,
        }
    }

    fn offer(&mut self, device: &str, decision: Decision<D>) {
        if self.decision_taken || !decision.is_match() {
            return;
        }
        self.decision_taken = true;
        self.decision = Some((device.to_string(), decision));
    }

    fn finish(self, class: &str) -> Result<(String, Decision<D>), AudioError> {
        self.decision
            .ok_or_else(|| AudioError::DeviceNotFound(class.to_string()))
    }
}

/// Consume one enumeration and return the deciding device and decision.
async fn run_stage<T, D>(
    mut listing: Enumeration<T>,
    class: &str,
    decide: impl Fn(&T) -> (String, Decision<D>),
) -> Result<(String, Decision<D>), AudioError> {
    let mut pass = StagePass::new();

    while let Some(entry) = listing.next().await {
        match entry {
            ListEntry::Item(item) => {
                let (device, decision) = decide(&item);
                pass.offer(&device, decision);
            }
            ListEntry::End => return pass.finish(class),
            ListEntry::Failed(e) => return Err(AudioError::UpstreamFailure(e)),
        }
    }

    Err(AudioError::UpstreamFailure(PortError::Disconnected))
}

fn decide_source(
    source: &SourceSnapshot,
    intent: &RoutingIntent,
) -> (String, Decision<InputChange>) {
    let decision = if source.monitor_of_sink.is_some() {
        Decision::Skip
    } else {
        choose_input_port(
            &source.ports,
            source.active_port.as_deref(),
            source.muted,
            intent,
        )
    };
    (source.name.clone(), decision)
}

/// One call-mode request driven to completion
pub struct CallModeCascade<'a> {
    port: &'a dyn AudioControlPort,
    intent: RoutingIntent,
}

impl<'a> CallModeCascade<'a> {
    /// Prepare a cascade for `intent`
    pub fn new(port: &'a dyn AudioControlPort, intent: RoutingIntent) -> Self {
        Self { port, intent }
    }

    /// Run every stage in order.
    ///
    /// A stage only starts after the previous stage's mutation is confirmed.
    ///
    /// # Errors
    /// - [`AudioError::DeviceNotFound`] when a stage finds no voice-capable device
    /// - [`AudioError::UpstreamFailure`] when a mutation fails or the connection drops
    #[instrument(
        skip(self),
        fields(
            in_call = self.intent.in_call,
            speaker_mode = self.intent.speaker_mode,
            mic_muted = self.intent.mic_muted
        )
    )]
    pub async fn run(self) -> Result<CascadeReport, AudioError> {
        let card_profile = self.route_card().await?;
        let sink_port = self.route_sink().await?;
        let source = self.route_source().await?;

        debug!(stage = ?CascadeStage::Completed, "Call mode cascade finished");
        Ok(CascadeReport {
            card_profile,
            sink_port,
            source,
        })
    }

    async fn route_card(&self) -> Result<Option<String>, AudioError> {
        debug!(stage = ?CascadeStage::EnumeratingCards);
        let cards = self.port.enumerate_cards().await?;
        let (card, decision) = run_stage(cards, "voice card", |card| {
            let decision =
                choose_card_profile(&card.profiles, card.active_profile.as_deref(), &self.intent);
            (card.name.clone(), decision)
        })
        .await?;

        match decision {
            Decision::Apply(profile) => {
                info!(card = %card, profile = %profile, "Switching card profile");
                self.port.set_card_profile(&card, &profile).await?;
                Ok(Some(profile))
            }
            _ => Ok(None),
        }
    }

    async fn route_sink(&self) -> Result<Option<String>, AudioError> {
        debug!(stage = ?CascadeStage::EnumeratingSinks);
        let sinks = self.port.enumerate_sinks().await?;
        let (sink, decision) = run_stage(sinks, "voice sink", |sink| {
            let decision =
                choose_output_port(&sink.ports, sink.active_port.as_deref(), &self.intent);
            (sink.name.clone(), decision)
        })
        .await?;

        match decision {
            Decision::Apply(port) => {
                info!(sink = %sink, port = %port, "Switching output port");
                self.port.set_sink_port(&sink, &port).await?;
                Ok(Some(port))
            }
            _ => Ok(None),
        }
    }

    async fn route_source(&self) -> Result<Option<InputChange>, AudioError> {
        debug!(stage = ?CascadeStage::EnumeratingSources);
        let sources = self.port.enumerate_sources().await?;
        let (source, decision) =
            run_stage(sources, "routing source", |s| decide_source(s, &self.intent)).await?;

        let Decision::Apply(change) = decision else {
            return Ok(None);
        };

        if let Some(port) = &change.port {
            info!(source = %source, port = %port, "Switching input port");
            self.port.set_source_port(&source, port).await?;
        }
        if let Some(muted) = change.mute {
            info!(source = %source, muted, "Pushing microphone mute");
            self.port.set_source_mute(&source, muted).await?;
        }

        Ok(Some(change))
    }
}

/// Push the microphone mute flag to the routing source.
///
/// Returns whether a mutation was issued; a source already matching the
/// request is left alone.
///
/// # Errors
/// - [`AudioError::DeviceNotFound`] when no routing source exists
/// - [`AudioError::UpstreamFailure`] when the mutation fails or the connection drops
#[instrument(skip(port))]
pub async fn push_mic_mute(port: &dyn AudioControlPort, mic_muted: bool) -> Result<bool, AudioError> {
    let intent = RoutingIntent {
        mic_muted,
        ..RoutingIntent::default()
    };

    let sources = port.enumerate_sources().await?;
    let (source, decision) =
        run_stage(sources, "routing source", |s| decide_source(s, &intent)).await?;

    match decision {
        Decision::Apply(_) => {
            info!(source = %source, mic_muted, "Setting microphone mute");
            port.set_source_mute(&source, mic_muted).await?;
            Ok(true)
        }
        _ => Ok(false),
    }
}
