//! Pure routing decisions over server-reported topology.

use crate::services::audio::port::{CardProfile, Port};

/// Profile that routes audio through the modem
pub const VOICE_CALL_PROFILE: &str = "voicecall";
/// Handset receiver
pub const EARPIECE_PORT: &str = "output-earpiece";
/// Loudspeaker
pub const SPEAKER_PORT: &str = "output-speaker";
/// Wired headset output
pub const WIRED_HEADSET_PORT: &str = "output-wired_headset";
/// Wired headphones without microphone
pub const WIRED_HEADPHONE_PORT: &str = "output-wired_headphone";
/// Built-in microphone
pub const BUILTIN_MIC_PORT: &str = "input-builtin_mic";
/// Wired headset microphone
pub const HEADSET_MIC_PORT: &str = "input-wired_headset";

/// Desired end state of one call-mode request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoutingIntent {
    /// Route through the voice call profile
    pub in_call: bool,
    /// Prefer the loudspeaker
    pub speaker_mode: bool,
    /// Microphone should be muted
    pub mic_muted: bool,
}

/// Outcome of inspecting one device descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<T> {
    /// Not the device this stage is looking for
    Skip,
    /// The right device, already in the desired state
    Unchanged,
    /// The right device, needs this change
    Apply(T),
}

impl<T> Decision<T> {
    /// Whether this descriptor was the device the stage looks for
    pub fn is_match(&self) -> bool {
        !matches!(self, Decision::Skip)
    }
}

/// Changes needed on the routing source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputChange {
    /// Port to activate, when the preferred port is not active
    pub port: Option<String>,
    /// Mute flag to push, when the reported flag disagrees
    pub mute: Option<bool>,
}

fn highest_priority<'a, T>(
    items: &'a [T],
    selectable: impl Fn(&T) -> bool,
    priority: impl Fn(&T) -> u32,
) -> Option<&'a T> {
    items
        .iter()
        .filter(|item| selectable(item))
        .fold(None, |best: Option<&T>, item| match best {
            Some(current) if priority(current) >= priority(item) => Some(current),
            _ => Some(item),
        })
}

fn find_port<'a>(ports: &'a [Port], name: &str) -> Option<&'a Port> {
    ports.iter().find(|port| port.name == name)
}

fn find_selectable_port<'a>(ports: &'a [Port], name: &str) -> Option<&'a Port> {
    find_port(ports, name).filter(|port| port.available.is_selectable())
}

/// Pick the card profile for `intent`.
///
/// Cards without a `voicecall` profile are not the voice card. Leaving a
/// call falls back to the highest-priority available profile.
pub fn choose_card_profile(
    profiles: &[CardProfile],
    active_profile: Option<&str>,
    intent: &RoutingIntent,
) -> Decision<String> {
    let Some(voice_call) = profiles.iter().find(|p| p.name == VOICE_CALL_PROFILE) else {
        return Decision::Skip;
    };

    let voice_active = active_profile == Some(voice_call.name.as_str());

    if intent.in_call && !voice_active {
        return Decision::Apply(voice_call.name.clone());
    }

    if !intent.in_call && voice_active {
        return match highest_priority(profiles, |p| p.available, |p| p.priority) {
            Some(fallback) if fallback.name != voice_call.name => {
                Decision::Apply(fallback.name.clone())
            }
            _ => Decision::Unchanged,
        };
    }

    Decision::Unchanged
}

/// Pick the output port of the voice sink for `intent`.
///
/// Sinks without an earpiece are not the voice sink. Unplugged ports are
/// never chosen.
pub fn choose_output_port(
    ports: &[Port],
    active_port: Option<&str>,
    intent: &RoutingIntent,
) -> Decision<String> {
    let Some(earpiece) = find_port(ports, EARPIECE_PORT) else {
        return Decision::Skip;
    };

    let highest = highest_priority(ports, |p| p.available.is_selectable(), |p| p.priority);
    let headphones = find_selectable_port(ports, WIRED_HEADSET_PORT)
        .or_else(|| find_selectable_port(ports, WIRED_HEADPHONE_PORT));

    let preferred = if intent.speaker_mode {
        find_selectable_port(ports, SPEAKER_PORT)
    } else if intent.in_call {
        headphones.or(Some(earpiece).filter(|p| p.available.is_selectable()))
    } else {
        None
    };

    match preferred.or(highest) {
        Some(port) if active_port != Some(port.name.as_str()) => Decision::Apply(port.name.clone()),
        _ => Decision::Unchanged,
    }
}

/// Pick the input port of the routing source for `intent`.
///
/// Sources without a built-in microphone are not the routing source. A
/// change is needed when the preferred port is not active or when the
/// reported mute flag disagrees with the intent.
pub fn choose_input_port(
    ports: &[Port],
    active_port: Option<&str>,
    reported_mute: bool,
    intent: &RoutingIntent,
) -> Decision<InputChange> {
    let Some(builtin_mic) = find_port(ports, BUILTIN_MIC_PORT) else {
        return Decision::Skip;
    };

    let preferred = find_selectable_port(ports, HEADSET_MIC_PORT).unwrap_or(builtin_mic);

    let change = InputChange {
        port: (active_port != Some(preferred.name.as_str())).then(|| preferred.name.clone()),
        mute: (reported_mute != intent.mic_muted).then_some(intent.mic_muted),
    };

    if change.port.is_none() && change.mute.is_none() {
        Decision::Unchanged
    } else {
        Decision::Apply(change)
    }
}
