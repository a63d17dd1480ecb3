use std::borrow::Cow;

use libpulse_binding::{
    context::introspect::{CardInfo, SinkInfo, SourceInfo},
    def::PortAvailable,
    sample::{Format as PulseFormat, Spec},
    volume::{ChannelVolumes, Volume as PulseVolume},
};

use crate::services::audio::port::{
    CardProfile, CardSnapshot, Port, PortAvailability, SampleEncoding, SampleFormat,
    SinkSnapshot, SourceSnapshot,
};

fn cow_str_to_string(cow_str: Option<&Cow<str>>) -> String {
    cow_str.map(|s| s.to_string()).unwrap_or_default()
}

/// Convert PulseAudio port availability
pub fn port_availability(available: PortAvailable) -> PortAvailability {
    match available {
        PortAvailable::Yes => PortAvailability::Yes,
        PortAvailable::No => PortAvailability::No,
        PortAvailable::Unknown => PortAvailability::Unknown,
    }
}

/// Create a card snapshot from PulseAudio card information
pub fn card_snapshot(card_info: &CardInfo) -> CardSnapshot {
    let profiles = card_info
        .profiles
        .iter()
        .map(|profile| CardProfile {
            name: cow_str_to_string(profile.name.as_ref()),
            priority: profile.priority,
            available: profile.available,
        })
        .collect();

    CardSnapshot {
        name: cow_str_to_string(card_info.name.as_ref()),
        profiles,
        active_profile: card_info
            .active_profile
            .as_ref()
            .map(|profile| cow_str_to_string(profile.name.as_ref())),
    }
}

/// Create a sink snapshot from PulseAudio sink information
pub fn sink_snapshot(sink_info: &SinkInfo) -> SinkSnapshot {
    let ports = sink_info
        .ports
        .iter()
        .map(|port| {
            Port::new(
                cow_str_to_string(port.name.as_ref()),
                port.priority,
                port_availability(port.available),
            )
        })
        .collect();

    SinkSnapshot {
        name: cow_str_to_string(sink_info.name.as_ref()),
        index: sink_info.index,
        ports,
        active_port: sink_info
            .active_port
            .as_ref()
            .map(|port| cow_str_to_string(port.name.as_ref())),
        volume: sink_info.volume.avg().0,
        muted: sink_info.mute,
    }
}

/// Create a source snapshot from PulseAudio source information
pub fn source_snapshot(source_info: &SourceInfo) -> SourceSnapshot {
    let ports = source_info
        .ports
        .iter()
        .map(|port| {
            Port::new(
                cow_str_to_string(port.name.as_ref()),
                port.priority,
                port_availability(port.available),
            )
        })
        .collect();

    SourceSnapshot {
        name: cow_str_to_string(source_info.name.as_ref()),
        index: source_info.index,
        ports,
        active_port: source_info
            .active_port
            .as_ref()
            .map(|port| cow_str_to_string(port.name.as_ref())),
        muted: source_info.mute,
        monitor_of_sink: source_info.monitor_of_sink,
    }
}

/// Convert an upload format to a PulseAudio sample spec
pub fn sample_spec(format: SampleFormat) -> Spec {
    let pulse_format = match format.encoding {
        SampleEncoding::S16Le => PulseFormat::S16le,
    };

    Spec {
        format: pulse_format,
        rate: format.rate,
        channels: format.channels,
    }
}

/// Same volume on every one of `channels`
pub fn channel_volumes(channels: u8, units: u32) -> ChannelVolumes {
    let mut volumes = ChannelVolumes::default();
    volumes.set(channels.max(1), PulseVolume(units));
    volumes
}
