use libpulse_binding::{
    callbacks::ListResult,
    context::Context,
    proplist::{Proplist, properties},
    volume::Volume as PulseVolume,
};
use tracing::{debug, warn};

use super::{
    conversion::{card_snapshot, channel_volumes, sink_snapshot, source_snapshot},
    events::{refresh_default_sink, report_default_sink, sink_changed},
    types::{BackendState, InternalCommand, ListSender, PulseCommand, Reply},
    upload::{abort_upload, reap_upload, start_upload},
};
use crate::services::audio::port::{ListEntry, MediaRole, PortError};

/// Outcome of one handled command
pub(super) enum Flow {
    Continue,
    Exit,
}

/// Handle external PulseAudio commands (service-initiated)
pub(super) fn handle_external_command(
    context: &mut Context,
    state: &mut BackendState,
    command: PulseCommand,
) -> Flow {
    match command {
        PulseCommand::EnumerateCards(list_tx) => {
            let mut list_tx = Some(list_tx);
            context.introspect().get_card_info_list(move |result| {
                forward_list_entry(&mut list_tx, list_entry(result, card_snapshot));
            });
        }
        PulseCommand::EnumerateSinks(list_tx) => {
            let mut list_tx = Some(list_tx);
            context.introspect().get_sink_info_list(move |result| {
                forward_list_entry(&mut list_tx, list_entry(result, sink_snapshot));
            });
        }
        PulseCommand::EnumerateSources(list_tx) => {
            let mut list_tx = Some(list_tx);
            context.introspect().get_source_info_list(move |result| {
                forward_list_entry(&mut list_tx, list_entry(result, source_snapshot));
            });
        }
        PulseCommand::SetCardProfile {
            card,
            profile,
            reply,
        } => {
            context.introspect().set_card_profile_by_name(
                &card,
                &profile,
                Some(reply_on_success("set card profile", reply)),
            );
        }
        PulseCommand::SetSinkPort { sink, port, reply } => {
            context.introspect().set_sink_port_by_name(
                &sink,
                &port,
                Some(reply_on_success("set sink port", reply)),
            );
        }
        PulseCommand::SetSourcePort {
            source,
            port,
            reply,
        } => {
            context.introspect().set_source_port_by_name(
                &source,
                &port,
                Some(reply_on_success("set source port", reply)),
            );
        }
        PulseCommand::SetSourceMute {
            source,
            muted,
            reply,
        } => {
            context.introspect().set_source_mute_by_name(
                &source,
                muted,
                Some(reply_on_success("set source mute", reply)),
            );
        }
        PulseCommand::SetSinkMute { sink, muted, reply } => {
            context.introspect().set_sink_mute_by_name(
                &sink,
                muted,
                Some(reply_on_success("set sink mute", reply)),
            );
        }
        PulseCommand::SetSinkVolume {
            sink,
            volume,
            reply,
        } => {
            query_sink_channels(context, state, sink, volume, reply);
        }
        PulseCommand::DefaultSinkName(reply) => {
            let mut reply = Some(reply);
            context.introspect().get_server_info(move |server_info| {
                if let Some(reply) = reply.take() {
                    let name = server_info
                        .default_sink_name
                        .as_ref()
                        .map(|name| name.to_string());
                    let _ = reply.send(Ok(name));
                }
            });
        }
        PulseCommand::UploadSample {
            name,
            format,
            source,
            reply,
        } => {
            start_upload(context, state, &name, format, source, reply);
        }
        PulseCommand::PlaySample {
            name,
            sink,
            volume,
            role,
            reply,
        } => {
            play_sample(context, &name, &sink, volume, role, reply);
        }
        PulseCommand::Shutdown => return Flow::Exit,
    }

    Flow::Continue
}

/// Handle internal PulseAudio commands (callback-initiated)
pub(super) fn handle_internal_command(
    context: &mut Context,
    state: &mut BackendState,
    command: InternalCommand,
) -> Flow {
    match command {
        InternalCommand::CheckConnection => {
            use libpulse_binding::context::State;

            match context.get_state() {
                State::Failed | State::Terminated => {
                    warn!("PulseAudio connection lost");
                    return Flow::Exit;
                }
                _ => {}
            }
        }
        InternalCommand::RefreshDefaultSink => refresh_default_sink(context, state),
        InternalCommand::ReportDefaultSink(name) => report_default_sink(context, state, name),
        InternalCommand::SinkChanged(index) => sink_changed(context, state, index),
        InternalCommand::ApplySinkVolume {
            sink,
            channels,
            volume,
            reply,
        } => {
            let volumes = channel_volumes(channels, volume);
            context.introspect().set_sink_volume_by_name(
                &sink,
                &volumes,
                Some(reply_on_success("set sink volume", reply)),
            );
        }
        InternalCommand::AbortUpload { id, error } => abort_upload(state, id, error),
        InternalCommand::ReapUpload(id) => reap_upload(state, id),
    }

    Flow::Continue
}

fn list_entry<T: ?Sized, U>(result: ListResult<&T>, convert: impl FnOnce(&T) -> U) -> ListEntry<U> {
    match result {
        ListResult::Item(item) => ListEntry::Item(convert(item)),
        ListResult::End => ListEntry::End,
        ListResult::Error => {
            ListEntry::Failed(PortError::failed("enumerate", "server reported a listing error"))
        }
    }
}

/// Forward one enumeration entry; after the terminal entry the sender is
/// dropped so the receiving stream ends.
fn forward_list_entry<T>(list_tx: &mut Option<ListSender<T>>, entry: ListEntry<T>) {
    match entry {
        ListEntry::Item(item) => {
            if let Some(tx) = list_tx {
                let _ = tx.send(ListEntry::Item(item));
            }
        }
        terminal => {
            if let ListEntry::Failed(e) = &terminal {
                warn!(error = %e, "PulseAudio enumeration failed");
            }
            if let Some(tx) = list_tx.take() {
                let _ = tx.send(terminal);
            }
        }
    }
}

fn reply_on_success(operation: &'static str, reply: Reply<()>) -> Box<dyn FnMut(bool)> {
    let mut reply = Some(reply);
    Box::new(move |success| {
        if let Some(reply) = reply.take() {
            let result = if success {
                Ok(())
            } else {
                Err(PortError::failed(operation, "rejected by server"))
            };
            let _ = reply.send(result);
        }
    })
}

/// Look up the channel count before setting a volume on every channel
fn query_sink_channels(
    context: &Context,
    state: &BackendState,
    sink: String,
    volume: u32,
    reply: Reply<()>,
) {
    let internal_tx = state.internal_tx.clone();
    let mut pending = Some(reply);
    let target = sink.clone();

    context
        .introspect()
        .get_sink_info_by_name(&sink, move |result| match result {
            ListResult::Item(sink_info) => {
                if let Some(reply) = pending.take() {
                    let _ = internal_tx.send(InternalCommand::ApplySinkVolume {
                        sink: target.clone(),
                        channels: sink_info.volume.len(),
                        volume,
                        reply,
                    });
                }
            }
            ListResult::End | ListResult::Error => {
                if let Some(reply) = pending.take() {
                    let _ = reply.send(Err(PortError::failed(
                        "set sink volume",
                        format!("no sink named {target}"),
                    )));
                }
            }
        });
}

fn play_sample(
    context: &mut Context,
    name: &str,
    sink: &str,
    volume: u32,
    role: MediaRole,
    reply: Reply<()>,
) {
    let Some(mut proplist) = Proplist::new() else {
        let _ = reply.send(Err(PortError::failed("play sample", "could not allocate proplist")));
        return;
    };
    if proplist.set_str(properties::MEDIA_ROLE, role.as_str()).is_err() {
        let _ = reply.send(Err(PortError::failed("play sample", "could not set media role")));
        return;
    }

    let mut reply = Some(reply);
    let sample = name.to_string();
    context.play_sample_with_proplist(
        name,
        Some(sink),
        Some(PulseVolume(volume)),
        &proplist,
        Some(Box::new(move |result: Result<u32, ()>| {
            if let Some(reply) = reply.take() {
                let outcome = result.map(|_| ()).map_err(|()| {
                    PortError::failed("play sample", format!("server refused '{sample}'"))
                });
                let _ = reply.send(outcome);
            }
        })),
    );
    debug!(name, sink, "Playback requested");
}
