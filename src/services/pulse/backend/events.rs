use libpulse_binding::{
    callbacks::ListResult,
    context::{
        Context,
        subscribe::{Facility, InterestMaskSet, Operation},
    },
};
use tracing::{debug, warn};

use super::{
    conversion::sink_snapshot,
    types::{BackendState, DefaultSink, InternalCommand, InternalCommandSender},
};
use crate::services::audio::port::{PortEvent, SinkReport};

type SubscriptionCallback = Option<Box<dyn FnMut(Option<Facility>, Option<Operation>, u32)>>;

/// Setup PulseAudio event subscription
///
/// Server changes may move the default sink; sink changes may alter its
/// volume or mute. Both are turned into internal commands.
pub fn setup_event_subscription(context: &mut Context, command_tx: InternalCommandSender) {
    let interest_mask = InterestMaskSet::SINK | InterestMaskSet::SERVER;

    let subscription_callback: SubscriptionCallback =
        Some(Box::new(move |facility, operation, index| {
            let command = match (facility, operation) {
                (Some(Facility::Server), Some(_)) => Some(InternalCommand::RefreshDefaultSink),
                (Some(Facility::Sink), Some(Operation::Changed)) => {
                    Some(InternalCommand::SinkChanged(index))
                }
                (Some(Facility::Sink), Some(Operation::Removed | Operation::New)) => {
                    Some(InternalCommand::RefreshDefaultSink)
                }
                _ => None,
            };

            if let Some(command) = command {
                let _ = command_tx.send(command);
            }
        }));

    context.set_subscribe_callback(subscription_callback);

    context.subscribe(interest_mask, |success: bool| {
        if !success {
            warn!("PulseAudio event subscription was rejected");
        }
    });
}

/// Ask the server for its default sink name
pub fn refresh_default_sink(context: &Context, state: &BackendState) {
    let internal_tx = state.internal_tx.clone();

    context.introspect().get_server_info(move |server_info| {
        if let Some(name) = &server_info.default_sink_name {
            let _ = internal_tx.send(InternalCommand::ReportDefaultSink(name.to_string()));
        }
    });
}

/// Query the reported default sink and publish it
pub fn report_default_sink(context: &Context, state: &BackendState, name: String) {
    let events_tx = state.events_tx.clone();
    let default_sink = state.default_sink.clone();
    let queried = name.clone();

    context
        .introspect()
        .get_sink_info_by_name(&name, move |result| match result {
            ListResult::Item(sink_info) => {
                let report = SinkReport::from(&sink_snapshot(sink_info));
                let current = DefaultSink {
                    name: report.name.clone(),
                    index: report.index,
                };

                let previous = default_sink.borrow_mut().replace(current);
                let event = match previous {
                    Some(previous) if previous.name == report.name => {
                        PortEvent::SinkPropertiesChanged(report)
                    }
                    _ => {
                        debug!(sink = %report.name, "Default sink is now");
                        PortEvent::DefaultSinkChanged(report)
                    }
                };
                let _ = events_tx.send(event);
            }
            ListResult::End => {}
            ListResult::Error => {
                warn!(sink = %queried, "Could not query default sink");
            }
        });
}

/// Publish new volume or mute of the default sink
pub fn sink_changed(context: &Context, state: &BackendState, index: u32) {
    let is_default = state
        .default_sink
        .borrow()
        .as_ref()
        .is_some_and(|sink| sink.index == index);
    if !is_default {
        return;
    }

    let events_tx = state.events_tx.clone();
    context
        .introspect()
        .get_sink_info_by_index(index, move |result| {
            if let ListResult::Item(sink_info) = result {
                let report = SinkReport::from(&sink_snapshot(sink_info));
                let _ = events_tx.send(PortEvent::SinkPropertiesChanged(report));
            }
        });
}
