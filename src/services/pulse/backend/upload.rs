use std::{cell::RefCell, rc::Rc};

use libpulse_binding::{
    context::Context,
    stream::{SeekMode, State as StreamState, Stream},
};
use tracing::{debug, warn};

use super::{
    conversion::sample_spec,
    types::{BackendState, InternalCommand, Reply, UploadId, UploadSlot},
};
use crate::services::audio::port::{PortError, SampleFormat, SampleSource};

const OPERATION: &str = "upload sample";

/// Open an upload stream and feed it from `source` as the server asks.
///
/// The stream lives in the backend state until it terminates; the reply is
/// sent exactly once, from whichever path finishes first.
pub fn start_upload(
    context: &mut Context,
    state: &mut BackendState,
    name: &str,
    format: SampleFormat,
    source: Box<dyn SampleSource>,
    reply: Reply<()>,
) {
    let spec = sample_spec(format);
    let declared_len = source.declared_len();

    if !spec.is_valid() || declared_len == 0 {
        let _ = reply.send(Err(PortError::failed(
            OPERATION,
            "invalid sample format or empty sample",
        )));
        return;
    }

    let Some(stream) = Stream::new(context, name, &spec, None) else {
        let _ = reply.send(Err(PortError::failed(OPERATION, "could not create stream")));
        return;
    };

    let id = state.next_upload_id();
    let stream = Rc::new(RefCell::new(stream));
    let reply = Rc::new(RefCell::new(Some(reply)));

    install_write_callback(&stream, id, source, state);
    install_state_callback(&stream, id, &reply, state);

    let connected = stream.borrow_mut().connect_upload(declared_len);
    if let Err(e) = connected {
        if let Some(reply) = reply.borrow_mut().take() {
            let _ = reply.send(Err(PortError::failed(OPERATION, format!("{e}"))));
        }
        return;
    }

    debug!(name, bytes = declared_len, id, "Upload stream opened");
    state.uploads.insert(id, UploadSlot { stream, reply });
}

fn install_write_callback(
    stream: &Rc<RefCell<Stream>>,
    id: UploadId,
    mut source: Box<dyn SampleSource>,
    state: &BackendState,
) {
    let weak_stream = Rc::downgrade(stream);
    let internal_tx = state.internal_tx.clone();

    stream
        .borrow_mut()
        .set_write_callback(Some(Box::new(move |requested: usize| {
            if source.is_complete() {
                return;
            }
            let Some(stream) = weak_stream.upgrade() else {
                return;
            };
            let Ok(mut stream) = stream.try_borrow_mut() else {
                return;
            };

            let written = source
                .pull(requested)
                .map_err(|e| PortError::failed(OPERATION, e.to_string()))
                .and_then(|chunk| {
                    stream
                        .write_copy(&chunk, 0, SeekMode::Relative)
                        .map_err(|e| PortError::failed(OPERATION, format!("{e}")))
                });

            let result = match written {
                Ok(()) if source.is_complete() => stream
                    .finish_upload()
                    .map_err(|e| PortError::failed(OPERATION, format!("{e}"))),
                other => other,
            };

            if let Err(error) = result {
                let _ = internal_tx.send(InternalCommand::AbortUpload { id, error });
            }
        })));
}

fn install_state_callback(
    stream: &Rc<RefCell<Stream>>,
    id: UploadId,
    reply: &Rc<RefCell<Option<Reply<()>>>>,
    state: &BackendState,
) {
    let weak_stream = Rc::downgrade(stream);
    let reply = Rc::clone(reply);
    let internal_tx = state.internal_tx.clone();

    stream
        .borrow_mut()
        .set_state_callback(Some(Box::new(move || {
            let Some(stream) = weak_stream.upgrade() else {
                return;
            };
            let Ok(stream) = stream.try_borrow() else {
                return;
            };

            let outcome = match stream.get_state() {
                StreamState::Terminated => Ok(()),
                StreamState::Failed => Err(PortError::failed(OPERATION, "stream failed")),
                _ => return,
            };

            if let Some(reply) = reply.borrow_mut().take() {
                let _ = reply.send(outcome);
            }
            let _ = internal_tx.send(InternalCommand::ReapUpload(id));
        })));
}

/// Fail an upload and close its stream
pub fn abort_upload(state: &mut BackendState, id: UploadId, error: PortError) {
    let Some(slot) = state.uploads.remove(&id) else {
        return;
    };
    warn!(id, error = %error, "Sample upload aborted");

    if let Some(reply) = slot.reply.borrow_mut().take() {
        let _ = reply.send(Err(error));
    }
    if let Ok(mut stream) = slot.stream.try_borrow_mut() {
        let _ = stream.disconnect();
    }
}

/// Drop a terminated upload stream
pub fn reap_upload(state: &mut BackendState, id: UploadId) {
    if state.uploads.remove(&id).is_some() {
        debug!(id, "Upload stream released");
    }
}
