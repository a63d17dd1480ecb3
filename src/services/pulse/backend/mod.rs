mod commands;
mod conversion;
mod events;
mod types;
mod upload;

pub use types::{CommandReceiver, CommandSender, EventSender, ListSender, PulseCommand, Reply};

use libpulse_binding::context::{Context, FlagSet as ContextFlags};
use libpulse_tokio::TokioMain;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::{config::PulseConfig, services::audio::port::PortError};

use commands::{Flow, handle_external_command, handle_internal_command};
use events::setup_event_subscription;
use types::{BackendState, InternalCommand};

/// PulseAudio backend implementation
pub struct PulseBackend;

impl PulseBackend {
    /// Spawn the thread that owns the PulseAudio context.
    ///
    /// `ready_tx` resolves once the context is ready or connecting failed.
    /// When the connection is lost the thread exits, dropping every pending
    /// reply so that waiting callers observe a disconnect.
    pub fn spawn_monitoring_task(
        config: PulseConfig,
        mut command_rx: CommandReceiver,
        events_tx: EventSender,
        ready_tx: oneshot::Sender<Result<(), PortError>>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::task::spawn_blocking(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = ready_tx.send(Err(PortError::ConnectionFailed(format!(
                        "Failed to create runtime: {e}"
                    ))));
                    return;
                }
            };

            rt.block_on(async move {
                let mut mainloop = TokioMain::new();
                let Some(mut context) = Context::new(&mainloop, &config.client_name) else {
                    let _ = ready_tx.send(Err(PortError::ConnectionFailed(String::from(
                        "Failed to create context",
                    ))));
                    return;
                };

                if let Err(e) =
                    context.connect(config.server.as_deref(), ContextFlags::NOFLAGS, None)
                {
                    let _ = ready_tx.send(Err(PortError::ConnectionFailed(format!(
                        "Connection failed: {e}"
                    ))));
                    return;
                }

                if let Err(e) = mainloop.wait_for_ready(&context).await {
                    let _ = ready_tx.send(Err(PortError::ConnectionFailed(format!(
                        "Context failed to become ready: {e:?}"
                    ))));
                    return;
                }

                let (internal_command_tx, mut internal_command_rx) =
                    mpsc::unbounded_channel::<InternalCommand>();

                let state_tx = internal_command_tx.clone();
                context.set_state_callback(Some(Box::new(move || {
                    let _ = state_tx.send(InternalCommand::CheckConnection);
                })));

                setup_event_subscription(&mut context, internal_command_tx.clone());

                let mut state = BackendState::new(events_tx, internal_command_tx.clone());
                let _ = internal_command_tx.send(InternalCommand::RefreshDefaultSink);

                info!(client = %config.client_name, "Connected to PulseAudio");
                let _ = ready_tx.send(Ok(()));

                tokio::select! {
                    _ = mainloop.run() => {
                        error!("PulseAudio mainloop exited");
                    }
                    _ = async {
                        loop {
                            let flow = tokio::select! {
                                command = command_rx.recv() => match command {
                                    Some(command) => {
                                        handle_external_command(&mut context, &mut state, command)
                                    }
                                    None => Flow::Exit,
                                },
                                Some(command) = internal_command_rx.recv() => {
                                    handle_internal_command(&mut context, &mut state, command)
                                }
                            };

                            if let Flow::Exit = flow {
                                break;
                            }
                        }
                    } => {
                        debug!("PulseAudio command loop finished");
                    }
                }

                context.set_state_callback(None);
                context.disconnect();
            });
        })
    }
}
