//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::DispatcherSet;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Starts the backend worker thread. Every command runs as its own task, so
/// requests from either user may overlap and complete in any order.
pub fn launch(
    dispatchers: DispatcherSet,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::BridgeFailed(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let dispatchers = Arc::new(dispatchers);
        runtime.block_on(async move {
            tracing::info!("backend worker ready");
            while let Ok(cmd) = cmd_rx.recv() {
                let dispatchers = Arc::clone(&dispatchers);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let event = execute(&dispatchers, cmd).await;
                    if ui_tx.send(event).is_err() {
                        tracing::debug!("ui closed before backend result was delivered");
                    }
                });
            }
            tracing::info!("ui command queue closed; backend worker stopping");
        });
    })
}

/// Runs one command against the issuing user's dispatcher.
pub async fn execute(dispatchers: &DispatcherSet, cmd: BackendCommand) -> UiEvent {
    let dispatcher = dispatchers.get(cmd.slot());
    match cmd {
        BackendCommand::SendMessage { ticket, message } => UiEvent::SendFinished {
            ticket,
            result: dispatcher.send(&message).await,
        },
        BackendCommand::FetchInbox { ticket } => UiEvent::InboxFetched {
            ticket,
            result: dispatcher.receive().await,
        },
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
