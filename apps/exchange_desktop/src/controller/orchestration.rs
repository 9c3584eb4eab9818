//! Command orchestration helpers from UI actions to backend command queue.

use client_core::{DispatchError, ExchangeState};
use crossbeam_channel::{Sender, TrySendError};
use shared::domain::UserSlot;

use crate::{backend_bridge::commands::BackendCommand, controller::events::UserIntent};

pub fn handle_user_intent(
    cmd_tx: &Sender<BackendCommand>,
    state: &mut ExchangeState,
    slot: UserSlot,
    intent: UserIntent,
) {
    let panel = state.panel_mut(slot);
    match intent {
        UserIntent::EditDraft(text) => panel.edit_draft(text),
        UserIntent::DismissAcknowledgement => panel.dismiss_acknowledgement(),
        UserIntent::Send => {
            let (ticket, message) = panel.begin_send();
            dispatch_backend_command(cmd_tx, BackendCommand::SendMessage { ticket, message }, state);
        }
        UserIntent::RefreshInbox => {
            let ticket = panel.begin_receive();
            dispatch_backend_command(cmd_tx, BackendCommand::FetchInbox { ticket }, state);
        }
    }
}

/// Queues a command for the backend worker. A command that cannot be queued
/// is settled right away as a failure of the user who issued it.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    state: &mut ExchangeState,
) {
    let cmd_name = cmd.name();
    let ticket = cmd.ticket();

    let reason = match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(
                command = cmd_name,
                user = ticket.slot().label(),
                seq = ticket.seq(),
                "queued ui->backend command"
            );
            return;
        }
        Err(TrySendError::Full(_)) => "UI command queue is full; please retry",
        Err(TrySendError::Disconnected(_)) => {
            "backend command processor disconnected (possible startup/runtime failure)"
        }
    };

    tracing::warn!(command = cmd_name, user = ticket.slot().label(), "{reason}");
    state
        .panel_mut(ticket.slot())
        .abandon(ticket, DispatchError::network("command queue", reason));
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
