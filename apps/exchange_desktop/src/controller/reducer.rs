//! Folds backend completions into the panel that issued them.

use client_core::{ExchangeState, Reduction};

use crate::controller::events::UiEvent;

/// Applies one backend event. Returns the panel reduction for completions and
/// `None` for bridge-level events, which land in `bridge_status` instead.
pub fn apply_ui_event(
    state: &mut ExchangeState,
    bridge_status: &mut Option<String>,
    event: UiEvent,
) -> Option<Reduction> {
    match event {
        UiEvent::SendFinished { ticket, result } => {
            Some(state.panel_mut(ticket.slot()).apply_send(ticket, result))
        }
        UiEvent::InboxFetched { ticket, result } => {
            Some(state.panel_mut(ticket.slot()).apply_receive(ticket, result))
        }
        UiEvent::BridgeFailed(message) => {
            tracing::error!("backend bridge reported failure: {message}");
            *bridge_status = Some(message);
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
