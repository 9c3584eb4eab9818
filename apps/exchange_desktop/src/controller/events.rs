//! UI/backend events and user intents for the desktop controller.

use client_core::{DispatchError, RequestTicket};

/// Completions reported by the backend worker.
#[derive(Debug)]
pub enum UiEvent {
    SendFinished {
        ticket: RequestTicket,
        result: Result<(), DispatchError>,
    },
    InboxFetched {
        ticket: RequestTicket,
        result: Result<Vec<String>, DispatchError>,
    },
    BridgeFailed(String),
}

/// Something a user did inside their own panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    EditDraft(String),
    Send,
    RefreshInbox,
    DismissAcknowledgement,
}
