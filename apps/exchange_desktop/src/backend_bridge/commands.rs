//! Backend commands queued from UI to backend worker.

use client_core::RequestTicket;
use shared::domain::UserSlot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    SendMessage {
        ticket: RequestTicket,
        message: String,
    },
    FetchInbox {
        ticket: RequestTicket,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::SendMessage { .. } => "send_message",
            BackendCommand::FetchInbox { .. } => "fetch_inbox",
        }
    }

    pub fn ticket(&self) -> RequestTicket {
        match self {
            BackendCommand::SendMessage { ticket, .. } | BackendCommand::FetchInbox { ticket } => {
                *ticket
            }
        }
    }

    pub fn slot(&self) -> UserSlot {
        self.ticket().slot()
    }
}
