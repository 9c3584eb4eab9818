//! Per-user view state and the rules that fold dispatch results into it.
//!
//! A request is started with `begin_*`, which hands out a [`RequestTicket`],
//! and finished with the matching `apply_*` once the call completes. Results
//! may arrive in any order; each one only touches the panel its ticket was
//! issued by.

use shared::domain::{UserIdentity, UserSlot};
use tracing::{debug, warn};

use crate::{
    config::Settings,
    error::{DispatchError, DispatchErrorKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Send,
    Receive,
}

/// Identifies one issued request. Sequence numbers are per user and strictly
/// increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    slot: UserSlot,
    operation: Operation,
    seq: u64,
}

impl RequestTicket {
    pub fn slot(&self) -> UserSlot {
        self.slot
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// The last failed operation of one user, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationError {
    operation: Operation,
    message: String,
    cause: DispatchError,
}

impl OperationError {
    pub fn from_dispatch(slot: UserSlot, operation: Operation, cause: DispatchError) -> Self {
        let message = match (operation, &cause) {
            (Operation::Send, DispatchError::RejectedByServer { detail: Some(detail), .. }) => {
                format!("Error: {detail}")
            }
            (Operation::Send, _) => format!("Failed to send message from {slot}."),
            (Operation::Receive, DispatchError::NetworkUnavailable { .. }) => {
                format!("Error retrieving messages for {slot}.")
            }
            (Operation::Receive, _) => format!("Failed to retrieve messages for {slot}."),
        };
        Self {
            operation,
            message,
            cause,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn kind(&self) -> DispatchErrorKind {
        self.cause.kind()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> &DispatchError {
        &self.cause
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Applied,
    /// A newer receive already landed; this result was dropped.
    Stale,
    /// The ticket belongs to another user or operation.
    Rejected,
}

#[derive(Debug, Clone)]
pub struct UserPanelState {
    identity: UserIdentity,
    draft: String,
    inbox: Vec<String>,
    error: Option<OperationError>,
    acknowledgement: Option<String>,
    next_seq: u64,
    last_applied_receive: u64,
    sends_in_flight: usize,
    receives_in_flight: usize,
}

impl UserPanelState {
    pub fn new(identity: UserIdentity) -> Self {
        Self {
            identity,
            draft: String::new(),
            inbox: Vec::new(),
            error: None,
            acknowledgement: None,
            next_seq: 1,
            last_applied_receive: 0,
            sends_in_flight: 0,
            receives_in_flight: 0,
        }
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    pub fn slot(&self) -> UserSlot {
        self.identity.slot()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn inbox(&self) -> &[String] {
        &self.inbox
    }

    pub fn error(&self) -> Option<&OperationError> {
        self.error.as_ref()
    }

    pub fn acknowledgement(&self) -> Option<&str> {
        self.acknowledgement.as_deref()
    }

    pub fn sends_in_flight(&self) -> usize {
        self.sends_in_flight
    }

    pub fn receives_in_flight(&self) -> usize {
        self.receives_in_flight
    }

    pub fn edit_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn dismiss_acknowledgement(&mut self) {
        self.acknowledgement = None;
    }

    /// Starts a send of the current draft. The draft itself stays in place
    /// until the backend confirms the message.
    pub fn begin_send(&mut self) -> (RequestTicket, String) {
        let ticket = self.issue(Operation::Send);
        self.sends_in_flight += 1;
        debug!(user = self.identity.label(), seq = ticket.seq, "send issued");
        (ticket, self.draft.clone())
    }

    pub fn begin_receive(&mut self) -> RequestTicket {
        let ticket = self.issue(Operation::Receive);
        self.receives_in_flight += 1;
        debug!(user = self.identity.label(), seq = ticket.seq, "receive issued");
        ticket
    }

    pub fn apply_send(
        &mut self,
        ticket: RequestTicket,
        result: Result<(), DispatchError>,
    ) -> Reduction {
        if !self.owns(ticket, Operation::Send) {
            return Reduction::Rejected;
        }
        self.sends_in_flight = self.sends_in_flight.saturating_sub(1);

        let slot = self.slot();
        match result {
            Ok(()) => {
                self.draft.clear();
                self.error = None;
                self.acknowledgement =
                    Some(format!("Message sent from {slot} to {}!", slot.peer()));
            }
            Err(err) => {
                self.error = Some(OperationError::from_dispatch(slot, Operation::Send, err));
            }
        }
        Reduction::Applied
    }

    pub fn apply_receive(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<String>, DispatchError>,
    ) -> Reduction {
        if !self.owns(ticket, Operation::Receive) {
            return Reduction::Rejected;
        }
        self.receives_in_flight = self.receives_in_flight.saturating_sub(1);

        if ticket.seq <= self.last_applied_receive {
            debug!(
                user = self.identity.label(),
                seq = ticket.seq,
                newest = self.last_applied_receive,
                "dropping stale receive result"
            );
            return Reduction::Stale;
        }
        self.last_applied_receive = ticket.seq;

        match result {
            Ok(messages) => {
                self.inbox = messages;
                self.error = None;
            }
            Err(err) => {
                self.error = Some(OperationError::from_dispatch(
                    self.slot(),
                    Operation::Receive,
                    err,
                ));
            }
        }
        Reduction::Applied
    }

    /// Records a request that never reached the dispatcher, e.g. because the
    /// command queue was closed. An abandoned receive does not advance the
    /// receive guard, so an older request still out at the backend can land.
    pub fn abandon(&mut self, ticket: RequestTicket, cause: DispatchError) -> Reduction {
        match ticket.operation {
            Operation::Send => self.apply_send(ticket, Err(cause)),
            Operation::Receive => {
                if !self.owns(ticket, Operation::Receive) {
                    return Reduction::Rejected;
                }
                self.receives_in_flight = self.receives_in_flight.saturating_sub(1);
                debug!(
                    user = self.identity.label(),
                    seq = ticket.seq,
                    "receive abandoned before dispatch"
                );
                self.error = Some(OperationError::from_dispatch(
                    self.slot(),
                    Operation::Receive,
                    cause,
                ));
                Reduction::Applied
            }
        }
    }

    fn issue(&mut self, operation: Operation) -> RequestTicket {
        let ticket = RequestTicket {
            slot: self.slot(),
            operation,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        ticket
    }

    fn owns(&self, ticket: RequestTicket, operation: Operation) -> bool {
        let owned = ticket.slot == self.slot() && ticket.operation == operation;
        if !owned {
            warn!(
                user = self.identity.label(),
                ticket_user = ticket.slot.label(),
                "ignoring result for a request this panel did not issue"
            );
        }
        owned
    }
}

/// Both users' panels. Nothing here is shared between the two.
#[derive(Debug, Clone)]
pub struct ExchangeState {
    panels: [UserPanelState; 2],
}

impl ExchangeState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            panels: UserSlot::ALL.map(|slot| UserPanelState::new(settings.identity(slot))),
        }
    }

    pub fn panel(&self, slot: UserSlot) -> &UserPanelState {
        &self.panels[slot.index()]
    }

    pub fn panel_mut(&mut self, slot: UserSlot) -> &mut UserPanelState {
        &mut self.panels[slot.index()]
    }

    pub fn panels(&self) -> impl Iterator<Item = &UserPanelState> {
        self.panels.iter()
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
