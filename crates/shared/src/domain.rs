use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two fixed participants of an exchange session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserSlot {
    User1,
    User2,
}

impl UserSlot {
    pub const ALL: [UserSlot; 2] = [UserSlot::User1, UserSlot::User2];

    pub fn label(self) -> &'static str {
        match self {
            UserSlot::User1 => "User 1",
            UserSlot::User2 => "User 2",
        }
    }

    /// The participant that receives what this slot sends.
    pub fn peer(self) -> UserSlot {
        match self {
            UserSlot::User1 => UserSlot::User2,
            UserSlot::User2 => UserSlot::User1,
        }
    }

    pub fn index(self) -> usize {
        match self {
            UserSlot::User1 => 0,
            UserSlot::User2 => 1,
        }
    }
}

impl fmt::Display for UserSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Backend endpoint names a user sends to and receives from, relative to the
/// configured base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointPair {
    pub send_endpoint: String,
    pub receive_endpoint: String,
}

impl EndpointPair {
    pub fn new(send_endpoint: impl Into<String>, receive_endpoint: impl Into<String>) -> Self {
        Self {
            send_endpoint: send_endpoint.into(),
            receive_endpoint: receive_endpoint.into(),
        }
    }

    pub fn default_for(slot: UserSlot) -> Self {
        match slot {
            UserSlot::User1 => Self::new("send_message_user1", "receive_messages_user1"),
            UserSlot::User2 => Self::new("send_message_user2", "receive_messages_user2"),
        }
    }
}

/// A user slot bound to its endpoint pair. Fixed for the lifetime of the
/// controller that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    slot: UserSlot,
    endpoints: EndpointPair,
}

impl UserIdentity {
    pub fn new(slot: UserSlot, endpoints: EndpointPair) -> Self {
        Self { slot, endpoints }
    }

    pub fn with_default_endpoints(slot: UserSlot) -> Self {
        Self::new(slot, EndpointPair::default_for(slot))
    }

    pub fn slot(&self) -> UserSlot {
        self.slot
    }

    pub fn label(&self) -> &'static str {
        self.slot.label()
    }

    pub fn endpoints(&self) -> &EndpointPair {
        &self.endpoints
    }
}
