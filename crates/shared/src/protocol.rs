use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

impl SendMessageRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// What the backend returns for an accepted message. Clients must not depend
/// on it: any 2xx body counts as success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveMessagesReply {
    #[serde(default)]
    pub decrypted_messages: Option<Vec<String>>,
}

impl ReceiveMessagesReply {
    pub fn new(messages: Vec<String>) -> Self {
        Self {
            decrypted_messages: Some(messages),
        }
    }

    /// Absent or null `decrypted_messages` is an empty inbox.
    pub fn into_messages(self) -> Vec<String> {
        self.decrypted_messages.unwrap_or_default()
    }
}
