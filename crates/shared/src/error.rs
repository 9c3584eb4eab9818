use serde::{Deserialize, Serialize};

/// Body the backend attaches to its replies; on a rejected send it carries the
/// reason, e.g. the safety classifier's verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl StatusBody {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
        }
    }

    /// Lenient parse: anything that is not a JSON object with a string
    /// `status` yields `None`.
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    /// The reported status, if it carries any text.
    pub fn detail(&self) -> Option<&str> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|status| !status.is_empty())
    }
}
