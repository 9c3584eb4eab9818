use shared::domain::UserSlot;
use thiserror::Error;

/// Why a single send or receive call did not produce a usable result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("backend unreachable at {endpoint}: {reason}")]
    NetworkUnavailable { endpoint: String, reason: String },
    #[error("backend rejected {endpoint} with HTTP {status_code}{}", detail_suffix(.detail))]
    RejectedByServer {
        endpoint: String,
        status_code: u16,
        detail: Option<String>,
    },
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchErrorKind {
    NetworkUnavailable,
    RejectedByServer,
    MalformedResponse,
}

impl DispatchError {
    pub fn network(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NetworkUnavailable {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> DispatchErrorKind {
        match self {
            Self::NetworkUnavailable { .. } => DispatchErrorKind::NetworkUnavailable,
            Self::RejectedByServer { .. } => DispatchErrorKind::RejectedByServer,
            Self::MalformedResponse { .. } => DispatchErrorKind::MalformedResponse,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            Self::NetworkUnavailable { endpoint, .. }
            | Self::RejectedByServer { endpoint, .. }
            | Self::MalformedResponse { endpoint, .. } => endpoint,
        }
    }

    /// Status text the backend attached to a rejection, if any.
    pub fn server_detail(&self) -> Option<&str> {
        match self {
            Self::RejectedByServer { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url '{base_url}': {source}")]
    InvalidBaseUrl {
        base_url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base url '{0}' must be an http or https origin")]
    UnsupportedBaseUrl(String),
    #[error("invalid endpoint '{endpoint}' for {slot}: {reason}")]
    InvalidEndpoint {
        slot: UserSlot,
        endpoint: String,
        reason: String,
    },
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    ParseFile {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
