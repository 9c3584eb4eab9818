//! HTTP seam between a dispatcher and the exchange backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    error::StatusBody,
    protocol::{ReceiveMessagesReply, SendMessageRequest},
};
use tracing::debug;
use url::Url;

use crate::error::{ConfigError, DispatchError};

#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Submits one message. Any 2xx reply is success.
    async fn post_message(&self, url: &Url, request: &SendMessageRequest)
        -> Result<(), DispatchError>;

    /// Fetches the decrypted inbox. Absent messages decode as an empty list.
    async fn fetch_inbox(&self, url: &Url) -> Result<Vec<String>, DispatchError>;
}

pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// Every request made through this transport is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self { http })
    }

    pub fn from_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MessageTransport for HttpTransport {
    async fn post_message(
        &self,
        url: &Url,
        request: &SendMessageRequest,
    ) -> Result<(), DispatchError> {
        let response = self
            .http
            .post(url.clone())
            .json(request)
            .send()
            .await
            .map_err(|err| network_error(url, &err))?;

        if response.status().is_success() {
            debug!(endpoint = %url, status = response.status().as_u16(), "message accepted");
            return Ok(());
        }
        Err(rejection(url, response).await)
    }

    async fn fetch_inbox(&self, url: &Url) -> Result<Vec<String>, DispatchError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|err| network_error(url, &err))?;

        if !response.status().is_success() {
            return Err(rejection(url, response).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| network_error(url, &err))?;
        let reply: ReceiveMessagesReply =
            serde_json::from_slice(&body).map_err(|err| DispatchError::MalformedResponse {
                endpoint: url.to_string(),
                reason: format!("invalid inbox payload: {err}"),
            })?;
        Ok(reply.into_messages())
    }
}

fn network_error(url: &Url, err: &reqwest::Error) -> DispatchError {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    DispatchError::network(url.as_str(), reason)
}

/// A rejection keeps the status code and whatever `status` text the body
/// carried; an unreadable body just means no detail.
async fn rejection(url: &Url, response: Response) -> DispatchError {
    let status_code = response.status().as_u16();
    let detail = response
        .bytes()
        .await
        .ok()
        .and_then(|body| StatusBody::parse(&body))
        .and_then(|body| body.detail().map(str::to_owned));

    DispatchError::RejectedByServer {
        endpoint: url.to_string(),
        status_code,
        detail,
    }
}
