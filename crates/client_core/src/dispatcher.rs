use std::sync::Arc;

use shared::{
    domain::{UserIdentity, UserSlot},
    protocol::SendMessageRequest,
};
use tracing::{info, warn};
use url::Url;

use crate::{
    config::{endpoint_url, Settings},
    error::{ConfigError, DispatchError},
    transport::{HttpTransport, MessageTransport},
};

/// Issues one user's send and receive calls. Holds no mutable state, so the
/// same dispatcher can serve any number of overlapping calls.
pub struct Dispatcher {
    identity: UserIdentity,
    send_url: Url,
    receive_url: Url,
    transport: Arc<dyn MessageTransport>,
}

impl Dispatcher {
    pub fn new(
        identity: UserIdentity,
        base_url: &Url,
        transport: Arc<dyn MessageTransport>,
    ) -> Result<Self, ConfigError> {
        let endpoints = identity.endpoints();
        let send_url = endpoint_url(base_url, identity.slot(), &endpoints.send_endpoint)?;
        let receive_url = endpoint_url(base_url, identity.slot(), &endpoints.receive_endpoint)?;
        Ok(Self {
            identity,
            send_url,
            receive_url,
            transport,
        })
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    pub fn send_url(&self) -> &Url {
        &self.send_url
    }

    pub fn receive_url(&self) -> &Url {
        &self.receive_url
    }

    /// Exactly one POST; never retried.
    pub async fn send(&self, message: &str) -> Result<(), DispatchError> {
        let user = self.identity.label();
        info!(user, endpoint = %self.send_url, "sending message");

        let result = self
            .transport
            .post_message(&self.send_url, &SendMessageRequest::new(message))
            .await;
        if let Err(err) = &result {
            warn!(
                user,
                endpoint = err.endpoint(),
                kind = ?err.kind(),
                "send failed: {err}"
            );
        }
        result
    }

    /// Exactly one GET. A success reply the client cannot decode is logged
    /// and degrades to an empty inbox.
    pub async fn receive(&self) -> Result<Vec<String>, DispatchError> {
        let user = self.identity.label();
        info!(user, endpoint = %self.receive_url, "retrieving messages");

        match self.transport.fetch_inbox(&self.receive_url).await {
            Ok(messages) => {
                info!(user, count = messages.len(), "retrieved messages");
                Ok(messages)
            }
            Err(err @ DispatchError::MalformedResponse { .. }) => {
                warn!(
                    user,
                    endpoint = err.endpoint(),
                    "treating unreadable inbox as empty: {err}"
                );
                Ok(Vec::new())
            }
            Err(err) => {
                warn!(
                    user,
                    endpoint = err.endpoint(),
                    kind = ?err.kind(),
                    "receive failed: {err}"
                );
                Err(err)
            }
        }
    }
}

/// The two dispatchers of an exchange session, built from one configuration.
pub struct DispatcherSet {
    user1: Arc<Dispatcher>,
    user2: Arc<Dispatcher>,
}

impl DispatcherSet {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let transport = Arc::new(HttpTransport::new(settings.request_timeout())?);
        Self::with_transport(settings, transport)
    }

    pub fn with_transport(
        settings: &Settings,
        transport: Arc<dyn MessageTransport>,
    ) -> Result<Self, ConfigError> {
        let base_url = settings.parsed_base_url()?;
        let build = |slot: UserSlot| {
            Dispatcher::new(settings.identity(slot), &base_url, transport.clone()).map(Arc::new)
        };
        Ok(Self {
            user1: build(UserSlot::User1)?,
            user2: build(UserSlot::User2)?,
        })
    }

    pub fn get(&self, slot: UserSlot) -> &Arc<Dispatcher> {
        match slot {
            UserSlot::User1 => &self.user1,
            UserSlot::User2 => &self.user2,
        }
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
