//! Authentication providers and the storage endpoint they produce

use crate::error::Result;
use crate::http::OutboundRequest;
use crate::request::{GetAuthentication, StorageRequest};
use crate::transport::Transport;
use async_trait::async_trait;
use std::fmt;

/// US authentication endpoint
pub const DEFAULT_AUTH_URL: &str = "https://auth.api.rackspacecloud.com/v1.0";

/// UK authentication endpoint
pub const UK_AUTH_URL: &str = "https://lon.auth.api.rackspacecloud.com/v1.0";

/// Where and how to reach the storage service for one authenticated session
#[derive(Clone, PartialEq, Eq)]
pub struct StorageEndpoint {
    storage_url: String,
    auth_token: String,
    cdn_management_url: Option<String>,
}

impl StorageEndpoint {
    pub fn new(
        storage_url: impl Into<String>,
        auth_token: impl Into<String>,
        cdn_management_url: Option<String>,
    ) -> Self {
        Self {
            storage_url: storage_url.into(),
            auth_token: auth_token.into(),
            cdn_management_url,
        }
    }

    pub fn storage_url(&self) -> &str {
        &self.storage_url
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn cdn_management_url(&self) -> Option<&str> {
        self.cdn_management_url.as_deref()
    }

    /// Route storage traffic over the internal ServiceNet (`snet-` host prefix)
    pub fn with_service_net(mut self) -> Self {
        if let Some(rest) = self.storage_url.strip_prefix("https://") {
            if !rest.starts_with("snet-") {
                self.storage_url = format!("https://snet-{}", rest);
            }
        }
        self
    }
}

impl fmt::Debug for StorageEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageEndpoint")
            .field("storage_url", &self.storage_url)
            .field("auth_token", &"<redacted>")
            .field("cdn_management_url", &self.cdn_management_url)
            .finish()
    }
}

/// Produces a [`StorageEndpoint`], possibly by talking to an auth service
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, transport: &dyn Transport) -> Result<StorageEndpoint>;
}

/// User name and API key exchanged for a token at an auth URL
#[derive(Clone)]
pub struct UserCredentials {
    pub username: String,
    pub api_key: String,
    pub auth_url: String,
    pub service_net: bool,
}

impl UserCredentials {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            service_net: false,
        }
    }

    pub fn auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    pub fn service_net(mut self, service_net: bool) -> Self {
        self.service_net = service_net;
        self
    }
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentials")
            .field("username", &self.username)
            .field("auth_url", &self.auth_url)
            .field("service_net", &self.service_net)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for UserCredentials {
    async fn authenticate(&self, transport: &dyn Transport) -> Result<StorageEndpoint> {
        let request = GetAuthentication::new(&self.auth_url, &self.username, &self.api_key)?;
        let mut outbound = OutboundRequest::new(request.build_uri()?);
        request.apply(&mut outbound);

        tracing::info!(auth_url = %self.auth_url, username = %self.username, "authenticating");
        let response = transport.send(outbound).await?;
        let endpoint = GetAuthentication::translate(response).await?;

        Ok(if self.service_net {
            endpoint.with_service_net()
        } else {
            endpoint
        })
    }
}

/// An endpoint obtained elsewhere, e.g. a token cached by the caller
#[derive(Debug, Clone)]
pub struct StaticEndpoint(pub StorageEndpoint);

#[async_trait]
impl AuthProvider for StaticEndpoint {
    async fn authenticate(&self, _transport: &dyn Transport) -> Result<StorageEndpoint> {
        Ok(self.0.clone())
    }
}
