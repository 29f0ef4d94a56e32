//! Authenticated connection to a Cloud Files account
//!
//! [`Connection`] owns the transport and the current [`StorageEndpoint`]. Each
//! operation builds one request descriptor from the endpoint, validates its
//! arguments, performs a single exchange and translates the response.

use crate::auth::{AuthProvider, StaticEndpoint, StorageEndpoint, UserCredentials};
use crate::config::{ConfigFile, DEFAULT_USER_AGENT};
use crate::error::{Error, Result};
use crate::http::{OutboundRequest, ProgressCallback};
use crate::model::{
    AccountInformation, CdnContainerInformation, ContainerCreation, ContainerInformation,
    ContainerSummary, ObjectInformation, ObjectSummary, StorageItem,
};
use crate::request::{
    CopyStorageItem, CreateContainer, DeleteContainer, DeleteStorageItem, GetAccountInformation,
    GetContainerInformation, GetContainerItemList, GetContainerItemListDetailed, GetContainers,
    GetContainersDetailed, GetPublicContainerInformation, GetPublicContainers,
    GetStorageItem, GetStorageItemInformation, ListParameters, MarkContainerAsPublic,
    PutStorageItem, RequestHeader, SetPublicContainerDetails, SetStorageItemMetaInformation,
    StorageRequest, DEFAULT_CDN_TTL,
};
use crate::response::X_AUTH_TOKEN;
use crate::transport::{ReqwestTransport, Transport};
use http::header::USER_AGENT;
use http::HeaderValue;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::io::AsyncRead;

/// Client for one account's storage and CDN services
pub struct Connection {
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AuthProvider>,
    endpoint: RwLock<Arc<StorageEndpoint>>,
    user_agent: HeaderValue,
}

impl Connection {
    /// Authenticate through `auth` and return a ready connection
    pub async fn connect(
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AuthProvider>,
    ) -> Result<Self> {
        let endpoint = auth.authenticate(transport.as_ref()).await?;
        tracing::info!(storage_url = %endpoint.storage_url(), "connected");

        Ok(Self {
            transport,
            auth,
            endpoint: RwLock::new(Arc::new(endpoint)),
            user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
        })
    }

    /// Use an endpoint obtained elsewhere; no authentication exchange happens
    pub fn with_endpoint(transport: Arc<dyn Transport>, endpoint: StorageEndpoint) -> Self {
        Self {
            transport,
            auth: Arc::new(StaticEndpoint(endpoint.clone())),
            endpoint: RwLock::new(Arc::new(endpoint)),
            user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
        }
    }

    /// Build the reqwest transport and credential auth described by `config`
    pub async fn from_config(config: &ConfigFile) -> Result<Self> {
        let advanced = config.advanced();
        let transport = ReqwestTransport::new(
            advanced.timeout(),
            advanced.connect_timeout(),
            &advanced.user_agent,
        )?
        .chunk_size(advanced.upload_chunk_size);

        let credentials = UserCredentials::new(&config.account.username, &config.account.api_key)
            .auth_url(&config.account.auth_url)
            .service_net(config.account.service_net);

        Self::connect(Arc::new(transport), Arc::new(credentials))
            .await?
            .with_user_agent(&advanced.user_agent)
    }

    /// Override the `User-Agent` header sent with every request
    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self> {
        self.user_agent =
            HeaderValue::from_str(user_agent).map_err(|_| Error::Argument("user_agent"))?;
        Ok(self)
    }

    /// The endpoint requests are currently sent to
    pub fn endpoint(&self) -> Arc<StorageEndpoint> {
        self.endpoint
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Authenticate again and swap in the new endpoint. Calls already in
    /// flight finish against the endpoint they started with.
    pub async fn authenticate(&self) -> Result<()> {
        let endpoint = self.auth.authenticate(self.transport.as_ref()).await?;
        tracing::info!(storage_url = %endpoint.storage_url(), "re-authenticated");
        *self
            .endpoint
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(endpoint);
        Ok(())
    }

    /// Apply `request`, add session headers, send it and translate the response
    async fn send<R: StorageRequest>(
        &self,
        endpoint: &StorageEndpoint,
        request: R,
    ) -> Result<R::Output> {
        let mut outbound = OutboundRequest::new(request.build_uri()?);
        request.apply(&mut outbound);

        let mut token = HeaderValue::from_str(endpoint.auth_token())
            .map_err(|_| Error::Authentication("auth token is not a valid header value".to_string()))?;
        token.set_sensitive(true);
        outbound.headers.insert(X_AUTH_TOKEN, token);
        outbound.headers.insert(USER_AGENT, self.user_agent.clone());

        tracing::debug!(method = %outbound.method, url = %outbound.uri, "sending request");
        let response = self.transport.send(outbound).await?;
        tracing::debug!(status = %response.status, "received response");

        R::translate(response).await
    }

    /// Send a descriptor built by the caller against [`Connection::endpoint`]
    pub async fn execute<R: StorageRequest>(&self, request: R) -> Result<R::Output> {
        let endpoint = self.endpoint();
        self.send(&endpoint, request).await
    }

    fn cdn_url(endpoint: &StorageEndpoint) -> Result<&str> {
        endpoint.cdn_management_url().ok_or(Error::CdnUnavailable)
    }

    // Account

    pub async fn get_account_information(&self) -> Result<AccountInformation> {
        let endpoint = self.endpoint();
        let request = GetAccountInformation::new(endpoint.storage_url())?;
        self.send(&endpoint, request).await
    }

    /// Container names, one page at a time when `parameters` sets a limit
    pub async fn get_containers(&self, parameters: ListParameters) -> Result<Vec<String>> {
        let endpoint = self.endpoint();
        let request = GetContainers::new(endpoint.storage_url())?.with_parameters(parameters);
        self.send(&endpoint, request).await
    }

    pub async fn get_containers_detailed(
        &self,
        parameters: ListParameters,
    ) -> Result<Vec<ContainerSummary>> {
        let endpoint = self.endpoint();
        let request =
            GetContainersDetailed::new(endpoint.storage_url())?.with_parameters(parameters);
        self.send(&endpoint, request).await
    }

    // Containers

    pub async fn create_container(&self, container: &str) -> Result<ContainerCreation> {
        let endpoint = self.endpoint();
        let request = CreateContainer::new(endpoint.storage_url(), container)?;
        self.send(&endpoint, request).await
    }

    pub async fn delete_container(&self, container: &str) -> Result<()> {
        let endpoint = self.endpoint();
        let request = DeleteContainer::new(endpoint.storage_url(), container)?;
        self.send(&endpoint, request).await
    }

    pub async fn get_container_information(&self, container: &str) -> Result<ContainerInformation> {
        let endpoint = self.endpoint();
        let request = GetContainerInformation::new(endpoint.storage_url(), container)?;
        self.send(&endpoint, request).await
    }

    pub async fn get_container_item_list(
        &self,
        container: &str,
        parameters: ListParameters,
    ) -> Result<Vec<String>> {
        let endpoint = self.endpoint();
        let request = GetContainerItemList::new(endpoint.storage_url(), container)?
            .with_parameters(parameters);
        self.send(&endpoint, request).await
    }

    pub async fn get_container_item_list_detailed(
        &self,
        container: &str,
        parameters: ListParameters,
    ) -> Result<Vec<ObjectSummary>> {
        let endpoint = self.endpoint();
        let request = GetContainerItemListDetailed::new(endpoint.storage_url(), container)?
            .with_parameters(parameters);
        self.send(&endpoint, request).await
    }

    // Storage items

    /// Upload a local file. The content type comes from the file's extension.
    pub async fn put_storage_item(
        &self,
        container: &str,
        object: &str,
        local_file_path: &Path,
        metadata: Option<&HashMap<String, String>>,
        progress: Option<ProgressCallback>,
    ) -> Result<ObjectInformation> {
        let endpoint = self.endpoint();
        let mut request = PutStorageItem::from_file(
            endpoint.storage_url(),
            container,
            object,
            local_file_path,
            metadata,
        )?;
        if let Some(progress) = progress {
            request = request.with_progress(progress);
        }
        tracing::debug!(
            container,
            object,
            bytes = request.content_length(),
            content_type = request.content_type(),
            "uploading file"
        );
        self.send(&endpoint, request).await
    }

    /// Upload exactly `length` bytes from `reader`. The content type comes from
    /// the object name. The reader is dropped once the exchange ends.
    pub async fn put_storage_item_stream<R>(
        &self,
        container: &str,
        object: &str,
        reader: R,
        length: u64,
        metadata: Option<&HashMap<String, String>>,
        progress: Option<ProgressCallback>,
    ) -> Result<ObjectInformation>
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        let endpoint = self.endpoint();
        let mut request = PutStorageItem::from_stream(
            endpoint.storage_url(),
            container,
            object,
            reader,
            length,
            metadata,
        )?;
        if let Some(progress) = progress {
            request = request.with_progress(progress);
        }
        self.send(&endpoint, request).await
    }

    /// Fetch an object; the body is left unread in the returned item
    pub async fn get_storage_item(
        &self,
        container: &str,
        object: &str,
        headers: Option<&HashMap<RequestHeader, String>>,
    ) -> Result<StorageItem> {
        let endpoint = self.endpoint();
        let mut request = GetStorageItem::new(endpoint.storage_url(), container, object)?;
        if let Some(headers) = headers {
            request = request.with_headers(headers)?;
        }
        self.send(&endpoint, request).await
    }

    /// Fetch an object into a local file, returning the bytes written
    pub async fn download_storage_item(
        &self,
        container: &str,
        object: &str,
        local_file_path: &Path,
        headers: Option<&HashMap<RequestHeader, String>>,
    ) -> Result<u64> {
        if local_file_path.as_os_str().is_empty() {
            return Err(Error::Argument("local_file_path"));
        }
        let item = self.get_storage_item(container, object, headers).await?;
        let written = item.save_to(local_file_path).await?;
        tracing::debug!(container, object, bytes = written, "downloaded");
        Ok(written)
    }

    pub async fn get_storage_item_information(
        &self,
        container: &str,
        object: &str,
    ) -> Result<ObjectInformation> {
        let endpoint = self.endpoint();
        let request = GetStorageItemInformation::new(endpoint.storage_url(), container, object)?;
        self.send(&endpoint, request).await
    }

    pub async fn delete_storage_item(&self, container: &str, object: &str) -> Result<()> {
        let endpoint = self.endpoint();
        let request = DeleteStorageItem::new(endpoint.storage_url(), container, object)?;
        self.send(&endpoint, request).await
    }

    /// Replace the object's user metadata
    pub async fn set_storage_item_meta_information(
        &self,
        container: &str,
        object: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        let endpoint = self.endpoint();
        let request =
            SetStorageItemMetaInformation::new(endpoint.storage_url(), container, object, metadata)?;
        self.send(&endpoint, request).await
    }

    pub async fn copy_storage_item(
        &self,
        source_container: &str,
        source_object: &str,
        destination_container: &str,
        destination_object: &str,
        metadata: Option<&HashMap<String, String>>,
    ) -> Result<()> {
        let endpoint = self.endpoint();
        let request = CopyStorageItem::new(
            endpoint.storage_url(),
            source_container,
            source_object,
            destination_container,
            destination_object,
            metadata,
        )?;
        self.send(&endpoint, request).await
    }

    // CDN

    pub async fn get_public_containers(&self, enabled_only: bool) -> Result<Vec<String>> {
        let endpoint = self.endpoint();
        let request = GetPublicContainers::new(Self::cdn_url(&endpoint)?)?.enabled_only(enabled_only);
        self.send(&endpoint, request).await
    }

    /// Publish a container on the CDN and return its public URI.
    /// `ttl` defaults to 72 hours.
    pub async fn mark_container_as_public(
        &self,
        container: &str,
        ttl: Option<u64>,
    ) -> Result<Option<String>> {
        let endpoint = self.endpoint();
        let request = MarkContainerAsPublic::new(
            Self::cdn_url(&endpoint)?,
            container,
            ttl.unwrap_or(DEFAULT_CDN_TTL),
        )?;
        self.send(&endpoint, request).await
    }

    pub async fn mark_container_as_private(&self, container: &str) -> Result<()> {
        self.set_public_container_details(container, false, None, None)
            .await
    }

    pub async fn set_public_container_details(
        &self,
        container: &str,
        cdn_enabled: bool,
        ttl: Option<u64>,
        log_retention: Option<bool>,
    ) -> Result<()> {
        let endpoint = self.endpoint();
        let mut request =
            SetPublicContainerDetails::new(Self::cdn_url(&endpoint)?, container, cdn_enabled)?;
        if let Some(ttl) = ttl {
            request = request.ttl(ttl)?;
        }
        if let Some(log_retention) = log_retention {
            request = request.log_retention(log_retention);
        }
        self.send(&endpoint, request).await
    }

    pub async fn get_public_container_information(
        &self,
        container: &str,
    ) -> Result<CdnContainerInformation> {
        let endpoint = self.endpoint();
        let request = GetPublicContainerInformation::new(Self::cdn_url(&endpoint)?, container)?;
        self.send(&endpoint, request).await
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint())
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}
