//! Storage item (object) requests

use super::{
    build_url, check_container, check_object, header_value, metadata_headers, require,
    strip_slash_prefix, StorageRequest,
};
use crate::error::{Error, Result};
use crate::http::{InboundResponse, OutboundRequest, ProgressCallback, UploadReader};
use crate::mime_types;
use crate::model::{ObjectInformation, StorageItem};
use crate::response::{check_status, object_information, Outcome, StatusTable, DESTINATION};
use async_trait::async_trait;
use http::header::{IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE, RANGE};
use http::{HeaderMap, HeaderName, Method, StatusCode};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;
use url::Url;

/// Validated storage URL, container and object shared by object requests
#[derive(Debug, Clone)]
struct ObjectTarget {
    storage_url: String,
    container: String,
    object: String,
}

impl ObjectTarget {
    fn new(storage_url: &str, container: &str, object: &str) -> Result<Self> {
        require(storage_url, "storage_url")?;
        require(container, "container")?;
        require(object, "object")?;
        check_container(container)?;
        check_object(object)?;
        Ok(Self {
            storage_url: storage_url.to_string(),
            container: container.to_string(),
            object: object.to_string(),
        })
    }

    fn uri(&self) -> Result<Url> {
        build_url(
            &self.storage_url,
            &[&self.container, strip_slash_prefix(&self.object)],
            &[],
        )
    }
}

/// Where upload bytes come from
enum UploadSource {
    /// Opened by the descriptor; the handle is dropped with the request body
    File { path: PathBuf, file: tokio::fs::File },
    Stream(UploadReader),
}

/// PUT an object from a local file or a caller-supplied reader
pub struct PutStorageItem {
    target: ObjectTarget,
    source: UploadSource,
    length: u64,
    metadata: HeaderMap,
    content_type: String,
    progress: Option<ProgressCallback>,
}

impl PutStorageItem {
    /// Upload a local file. Names are validated before the file is opened, so a
    /// rejected request never holds a handle.
    pub fn from_file(
        storage_url: &str,
        container: &str,
        object: &str,
        local_file_path: &Path,
        metadata: Option<&HashMap<String, String>>,
    ) -> Result<Self> {
        if local_file_path.as_os_str().is_empty() {
            return Err(Error::Argument("local_file_path"));
        }
        let target = ObjectTarget::new(storage_url, container, object)?;
        let metadata = metadata_headers(metadata)?;

        let file = std::fs::File::open(local_file_path)?;
        let length = file.metadata()?.len();
        let content_type = mime_types::resolve(&local_file_path.to_string_lossy()).to_string();

        Ok(Self {
            target,
            source: UploadSource::File {
                path: local_file_path.to_path_buf(),
                file: tokio::fs::File::from_std(file),
            },
            length,
            metadata,
            content_type,
            progress: None,
        })
    }

    /// Upload `length` bytes read from `reader`. The content type is resolved
    /// from the object name.
    pub fn from_stream<R>(
        storage_url: &str,
        container: &str,
        object: &str,
        reader: R,
        length: u64,
        metadata: Option<&HashMap<String, String>>,
    ) -> Result<Self>
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        let target = ObjectTarget::new(storage_url, container, object)?;
        let metadata = metadata_headers(metadata)?;
        let content_type = mime_types::resolve(strip_slash_prefix(object)).to_string();

        Ok(Self {
            target,
            source: UploadSource::Stream(Box::new(reader)),
            length,
            metadata,
            content_type,
            progress: None,
        })
    }

    /// Override the resolved content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        if !content_type.trim().is_empty() {
            self.content_type = content_type;
        }
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content_length(&self) -> u64 {
        self.length
    }
}

impl fmt::Debug for PutStorageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            UploadSource::File { path, .. } => path.display().to_string(),
            UploadSource::Stream(_) => "<stream>".to_string(),
        };
        f.debug_struct("PutStorageItem")
            .field("target", &self.target)
            .field("source", &source)
            .field("length", &self.length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StorageRequest for PutStorageItem {
    type Output = ObjectInformation;

    const STATUS_TABLE: StatusTable = &[(StatusCode::CREATED, Outcome::Created)];

    fn build_uri(&self) -> Result<Url> {
        self.target.uri()
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::PUT;
        request.headers.extend(self.metadata);
        request.allow_write_stream_buffering = false;
        request.content_type = Some(self.content_type);

        let reader: UploadReader = match self.source {
            UploadSource::File { file, .. } => Box::new(file),
            UploadSource::Stream(reader) => reader,
        };
        request.set_content(reader, self.length, self.progress);
    }

    async fn translate(response: InboundResponse) -> Result<ObjectInformation> {
        let (_, response) = check_status(response, Self::STATUS_TABLE).await?;
        Ok(object_information(&response.headers))
    }
}

/// Optional request headers for downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestHeader {
    Range,
    IfMatch,
    IfNoneMatch,
    IfModifiedSince,
    IfUnmodifiedSince,
}

impl RequestHeader {
    fn header_name(self) -> HeaderName {
        match self {
            RequestHeader::Range => RANGE,
            RequestHeader::IfMatch => IF_MATCH,
            RequestHeader::IfNoneMatch => IF_NONE_MATCH,
            RequestHeader::IfModifiedSince => IF_MODIFIED_SINCE,
            RequestHeader::IfUnmodifiedSince => IF_UNMODIFIED_SINCE,
        }
    }
}

/// GET an object's body and headers
#[derive(Debug, Clone)]
pub struct GetStorageItem {
    target: ObjectTarget,
    headers: HeaderMap,
}

impl GetStorageItem {
    pub fn new(storage_url: &str, container: &str, object: &str) -> Result<Self> {
        Ok(Self {
            target: ObjectTarget::new(storage_url, container, object)?,
            headers: HeaderMap::new(),
        })
    }

    /// Add range and conditional headers
    pub fn with_headers(mut self, headers: &HashMap<RequestHeader, String>) -> Result<Self> {
        for (header, value) in headers {
            self.headers
                .insert(header.header_name(), header_value(value, "request_header")?);
        }
        Ok(self)
    }
}

#[async_trait]
impl StorageRequest for GetStorageItem {
    type Output = StorageItem;

    const STATUS_TABLE: StatusTable = &[
        (StatusCode::OK, Outcome::Ok),
        (StatusCode::PARTIAL_CONTENT, Outcome::PartialContent),
    ];

    fn build_uri(&self) -> Result<Url> {
        self.target.uri()
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::GET;
        request.headers.extend(self.headers);
    }

    async fn translate(response: InboundResponse) -> Result<StorageItem> {
        let (_, response) = check_status(response, Self::STATUS_TABLE).await?;
        let information = object_information(&response.headers);
        Ok(StorageItem::new(information, response.body))
    }
}

/// HEAD an object for its headers and metadata
#[derive(Debug, Clone)]
pub struct GetStorageItemInformation {
    target: ObjectTarget,
}

impl GetStorageItemInformation {
    pub fn new(storage_url: &str, container: &str, object: &str) -> Result<Self> {
        Ok(Self {
            target: ObjectTarget::new(storage_url, container, object)?,
        })
    }
}

#[async_trait]
impl StorageRequest for GetStorageItemInformation {
    type Output = ObjectInformation;

    const STATUS_TABLE: StatusTable = &[
        (StatusCode::OK, Outcome::Ok),
        (StatusCode::NO_CONTENT, Outcome::NoContent),
    ];

    fn build_uri(&self) -> Result<Url> {
        self.target.uri()
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::HEAD;
    }

    async fn translate(response: InboundResponse) -> Result<ObjectInformation> {
        let (_, response) = check_status(response, Self::STATUS_TABLE).await?;
        Ok(object_information(&response.headers))
    }
}

/// DELETE an object
#[derive(Debug, Clone)]
pub struct DeleteStorageItem {
    target: ObjectTarget,
}

impl DeleteStorageItem {
    pub fn new(storage_url: &str, container: &str, object: &str) -> Result<Self> {
        Ok(Self {
            target: ObjectTarget::new(storage_url, container, object)?,
        })
    }
}

#[async_trait]
impl StorageRequest for DeleteStorageItem {
    type Output = ();

    const STATUS_TABLE: StatusTable = &[(StatusCode::NO_CONTENT, Outcome::NoContent)];

    fn build_uri(&self) -> Result<Url> {
        self.target.uri()
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::DELETE;
    }

    async fn translate(response: InboundResponse) -> Result<()> {
        check_status(response, Self::STATUS_TABLE).await?;
        Ok(())
    }
}

/// POST replacement metadata onto an object; the service answers 202
#[derive(Debug, Clone)]
pub struct SetStorageItemMetaInformation {
    target: ObjectTarget,
    metadata: HeaderMap,
}

impl SetStorageItemMetaInformation {
    pub fn new(
        storage_url: &str,
        container: &str,
        object: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<Self> {
        let target = ObjectTarget::new(storage_url, container, object)?;
        Ok(Self {
            target,
            metadata: metadata_headers(Some(metadata))?,
        })
    }
}

#[async_trait]
impl StorageRequest for SetStorageItemMetaInformation {
    type Output = ();

    const STATUS_TABLE: StatusTable = &[
        (StatusCode::ACCEPTED, Outcome::Accepted),
        (StatusCode::NO_CONTENT, Outcome::NoContent),
    ];

    fn build_uri(&self) -> Result<Url> {
        self.target.uri()
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::POST;
        request.headers.extend(self.metadata);
    }

    async fn translate(response: InboundResponse) -> Result<()> {
        check_status(response, Self::STATUS_TABLE).await?;
        Ok(())
    }
}

/// Server-side COPY of an object to another container or name
#[derive(Debug, Clone)]
pub struct CopyStorageItem {
    source: ObjectTarget,
    destination: String,
    metadata: HeaderMap,
    method: Method,
}

impl CopyStorageItem {
    pub fn new(
        storage_url: &str,
        source_container: &str,
        source_object: &str,
        destination_container: &str,
        destination_object: &str,
        metadata: Option<&HashMap<String, String>>,
    ) -> Result<Self> {
        require(destination_container, "destination_container")?;
        require(destination_object, "destination_object")?;
        let source = ObjectTarget::new(storage_url, source_container, source_object)?;
        check_container(destination_container)?;
        check_object(destination_object)?;

        let destination = format!(
            "{}/{}",
            super::encode_segment(destination_container),
            super::encode_segment(strip_slash_prefix(destination_object))
        );
        let method = Method::from_bytes(b"COPY").map_err(|e| Error::InvalidUrl(e.to_string()))?;

        Ok(Self {
            source,
            destination,
            metadata: metadata_headers(metadata)?,
            method,
        })
    }
}

#[async_trait]
impl StorageRequest for CopyStorageItem {
    type Output = ();

    const STATUS_TABLE: StatusTable = &[(StatusCode::CREATED, Outcome::Created)];

    fn build_uri(&self) -> Result<Url> {
        self.source.uri()
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = self.method;
        request.headers.extend(self.metadata);
        if let Ok(destination) = header_value(&self.destination, "destination") {
            request.headers.insert(DESTINATION, destination);
        }
    }

    async fn translate(response: InboundResponse) -> Result<()> {
        check_status(response, Self::STATUS_TABLE).await?;
        Ok(())
    }
}
