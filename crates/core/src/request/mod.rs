//! Request descriptors
//!
//! Each storage operation has one descriptor type. Constructors validate every
//! argument before anything else happens, `build_uri` and `apply` fill in an
//! [`OutboundRequest`], and `translate` turns the response into the
//! operation's output using its own status table.

mod account;
mod auth;
mod cdn;
mod container;
mod object;

pub use account::{GetAccountInformation, GetContainers, GetContainersDetailed};
pub use auth::GetAuthentication;
pub use cdn::{
    GetPublicContainerInformation, GetPublicContainers, MarkContainerAsPublic,
    SetPublicContainerDetails, DEFAULT_CDN_TTL, MAX_CDN_TTL, MIN_CDN_TTL,
};
pub use container::{
    CreateContainer, DeleteContainer, GetContainerInformation, GetContainerItemList,
    GetContainerItemListDetailed,
};
pub use object::{
    CopyStorageItem, DeleteStorageItem, GetStorageItem, GetStorageItemInformation,
    PutStorageItem, RequestHeader, SetStorageItemMetaInformation,
};

use crate::error::{Error, Result};
use crate::http::{InboundResponse, OutboundRequest};
use crate::response::{StatusTable, META_DATA_HEADER};
use crate::validation;
use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use url::Url;

/// Bytes left unescaped in container and object path segments
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// One storage operation, ready to be applied to a request exactly once
#[async_trait]
pub trait StorageRequest: Sized + Send {
    /// Value produced by a successful response
    type Output: Send;

    /// Success statuses and what they mean for this operation
    const STATUS_TABLE: StatusTable;

    /// Full request URI including encoded names and query parameters
    fn build_uri(&self) -> Result<Url>;

    /// Set method, headers, content type and body on the request
    fn apply(self, request: &mut OutboundRequest);

    /// Interpret the response for this operation
    async fn translate(response: InboundResponse) -> Result<Self::Output>;
}

/// Paging and filtering for listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParameters {
    pub prefix: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub marker: Option<String>,
    /// Pseudo-directory to list (container listings only)
    pub path: Option<String>,
}

impl ListParameters {
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Query pairs in wire order: prefix, limit, offset, marker, then path
    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(prefix) = &self.prefix {
            pairs.push(("prefix", prefix.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(marker) = &self.marker {
            pairs.push(("marker", marker.clone()));
        }
        if let Some(path) = &self.path {
            pairs.push(("path", path.clone()));
        }
        pairs
    }
}

/// Percent-encode a container or object name for use as one path segment
pub fn encode_segment(name: &str) -> String {
    utf8_percent_encode(name, PATH_SEGMENT_ENCODE_SET).to_string()
}

/// `{base}/{segments...}` with every segment encoded, then the query pairs in order
pub(crate) fn build_url(
    base: &str,
    segments: &[&str],
    query: &[(&'static str, String)],
) -> Result<Url> {
    let mut raw = base.trim_end_matches('/').to_string();
    for segment in segments {
        raw.push('/');
        raw.push_str(&encode_segment(segment));
    }

    let mut url = Url::parse(&raw)?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in query {
            pairs.append_pair(name, value);
        }
    }
    Ok(url)
}

pub(crate) fn require(value: &str, name: &'static str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Argument(name));
    }
    Ok(())
}

pub(crate) fn check_container(name: &str) -> Result<()> {
    if !validation::validate_container_name(name) {
        return Err(Error::ContainerName(name.to_string()));
    }
    Ok(())
}

/// A name made only of slashes would address the container itself
pub(crate) fn check_object(name: &str) -> Result<()> {
    if !validation::validate_object_name(name) || strip_slash_prefix(name).is_empty() {
        return Err(Error::StorageItemName(name.to_string()));
    }
    Ok(())
}

/// Strip the leading slashes an object name may carry
pub(crate) fn strip_slash_prefix(name: &str) -> &str {
    name.trim_start_matches('/')
}

/// Validate metadata and render it as `X-Object-Meta-{key}` headers
pub(crate) fn metadata_headers(metadata: Option<&HashMap<String, String>>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let Some(metadata) = metadata else {
        return Ok(headers);
    };

    for (key, value) in metadata {
        if !validation::validate_metadata_key(key) {
            return Err(Error::Metadata(format!("key too long or empty: {}", key)));
        }
        if !validation::validate_metadata_value(value) {
            return Err(Error::Metadata(format!("value too long for key {}", key)));
        }
        let name = HeaderName::from_bytes(format!("{}{}", META_DATA_HEADER, key).as_bytes())
            .map_err(|_| Error::Metadata(format!("key is not a valid header name: {}", key)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::Metadata(format!("value is not a valid header value for key {}", key)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Render a header value, reporting failures as argument errors
pub(crate) fn header_value(value: &str, name: &'static str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| Error::Argument(name))
}
