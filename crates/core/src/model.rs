//! Domain values returned by storage operations

use crate::error::{Error, Result};
use crate::http::{body_read_error, ResponseBody};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Account totals from a HEAD on the storage URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountInformation {
    pub container_count: u64,
    pub bytes_used: u64,
}

/// Container totals from a HEAD on the container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInformation {
    pub name: String,
    pub object_count: u64,
    pub bytes_used: u64,
}

/// One entry of a detailed (`format=json`) container listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub name: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub bytes: u64,
}

/// One entry of a detailed (`format=json`) object listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub name: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub last_modified: String,
}

/// Outcome of creating a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerCreation {
    Created,
    AlreadyExisted,
}

/// Object headers from a HEAD or GET
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectInformation {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    /// User metadata with the `X-Object-Meta-` prefix removed. Keys are always
    /// lowercase; a key stored as `Testkey` reads back as `testkey`.
    pub metadata: HashMap<String, String>,
}

/// A downloaded object: its headers plus the still-unread body
#[derive(Debug)]
pub struct StorageItem {
    pub information: ObjectInformation,
    body: ResponseBody,
}

impl StorageItem {
    pub fn new(information: ObjectInformation, body: ResponseBody) -> Self {
        Self { information, body }
    }

    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    pub fn into_reader(self) -> impl AsyncRead + Send + Unpin {
        self.body.into_reader()
    }

    /// Read the whole object into memory
    pub async fn bytes(self) -> Result<bytes::Bytes> {
        self.body.bytes().await
    }

    /// Stream the object into a local file, returning the bytes written.
    ///
    /// The body goes to a `.part` sibling first and is renamed into place once
    /// complete; on any failure the partial file is removed and `path` is left
    /// untouched.
    pub async fn save_to(self, path: &Path) -> Result<u64> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let partial = partial_path(path);
        let result = match write_body(self.body, &partial).await {
            Ok(written) => tokio::fs::rename(&partial, path)
                .await
                .map(|_| written)
                .map_err(Error::from),
            Err(err) => Err(err),
        };
        if result.is_err() {
            if let Err(err) = tokio::fs::remove_file(&partial).await {
                tracing::debug!(path = %partial.display(), "partial download not removed: {}", err);
            }
        }
        result
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

async fn write_body(body: ResponseBody, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = body.into_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(body_read_error)?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

/// CDN state of a container
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CdnContainerInformation {
    pub cdn_enabled: bool,
    pub cdn_uri: Option<String>,
    pub ttl: Option<u64>,
    pub log_retention: Option<bool>,
}
