//! Error types for cloudfiles-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cloudfiles-core
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cloudfiles-core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidConfig(String),

    /// A required argument was missing or empty
    #[error("Missing required argument: {0}")]
    Argument(&'static str),

    /// Container name failed validation
    #[error("Invalid container name: {0}")]
    ContainerName(String),

    /// Storage item (object) name failed validation
    #[error("Invalid storage item name: {0}")]
    StorageItemName(String),

    /// Metadata key or value failed validation
    #[error("Invalid metadata: {0}")]
    Metadata(String),

    /// Request URL could not be assembled
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The account has no CDN management endpoint
    #[error("CDN management URL not available for this account")]
    CdnUnavailable,

    /// Authentication error (401)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Permission denied (403)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Not found error (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflicting state, e.g. deleting a non-empty container (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Conditional request failed (412)
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// The storage service failed (5xx)
    #[error("Storage service fault (HTTP {status}): {body}")]
    ServerFault { status: u16, body: String },

    /// A status code the operation does not expect
    #[error("Unexpected response (HTTP {status}): {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Connection-level failure
    #[error("Network error: {0}")]
    Transport(String),

    /// Timeout
    #[error("Operation timed out")]
    Timeout,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Raised locally before any network I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Argument(_)
                | Error::ContainerName(_)
                | Error::StorageItemName(_)
                | Error::Metadata(_)
                | Error::InvalidUrl(_)
        )
    }

    /// The exchange never produced a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Timeout)
    }

    /// The storage service answered with a status the operation treats as failure.
    pub fn is_service(&self) -> bool {
        matches!(
            self,
            Error::Authentication(_)
                | Error::PermissionDenied(_)
                | Error::NotFound(_)
                | Error::Conflict(_)
                | Error::PreconditionFailed(_)
                | Error::ServerFault { .. }
                | Error::UnexpectedStatus { .. }
        )
    }

    /// HTTP status of a service error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Authentication(_) => Some(401),
            Error::PermissionDenied(_) => Some(403),
            Error::NotFound(_) => Some(404),
            Error::Conflict(_) => Some(409),
            Error::PreconditionFailed(_) => Some(412),
            Error::ServerFault { status, .. } | Error::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidUrl(err.to_string())
    }
}
