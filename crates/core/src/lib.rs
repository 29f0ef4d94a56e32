//! cloudfiles-core - Core library for the Cloud Files CLI
//!
//! This library provides the HTTP client layer for Cloud Files (OpenStack Swift)
//! object storage: name validation, content type resolution, one request
//! descriptor per storage operation, response translation, configuration
//! management, and the [`Connection`] that ties them together.

pub mod auth;
pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod mime_types;
pub mod model;
pub mod request;
pub mod response;
pub mod transport;
pub mod validation;

// Re-export commonly used types
pub use auth::{AuthProvider, StaticEndpoint, StorageEndpoint, UserCredentials, DEFAULT_AUTH_URL};
pub use config::{config_exists, get_config_path, load_config, save_config, validate_config};
pub use config::{AccountConfig, AdvancedConfig, ConfigFile, LoggingConfig, OutputConfig, StorageConfig};
pub use connection::Connection;
pub use error::{Error, Result};
pub use crate::http::{InboundResponse, OutboundRequest, ProgressCallback};
pub use model::{
    AccountInformation, CdnContainerInformation, ContainerCreation, ContainerInformation,
    ContainerSummary, ObjectInformation, ObjectSummary, StorageItem,
};
pub use request::{ListParameters, RequestHeader, StorageRequest};
pub use transport::{ReqwestTransport, Transport};
