//! Container requests

use super::{build_url, check_container, require, ListParameters, StorageRequest};
use crate::error::Result;
use crate::http::{InboundResponse, OutboundRequest};
use crate::model::{ContainerCreation, ContainerInformation, ObjectSummary};
use crate::response::{
    check_status, container_information, parse_name_list, Outcome, StatusTable,
};
use async_trait::async_trait;
use http::{Method, StatusCode};
use url::Url;

/// Validated storage URL and container name shared by container requests
#[derive(Debug, Clone)]
struct ContainerTarget {
    storage_url: String,
    container: String,
}

impl ContainerTarget {
    fn new(storage_url: &str, container: &str) -> Result<Self> {
        require(storage_url, "storage_url")?;
        require(container, "container")?;
        check_container(container)?;
        Ok(Self {
            storage_url: storage_url.to_string(),
            container: container.to_string(),
        })
    }

    fn uri(&self, query: &[(&'static str, String)]) -> Result<Url> {
        build_url(&self.storage_url, &[&self.container], query)
    }
}

/// PUT a container; 202 means it was already there
#[derive(Debug, Clone)]
pub struct CreateContainer {
    target: ContainerTarget,
}

impl CreateContainer {
    pub fn new(storage_url: &str, container: &str) -> Result<Self> {
        Ok(Self {
            target: ContainerTarget::new(storage_url, container)?,
        })
    }
}

#[async_trait]
impl StorageRequest for CreateContainer {
    type Output = ContainerCreation;

    const STATUS_TABLE: StatusTable = &[
        (StatusCode::CREATED, Outcome::Created),
        (StatusCode::ACCEPTED, Outcome::AlreadyExists),
    ];

    fn build_uri(&self) -> Result<Url> {
        self.target.uri(&[])
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::PUT;
    }

    async fn translate(response: InboundResponse) -> Result<ContainerCreation> {
        let (outcome, _) = check_status(response, Self::STATUS_TABLE).await?;
        Ok(match outcome {
            Outcome::AlreadyExists => ContainerCreation::AlreadyExisted,
            _ => ContainerCreation::Created,
        })
    }
}

/// DELETE an empty container; 409 when it still holds objects
#[derive(Debug, Clone)]
pub struct DeleteContainer {
    target: ContainerTarget,
}

impl DeleteContainer {
    pub fn new(storage_url: &str, container: &str) -> Result<Self> {
        Ok(Self {
            target: ContainerTarget::new(storage_url, container)?,
        })
    }
}

#[async_trait]
impl StorageRequest for DeleteContainer {
    type Output = ();

    const STATUS_TABLE: StatusTable = &[(StatusCode::NO_CONTENT, Outcome::NoContent)];

    fn build_uri(&self) -> Result<Url> {
        self.target.uri(&[])
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::DELETE;
    }

    async fn translate(response: InboundResponse) -> Result<()> {
        check_status(response, Self::STATUS_TABLE).await?;
        Ok(())
    }
}

/// HEAD a container for object count and bytes used
#[derive(Debug, Clone)]
pub struct GetContainerInformation {
    target: ContainerTarget,
}

impl GetContainerInformation {
    pub fn new(storage_url: &str, container: &str) -> Result<Self> {
        Ok(Self {
            target: ContainerTarget::new(storage_url, container)?,
        })
    }
}

#[async_trait]
impl StorageRequest for GetContainerInformation {
    type Output = ContainerInformation;

    const STATUS_TABLE: StatusTable = &[
        (StatusCode::NO_CONTENT, Outcome::NoContent),
        (StatusCode::OK, Outcome::Ok),
    ];

    fn build_uri(&self) -> Result<Url> {
        self.target.uri(&[])
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::HEAD;
    }

    async fn translate(response: InboundResponse) -> Result<ContainerInformation> {
        let (_, response) = check_status(response, Self::STATUS_TABLE).await?;
        let name = container_name_from_url(&response.url);
        Ok(container_information(&name, &response.headers))
    }
}

/// Last path segment of the request URL, decoded
fn container_name_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default();
    percent_encoding::percent_decode_str(segment)
        .decode_utf8_lossy()
        .into_owned()
}

/// GET the object names in a container, one per line
#[derive(Debug, Clone)]
pub struct GetContainerItemList {
    target: ContainerTarget,
    parameters: ListParameters,
}

impl GetContainerItemList {
    pub fn new(storage_url: &str, container: &str) -> Result<Self> {
        Ok(Self {
            target: ContainerTarget::new(storage_url, container)?,
            parameters: ListParameters::default(),
        })
    }

    pub fn with_parameters(mut self, parameters: ListParameters) -> Self {
        self.parameters = parameters;
        self
    }
}

#[async_trait]
impl StorageRequest for GetContainerItemList {
    type Output = Vec<String>;

    const STATUS_TABLE: StatusTable = &[
        (StatusCode::OK, Outcome::Ok),
        (StatusCode::NO_CONTENT, Outcome::NoContent),
    ];

    fn build_uri(&self) -> Result<Url> {
        self.target.uri(&self.parameters.pairs())
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::GET;
    }

    async fn translate(response: InboundResponse) -> Result<Vec<String>> {
        let (outcome, response) = check_status(response, Self::STATUS_TABLE).await?;
        if outcome == Outcome::NoContent {
            return Ok(Vec::new());
        }
        let body = response.body.text().await?;
        Ok(parse_name_list(&body))
    }
}

/// GET the objects in a container with hash, size and type (`format=json`)
#[derive(Debug, Clone)]
pub struct GetContainerItemListDetailed {
    inner: GetContainerItemList,
}

impl GetContainerItemListDetailed {
    pub fn new(storage_url: &str, container: &str) -> Result<Self> {
        Ok(Self {
            inner: GetContainerItemList::new(storage_url, container)?,
        })
    }

    pub fn with_parameters(mut self, parameters: ListParameters) -> Self {
        self.inner = self.inner.with_parameters(parameters);
        self
    }
}

#[async_trait]
impl StorageRequest for GetContainerItemListDetailed {
    type Output = Vec<ObjectSummary>;

    const STATUS_TABLE: StatusTable = GetContainerItemList::STATUS_TABLE;

    fn build_uri(&self) -> Result<Url> {
        let mut pairs = self.inner.parameters.pairs();
        pairs.push(("format", "json".to_string()));
        self.inner.target.uri(&pairs)
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::GET;
    }

    async fn translate(response: InboundResponse) -> Result<Vec<ObjectSummary>> {
        let (outcome, response) = check_status(response, Self::STATUS_TABLE).await?;
        if outcome == Outcome::NoContent {
            return Ok(Vec::new());
        }
        let body = response.body.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&body)?)
    }
}
