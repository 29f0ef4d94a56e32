//! Account-level requests against the storage URL

use super::{build_url, require, ListParameters, StorageRequest};
use crate::error::Result;
use crate::http::{InboundResponse, OutboundRequest};
use crate::model::{AccountInformation, ContainerSummary};
use crate::response::{
    check_status, header_u64, parse_name_list, Outcome, StatusTable, X_ACCOUNT_BYTES_USED,
    X_ACCOUNT_CONTAINER_COUNT,
};
use async_trait::async_trait;
use http::{Method, StatusCode};
use url::Url;

/// HEAD the account for container count and bytes used
#[derive(Debug, Clone)]
pub struct GetAccountInformation {
    storage_url: String,
}

impl GetAccountInformation {
    pub fn new(storage_url: &str) -> Result<Self> {
        require(storage_url, "storage_url")?;
        Ok(Self {
            storage_url: storage_url.to_string(),
        })
    }
}

#[async_trait]
impl StorageRequest for GetAccountInformation {
    type Output = AccountInformation;

    const STATUS_TABLE: StatusTable = &[
        (StatusCode::NO_CONTENT, Outcome::NoContent),
        (StatusCode::OK, Outcome::Ok),
    ];

    fn build_uri(&self) -> Result<Url> {
        build_url(&self.storage_url, &[], &[])
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::HEAD;
    }

    async fn translate(response: InboundResponse) -> Result<AccountInformation> {
        let (_, response) = check_status(response, Self::STATUS_TABLE).await?;
        Ok(AccountInformation {
            container_count: header_u64(&response.headers, X_ACCOUNT_CONTAINER_COUNT).unwrap_or(0),
            bytes_used: header_u64(&response.headers, X_ACCOUNT_BYTES_USED).unwrap_or(0),
        })
    }
}

/// GET the account's container names, one per line
#[derive(Debug, Clone)]
pub struct GetContainers {
    storage_url: String,
    parameters: ListParameters,
}

impl GetContainers {
    pub fn new(storage_url: &str) -> Result<Self> {
        require(storage_url, "storage_url")?;
        Ok(Self {
            storage_url: storage_url.to_string(),
            parameters: ListParameters::default(),
        })
    }

    pub fn with_parameters(mut self, parameters: ListParameters) -> Self {
        self.parameters = parameters;
        self
    }
}

#[async_trait]
impl StorageRequest for GetContainers {
    type Output = Vec<String>;

    const STATUS_TABLE: StatusTable = &[
        (StatusCode::OK, Outcome::Ok),
        (StatusCode::NO_CONTENT, Outcome::NoContent),
    ];

    fn build_uri(&self) -> Result<Url> {
        build_url(&self.storage_url, &[], &self.parameters.pairs())
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

/// GET the account's containers with counts and sizes (`format=json`)
#[derive(Debug, Clone)]
pub struct GetContainersDetailed {
    inner: GetContainers,
}

impl GetContainersDetailed {
    pub fn new(storage_url: &str) -> Result<Self> {
        Ok(Self {
            inner: GetContainers::new(storage_url)?,
        })
    }

    pub fn with_parameters(mut self, parameters: ListParameters) -> Self {
        self.inner = self.inner.with_parameters(parameters);
        self
    }
}

#[async_trait]
impl StorageRequest for GetContainersDetailed {
    type Output = Vec<ContainerSummary>;

    const STATUS_TABLE: StatusTable = GetContainers::STATUS_TABLE;

    fn build_uri(&self) -> Result<Url> {
        let mut pairs = self.inner.parameters.pairs();
        pairs.push(("format", "json".to_string()));
        build_url(&self.inner.storage_url, &[], &pairs)
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::GET;
    }

    async fn translate(response: InboundResponse) -> Result<Vec<ContainerSummary>> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const STORAGE_URL: &str = "https://storage.example.com/v1/MossoCloudFS_abc";

    fn url() -> Url {
        Url::parse(STORAGE_URL).unwrap()
    }

    #[test]
    fn test_requires_storage_url() {
        assert!(matches!(GetAccountInformation::new(""), Err(Error::Argument("storage_url"))));
        assert!(matches!(GetContainers::new(""), Err(Error::Argument("storage_url"))));
    }

    #[tokio::test]
    async fn test_account_information() {
        let request = GetAccountInformation::new(STORAGE_URL).unwrap();
        assert_eq!(request.build_uri().unwrap().as_str(), STORAGE_URL);

        let mut outbound = OutboundRequest::new(request.build_uri().unwrap());
        request.apply(&mut outbound);
        assert_eq!(outbound.method, Method::HEAD);

        let response = InboundResponse::new(StatusCode::NO_CONTENT, url())
            .with_header("X-Account-Container-Count", "7")
            .with_header("X-Account-Bytes-Used", "1024");
        let info = GetAccountInformation::translate(response).await.unwrap();
        assert_eq!(info.container_count, 7);
        assert_eq!(info.bytes_used, 1024);
    }

    #[tokio::test]
    async fn test_container_list() {
        let request = GetContainers::new(STORAGE_URL)
            .unwrap()
            .with_parameters(ListParameters::default().limit(2).marker("b"));
        assert_eq!(
            request.build_uri().unwrap().as_str(),
            format!("{}?limit=2&marker=b", STORAGE_URL)
        );

        let response = InboundResponse::new(StatusCode::OK, url()).with_body("alpha\nbeta\n");
        let names = GetContainers::translate(response).await.unwrap();
        assert_eq!(names, vec!["alpha", "beta"]);

        let empty = InboundResponse::new(StatusCode::NO_CONTENT, url());
        assert!(GetContainers::translate(empty).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_container_list_detailed() {
        let request = GetContainersDetailed::new(STORAGE_URL).unwrap();
        assert_eq!(
            request.build_uri().unwrap().as_str(),
            format!("{}?format=json", STORAGE_URL)
        );

        let response = InboundResponse::new(StatusCode::OK, url())
            .with_body(r#"[{"name":"photos","count":3,"bytes":300}]"#);
        let containers = GetContainersDetailed::translate(response).await.unwrap();
        assert_eq!(
            containers,
            vec![ContainerSummary {
                name: "photos".to_string(),
                count: 3,
                bytes: 300
            }]
        );
    }
}
