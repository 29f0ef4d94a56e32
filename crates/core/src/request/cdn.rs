//! CDN management requests, sent to the CDN management URL

use super::{build_url, check_container, require, StorageRequest};
use crate::error::{Error, Result};
use crate::http::{InboundResponse, OutboundRequest};
use crate::model::CdnContainerInformation;
use crate::response::{
    check_status, header_bool, header_str, header_u64, parse_name_list, Outcome, StatusTable,
    X_CDN_ENABLED, X_CDN_URI, X_LOG_RETENTION, X_TTL,
};
use async_trait::async_trait;
use http::{HeaderValue, Method, StatusCode};
use url::Url;

/// Default edge cache TTL in seconds (72 hours)
pub const DEFAULT_CDN_TTL: u64 = 259_200;

/// Smallest TTL the CDN accepts
pub const MIN_CDN_TTL: u64 = 900;

/// Largest TTL the CDN accepts (one year)
pub const MAX_CDN_TTL: u64 = 31_536_000;

fn check_ttl(ttl: u64) -> Result<()> {
    if !(MIN_CDN_TTL..=MAX_CDN_TTL).contains(&ttl) {
        return Err(Error::Argument("ttl"));
    }
    Ok(())
}

fn true_false(value: bool) -> HeaderValue {
    HeaderValue::from_static(if value { "True" } else { "False" })
}

/// GET the names of CDN-enabled containers
#[derive(Debug, Clone)]
pub struct GetPublicContainers {
    cdn_management_url: String,
    enabled_only: bool,
}

impl GetPublicContainers {
    pub fn new(cdn_management_url: &str) -> Result<Self> {
        require(cdn_management_url, "cdn_management_url")?;
        Ok(Self {
            cdn_management_url: cdn_management_url.to_string(),
            enabled_only: false,
        })
    }

    /// Skip containers that were published once and later disabled
    pub fn enabled_only(mut self, enabled_only: bool) -> Self {
        self.enabled_only = enabled_only;
        self
    }
}

#[async_trait]
impl StorageRequest for GetPublicContainers {
    type Output = Vec<String>;

    const STATUS_TABLE: StatusTable = &[
        (StatusCode::OK, Outcome::Ok),
        (StatusCode::NO_CONTENT, Outcome::NoContent),
    ];

    fn build_uri(&self) -> Result<Url> {
        let query = if self.enabled_only {
            vec![("enabled_only", "true".to_string())]
        } else {
            Vec::new()
        };
        build_url(&self.cdn_management_url, &[], &query)
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

/// PUT a container onto the CDN; returns its public URI
#[derive(Debug, Clone)]
pub struct MarkContainerAsPublic {
    cdn_management_url: String,
    container: String,
    ttl: u64,
}

impl MarkContainerAsPublic {
    pub fn new(cdn_management_url: &str, container: &str, ttl: u64) -> Result<Self> {
        require(cdn_management_url, "cdn_management_url")?;
        require(container, "container")?;
        check_container(container)?;
        check_ttl(ttl)?;
        Ok(Self {
            cdn_management_url: cdn_management_url.to_string(),
            container: container.to_string(),
            ttl,
        })
    }
}

#[async_trait]
impl StorageRequest for MarkContainerAsPublic {
    type Output = Option<String>;

    const STATUS_TABLE: StatusTable = &[
        (StatusCode::CREATED, Outcome::Created),
        (StatusCode::ACCEPTED, Outcome::AlreadyExists),
    ];

    fn build_uri(&self) -> Result<Url> {
        build_url(&self.cdn_management_url, &[&self.container], &[])
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::PUT;
        request.headers.insert(X_TTL, HeaderValue::from(self.ttl));
    }

    async fn translate(response: InboundResponse) -> Result<Option<String>> {
        let (_, response) = check_status(response, Self::STATUS_TABLE).await?;
        Ok(header_str(&response.headers, X_CDN_URI).map(str::to_string))
    }
}

/// POST CDN settings (enabled flag, TTL, log retention) for a container
#[derive(Debug, Clone)]
pub struct SetPublicContainerDetails {
    cdn_management_url: String,
    container: String,
    cdn_enabled: bool,
    ttl: Option<u64>,
    log_retention: Option<bool>,
}

impl SetPublicContainerDetails {
    pub fn new(cdn_management_url: &str, container: &str, cdn_enabled: bool) -> Result<Self> {
        require(cdn_management_url, "cdn_management_url")?;
        require(container, "container")?;
        check_container(container)?;
        Ok(Self {
            cdn_management_url: cdn_management_url.to_string(),
            container: container.to_string(),
            cdn_enabled,
            ttl: None,
            log_retention: None,
        })
    }

    pub fn ttl(mut self, ttl: u64) -> Result<Self> {
        check_ttl(ttl)?;
        self.ttl = Some(ttl);
        Ok(self)
    }

    pub fn log_retention(mut self, log_retention: bool) -> Self {
        self.log_retention = Some(log_retention);
        self
    }
}

#[async_trait]
impl StorageRequest for SetPublicContainerDetails {
    type Output = ();

    const STATUS_TABLE: StatusTable = &[
        (StatusCode::ACCEPTED, Outcome::Accepted),
        (StatusCode::NO_CONTENT, Outcome::NoContent),
    ];

    fn build_uri(&self) -> Result<Url> {
        build_url(&self.cdn_management_url, &[&self.container], &[])
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::POST;
        request.headers.insert(X_CDN_ENABLED, true_false(self.cdn_enabled));
        if let Some(ttl) = self.ttl {
            request.headers.insert(X_TTL, HeaderValue::from(ttl));
        }
        if let Some(log_retention) = self.log_retention {
            request.headers.insert(X_LOG_RETENTION, true_false(log_retention));
        }
    }

    async fn translate(response: InboundResponse) -> Result<()> {
        check_status(response, Self::STATUS_TABLE).await?;
        Ok(())
    }
}

/// HEAD a container on the CDN for its public URI and settings
#[derive(Debug, Clone)]
pub struct GetPublicContainerInformation {
    cdn_management_url: String,
    container: String,
}

impl GetPublicContainerInformation {
    pub fn new(cdn_management_url: &str, container: &str) -> Result<Self> {
        require(cdn_management_url, "cdn_management_url")?;
        require(container, "container")?;
        check_container(container)?;
        Ok(Self {
            cdn_management_url: cdn_management_url.to_string(),
            container: container.to_string(),
        })
    }
}

#[async_trait]
impl StorageRequest for GetPublicContainerInformation {
    type Output = CdnContainerInformation;

    const STATUS_TABLE: StatusTable = &[
        (StatusCode::NO_CONTENT, Outcome::NoContent),
        (StatusCode::OK, Outcome::Ok),
    ];

    fn build_uri(&self) -> Result<Url> {
        build_url(&self.cdn_management_url, &[&self.container], &[])
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::HEAD;
    }

    async fn translate(response: InboundResponse) -> Result<CdnContainerInformation> {
        let (_, response) = check_status(response, Self::STATUS_TABLE).await?;
        let headers = &response.headers;
        Ok(CdnContainerInformation {
            cdn_enabled: header_bool(headers, X_CDN_ENABLED).unwrap_or(false),
            cdn_uri: header_str(headers, X_CDN_URI).map(str::to_string),
            ttl: header_u64(headers, X_TTL),
            log_retention: header_bool(headers, X_LOG_RETENTION),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CDN_URL: &str = "https://cdn.example.com/v1/acct";

    fn url(path: &str) -> Url {
        Url::parse(&format!("{}{}", CDN_URL, path)).unwrap()
    }

    #[tokio::test]
    async fn test_public_containers() {
        let request = GetPublicContainers::new(CDN_URL).unwrap().enabled_only(true);
        assert_eq!(
            request.build_uri().unwrap().as_str(),
            "https://cdn.example.com/v1/acct?enabled_only=true"
        );

        let response = InboundResponse::new(StatusCode::OK, url("")).with_body("site\nassets\n");
        assert_eq!(
            GetPublicContainers::translate(response).await.unwrap(),
            vec!["site", "assets"]
        );
    }

    #[tokio::test]
    async fn test_mark_container_as_public() {
        let request = MarkContainerAsPublic::new(CDN_URL, "site", 10_000).unwrap();
        let mut outbound = OutboundRequest::new(request.build_uri().unwrap());
        request.apply(&mut outbound);
        assert_eq!(outbound.method, Method::PUT);
        assert_eq!(outbound.uri.as_str(), "https://cdn.example.com/v1/acct/site");
        assert_eq!(outbound.headers.get(X_TTL).unwrap(), "10000");

        let response = InboundResponse::new(StatusCode::CREATED, url("/site"))
            .with_header("X-CDN-URI", "http://c0001.cdn.example.com");
        assert_eq!(
            MarkContainerAsPublic::translate(response).await.unwrap().as_deref(),
            Some("http://c0001.cdn.example.com")
        );
    }

    #[test]
    fn test_ttl_bounds() {
        assert!(matches!(
            MarkContainerAsPublic::new(CDN_URL, "site", 10),
            Err(Error::Argument("ttl"))
        ));
        assert!(MarkContainerAsPublic::new(CDN_URL, "site", MIN_CDN_TTL).is_ok());
        assert!(SetPublicContainerDetails::new(CDN_URL, "site", true)
            .unwrap()
            .ttl(MAX_CDN_TTL + 1)
            .is_err());
    }

    #[test]
    fn test_set_public_container_details() {
        let request = SetPublicContainerDetails::new(CDN_URL, "site", false)
            .unwrap()
            .ttl(3600)
            .unwrap()
            .log_retention(true);
        let mut outbound = OutboundRequest::new(request.build_uri().unwrap());
        request.apply(&mut outbound);

        assert_eq!(outbound.method, Method::POST);
        assert_eq!(outbound.headers.get(X_CDN_ENABLED).unwrap(), "False");
        assert_eq!(outbound.headers.get(X_TTL).unwrap(), "3600");
        assert_eq!(outbound.headers.get(X_LOG_RETENTION).unwrap(), "True");
    }

    #[tokio::test]
    async fn test_public_container_information() {
        let response = InboundResponse::new(StatusCode::NO_CONTENT, url("/site"))
            .with_header("X-CDN-Enabled", "True")
            .with_header("X-CDN-URI", "http://c0001.cdn.example.com")
            .with_header("X-TTL", "259200")
            .with_header("X-Log-Retention", "False");

        let info = GetPublicContainerInformation::translate(response).await.unwrap();

        assert!(info.cdn_enabled);
        assert_eq!(info.cdn_uri.as_deref(), Some("http://c0001.cdn.example.com"));
        assert_eq!(info.ttl, Some(DEFAULT_CDN_TTL));
        assert_eq!(info.log_retention, Some(false));
    }

    #[test]
    fn test_cdn_container_name_validated() {
        assert!(matches!(
            GetPublicContainerInformation::new(CDN_URL, "a?b"),
            Err(Error::ContainerName(_))
        ));
    }
}
