//! Header-based (v1.0) authentication request

use super::{header_value, require, StorageRequest};
use crate::auth::StorageEndpoint;
use crate::error::{Error, Result};
use crate::http::{InboundResponse, OutboundRequest};
use crate::response::{
    check_status, header_str, Outcome, StatusTable, X_AUTH_KEY, X_AUTH_TOKEN, X_AUTH_USER,
    X_CDN_MANAGEMENT_URL, X_STORAGE_URL,
};
use async_trait::async_trait;
use http::{HeaderValue, Method, StatusCode};
use std::fmt;
use url::Url;

/// GET the auth URL with user name and API key headers
pub struct GetAuthentication {
    auth_url: Url,
    username: HeaderValue,
    api_key: HeaderValue,
}

impl GetAuthentication {
    pub fn new(auth_url: &str, username: &str, api_key: &str) -> Result<Self> {
        require(auth_url, "auth_url")?;
        require(username, "username")?;
        require(api_key, "api_key")?;

        let mut api_key = header_value(api_key, "api_key")?;
        api_key.set_sensitive(true);

        Ok(Self {
            auth_url: Url::parse(auth_url)?,
            username: header_value(username, "username")?,
            api_key,
        })
    }
}

impl fmt::Debug for GetAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetAuthentication")
            .field("auth_url", &self.auth_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StorageRequest for GetAuthentication {
    type Output = StorageEndpoint;

    const STATUS_TABLE: StatusTable = &[
        (StatusCode::NO_CONTENT, Outcome::NoContent),
        (StatusCode::OK, Outcome::Ok),
    ];

    fn build_uri(&self) -> Result<Url> {
        Ok(self.auth_url.clone())
    }

    fn apply(self, request: &mut OutboundRequest) {
        request.method = Method::GET;
        request.headers.insert(X_AUTH_USER, self.username);
        request.headers.insert(X_AUTH_KEY, self.api_key);
    }

    async fn translate(response: InboundResponse) -> Result<StorageEndpoint> {
        let (_, response) = check_status(response, Self::STATUS_TABLE).await?;
        let headers = &response.headers;

        let storage_url = header_str(headers, X_STORAGE_URL)
            .ok_or_else(|| Error::Authentication("response carried no storage URL".to_string()))?;
        let auth_token = header_str(headers, X_AUTH_TOKEN)
            .ok_or_else(|| Error::Authentication("response carried no auth token".to_string()))?;
        let cdn_management_url = header_str(headers, X_CDN_MANAGEMENT_URL)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        Ok(StorageEndpoint::new(storage_url, auth_token, cdn_management_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTH_URL: &str = "https://auth.api.rackspacecloud.com/v1.0";

    #[test]
    fn test_requires_arguments() {
        assert!(matches!(
            GetAuthentication::new(AUTH_URL, "", "key"),
            Err(Error::Argument("username"))
        ));
        assert!(matches!(
            GetAuthentication::new(AUTH_URL, "user", ""),
            Err(Error::Argument("api_key"))
        ));
        assert!(matches!(
            GetAuthentication::new("", "user", "key"),
            Err(Error::Argument("auth_url"))
        ));
    }

    #[test]
    fn test_apply_sets_credentials() {
        let request = GetAuthentication::new(AUTH_URL, "user", "secret").unwrap();
        let mut outbound = OutboundRequest::new(request.build_uri().unwrap());
        request.apply(&mut outbound);

        assert_eq!(outbound.method, Method::GET);
        assert_eq!(outbound.uri.as_str(), AUTH_URL);
        assert_eq!(outbound.headers.get(X_AUTH_USER).unwrap(), "user");
        assert_eq!(outbound.headers.get(X_AUTH_KEY).unwrap(), "secret");
        assert!(outbound.headers.get(X_AUTH_KEY).unwrap().is_sensitive());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let request = GetAuthentication::new(AUTH_URL, "user", "secret").unwrap();
        assert!(!format!("{:?}", request).contains("secret"));
    }

    #[tokio::test]
    async fn test_translate_endpoint() {
        let response = InboundResponse::new(StatusCode::NO_CONTENT, Url::parse(AUTH_URL).unwrap())
            .with_header("X-Storage-Url", "https://storage.example.com/v1/acct")
            .with_header("X-Auth-Token", "token-123")
            .with_header("X-CDN-Management-Url", "https://cdn.example.com/v1/acct");

        let endpoint = GetAuthentication::translate(response).await.unwrap();

        assert_eq!(endpoint.storage_url(), "https://storage.example.com/v1/acct");
        assert_eq!(endpoint.auth_token(), "token-123");
        assert_eq!(endpoint.cdn_management_url(), Some("https://cdn.example.com/v1/acct"));
    }

    #[tokio::test]
    async fn test_translate_rejected_credentials() {
        let response = InboundResponse::new(StatusCode::UNAUTHORIZED, Url::parse(AUTH_URL).unwrap());
        let err = GetAuthentication::translate(response).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }
}
