//! Response translation: status tables, error mapping and header parsing

use crate::error::{Error, Result};
use crate::http::InboundResponse;
use crate::model::{ContainerInformation, ObjectInformation};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED};
use http::{HeaderMap, StatusCode};
use std::collections::HashMap;

/// Header prefix carrying user metadata on objects
pub const META_DATA_HEADER: &str = "X-Object-Meta-";

pub const X_AUTH_TOKEN: &str = "X-Auth-Token";
pub const X_AUTH_USER: &str = "X-Auth-User";
pub const X_AUTH_KEY: &str = "X-Auth-Key";
pub const X_STORAGE_URL: &str = "X-Storage-Url";
pub const X_CDN_MANAGEMENT_URL: &str = "X-CDN-Management-Url";
pub const X_CONTAINER_OBJECT_COUNT: &str = "X-Container-Object-Count";
pub const X_CONTAINER_BYTES_USED: &str = "X-Container-Bytes-Used";
pub const X_ACCOUNT_CONTAINER_COUNT: &str = "X-Account-Container-Count";
pub const X_ACCOUNT_BYTES_USED: &str = "X-Account-Bytes-Used";
pub const X_CDN_ENABLED: &str = "X-CDN-Enabled";
pub const X_CDN_URI: &str = "X-CDN-URI";
pub const X_TTL: &str = "X-TTL";
pub const X_LOG_RETENTION: &str = "X-Log-Retention";
pub const DESTINATION: &str = "Destination";

/// What a success status means for a particular operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Created,
    Accepted,
    NoContent,
    PartialContent,
    AlreadyExists,
}

/// Success statuses of one operation; anything else is an error
pub type StatusTable = &'static [(StatusCode, Outcome)];

/// Match the response status against an operation's table.
///
/// Statuses outside the table become typed errors; the body is read only as
/// diagnostic text for those.
pub async fn check_status(
    response: InboundResponse,
    table: StatusTable,
) -> Result<(Outcome, InboundResponse)> {
    if let Some((_, outcome)) = table.iter().find(|(status, _)| *status == response.status) {
        return Ok((*outcome, response));
    }

    let status = response.status;
    let resource = response.url.path().to_string();
    let body = response.body.text().await.unwrap_or_default();
    let err = error_for_status(status, resource, body);
    tracing::warn!(status = status.as_u16(), "storage request failed: {}", err);
    Err(err)
}

/// Map a failure status to the error taxonomy
pub fn error_for_status(status: StatusCode, resource: String, body: String) -> Error {
    let detail = if body.trim().is_empty() {
        resource
    } else {
        format!("{}: {}", resource, body.trim())
    };

    match status.as_u16() {
        401 => Error::Authentication(detail),
        403 => Error::PermissionDenied(detail),
        404 => Error::NotFound(detail),
        409 => Error::Conflict(detail),
        412 => Error::PreconditionFailed(detail),
        code if status.is_server_error() => Error::ServerFault { status: code, body },
        code => Error::UnexpectedStatus { status: code, body },
    }
}

/// Split a plain-text listing into names, one per line
pub fn parse_name_list(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Collect `X-Object-Meta-*` headers, prefix removed.
///
/// Header names are case-insensitive and `http` stores them lowercased, so the
/// keys come back lowercased whatever case they were written in.
pub fn extract_metadata(headers: &HeaderMap) -> HashMap<String, String> {
    let prefix = META_DATA_HEADER.to_ascii_lowercase();
    headers
        .iter()
        .filter_map(|(name, value)| {
            let key = name.as_str().strip_prefix(prefix.as_str())?;
            let value = value.to_str().ok()?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Read a header as a string
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Read a header as an unsigned integer
pub fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    header_str(headers, name).and_then(|v| v.trim().parse().ok())
}

/// Read a `True`/`False` header
pub fn header_bool(headers: &HeaderMap, name: &str) -> Option<bool> {
    header_str(headers, name).map(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Build object information from response headers
pub fn object_information(headers: &HeaderMap) -> ObjectInformation {
    ObjectInformation {
        content_type: header_str(headers, CONTENT_TYPE.as_str()).map(str::to_string),
        content_length: header_u64(headers, CONTENT_LENGTH.as_str()),
        etag: header_str(headers, ETAG.as_str()).map(str::to_string),
        last_modified: header_str(headers, LAST_MODIFIED.as_str()).map(str::to_string),
        metadata: extract_metadata(headers),
    }
}

/// Build container information from response headers
pub fn container_information(name: &str, headers: &HeaderMap) -> ContainerInformation {
    ContainerInformation {
        name: name.to_string(),
        object_count: header_u64(headers, X_CONTAINER_OBJECT_COUNT).unwrap_or(0),
        bytes_used: header_u64(headers, X_CONTAINER_BYTES_USED).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    const DELETE_TABLE: StatusTable = &[(StatusCode::NO_CONTENT, Outcome::NoContent)];
    const CREATE_TABLE: StatusTable = &[
        (StatusCode::CREATED, Outcome::Created),
        (StatusCode::ACCEPTED, Outcome::AlreadyExists),
    ];

    fn response(status: u16) -> InboundResponse {
        InboundResponse::new(
            StatusCode::from_u16(status).unwrap(),
            Url::parse("https://storage.example.com/v1/acct/photos").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_check_status_success() {
        let (outcome, _) = check_status(response(204), DELETE_TABLE).await.unwrap();
        assert_eq!(outcome, Outcome::NoContent);
    }

    #[tokio::test]
    async fn test_check_status_per_operation_meaning() {
        let (outcome, _) = check_status(response(202), CREATE_TABLE).await.unwrap();
        assert_eq!(outcome, Outcome::AlreadyExists);

        // 202 means nothing to a delete
        let err = check_status(response(202), DELETE_TABLE).await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedStatus { status: 202, .. }));
    }

    #[tokio::test]
    async fn test_check_status_errors() {
        let err = check_status(response(404), DELETE_TABLE).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(ref r) if r == "/v1/acct/photos"));

        let err = check_status(response(401), DELETE_TABLE).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));

        let err = check_status(response(409).with_body("There was a conflict"), DELETE_TABLE)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(ref d) if d.contains("There was a conflict")));

        let err = check_status(response(503).with_body("busy"), DELETE_TABLE)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ServerFault { status: 503, ref body } if body == "busy"));
    }

    #[test]
    fn test_parse_name_list() {
        assert_eq!(parse_name_list("a\nb\r\n\nc\n"), vec!["a", "b", "c"]);
        assert!(parse_name_list("").is_empty());
        assert!(parse_name_list("\n\n").is_empty());
    }

    #[test]
    fn test_extract_metadata() {
        let response = response(200)
            .with_header("X-Object-Meta-Testkey", "testvalue")
            .with_header("X-Container-Object-Count", "3")
            .with_header("Content-Type", "text/plain");

        let metadata = extract_metadata(&response.headers);

        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata.get("testkey").map(String::as_str), Some("testvalue"));
        assert!(!metadata.contains_key("Testkey"));
    }

    #[test]
    fn test_header_readers() {
        let response = response(204)
            .with_header("X-Container-Object-Count", "42")
            .with_header("X-Container-Bytes-Used", "not-a-number")
            .with_header("X-CDN-Enabled", "True");

        assert_eq!(header_u64(&response.headers, X_CONTAINER_OBJECT_COUNT), Some(42));
        assert_eq!(header_u64(&response.headers, X_CONTAINER_BYTES_USED), None);
        assert_eq!(header_bool(&response.headers, X_CDN_ENABLED), Some(true));

        let info = container_information("photos", &response.headers);
        assert_eq!(info.object_count, 42);
        assert_eq!(info.bytes_used, 0);
    }
}
