//! Connection tests against a scripted in-memory transport

use async_trait::async_trait;
use bytes::Bytes;
use cloudfiles_core::http::{ProgressStream, RequestBody, ResponseBody};
use cloudfiles_core::{
    Connection, ContainerCreation, Error, InboundResponse, ListParameters, OutboundRequest,
    ProgressCallback, RequestHeader, Result, StorageEndpoint, Transport, UserCredentials,
};
use futures::{stream, TryStreamExt};
use http::{Method, StatusCode};
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio_util::io::ReaderStream;

const STORAGE_URL: &str = "https://storage.example.com/v1/MossoCloudFS_acct";
const CDN_URL: &str = "https://cdn.example.com/v1/MossoCloudFS_acct";

/// What the transport saw
#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    url: String,
    headers: http::HeaderMap,
    content_type: Option<String>,
    body: Vec<u8>,
}

enum Scripted {
    Respond {
        status: StatusCode,
        headers: Vec<(&'static str, String)>,
        body: Bytes,
    },
    /// Headers arrive, then the body stream dies after `body`
    Interrupted {
        status: StatusCode,
        body: Bytes,
    },
    Fail(Error),
}

#[derive(Default)]
struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<Recorded>>,
}

impl MockTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn respond(&self, status: u16, headers: &[(&'static str, &str)], body: &'static str) {
        self.script.lock().unwrap().push_back(Scripted::Respond {
            status: StatusCode::from_u16(status).unwrap(),
            headers: headers.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            body: Bytes::from_static(body.as_bytes()),
        });
    }

    fn interrupt(&self, status: u16, body: &'static str) {
        self.script.lock().unwrap().push_back(Scripted::Interrupted {
            status: StatusCode::from_u16(status).unwrap(),
            body: Bytes::from_static(body.as_bytes()),
        });
    }

    fn fail(&self, error: Error) {
        self.script.lock().unwrap().push_back(Scripted::Fail(error));
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn last(&self) -> Recorded {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: OutboundRequest) -> Result<InboundResponse> {
        let method = request.method.clone();
        let url = request.uri.clone();
        let headers = request.headers.clone();
        let content_type = request.content_type.clone();

        let body = match request.into_body() {
            RequestBody::Empty => Vec::new(),
            RequestBody::Stream {
                reader,
                length,
                progress,
            } => {
                let stream = ProgressStream::new(ReaderStream::with_capacity(reader, 4), length, progress);
                let chunks: Vec<Bytes> = stream
                    .try_collect()
                    .await
                    .map_err(|e| Error::Transport(e.to_string()))?;
                chunks.concat()
            }
        };

        self.requests.lock().unwrap().push(Recorded {
            method,
            url: url.to_string(),
            headers,
            content_type,
            body,
        });

        let next = self.script.lock().unwrap().pop_front();
        match next.expect("unscripted request") {
            Scripted::Respond {
                status,
                headers,
                body,
            } => {
                let mut response = InboundResponse::new(status, url).with_body(body);
                for (name, value) in headers {
                    response = response.with_header(name, &value);
                }
                Ok(response)
            }
            Scripted::Interrupted { status, body } => {
                let mut response = InboundResponse::new(status, url);
                response.body = ResponseBody::from_stream(stream::iter(vec![
                    Ok(body),
                    Err(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        "connection reset by peer",
                    )),
                ]));
                Ok(response)
            }
            Scripted::Fail(error) => Err(error),
        }
    }
}

fn connection(transport: &Arc<MockTransport>, cdn: bool) -> Connection {
    let endpoint = StorageEndpoint::new(STORAGE_URL, "token-1", cdn.then(|| CDN_URL.to_string()));
    Connection::with_endpoint(transport.clone(), endpoint)
}

fn unique_container() -> String {
    format!("test-{}", uuid::Uuid::new_v4())
}

fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<(u64, u64)>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    let callback: ProgressCallback = Arc::new(move |sent, total| {
        sink.lock().unwrap().push((sent, total));
    });
    (callback, calls)
}

#[tokio::test]
async fn test_connect_authenticates_then_sends_token() {
    let transport = MockTransport::new();
    transport.respond(
        204,
        &[
            ("X-Storage-Url", STORAGE_URL),
            ("X-Auth-Token", "token-1"),
            ("X-CDN-Management-Url", CDN_URL),
        ],
        "",
    );
    transport.respond(201, &[], "");

    let credentials = UserCredentials::new("user", "key").auth_url("https://auth.example.com/v1.0");
    let connection = Connection::connect(transport.clone(), Arc::new(credentials))
        .await
        .unwrap();

    let requests = transport.requests();
    let auth = &requests[0];
    assert_eq!(auth.url, "https://auth.example.com/v1.0");
    assert_eq!(auth.headers.get("X-Auth-User").unwrap(), "user");
    assert_eq!(auth.headers.get("X-Auth-Key").unwrap(), "key");
    assert_eq!(connection.endpoint().cdn_management_url(), Some(CDN_URL));

    let created = connection.create_container("photos").await.unwrap();
    assert_eq!(created, ContainerCreation::Created);

    let request = transport.last();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.url, format!("{}/photos", STORAGE_URL));
    assert_eq!(request.headers.get("X-Auth-Token").unwrap(), "token-1");
    assert!(request.headers.get("User-Agent").is_some());
}

#[tokio::test]
async fn test_connect_rejected_credentials() {
    let transport = MockTransport::new();
    transport.respond(401, &[], "Bad username or password");

    let credentials = UserCredentials::new("user", "wrong");
    let err = Connection::connect(transport.clone(), Arc::new(credentials))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication(_)));
}

#[tokio::test]
async fn test_service_net_rewrites_storage_host() {
    let transport = MockTransport::new();
    transport.respond(
        204,
        &[("X-Storage-Url", STORAGE_URL), ("X-Auth-Token", "t")],
        "",
    );

    let credentials = UserCredentials::new("user", "key").service_net(true);
    let connection = Connection::connect(transport.clone(), Arc::new(credentials))
        .await
        .unwrap();

    assert_eq!(
        connection.endpoint().storage_url(),
        "https://snet-storage.example.com/v1/MossoCloudFS_acct"
    );
}

#[tokio::test]
async fn test_create_existing_container() {
    let transport = MockTransport::new();
    transport.respond(202, &[], "");
    let connection = connection(&transport, false);

    let outcome = connection.create_container(&unique_container()).await.unwrap();

    assert_eq!(outcome, ContainerCreation::AlreadyExisted);
}

#[tokio::test]
async fn test_unlisted_success_status_is_unexpected() {
    let transport = MockTransport::new();
    transport.respond(200, &[], "");
    let connection = connection(&transport, false);

    let err = connection.create_container("photos").await.unwrap_err();

    assert!(matches!(err, Error::UnexpectedStatus { status: 200, .. }));
}

#[tokio::test]
async fn test_delete_container_outcomes() {
    let transport = MockTransport::new();
    transport.respond(204, &[], "");
    transport.respond(404, &[], "");
    transport.respond(409, &[], "There was a conflict when trying to complete your request.");
    let connection = connection(&transport, false);

    connection.delete_container("photos").await.unwrap();
    assert_eq!(transport.last().method, Method::DELETE);

    let err = connection.delete_container("photos").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.status(), Some(404));

    let err = connection.delete_container("photos").await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn test_invalid_names_send_nothing() {
    let transport = MockTransport::new();
    let connection = connection(&transport, true);

    let err = connection.create_container("a/b").await.unwrap_err();
    assert!(matches!(err, Error::ContainerName(_)));

    let err = connection.delete_storage_item("c", &"x".repeat(129)).await.unwrap_err();
    assert!(matches!(err, Error::StorageItemName(_)));

    let err = connection.get_container_information("").await.unwrap_err();
    assert!(matches!(err, Error::Argument("container")));

    let err = connection.mark_container_as_public("a?b", None).await.unwrap_err();
    assert!(err.is_validation());

    let err = connection.delete_storage_item("c", "//").await.unwrap_err();
    assert!(matches!(err, Error::StorageItemName(_)));

    let err = connection
        .copy_storage_item("src", "a.txt", "dst", "/", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StorageItemName(_)));

    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_transport_failure_is_distinct() {
    let transport = MockTransport::new();
    transport.fail(Error::Transport("connection reset".to_string()));
    let connection = connection(&transport, false);

    let err = connection.get_account_information().await.unwrap_err();

    assert!(err.is_transport());
    assert!(!err.is_service());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_interrupted_listing_is_transport_error() {
    let transport = MockTransport::new();
    transport.interrupt(200, "photos\nback");
    let connection = connection(&transport, false);

    let err = connection.get_containers(ListParameters::default()).await.unwrap_err();

    assert!(err.is_transport());
    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_interrupted_download_leaves_nothing_behind() {
    let transport = MockTransport::new();
    transport.interrupt(200, "Hel");
    let connection = connection(&transport, false);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.txt");

    let err = connection
        .download_storage_item("docs", "hello.txt", &path, None)
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert!(!path.exists());
    assert!(!dir.path().join("hello.txt.part").exists());
}

#[tokio::test]
async fn test_server_fault() {
    let transport = MockTransport::new();
    transport.respond(503, &[], "Service Unavailable");
    let connection = connection(&transport, false);

    let err = connection.get_containers(ListParameters::default()).await.unwrap_err();

    match err {
        Error::ServerFault { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "Service Unavailable");
        }
        other => panic!("expected server fault, got {:?}", other),
    }
}

#[tokio::test]
async fn test_account_and_listings() {
    let transport = MockTransport::new();
    transport.respond(
        204,
        &[("X-Account-Container-Count", "2"), ("X-Account-Bytes-Used", "1024")],
        "",
    );
    transport.respond(200, &[], "photos\nbackups\n");
    transport.respond(204, &[], "");
    let connection = connection(&transport, false);

    let info = connection.get_account_information().await.unwrap();
    assert_eq!(info.container_count, 2);
    assert_eq!(info.bytes_used, 1024);
    assert_eq!(transport.last().method, Method::HEAD);

    let containers = connection
        .get_containers(ListParameters::default().limit(2))
        .await
        .unwrap();
    assert_eq!(containers, vec!["photos", "backups"]);
    assert_eq!(transport.last().url, format!("{}?limit=2", STORAGE_URL));

    let objects = connection
        .get_container_item_list("photos", ListParameters::default().prefix("2009/"))
        .await
        .unwrap();
    assert!(objects.is_empty());
    assert_eq!(transport.last().url, format!("{}/photos?prefix=2009%2F", STORAGE_URL));
}

#[tokio::test]
async fn test_upload_file_with_progress() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(b"Hello42 from a file")
        .unwrap();

    let transport = MockTransport::new();
    transport.respond(201, &[("ETag", "5d41402abc4b2a76b9719d911017c592")], "");
    let connection = connection(&transport, false);

    let mut metadata = HashMap::new();
    metadata.insert("Owner".to_string(), "ops".to_string());
    let (callback, calls) = recorder();

    let info = connection
        .put_storage_item("docs", "notes/today.txt", &path, Some(&metadata), Some(callback))
        .await
        .unwrap();

    assert_eq!(info.etag.as_deref(), Some("5d41402abc4b2a76b9719d911017c592"));

    let request = transport.last();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.url, format!("{}/docs/notes%2Ftoday.txt", STORAGE_URL));
    assert_eq!(request.content_type.as_deref(), Some("text/plain"));
    assert_eq!(request.headers.get("X-Object-Meta-Owner").unwrap(), "ops");
    assert_eq!(request.body, b"Hello42 from a file");

    let calls = calls.lock().unwrap();
    assert!(!calls.is_empty());
    assert_eq!(*calls.last().unwrap(), (19, 19));
    assert!(calls.windows(2).all(|pair| pair[0].0 <= pair[1].0));
}

#[tokio::test]
async fn test_upload_stream_empty_payload() {
    let transport = MockTransport::new();
    transport.respond(201, &[], "");
    let connection = connection(&transport, false);
    let (callback, calls) = recorder();

    connection
        .put_storage_item_stream("docs", "empty.xml", std::io::Cursor::new(Vec::new()), 0, None, Some(callback))
        .await
        .unwrap();

    assert_eq!(transport.last().content_type.as_deref(), Some("application/xml"));
    assert_eq!(*calls.lock().unwrap(), vec![(0, 0)]);
}

#[tokio::test]
async fn test_upload_stream_short_source_fails() {
    let transport = MockTransport::new();
    let connection = connection(&transport, false);

    let err = connection
        .put_storage_item_stream("docs", "short.bin", std::io::Cursor::new(b"abc".to_vec()), 10, None, None)
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_metadata_round_trip() {
    let transport = MockTransport::new();
    transport.respond(202, &[], "");
    transport.respond(
        200,
        &[
            ("Content-Type", "image/jpeg"),
            ("Content-Length", "2048"),
            ("X-Object-Meta-Camera", "x100"),
            ("X-Object-Meta-Location", "Lisbon"),
        ],
        "",
    );
    let connection = connection(&transport, false);

    let mut metadata = HashMap::new();
    metadata.insert("Camera".to_string(), "x100".to_string());
    metadata.insert("Location".to_string(), "Lisbon".to_string());

    connection
        .set_storage_item_meta_information("photos", "beach.jpg", &metadata)
        .await
        .unwrap();
    let sent = transport.last();
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.headers.get("X-Object-Meta-Camera").unwrap(), "x100");

    let info = connection
        .get_storage_item_information("photos", "beach.jpg")
        .await
        .unwrap();
    assert_eq!(info.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(info.content_length, Some(2048));
    assert_eq!(info.metadata.get("camera").map(String::as_str), Some("x100"));
    assert_eq!(info.metadata.get("location").map(String::as_str), Some("Lisbon"));
}

#[tokio::test]
async fn test_download_storage_item() {
    let transport = MockTransport::new();
    transport.respond(206, &[("Content-Type", "text/plain")], "Hello");
    let connection = connection(&transport, false);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("hello.txt");
    let mut headers = HashMap::new();
    headers.insert(RequestHeader::Range, "bytes=0-4".to_string());

    let written = connection
        .download_storage_item("docs", "hello.txt", &path, Some(&headers))
        .await
        .unwrap();

    assert_eq!(written, 5);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "Hello");
    assert_eq!(transport.last().headers.get("Range").unwrap(), "bytes=0-4");
}

#[tokio::test]
async fn test_copy_storage_item() {
    let transport = MockTransport::new();
    transport.respond(201, &[], "");
    let connection = connection(&transport, false);

    connection
        .copy_storage_item("src", "a.txt", "dst", "b.txt", None)
        .await
        .unwrap();

    let request = transport.last();
    assert_eq!(request.method.as_str(), "COPY");
    assert_eq!(request.headers.get("Destination").unwrap(), "dst/b.txt");
}

#[tokio::test]
async fn test_cdn_requires_management_url() {
    let transport = MockTransport::new();
    let connection = connection(&transport, false);

    let err = connection.get_public_containers(false).await.unwrap_err();
    assert!(matches!(err, Error::CdnUnavailable));

    let err = connection.mark_container_as_private("site").await.unwrap_err();
    assert!(matches!(err, Error::CdnUnavailable));

    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_cdn_publish_and_unpublish() {
    let transport = MockTransport::new();
    transport.respond(201, &[("X-CDN-URI", "http://c0001.cdn.example.com")], "");
    transport.respond(202, &[], "");
    let connection = connection(&transport, true);

    let uri = connection.mark_container_as_public("site", None).await.unwrap();
    assert_eq!(uri.as_deref(), Some("http://c0001.cdn.example.com"));
    let publish = transport.last();
    assert_eq!(publish.url, format!("{}/site", CDN_URL));
    assert_eq!(publish.headers.get("X-TTL").unwrap(), "259200");

    connection.mark_container_as_private("site").await.unwrap();
    let unpublish = transport.last();
    assert_eq!(unpublish.method, Method::POST);
    assert_eq!(unpublish.headers.get("X-CDN-Enabled").unwrap(), "False");
}

#[tokio::test]
async fn test_reauthenticate_swaps_endpoint() {
    let transport = MockTransport::new();
    transport.respond(
        204,
        &[("X-Storage-Url", STORAGE_URL), ("X-Auth-Token", "token-1")],
        "",
    );
    transport.respond(
        204,
        &[("X-Storage-Url", STORAGE_URL), ("X-Auth-Token", "token-2")],
        "",
    );
    transport.respond(204, &[], "");

    let connection = Connection::connect(transport.clone(), Arc::new(UserCredentials::new("user", "key")))
        .await
        .unwrap();
    let before = connection.endpoint();

    connection.authenticate().await.unwrap();
    connection.delete_storage_item("c", "o").await.unwrap();

    assert_eq!(before.auth_token(), "token-1");
    assert_eq!(transport.last().headers.get("X-Auth-Token").unwrap(), "token-2");
}
