//! Transport-neutral request and response types
//!
//! Descriptors write into an [`OutboundRequest`]; a [`crate::transport::Transport`]
//! turns it into a wire exchange and hands back an [`InboundResponse`].

use crate::error::{Error, Result};
use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use http::{HeaderMap, Method, StatusCode};
use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use url::Url;

/// Progress sink for uploads.
///
/// Called on the sending task with `(bytes_sent, total_bytes)` after every chunk
/// handed to the transport. It may be called zero or more times, never
/// concurrently, and the last call of a completed upload reports
/// `bytes_sent == total_bytes`. It must return promptly; a blocked sink stalls
/// the upload.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Boxed reader used as an upload source
pub type UploadReader = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// Body of an outbound request
#[derive(Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Stream {
        reader: UploadReader,
        length: u64,
        progress: Option<ProgressCallback>,
    },
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => write!(f, "Empty"),
            RequestBody::Stream {
                length, progress, ..
            } => f
                .debug_struct("Stream")
                .field("length", length)
                .field("progress", &progress.is_some())
                .finish(),
        }
    }
}

/// A request being assembled for the transport
#[derive(Debug)]
pub struct OutboundRequest {
    pub method: Method,
    pub uri: Url,
    pub headers: HeaderMap,
    pub content_type: Option<String>,
    /// When false the transport streams the body instead of buffering it first
    pub allow_write_stream_buffering: bool,
    body: RequestBody,
}

impl OutboundRequest {
    /// Create a GET request for `uri` with no headers and no body
    pub fn new(uri: Url) -> Self {
        Self {
            method: Method::GET,
            uri,
            headers: HeaderMap::new(),
            content_type: None,
            allow_write_stream_buffering: true,
            body: RequestBody::Empty,
        }
    }

    /// Attach a streamed body and an optional progress sink
    pub fn set_content(
        &mut self,
        reader: UploadReader,
        length: u64,
        progress: Option<ProgressCallback>,
    ) {
        self.body = RequestBody::Stream {
            reader,
            length,
            progress,
        };
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn into_body(self) -> RequestBody {
        self.body
    }
}

/// Wraps an upload stream, reporting progress and rejecting short bodies.
///
/// A source that ends before `total` bytes (for example a reader closed by the
/// caller to cancel) yields an `UnexpectedEof` error instead of finishing, so
/// the transport fails the request rather than sending a truncated object.
pub struct ProgressStream<S> {
    inner: S,
    sent: u64,
    total: u64,
    progress: Option<ProgressCallback>,
    done: bool,
}

impl<S> ProgressStream<S> {
    pub fn new(inner: S, total: u64, progress: Option<ProgressCallback>) -> Self {
        Self {
            inner,
            sent: 0,
            total,
            progress,
            done: false,
        }
    }

    fn report(&self) {
        if let Some(progress) = &self.progress {
            progress(self.sent, self.total);
        }
    }
}

impl<S> Stream for ProgressStream<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                self.sent += chunk.len() as u64;
                if self.sent > self.total {
                    self.done = true;
                    return Poll::Ready(Some(Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("upload source exceeded declared length of {} bytes", self.total),
                    ))));
                }
                self.report();
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(err))) => {
                self.done = true;
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                self.done = true;
                if self.sent < self.total {
                    return Poll::Ready(Some(Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!(
                            "upload source closed after {} of {} bytes",
                            self.sent, self.total
                        ),
                    ))));
                }
                if self.total == 0 {
                    self.report();
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Body of an inbound response, consumed at most once
pub struct ResponseBody {
    stream: BoxStream<'static, io::Result<Bytes>>,
}

impl ResponseBody {
    pub fn empty() -> Self {
        Self::from_stream(stream::empty())
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::from_stream(stream::once(futures::future::ready(Ok(bytes.into()))))
    }

    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            stream: stream.boxed(),
        }
    }

    /// Collect the whole body. A stream that fails partway is a transport error.
    pub async fn bytes(self) -> Result<Bytes> {
        let chunks: Vec<Bytes> = self.stream.try_collect().await.map_err(body_read_error)?;
        Ok(Bytes::from(chunks.concat()))
    }

    /// Collect the body as text, replacing invalid UTF-8
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn into_stream(self) -> BoxStream<'static, io::Result<Bytes>> {
        self.stream
    }

    pub fn into_reader(self) -> impl AsyncRead + Send + Unpin {
        StreamReader::new(self.stream)
    }
}

/// Map a failure while reading a response body to the transport error kinds
pub fn body_read_error(err: io::Error) -> Error {
    let timed_out = err.kind() == io::ErrorKind::TimedOut
        || err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
            .is_some_and(reqwest::Error::is_timeout);
    if timed_out {
        Error::Timeout
    } else {
        Error::Transport(format!("failed to read response body: {}", err))
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBody").finish_non_exhaustive()
    }
}

/// Status, headers and body returned by the transport
#[derive(Debug)]
pub struct InboundResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: Url,
    pub body: ResponseBody,
}

impl InboundResponse {
    pub fn new(status: StatusCode, url: Url) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            url,
            body: ResponseBody::empty(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = http::HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = ResponseBody::from_bytes(body);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::AsyncReadExt;

    fn chunks(parts: &[&'static [u8]]) -> impl Stream<Item = io::Result<Bytes>> + Unpin {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::from_static(p)))
                .collect::<Vec<_>>(),
        )
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
    async fn test_progress_reports_each_chunk() {
        let (callback, calls) = recorder();
        let stream = ProgressStream::new(chunks(&[b"hello", b" ", b"world"]), 11, Some(callback));

        let collected: Vec<Bytes> = stream.try_collect().await.unwrap();

        assert_eq!(collected.concat(), b"hello world");
        assert_eq!(*calls.lock().unwrap(), vec![(5, 11), (6, 11), (11, 11)]);
    }

    #[tokio::test]
    async fn test_progress_empty_body_reports_completion() {
        let (callback, calls) = recorder();
        let stream = ProgressStream::new(chunks(&[]), 0, Some(callback));

        let collected: Vec<Bytes> = stream.try_collect().await.unwrap();

        assert!(collected.is_empty());
        assert_eq!(*calls.lock().unwrap(), vec![(0, 0)]);
    }

    #[tokio::test]
    async fn test_short_source_is_an_error() {
        let stream = ProgressStream::new(chunks(&[b"abc"]), 10, None);

        let err = stream.try_collect::<Vec<Bytes>>().await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_long_source_is_an_error() {
        let stream = ProgressStream::new(chunks(&[b"abcdef"]), 3, None);

        let err = stream.try_collect::<Vec<Bytes>>().await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_source_error_is_passed_through() {
        let failing = stream::iter(vec![
            Ok(Bytes::from_static(b"ab")),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed")),
        ]);
        let stream = ProgressStream::new(failing, 10, None);

        let err = stream.try_collect::<Vec<Bytes>>().await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn test_response_body_reader() {
        let body = ResponseBody::from_stream(chunks(&[b"Hello", b"42"]));
        let mut reader = body.into_reader();
        let mut out = String::new();
        reader.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "Hello42");
    }

    #[tokio::test]
    async fn test_interrupted_body_is_transport_error() {
        let body = ResponseBody::from_stream(stream::iter(vec![
            Ok(Bytes::from_static(b"a.txt\n")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer")),
        ]));

        let err = body.text().await.unwrap_err();

        assert!(err.is_transport());
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn test_body_read_timeout() {
        let err = body_read_error(io::Error::new(io::ErrorKind::TimedOut, "idle"));
        assert!(matches!(err, Error::Timeout));

        let err = body_read_error(io::Error::other("boom"));
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn test_outbound_request_defaults() {
        let request = OutboundRequest::new(Url::parse("https://storage.example.com/v1/acct").unwrap());
        assert_eq!(request.method, Method::GET);
        assert!(request.allow_write_stream_buffering);
        assert!(matches!(request.body(), RequestBody::Empty));
    }
}
