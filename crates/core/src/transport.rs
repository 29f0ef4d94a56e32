//! HTTP transport collaborator

use crate::error::{Error, Result};
use crate::http::{InboundResponse, OutboundRequest, ProgressStream, RequestBody, ResponseBody};
use async_trait::async_trait;
use futures::TryStreamExt;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::HeaderValue;
use std::io;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

/// Default read size for streamed uploads
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Sends one request and returns the raw response.
///
/// Implementations report connection-level failures as [`Error::Transport`] or
/// [`Error::Timeout`] and never interpret status codes.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<InboundResponse>;
}

/// [`Transport`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    chunk_size: usize,
}

impl ReqwestTransport {
    /// Create a transport with the given timeouts and user agent
    pub fn new(timeout: Duration, connect_timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the upload read size, which is also the progress granularity
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<InboundResponse> {
        let method = request.method.clone();
        let uri = request.uri.clone();
        let mut headers = request.headers.clone();
        let buffered = request.allow_write_stream_buffering;

        if let Some(content_type) = &request.content_type {
            let value = HeaderValue::from_str(content_type)
                .map_err(|e| Error::Transport(format!("Invalid content type: {}", e)))?;
            headers.insert(CONTENT_TYPE, value);
        }

        let mut builder = self.client.request(method, uri);

        match request.into_body() {
            RequestBody::Empty => {}
            RequestBody::Stream {
                reader,
                length,
                progress,
            } => {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
                if buffered {
                    let mut buffer = Vec::with_capacity(length as usize);
                    reader.take(length).read_to_end(&mut buffer).await.map_err(|e| {
                        Error::Transport(format!("Failed to read upload source: {}", e))
                    })?;
                    if buffer.len() as u64 != length {
                        return Err(Error::Transport(format!(
                            "upload source closed after {} of {} bytes",
                            buffer.len(),
                            length
                        )));
                    }
                    if let Some(progress) = progress {
                        progress(length, length);
                    }
                    builder = builder.body(buffer);
                } else {
                    let chunks = ReaderStream::with_capacity(reader, self.chunk_size);
                    let stream = ProgressStream::new(chunks, length, progress);
                    builder = builder.body(reqwest::Body::wrap_stream(stream));
                }
            }
        }

        let response = builder.headers(headers).send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        // The reqwest error stays inside the io::Error so body reads can still spot timeouts
        let body = ResponseBody::from_stream(response.bytes_stream().map_err(io::Error::other));

        Ok(InboundResponse {
            status,
            headers,
            url,
            body,
        })
    }
}
