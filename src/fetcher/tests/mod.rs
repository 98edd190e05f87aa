//! Fetcher tests driven by an in-memory transport


use super::*;
use crate::client::{HttpClient, HttpResponse};
use crate::config::FetcherConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};
use url::Url;

/// Canned behavior for one URL
#[derive(Clone, Debug)]
pub(super) enum Stub {
    /// Answer with a status, optional content type and a body
    Respond {
        status: u16,
        content_type: Option<&'static str>,
        body: StubBody,
    },
    /// Fail as if the connection was refused
    Refuse,
    /// Fail with a transport-level "not found"
    Missing,
    /// Never deliver the response head
    StallHead,
}

#[derive(Clone, Debug)]
pub(super) enum StubBody {
    /// Deliver these bytes, at most one chunk per read
    Bytes(Vec<u8>),
    /// Deliver these bytes, then fail the next read
    Broken(Vec<u8>),
    /// Never deliver anything
    Stalled,
}

impl Stub {
    pub(super) fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Stub::Respond {
            status: 200,
            content_type: Some(content_type),
            body: StubBody::Bytes(body.into()),
        }
    }

    pub(super) fn status(status: u16) -> Self {
        Stub::Respond {
            status,
            content_type: None,
            body: StubBody::Bytes(Vec::new()),
        }
    }
}

/// Body that never becomes readable
struct StalledBody;

impl AsyncRead for StalledBody {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Poll::Pending
    }
}

/// Body whose every read fails
struct FailingBody;

impl AsyncRead for FailingBody {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Poll::Ready(Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        )))
    }
}

/// In-memory transport that records every request it receives
///
/// Unknown URLs answer with HTTP 404.
#[derive(Clone, Default)]
pub(super) struct StubClient {
    routes: HashMap<String, Stub>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubClient {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn route(mut self, url: &str, stub: Stub) -> Self {
        self.routes.insert(url.to_string(), stub);
        self
    }

    /// Shared handle to the list of requested URLs
    pub(super) fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl HttpClient for StubClient {
    async fn get(&self, url: &Url) -> std::result::Result<HttpResponse, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());

        let stub = self
            .routes
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| Stub::status(404));

        match stub {
            Stub::Respond {
                status,
                content_type,
                body,
            } => {
                let mut headers = BTreeMap::new();
                if let Some(content_type) = content_type {
                    headers.insert(
                        "content-type".to_string(),
                        vec![content_type.to_string()],
                    );
                }
                let body: ResponseBody = match body {
                    StubBody::Bytes(bytes) => Box::pin(Cursor::new(bytes)),
                    StubBody::Broken(bytes) => {
                        Box::pin(tokio::io::AsyncReadExt::chain(Cursor::new(bytes), FailingBody))
                    }
                    StubBody::Stalled => Box::pin(StalledBody),
                };
                Ok(HttpResponse {
                    status,
                    content_type: content_type.map(str::to_string),
                    headers,
                    body,
                })
            }
            Stub::Refuse => Err(FetchError::Connect("connection refused".to_string())),
            Stub::Missing => Err(FetchError::NotFound(url.to_string())),
            Stub::StallHead => std::future::pending().await,
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Fetcher over `client` with default configuration
pub(super) fn stub_fetcher(client: StubClient) -> Fetcher<StubClient> {
    Fetcher::with_client(client, FetcherConfig::default()).unwrap()
}

/// Fetcher over `client` with a custom content limit
pub(super) fn limited_fetcher(client: StubClient, content_limit: u64) -> Fetcher<StubClient> {
    let config = FetcherConfig {
        content_limit,
        ..Default::default()
    };
    Fetcher::with_client(client, config).unwrap()
}

/// Deterministic body of `len` bytes that is not periodic on chunk boundaries
pub(super) fn patterned_body(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
