//! HTTP transport abstraction
//!
//! The fetcher only needs one operation from the network: issue a GET and hand
//! back the response head plus a readable body. [`HttpClient`] captures that so
//! the fetch logic can be driven by [`ReqwestClient`] in production and by
//! in-memory stubs in tests.

use crate::config::FetcherConfig;
use crate::error::{Error, FetchError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use std::collections::BTreeMap;
use std::pin::Pin;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use url::Url;

/// Readable response body
///
/// Dropping it releases the underlying connection without reading further.
pub type ResponseBody = Pin<Box<dyn AsyncRead + Send>>;

/// Response head plus a streaming body
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Value of the `Content-Type` header, if present
    pub content_type: Option<String>,
    /// All response headers, grouped by lower-case name
    pub headers: BTreeMap<String, Vec<String>>,
    /// Response body, read incrementally by the fetcher
    pub body: ResponseBody,
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Trait for the network transport used by the fetcher
///
/// Implementations open one connection per call and resolve once the response
/// head is available. They report transport failures as [`FetchError`]; HTTP
/// error statuses are returned as regular responses and judged by the fetcher.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET request for `url`
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established (refused, DNS
    /// failure, connect timeout) or the server violates the protocol.
    async fn get(&self, url: &Url) -> std::result::Result<HttpResponse, FetchError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Production transport backed by `reqwest`
///
/// Connection pooling is disabled: every fetch opens and releases its own
/// connection, so independent fetches share no state.
#[derive(Clone, Debug)]
pub struct ReqwestClient {
    client: reqwest::Client,
    connect_timeout: Duration,
}

impl ReqwestClient {
    /// Build a client from the fetcher configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Client`] if the TLS backend or resolver cannot be initialized.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(0);

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let client = builder
            .build()
            .map_err(|e| Error::Client(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            connect_timeout: config.connect_timeout,
        })
    }

    fn map_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                after: self.connect_timeout,
            }
        } else if error.is_connect() {
            FetchError::Connect(error.to_string())
        } else {
            FetchError::Network(error)
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &Url) -> std::result::Result<HttpResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let headers = collect_headers(response.headers());

        let body = StreamReader::new(response.bytes_stream().map_err(std::io::Error::other));

        Ok(HttpResponse {
            status,
            content_type,
            headers,
            body: Box::pin(body),
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut collected: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        collected
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    collected
}
