//! Single-resource fetching
//!
//! [`Fetcher`] has two entry points:
//! - [`Fetcher::fetch_raw`] performs the network I/O and fails with a
//!   [`FetchFailure`] that hands the untouched resource back.
//! - [`Fetcher::fetch`] never fails: errors are classified into a status code
//!   and returned as an empty [`FetchedData`] whose resource is marked
//!   [`ResourceStatus::Error`](crate::types::ResourceStatus::Error).
//!
//! The streaming adapter in [`stream`] drives `fetch` once per pulled resource.

mod stream;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use stream::FetchStream;

use crate::client::{HttpClient, HttpResponse, ReqwestClient, ResponseBody};
use crate::config::{CHUNK_SIZE, FetcherConfig};
use crate::error::{FetchError, FetchFailure, Result};
use crate::types::{FetchedData, Resource};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::time::{Instant, timeout};
use tracing::{debug, info, warn};
use url::Url;

/// Body and head of a completed download, before it is tied to a resource
struct Download {
    status: u16,
    content_type: Option<String>,
    headers: BTreeMap<String, Vec<String>>,
    content: Vec<u8>,
}

/// Fetches resources one at a time with timeouts and a content limit
///
/// Cloning is cheap: the transport and configuration are shared.
pub struct Fetcher<C = ReqwestClient> {
    client: Arc<C>,
    config: Arc<FetcherConfig>,
}

impl<C> Clone for Fetcher<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C> std::fmt::Debug for Fetcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Fetcher<ReqwestClient> {
    /// Create a fetcher backed by `reqwest`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: FetcherConfig) -> Result<Self> {
        config.validate()?;
        let client = ReqwestClient::new(&config)?;
        Self::with_client(client, config)
    }
}

impl<C: HttpClient> Fetcher<C> {
    /// Create a fetcher over a custom transport
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_client(client: C, config: FetcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: Arc::new(client),
            config: Arc::new(config),
        })
    }

    /// The active configuration
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetch `resource`, classifying any failure into an error outcome
    ///
    /// This never fails. On success the outcome is the one produced by
    /// [`fetch_raw`](Self::fetch_raw); on failure it has an empty payload and
    /// content type, status 404 for "not found" failures or the configured
    /// default error code otherwise, and the resource is marked `ERROR`.
    pub async fn fetch(&self, resource: Resource) -> FetchedData {
        let started = Instant::now();

        match self.fetch_raw(resource).await {
            Ok(data) => data,
            Err(failure) => {
                let (resource, error) = failure.into_parts();
                let status_code = error.status_code(self.config.default_error_code);

                warn!(
                    url = %resource.url,
                    status_code,
                    error_code = error.error_code(),
                    "Fetch failed"
                );
                debug!(url = %resource.url, error = %error, "Fetch error detail");

                FetchedData::failed(resource, status_code).with_response_time(started.elapsed())
            }
        }
    }

    /// Fetch `resource`, returning the failure instead of classifying it
    ///
    /// The body is read in [`CHUNK_SIZE`] reads and reading stops once the
    /// buffered payload reaches the content limit; the remainder of the body is
    /// discarded. A truncated fetch is still a success.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchFailure`] carrying the unmodified resource if the URL is
    /// invalid or not HTTP(S), the connection fails, a timeout expires, the
    /// server answers with a status of 400 or above, or reading the body fails.
    pub async fn fetch_raw(
        &self,
        resource: Resource,
    ) -> std::result::Result<FetchedData, FetchFailure> {
        let started = Instant::now();
        info!(url = %resource.url, client = self.client.name(), "Fetching resource");

        match self.download(&resource.url).await {
            Ok(download) => Ok(FetchedData::fetched(
                resource,
                download.content,
                download.content_type.unwrap_or_default(),
                download.status,
                download.headers,
            )
            .with_response_time(started.elapsed())),
            Err(error) => Err(FetchFailure::new(resource, error)),
        }
    }

    async fn download(&self, raw_url: &str) -> std::result::Result<Download, FetchError> {
        let url = Url::parse(raw_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
        }

        let head_timeout = self.config.head_timeout();
        let response = timeout(head_timeout, self.client.get(&url))
            .await
            .map_err(|_| FetchError::Timeout {
                after: head_timeout,
            })??;

        debug!(url = %url, status = response.status, "Received response");

        if response.status >= 400 {
            return Err(FetchError::Status {
                status: response.status,
            });
        }

        let HttpResponse {
            status,
            content_type,
            headers,
            body,
        } = response;
        let content = self.read_capped(&url, body).await?;

        Ok(Download {
            status,
            content_type,
            headers,
            content,
        })
    }

    /// Read the body until EOF or until the content limit is reached
    ///
    /// The limit is checked after each read, so the result may exceed it by
    /// less than one chunk.
    async fn read_capped(
        &self,
        url: &Url,
        mut body: ResponseBody,
    ) -> std::result::Result<Vec<u8>, FetchError> {
        let limit = self.config.content_limit;
        let read_timeout = self.config.read_timeout;

        let mut content = Vec::new();
        let mut chunk = vec![0u8; CHUNK_SIZE];

        loop {
            let read = timeout(read_timeout, body.read(&mut chunk))
                .await
                .map_err(|_| FetchError::Timeout {
                    after: read_timeout,
                })??;
            if read == 0 {
                break;
            }

            content.extend_from_slice(&chunk[..read]);

            if content.len() as u64 >= limit {
                info!(
                    url = %url,
                    bytes = content.len(),
                    limit,
                    "Size is greater than the allowed limit, truncating"
                );
                break;
            }
        }

        Ok(content)
    }
}
