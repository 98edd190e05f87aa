//! Common test utilities for pagefetch integration tests

#![allow(dead_code)]

use pagefetch::{Fetcher, FetcherConfig};
use std::time::Duration;
use wiremock::MockServer;

/// Fetcher over the real HTTP transport with default settings
pub fn default_fetcher() -> Fetcher {
    Fetcher::new(FetcherConfig::default()).expect("default config is valid")
}

/// Fetcher with a custom content limit
pub fn limited_fetcher(content_limit: u64) -> Fetcher {
    Fetcher::new(FetcherConfig {
        content_limit,
        ..Default::default()
    })
    .expect("config is valid")
}

/// Fetcher with short timeouts for slow-server tests
pub fn impatient_fetcher(read_timeout: Duration) -> Fetcher {
    Fetcher::new(FetcherConfig {
        connect_timeout: Duration::from_millis(200),
        read_timeout,
        ..Default::default()
    })
    .expect("config is valid")
}

/// Absolute URL for `path` on the mock server
pub fn url_for(server: &MockServer, path: &str) -> String {
    format!("{}{}", server.uri(), path)
}

/// URL on a local port nothing listens on
///
/// The port is taken from a listener that is dropped immediately.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/")
}

/// Deterministic body of `len` bytes
pub fn patterned_body(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Number of requests the mock server has seen
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default()
}
