//! Error types for pagefetch
//!
//! Two layers of errors live here:
//! - [`FetchError`] describes why a single raw fetch failed (transport, HTTP status,
//!   URL problems). The isolated fetch path converts it into a status code with
//!   [`FetchError::status_code`] and never lets it escape.
//! - [`Error`] is the crate-level error returned by constructors and configuration
//!   validation.

use crate::types::Resource;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for pagefetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Status code reported for the "resource not found" class of failures
pub const NOT_FOUND_STATUS: u16 = 404;

/// Main error type for pagefetch
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "content_limit")
        key: Option<String>,
    },

    /// The HTTP transport could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Reasons a raw fetch can fail
///
/// Every variant maps to an outcome status code through [`FetchError::status_code`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The resource URL could not be parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The URL scheme cannot be fetched over HTTP
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// Connection could not be established (refused, DNS failure, TLS handshake)
    #[error("connection failed: {0}")]
    Connect(String),

    /// Connecting or reading did not complete in time
    #[error("timed out after {} ms", .after.as_millis())]
    Timeout {
        /// The timeout that expired
        after: Duration,
    },

    /// The server answered with an error status (>= 400)
    #[error("server returned HTTP {status}")]
    Status {
        /// Upstream HTTP status code
        status: u16,
    },

    /// The target resource does not exist
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Any other transport failure reported by the HTTP client
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O failure while streaming the response body
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Whether this failure means the target resource does not exist
    ///
    /// HTTP 404 and 410 both count, as does an I/O error of kind `NotFound`.
    pub fn is_not_found(&self) -> bool {
        match self {
            FetchError::NotFound(_) => true,
            FetchError::Status { status } => matches!(status, 404 | 410),
            FetchError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Classify this failure into the status code carried by the error outcome
    ///
    /// "Not found" failures map to 404; everything else maps to `default_error_code`.
    pub fn status_code(&self, default_error_code: u16) -> u16 {
        if self.is_not_found() {
            NOT_FOUND_STATUS
        } else {
            default_error_code
        }
    }

    /// Machine-readable error code, used as a structured logging field
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl(_) => "invalid_url",
            FetchError::UnsupportedScheme(_) => "unsupported_scheme",
            FetchError::Connect(_) => "connect_error",
            FetchError::Timeout { .. } => "timeout",
            FetchError::Status { .. } if self.is_not_found() => "not_found",
            FetchError::Status { .. } => "http_status",
            FetchError::NotFound(_) => "not_found",
            FetchError::Network(_) => "network_error",
            FetchError::Io(_) => "io_error",
        }
    }
}

/// A failed raw fetch, handing the untouched resource back to the caller
///
/// The resource status is not modified on this path.
#[derive(Debug, Error)]
#[error("failed to fetch {}: {error}", .resource.url)]
pub struct FetchFailure {
    /// The resource that was being fetched
    pub resource: Resource,
    /// Why the fetch failed
    #[source]
    pub error: FetchError,
}

impl FetchFailure {
    /// Create a new failure for `resource`
    pub fn new(resource: Resource, error: impl Into<FetchError>) -> Self {
        Self {
            resource,
            error: error.into(),
        }
    }

    /// Split into the resource and the underlying error
    pub fn into_parts(self) -> (Resource, FetchError) {
        (self.resource, self.error)
    }
}
