//! Configuration types for pagefetch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Size of each body read, in bytes
///
/// The content limit is checked after every read, so a truncated payload ends
/// on a read boundary and may overshoot the limit by less than one chunk.
pub const CHUNK_SIZE: usize = 4096;

/// Default connect timeout (5000 ms)
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default read timeout (10000 ms)
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Default maximum payload size (8 MiB)
pub const DEFAULT_CONTENT_LIMIT: u64 = 8_388_608;

/// Default status code for failures that are not "not found"
pub const DEFAULT_ERROR_CODE: u16 = 400;

/// Fetcher configuration
///
/// Every field has a default, so an empty document deserializes into
/// [`FetcherConfig::default()`]. Timeouts are encoded as integer milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Time allowed to establish a connection (default: 5000 ms)
    #[serde(
        rename = "connect_timeout_ms",
        with = "duration_ms",
        default = "default_connect_timeout"
    )]
    pub connect_timeout: Duration,

    /// Time allowed for each read, including waiting for the response head
    /// after connecting (default: 10000 ms)
    #[serde(
        rename = "read_timeout_ms",
        with = "duration_ms",
        default = "default_read_timeout"
    )]
    pub read_timeout: Duration,

    /// Stop reading the body once this many bytes have been buffered (default: 8 MiB)
    #[serde(default = "default_content_limit")]
    pub content_limit: u64,

    /// Status code for failures other than "not found" (default: 400)
    #[serde(default = "default_error_code")]
    pub default_error_code: u16,

    /// User-Agent header sent with every request (None = client default)
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            read_timeout: default_read_timeout(),
            content_limit: default_content_limit(),
            default_error_code: default_error_code(),
            user_agent: None,
        }
    }
}

impl FetcherConfig {
    /// Check that every setting is usable
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending key if a timeout or the
    /// content limit is zero, or if the default error code is not a valid
    /// HTTP status (100..=599).
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout.is_zero() {
            return Err(config_error(
                "connect timeout must be greater than zero",
                "connect_timeout_ms",
            ));
        }
        if self.read_timeout.is_zero() {
            return Err(config_error(
                "read timeout must be greater than zero",
                "read_timeout_ms",
            ));
        }
        if self.content_limit == 0 {
            return Err(config_error(
                "content limit must be greater than zero",
                "content_limit",
            ));
        }
        if !(100..=599).contains(&self.default_error_code) {
            return Err(config_error(
                format!(
                    "default error code {} is not a valid HTTP status",
                    self.default_error_code
                ),
                "default_error_code",
            ));
        }
        Ok(())
    }

    /// Upper bound for waiting on the response head: connect plus one read
    pub(crate) fn head_timeout(&self) -> Duration {
        self.connect_timeout.saturating_add(self.read_timeout)
    }
}

fn config_error(message: impl Into<String>, key: &str) -> Error {
    Error::Config {
        message: message.into(),
        key: Some(key.to_string()),
    }
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_read_timeout() -> Duration {
    DEFAULT_READ_TIMEOUT
}

fn default_content_limit() -> u64 {
    DEFAULT_CONTENT_LIMIT
}

fn default_error_code() -> u16 {
    DEFAULT_ERROR_CODE
}

// Duration serialization helper (integer milliseconds)
pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
