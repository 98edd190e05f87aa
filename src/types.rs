//! Core types for pagefetch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Fetch status of a [`Resource`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    /// Not fetched yet (the state a resource arrives in)
    #[default]
    Unfetched,
    /// Fetched successfully (possibly truncated)
    Fetched,
    /// The fetch failed and was classified into an error outcome
    Error,
}

impl ResourceStatus {
    /// Canonical upper-case name (`UNFETCHED`, `FETCHED`, `ERROR`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Unfetched => "UNFETCHED",
            ResourceStatus::Fetched => "FETCHED",
            ResourceStatus::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNFETCHED" => Ok(ResourceStatus::Unfetched),
            "FETCHED" => Ok(ResourceStatus::Fetched),
            "ERROR" => Ok(ResourceStatus::Error),
            other => Err(format!("unknown resource status: {other}")),
        }
    }
}

/// One unit of fetch work: a URL plus its fetch status
///
/// Resources are produced by the crawl frontier. The fetch stage takes them by
/// value and returns them inside the [`FetchedData`] with the status updated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Target URL
    pub url: String,

    /// Current fetch status
    #[serde(default)]
    pub status: ResourceStatus,
}

impl Resource {
    /// Create a new, unfetched resource
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: ResourceStatus::Unfetched,
        }
    }

    /// Return this resource with `status` applied
    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }
}

/// The outcome of fetching one [`Resource`]
///
/// Successful and failed fetches share this shape: failures carry an empty
/// payload, an empty content type and a classified status code, and the
/// resource is marked [`ResourceStatus::Error`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchedData {
    /// The resource this outcome was produced from
    pub resource: Resource,

    /// Raw payload bytes, possibly truncated at the content limit
    pub content: Vec<u8>,

    /// Declared content type (empty if absent or on error)
    pub content_type: String,

    /// Upstream HTTP status on success, classified status on error
    pub status_code: u16,

    /// Response headers (empty on error)
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<String>>,

    /// When the fetch attempt finished
    pub fetched_at: DateTime<Utc>,

    /// Wall-clock duration of the fetch attempt
    #[serde(with = "crate::config::duration_ms")]
    pub response_time: Duration,
}

impl FetchedData {
    /// Build a successful outcome, marking the resource [`ResourceStatus::Fetched`]
    pub fn fetched(
        resource: Resource,
        content: Vec<u8>,
        content_type: impl Into<String>,
        status_code: u16,
        headers: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            resource: resource.with_status(ResourceStatus::Fetched),
            content,
            content_type: content_type.into(),
            status_code,
            headers,
            fetched_at: Utc::now(),
            response_time: Duration::ZERO,
        }
    }

    /// Build an error outcome, marking the resource [`ResourceStatus::Error`]
    pub fn failed(resource: Resource, status_code: u16) -> Self {
        Self {
            resource: resource.with_status(ResourceStatus::Error),
            content: Vec::new(),
            content_type: String::new(),
            status_code,
            headers: BTreeMap::new(),
            fetched_at: Utc::now(),
            response_time: Duration::ZERO,
        }
    }

    /// Set the measured response time
    pub fn with_response_time(mut self, response_time: Duration) -> Self {
        self.response_time = response_time;
        self
    }

    /// Number of payload bytes held
    pub fn content_length(&self) -> usize {
        self.content.len()
    }

    /// Whether this outcome represents a failed fetch
    pub fn is_error(&self) -> bool {
        self.resource.status == ResourceStatus::Error
    }

    /// URL of the originating resource
    pub fn url(&self) -> &str {
        &self.resource.url
    }

    /// Give the resource back to the caller
    pub fn into_resource(self) -> Resource {
        self.resource
    }
}
