//! # pagefetch
//!
//! Fetch stage for crawler pipelines: turns a lazy stream of resources into a
//! lazy stream of fetched payloads without ever failing the pipeline.
//!
//! ## Design Philosophy
//!
//! pagefetch is designed to be:
//! - **Total** - Every resource yields exactly one [`FetchedData`]; network
//!   failures become error outcomes with a classified status code
//! - **Bounded** - Connect and read timeouts plus a content limit cap the time
//!   and memory spent on any single resource
//! - **Lazy** - One fetch per pull, in input order, with no prefetching
//! - **Library-first** - No CLI or config loading, purely a Rust crate for embedding
//!
//! ## Quick Start
//!
//! ```no_run
//! use futures::StreamExt;
//! use pagefetch::{Fetcher, FetcherConfig, Resource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = Fetcher::new(FetcherConfig::default())?;
//!
//!     let resources = vec![
//!         Resource::new("https://example.com/"),
//!         Resource::new("https://example.com/missing"),
//!     ];
//!
//!     let mut outcomes = fetcher.fetch_iter(resources);
//!     while let Some(data) = outcomes.next().await {
//!         println!(
//!             "{} -> {} ({} bytes, {})",
//!             data.url(),
//!             data.status_code,
//!             data.content_length(),
//!             data.resource.status
//!         );
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP transport abstraction
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Single-resource fetching and the streaming adapter
pub mod fetcher;
/// Core types
pub mod types;

// Re-export commonly used types
pub use client::{HttpClient, HttpResponse, ReqwestClient, ResponseBody};
pub use config::{CHUNK_SIZE, FetcherConfig};
pub use error::{Error, FetchError, FetchFailure, Result};
pub use fetcher::{FetchStream, Fetcher};
pub use types::{FetchedData, Resource, ResourceStatus};
