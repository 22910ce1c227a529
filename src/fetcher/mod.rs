//! HTTP fetching with rate-limit-aware retry
//!
//! Everything that talks to the network goes through the [`Fetch`] trait so
//! that discovery and download logic can be exercised against injected test
//! doubles. The production implementation is [`RetryingFetcher`], which wraps
//! a shared `reqwest` client with bounded retry on HTTP 429.

use async_trait::async_trait;
use bytes::Bytes;

pub mod http;
pub mod shared_resources;

pub use http::RetryingFetcher;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Transport-level failure (DNS, connect, timeout, interrupted body)
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status other than 429; never retried
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    /// HTTP 429 persisted through every retry attempt
    #[error("rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded {
        /// Total attempts issued before giving up
        attempts: u32,
    },
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// A single HTTP GET returning the full response body.
///
/// Implementations own their retry policy; callers treat one `fetch` call as
/// one logical retrieval that either yields the complete body or a permanent
/// [`FetcherError`].
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Retrieve the body at `url`.
    async fn fetch(&self, url: &str) -> FetcherResult<Bytes>;
}
