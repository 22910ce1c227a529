//! Retrying HTTP fetcher
//!
//! Issues a single GET with bounded retry on HTTP 429:
//! - Transport errors and non-429 failure statuses raise immediately
//! - 429 responses are retried up to [`MAX_FETCH_ATTEMPTS`] attempts total;
//!   every failed attempt `k`, the last one included, sleeps
//!   `initial_backoff * 2^(k-1)` plus uniform random jitter before the next
//!   attempt or the final error
//!
//! The jitter decorrelates the many concurrent download workers that tend to
//! hit 429 at the same moment; the bounded attempt budget guarantees the
//! pipeline terminates against a persistently throttling server.

use bytes::Bytes;
use rand::Rng;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::fetcher::{Fetch, FetcherError, FetcherResult};
use crate::sink::StatusSink;

/// Maximum GET attempts per URL, counting the first one.
pub const MAX_FETCH_ATTEMPTS: u32 = 5;

/// Base backoff delay after the first 429.
pub const INITIAL_BACKOFF: Duration = Duration::from_millis(1000);

/// Upper bound (exclusive) of the uniform random jitter added to each backoff.
pub const JITTER_WINDOW: Duration = Duration::from_millis(500);

/// HTTP fetcher with rate-limit-aware exponential backoff.
///
/// Holds a shared [`reqwest::Client`] (cheap to clone, constructed once at
/// startup) and a [`StatusSink`] that is told about every retry.
pub struct RetryingFetcher {
    client: Arc<Client>,
    status: Arc<dyn StatusSink>,
    max_attempts: u32,
    initial_backoff: Duration,
    jitter_window: Duration,
}

impl RetryingFetcher {
    /// Create a fetcher with the default retry policy.
    pub fn new(client: Arc<Client>, status: Arc<dyn StatusSink>) -> Self {
        Self {
            client,
            status,
            max_attempts: MAX_FETCH_ATTEMPTS,
            initial_backoff: INITIAL_BACKOFF,
            jitter_window: JITTER_WINDOW,
        }
    }

    /// Override the base backoff delay. Intended for tests.
    pub fn with_initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    /// Override the jitter window. [`Duration::ZERO`] disables jitter.
    pub fn with_jitter_window(mut self, jitter_window: Duration) -> Self {
        self.jitter_window = jitter_window;
        self
    }

    /// Backoff delay (without jitter) after failed attempt `attempt` (1-indexed).
    fn base_backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

#[async_trait::async_trait]
impl Fetch for RetryingFetcher {
    async fn fetch(&self, url: &str) -> FetcherResult<Bytes> {
        for attempt in 1..=self.max_attempts {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FetcherError::Network(e.to_string()))?;

            let status = response.status();

            if status.as_u16() == 429 {
                warn!(
                    url,
                    attempt,
                    max_attempts = self.max_attempts,
                    "rate limited (429)"
                );
                let delay = self.base_backoff(attempt) + jitter(self.jitter_window);
                self.status.status(&format!(
                    "429 Too Many Requests. Retrying in {} ms...",
                    delay.as_millis()
                ));
                tokio::time::sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                return Err(FetcherError::HttpStatus(status.as_u16()));
            }

            debug!(url, attempt, "request succeeded");
            return response
                .bytes()
                .await
                .map_err(|e| FetcherError::Network(e.to_string()));
        }

        Err(FetcherError::RateLimitExceeded {
            attempts: self.max_attempts,
        })
    }
}

/// Uniform random delay in `[0, window)`.
fn jitter(window: Duration) -> Duration {
    let window_ms = window.as_millis() as u64;
    if window_ms == 0 {
        return Duration::ZERO;
    }
    let mut rng = rand::thread_rng();
    Duration::from_millis(rng.gen_range(0..window_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::NullStatusSink;

    fn test_fetcher() -> RetryingFetcher {
        RetryingFetcher::new(Arc::new(Client::new()), Arc::new(NullStatusSink))
    }

    #[test]
    fn test_base_backoff_doubles_per_attempt() {
        let fetcher = test_fetcher();
        assert_eq!(fetcher.base_backoff(1), Duration::from_millis(1000));
        assert_eq!(fetcher.base_backoff(2), Duration::from_millis(2000));
        assert_eq!(fetcher.base_backoff(3), Duration::from_millis(4000));
        assert_eq!(fetcher.base_backoff(4), Duration::from_millis(8000));
        assert_eq!(fetcher.base_backoff(5), Duration::from_millis(16000));
    }

    #[test]
    fn test_base_backoff_respects_override() {
        let fetcher = test_fetcher().with_initial_backoff(Duration::from_millis(10));
        assert_eq!(fetcher.base_backoff(1), Duration::from_millis(10));
        assert_eq!(fetcher.base_backoff(3), Duration::from_millis(40));
    }

    #[test]
    fn test_jitter_within_window() {
        let window = Duration::from_millis(500);
        for _ in 0..200 {
            let delay = jitter(window);
            assert!(delay < window, "jitter {delay:?} outside [0, {window:?})");
        }
    }

    #[test]
    fn test_jitter_zero_window() {
        assert_eq!(jitter(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_default_policy() {
        let fetcher = test_fetcher();
        assert_eq!(fetcher.max_attempts, MAX_FETCH_ATTEMPTS);
        assert_eq!(fetcher.initial_backoff, INITIAL_BACKOFF);
        assert_eq!(fetcher.jitter_window, JITTER_WINDOW);
    }
}
