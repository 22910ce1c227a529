//! Shared HTTP client for all fetcher instances
//!
//! The process owns exactly one `reqwest::Client` so connection pooling works
//! across the metadata-discovery and download phases. It is constructed once
//! at startup and passed around as an `Arc`; no code path recreates it
//! per-request.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Time to establish the TCP connection.
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Overall time budget for one request, including the body.
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Global HTTP client shared by all fetcher instances.
///
/// Configured with explicit timeouts to prevent indefinite hangs.
pub static GLOBAL_HTTP_CLIENT: Lazy<Arc<Client>> = Lazy::new(|| {
    Arc::new(
        Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                panic!("FATAL: failed to build HTTP client: {e}. Check system TLS configuration.");
            }),
    )
});

/// Get the global HTTP client. Cloning the `Arc` is cheap.
pub fn global_http_client() -> Arc<Client> {
    GLOBAL_HTTP_CLIENT.clone()
}
