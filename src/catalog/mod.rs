//! Catalog discovery for tag queries
//!
//! Turns the upstream's paginated XML API into an in-memory [`Catalog`]:
//!
//! 1. **Counting**: one metadata-only query (`limit=1`) reads the total post
//!    count from the XML root ([`CatalogDiscovery::count_total`])
//! 2. **Page math**: `ceil(total / 42)` pages, with the page size fixed by
//!    the upstream ([`page_count`])
//! 3. **Listing**: pages are fetched sequentially and parsed into
//!    [`PostRecord`]s ([`CatalogDiscovery::discover`])
//!
//! Discovery runs with concurrency 1 by design: it keeps status reporting
//! simple and avoids rate-limit pressure before the download phase, which is
//! where concurrency actually pays off.
//!
//! [`PostRecord`]: crate::PostRecord
//! [`Catalog`]: crate::Catalog

use crate::fetcher::FetcherError;

pub mod discovery;
pub mod xml;

pub use discovery::CatalogDiscovery;

/// Posts per API page. Fixed by the upstream and not sent as a parameter.
pub const POSTS_PER_PAGE: u64 = 42;

/// Catalog errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// API response missing an expected attribute or shape
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Underlying HTTP failure
    #[error(transparent)]
    Fetcher(#[from] FetcherError),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Number of API pages needed to cover `total` posts.
pub fn page_count(total: u64) -> u64 {
    total.div_ceil(POSTS_PER_PAGE)
}
