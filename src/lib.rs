//! # tagdl
//!
//! A bulk image downloader for tag-indexed imageboard APIs. Given a search
//! tag, tagdl discovers every matching post through the upstream's paginated
//! XML API and downloads the referenced media files to a local directory.
//!
//! ## Features
//!
//! - **Paginated Discovery**: Walks the tag query API page by page and builds
//!   the full catalog of file URLs before downloading
//! - **Rate-Limit Resilience**: Jittered exponential backoff on HTTP 429 with
//!   a bounded retry budget
//! - **Bounded Concurrency**: At most 10 simultaneous downloads, enforced by
//!   a counting semaphore
//! - **Deduplication**: Files already on disk are skipped, making repeated
//!   runs over the same directory idempotent
//! - **Reconciliation**: A single bounded second pass re-fetches exactly the
//!   files the first pass missed
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tagdl::catalog::CatalogDiscovery;
//! use tagdl::downloader::{BulkDownloader, DownloadProgress, DownloadedSet, ReconciliationDriver};
//! use tagdl::fetcher::{shared_resources, RetryingFetcher};
//! use tagdl::output::unique_tag_dir;
//! use tagdl::sink::{DiscardImageSink, LogStatusSink, StatusSink};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let status: Arc<dyn StatusSink> = Arc::new(LogStatusSink);
//! let fetcher = Arc::new(RetryingFetcher::new(
//!     shared_resources::global_http_client(),
//!     status.clone(),
//! ));
//!
//! let discovery = CatalogDiscovery::new(fetcher.clone(), "https://rule34.xxx", status.clone());
//! let total = discovery.count_total("landscape").await?;
//! let pages = tagdl::catalog::page_count(total);
//! let catalog = discovery.discover("landscape", pages).await?;
//!
//! let target = unique_tag_dir("img".as_ref(), "landscape")?;
//! let downloaded = Arc::new(DownloadedSet::new());
//! let progress = Arc::new(DownloadProgress::new(catalog.len()));
//!
//! let downloader = BulkDownloader::new(fetcher, status.clone(), Arc::new(DiscardImageSink));
//! downloader.download_all(&catalog, &target, &downloaded, &progress).await;
//!
//! let driver = ReconciliationDriver::new(&downloader, status);
//! let final_count = driver.ensure_complete(&catalog, &target, &downloaded, &progress).await;
//! println!("{final_count} files downloaded");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`fetcher`] - HTTP request primitive with rate-limit-aware retry
//! - [`catalog`] - XML response parsing and paginated catalog discovery
//! - [`downloader`] - Bounded-concurrency bulk download and reconciliation
//! - [`output`] - Collision-free target directory creation
//! - [`sink`] - Status and image notification interfaces for host UIs
//! - [`cli`] - Command-line interface

pub mod catalog;
pub mod cli;
pub mod downloader;
pub mod fetcher;
pub mod output;
pub mod sink;

pub use catalog::{page_count, CatalogDiscovery, CatalogError};
pub use downloader::{BulkDownloader, DownloadProgress, DownloadedSet, ReconciliationDriver};
pub use fetcher::{Fetch, FetcherError, RetryingFetcher};
pub use output::{unique_tag_dir, OutputError};
pub use sink::{ImageSink, StatusSink};

/// File extensions accepted as downloadable images.
///
/// Posts pointing at videos or exotic formats are dropped during catalog
/// discovery rather than failing later in the download phase.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];

/// One discovered post: its tag list and the URL of its media file.
///
/// Records are immutable once parsed. A post whose `file_url` is missing or
/// whose extension is not in [`SUPPORTED_EXTENSIONS`] never becomes a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    /// Space-separated tag list as reported by the upstream (may be empty).
    pub tags: String,
    /// Absolute URL of the media file.
    pub file_url: String,
}

impl PostRecord {
    /// Create a new record.
    pub fn new(tags: impl Into<String>, file_url: impl Into<String>) -> Self {
        Self {
            tags: tags.into(),
            file_url: file_url.into(),
        }
    }

    /// Destination filename: the trailing path segment of the file URL.
    ///
    /// Returns `None` for URLs with an empty trailing segment.
    pub fn file_name(&self) -> Option<&str> {
        file_name_from_url(&self.file_url)
    }
}

/// The full ordered list of records discovered for a tag query.
///
/// Accumulated in page order. No uniqueness invariant is enforced here;
/// deduplication happens at destination-path level in the download phase.
pub type Catalog = Vec<PostRecord>;

/// Whether a URL ends in one of the supported image extensions.
///
/// Comparison is case-insensitive (`.PNG` is as valid as `.png`). URLs with
/// no extension are rejected. Trailing query strings are stripped first so
/// `...image.jpg?download=1` still matches.
pub fn has_supported_extension(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let Some((_, ext)) = path.rsplit_once('.') else {
        return false;
    };
    if ext.contains('/') {
        // The dot belonged to a directory or host segment, not an extension.
        return false;
    }
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|supported| ext.eq_ignore_ascii_case(supported))
}

/// Extract the trailing path segment of a URL, for use as a local filename.
pub fn file_name_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next()?;
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions_lowercase() {
        assert!(has_supported_extension("https://example.com/a/b/image.jpg"));
        assert!(has_supported_extension("https://example.com/image.jpeg"));
        assert!(has_supported_extension("https://example.com/image.png"));
        assert!(has_supported_extension("https://example.com/image.gif"));
        assert!(has_supported_extension("https://example.com/image.bmp"));
    }

    #[test]
    fn test_supported_extension_any_case() {
        assert!(has_supported_extension("https://example.com/image.PNG"));
        assert!(has_supported_extension("https://example.com/image.Jpg"));
        assert!(has_supported_extension("https://example.com/image.GIF"));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        assert!(!has_supported_extension("https://example.com/clip.webp"));
        assert!(!has_supported_extension("https://example.com/clip.mp4"));
        assert!(!has_supported_extension("https://example.com/clip.webm"));
    }

    #[test]
    fn test_no_extension_rejected() {
        assert!(!has_supported_extension("https://example.com/image"));
        assert!(!has_supported_extension("https://example.com/"));
        // The dot in the host must not count as an extension separator.
        assert!(!has_supported_extension("https://example.com"));
    }

    #[test]
    fn test_extension_with_query_string() {
        assert!(has_supported_extension(
            "https://example.com/image.jpg?download=1"
        ));
        assert!(!has_supported_extension(
            "https://example.com/image?format=.jpg"
        ));
    }

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url("https://example.com/images/abc123.png"),
            Some("abc123.png")
        );
        assert_eq!(
            file_name_from_url("https://example.com/images/abc123.png?v=2"),
            Some("abc123.png")
        );
        assert_eq!(file_name_from_url("https://example.com/images/"), None);
    }

    #[test]
    fn test_post_record_file_name() {
        let record = PostRecord::new("scenery sky", "https://example.com/img/a.jpg");
        assert_eq!(record.file_name(), Some("a.jpg"));
    }
}
