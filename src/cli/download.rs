//! Download command implementation
//!
//! Wires the core pipeline together for one terminal session: count pages,
//! discover the catalog, claim a unique target directory, run the bulk pass
//! and the reconciliation pass. The terminal sees the core only through an
//! indicatif-backed [`StatusSink`].

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::pages::validate_tag;
use super::CliError;
use crate::catalog::{page_count, CatalogDiscovery};
use crate::downloader::{BulkDownloader, DownloadProgress, DownloadedSet, ReconciliationDriver};
use crate::fetcher::{shared_resources, RetryingFetcher};
use crate::output::unique_tag_dir;
use crate::sink::{ImageSink, StatusSink};

/// Arguments for the `download` command
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Search tag to download
    pub tag: String,

    /// Number of pages to fetch (defaults to every discovered page)
    #[arg(long)]
    pub pages: Option<u64>,

    /// Directory that receives one subdirectory per download session
    #[arg(long, default_value = "img")]
    pub output_dir: PathBuf,
}

impl DownloadArgs {
    /// Execute the full fetch-and-download pipeline.
    pub async fn execute(&self, base_url: &str) -> Result<(), CliError> {
        let tag = validate_tag(&self.tag)?;
        // Zero is invalid regardless of the discovered total; reject it
        // before anything touches the network or the filesystem.
        if self.pages == Some(0) {
            return Err(CliError::InvalidArgument(
                "page count must be at least 1".to_string(),
            ));
        }

        let sink = Arc::new(ConsoleSink::new());
        let status: Arc<dyn StatusSink> = sink.clone();
        let fetcher = Arc::new(RetryingFetcher::new(
            shared_resources::global_http_client(),
            status.clone(),
        ));
        let discovery = CatalogDiscovery::new(fetcher.clone(), base_url, status.clone());

        status.status("Loading total pages...");
        let total = discovery.count_total(tag).await?;
        let total_pages = page_count(total);

        if total_pages == 0 {
            sink.finish(&format!("No posts found for tag '{tag}'"));
            return Ok(());
        }

        let pages = self.pages.unwrap_or(total_pages);
        if pages > total_pages {
            return Err(CliError::InvalidArgument(format!(
                "page count must be between 1 and {total_pages}, got {pages}"
            )));
        }

        status.status("Loading URLs...");
        let catalog = discovery.discover(tag, pages).await?;
        let target_dir = unique_tag_dir(&self.output_dir, tag)?;

        status.status("Downloading files...");
        let downloaded = Arc::new(DownloadedSet::new());
        let progress = Arc::new(DownloadProgress::new(catalog.len()));
        let downloader =
            BulkDownloader::new(fetcher, status.clone(), Arc::new(ConsoleImageSink));

        downloader
            .download_all(&catalog, &target_dir, &downloaded, &progress)
            .await;

        let driver = ReconciliationDriver::new(&downloader, status.clone());
        let final_count = driver
            .ensure_complete(&catalog, &target_dir, &downloaded, &progress)
            .await;

        sink.finish(&format!(
            "{final_count} files downloaded to {}",
            target_dir.display()
        ));
        Ok(())
    }
}

/// Terminal status sink: a 0-100 progress bar with a rolling message line.
struct ConsoleSink {
    bar: ProgressBar,
}

impl ConsoleSink {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {wide_msg}")
                .expect("hardcoded template is valid")
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl StatusSink for ConsoleSink {
    fn status(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn progress(&self, percent: u8) {
        self.bar.set_position(u64::from(percent));
    }
}

/// Logs freshly written files; thumbnail rendering is the host's business.
struct ConsoleImageSink;

impl ImageSink for ConsoleImageSink {
    fn image_ready(&self, path: &Path) {
        debug!(path = %path.display(), "image ready");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: DownloadArgs,
    }

    #[test]
    fn test_default_output_dir() {
        let cli = TestCli::parse_from(["test", "scenery"]);
        assert_eq!(cli.args.output_dir, PathBuf::from("img"));
        assert_eq!(cli.args.pages, None);
    }

    #[test]
    fn test_pages_flag_parsed() {
        let cli = TestCli::parse_from(["test", "scenery", "--pages", "3"]);
        assert_eq!(cli.args.pages, Some(3));
    }

    #[tokio::test]
    async fn test_zero_pages_rejected_before_any_request() {
        let args = DownloadArgs {
            tag: "scenery".to_string(),
            pages: Some(0),
            output_dir: PathBuf::from("img"),
        };

        // Unroutable base: any request would surface as a fetcher error, so
        // an InvalidArgument here proves nothing touched the network.
        let err = args.execute("http://127.0.0.1:1").await.unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }
}
