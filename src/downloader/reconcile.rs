//! Missing-file reconciliation
//!
//! After the bulk pass, any catalog entry whose URL is absent from the
//! [`DownloadedSet`] is a deficit. The driver re-issues the downloader over
//! exactly that deficit, once. One pass - not a retry loop - bounds the
//! worst-case total work at two full passes no matter how many files are
//! missing; a residual deficit is reported, never escalated.

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::downloader::{BulkDownloader, DownloadProgress, DownloadedSet};
use crate::sink::StatusSink;
use crate::PostRecord;

/// Drives at most one reconciliation pass over a catalog's deficit.
pub struct ReconciliationDriver<'d> {
    downloader: &'d BulkDownloader,
    status: Arc<dyn StatusSink>,
}

impl<'d> ReconciliationDriver<'d> {
    /// Create a driver reusing an existing downloader.
    pub fn new(downloader: &'d BulkDownloader, status: Arc<dyn StatusSink>) -> Self {
        Self { downloader, status }
    }

    /// Compare expected vs. confirmed counts and re-download the deficit once.
    ///
    /// Returns the final number of confirmed files. A deficit remaining after
    /// the single pass is surfaced as a status line only.
    pub async fn ensure_complete(
        &self,
        catalog: &[PostRecord],
        target_dir: &Path,
        downloaded: &Arc<DownloadedSet>,
        progress: &Arc<DownloadProgress>,
    ) -> u64 {
        let expected = catalog.len();
        let actual = downloaded.len();

        if actual < expected {
            let deficit: Vec<PostRecord> = catalog
                .iter()
                .filter(|record| !downloaded.contains(&record.file_url))
                .cloned()
                .collect();

            self.status.status(&format!(
                "Missing {} files. Attempting to redownload...",
                deficit.len()
            ));
            info!(missing = deficit.len(), "starting reconciliation pass");

            self.downloader
                .download_all(&deficit, target_dir, downloaded, progress)
                .await;
        }

        let final_count = downloaded.len();
        if final_count < expected {
            self.status.status(&format!(
                "{} files still missing after redownload",
                expected - final_count
            ));
        }
        final_count as u64
    }
}
