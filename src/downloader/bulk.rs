//! Bulk download execution
//!
//! Downloads a catalog of URLs into a target directory under a fixed
//! concurrency ceiling. A counting semaphore is acquired before each unit is
//! spawned, so admission itself is the backpressure point; the permit is
//! released when the unit finishes, success or failure.
//!
//! Dedup is destination-path based: a file already on disk is counted as
//! downloaded without touching the network, which makes repeated runs over
//! the same directory idempotent. A failure on one URL is reported and
//! swallowed - the URL simply never enters the [`DownloadedSet`], which the
//! reconciliation pass picks up later.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::downloader::config::MAX_CONCURRENT_DOWNLOADS;
use crate::downloader::{DownloadProgress, DownloadedSet};
use crate::fetcher::Fetch;
use crate::sink::{ImageSink, StatusSink};
use crate::{file_name_from_url, PostRecord};

/// Downloads catalog entries with bounded concurrency and deduplication.
pub struct BulkDownloader {
    fetcher: Arc<dyn Fetch>,
    status: Arc<dyn StatusSink>,
    images: Arc<dyn ImageSink>,
    concurrency: usize,
}

impl BulkDownloader {
    /// Create a downloader with the default concurrency ceiling.
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        status: Arc<dyn StatusSink>,
        images: Arc<dyn ImageSink>,
    ) -> Self {
        Self {
            fetcher,
            status,
            images,
            concurrency: MAX_CONCURRENT_DOWNLOADS,
        }
    }

    /// Override the concurrency ceiling. Intended for tests.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Download every entry into `target_dir`, returning once all dispatched
    /// work has finished.
    ///
    /// Confirmed files (freshly written or already present) are added to
    /// `downloaded`; every completion bumps `progress` and reports the new
    /// percentage through the status sink. Per-entry failures are isolated.
    pub async fn download_all(
        &self,
        entries: &[PostRecord],
        target_dir: &Path,
        downloaded: &Arc<DownloadedSet>,
        progress: &Arc<DownloadProgress>,
    ) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = Vec::with_capacity(entries.len());

        for record in entries {
            let Some(file_name) = file_name_from_url(&record.file_url) else {
                self.status
                    .status(&format!("Skipping malformed URL {}", record.file_url));
                continue;
            };

            // Suspends here once `concurrency` units are in flight.
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break, // semaphore closed; cannot happen while we hold it
            };

            let unit = DownloadUnit {
                fetcher: self.fetcher.clone(),
                status: self.status.clone(),
                images: self.images.clone(),
                downloaded: downloaded.clone(),
                progress: progress.clone(),
                url: record.file_url.clone(),
                dest: target_dir.join(file_name),
            };

            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                unit.run().await;
            }));
        }

        for task in tasks {
            if task.await.is_err() {
                warn!("download task panicked");
            }
        }
    }
}

/// One unit of download work: a single URL bound for a single destination.
struct DownloadUnit {
    fetcher: Arc<dyn Fetch>,
    status: Arc<dyn StatusSink>,
    images: Arc<dyn ImageSink>,
    downloaded: Arc<DownloadedSet>,
    progress: Arc<DownloadProgress>,
    url: String,
    dest: PathBuf,
}

impl DownloadUnit {
    async fn run(self) {
        if self.dest.exists() {
            // Pre-existing files count as downloaded but are not announced
            // to the image sink; only fresh writes are.
            self.downloaded.insert(&self.url);
            self.status.status(&format!(
                "File {} already exists. Skipping.",
                self.dest.display()
            ));
            self.complete();
            return;
        }

        let bytes = match self.fetcher.fetch(&self.url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(url = %self.url, error = %e, "download failed");
                self.status
                    .status(&format!("Error downloading {}: {e}", self.url));
                return;
            }
        };

        match write_exclusive(&self.dest, &bytes).await {
            Ok(WriteOutcome::Written) => {
                self.downloaded.insert(&self.url);
                self.status
                    .status(&format!("Downloaded {}", self.dest.display()));
                self.images.image_ready(&self.dest);
                self.complete();
            }
            Ok(WriteOutcome::AlreadyExists) => {
                // Lost a create race to a concurrent unit for the same
                // destination; the file is on disk either way.
                debug!(dest = %self.dest.display(), "concurrently created, treating as downloaded");
                self.downloaded.insert(&self.url);
                self.complete();
            }
            Err(e) => {
                warn!(dest = %self.dest.display(), error = %e, "write failed");
                // Drop the partial file so a reconciliation pass can retry.
                let _ = fs::remove_file(&self.dest).await;
                self.status
                    .status(&format!("Error writing {}: {e}", self.dest.display()));
            }
        }
    }

    fn complete(&self) {
        let percent = self.progress.complete_one();
        self.status.progress(percent);
    }
}

enum WriteOutcome {
    Written,
    AlreadyExists,
}

/// Write `bytes` to `dest` with an exclusive create.
async fn write_exclusive(dest: &Path, bytes: &[u8]) -> std::io::Result<WriteOutcome> {
    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .await
    {
        Ok(mut file) => {
            file.write_all(bytes).await?;
            file.flush().await?;
            Ok(WriteOutcome::Written)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(WriteOutcome::AlreadyExists),
        Err(e) => Err(e),
    }
}
