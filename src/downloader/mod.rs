//! Bounded-concurrency bulk download and reconciliation
//!
//! # Overview
//!
//! The download phase takes a discovered catalog and a target directory and
//! drives it to completion in at most two passes:
//!
//! 1. **Bulk pass**: [`bulk::BulkDownloader`] dispatches every catalog entry
//!    under a 10-permit semaphore, skipping files already on disk and
//!    recording each confirmed file in a shared [`DownloadedSet`]
//! 2. **Reconciliation pass**: [`reconcile::ReconciliationDriver`] re-issues
//!    exactly the entries missing from the set, once
//!
//! Per-file failures never abort a pass; they surface as status lines and as
//! absences from the set. Worst-case total work is therefore bounded at two
//! full passes.
//!
//! # Shared state
//!
//! [`DownloadedSet`] and [`DownloadProgress`] are the only state shared
//! between workers; both are safe for concurrent mutation.

use std::collections::HashSet;
use std::sync::Mutex;

pub mod bulk;
pub mod config;
pub mod progress;
pub mod reconcile;

pub use bulk::BulkDownloader;
pub use progress::DownloadProgress;
pub use reconcile::ReconciliationDriver;

/// URLs confirmed present on disk, shared across download passes.
///
/// Membership is added only after a file is durably on disk (or was already
/// there) - never on dispatch. The reconciliation pass reads this to compute
/// the deficit.
#[derive(Debug, Default)]
pub struct DownloadedSet {
    inner: Mutex<HashSet<String>>,
}

impl DownloadedSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a URL as downloaded. Returns `false` if it was already present.
    pub fn insert(&self, url: &str) -> bool {
        self.lock().insert(url.to_string())
    }

    /// Whether a URL has been confirmed on disk.
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    /// Number of confirmed URLs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no URL has been confirmed yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // A poisoned lock only means a worker panicked mid-insert; the set
        // itself is still a valid HashSet.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains() {
        let set = DownloadedSet::new();
        assert!(set.is_empty());
        assert!(set.insert("https://cdn.test/a.jpg"));
        assert!(!set.insert("https://cdn.test/a.jpg"));
        assert!(set.contains("https://cdn.test/a.jpg"));
        assert!(!set.contains("https://cdn.test/b.jpg"));
        assert_eq!(set.len(), 1);
    }
}
