//! Progress tracking for a download session.
//!
//! One [`DownloadProgress`] is created per download request with the expected
//! total fixed up front; every completed unit (fresh write or skip) bumps the
//! atomic counter from whichever worker finished it.

use std::sync::atomic::{AtomicU64, Ordering};

/// Shared completion counter with a fixed expected total.
#[derive(Debug)]
pub struct DownloadProgress {
    completed: AtomicU64,
    expected: u64,
}

impl DownloadProgress {
    /// Create a tracker expecting `expected` completions.
    pub fn new(expected: usize) -> Self {
        Self {
            completed: AtomicU64::new(0),
            expected: expected as u64,
        }
    }

    /// Record one completion and return the updated percentage.
    pub fn complete_one(&self) -> u8 {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.percent()
    }

    /// Completions so far.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Expected total completions.
    pub fn expected(&self) -> u64 {
        self.expected
    }

    /// Completion percentage clamped to 0-100.
    ///
    /// An expected total of zero reports 100: there is nothing left to do.
    pub fn percent(&self) -> u8 {
        if self.expected == 0 {
            return 100;
        }
        let ratio = self.completed() as f64 / self.expected as f64;
        (ratio * 100.0).clamp(0.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_progression() {
        let progress = DownloadProgress::new(4);
        assert_eq!(progress.percent(), 0);
        assert_eq!(progress.complete_one(), 25);
        assert_eq!(progress.complete_one(), 50);
        assert_eq!(progress.complete_one(), 75);
        assert_eq!(progress.complete_one(), 100);
    }

    #[test]
    fn test_percent_clamped_above_expected() {
        // Skips plus a concurrent-create race can overshoot the expected
        // count; the percentage must stay at 100.
        let progress = DownloadProgress::new(2);
        progress.complete_one();
        progress.complete_one();
        assert_eq!(progress.complete_one(), 100);
    }

    #[test]
    fn test_percent_zero_expected() {
        let progress = DownloadProgress::new(0);
        assert_eq!(progress.percent(), 100);
    }
}
