//! Status and image notification interfaces.
//!
//! The core never talks to a UI directly. Hosts (CLI, GUI, tests) implement
//! these traits and receive human-readable status lines, a 0-100 progress
//! percentage, and the paths of freshly written files. Implementations must
//! be safe to invoke from any worker task and must not block beyond
//! marshaling the notification.

use std::path::Path;
use tracing::{debug, info};

/// Receives human-readable status lines and numeric progress updates.
pub trait StatusSink: Send + Sync {
    /// A one-line status message (page progress, retry notices, per-file
    /// completions and errors, final summary).
    fn status(&self, message: &str);

    /// Overall download progress as a percentage clamped to 0-100.
    fn progress(&self, percent: u8);
}

/// Receives the local path of each freshly written file.
///
/// Not invoked for files skipped because they already existed on disk.
pub trait ImageSink: Send + Sync {
    /// Called after a file has been durably written.
    fn image_ready(&self, path: &Path);
}

/// Status sink that forwards everything to `tracing`.
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn status(&self, message: &str) {
        info!("{message}");
    }

    fn progress(&self, percent: u8) {
        debug!(percent, "download progress");
    }
}

/// Image sink that logs paths at debug level and otherwise ignores them.
pub struct DiscardImageSink;

impl ImageSink for DiscardImageSink {
    fn image_ready(&self, path: &Path) {
        debug!(path = %path.display(), "file written");
    }
}

/// Status sink that drops all notifications. Useful as a default in tests.
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn status(&self, _message: &str) {}

    fn progress(&self, _percent: u8) {}
}
