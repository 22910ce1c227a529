//! Download configuration constants

/// Maximum simultaneous in-flight downloads.
/// High enough to keep the pipe full against a CDN, low enough to stay under
/// typical per-IP throttling thresholds.
pub const MAX_CONCURRENT_DOWNLOADS: usize = 10;
