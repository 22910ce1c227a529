//! Output directory management
//!
//! Each download session owns one subdirectory of the output root, named
//! after the tag and suffixed `(1)`, `(2)`, ... on collision. The directory
//! is created before any file write and is never deleted by this crate.

pub mod path;

pub use path::{sanitize_tag, unique_tag_dir};

/// Output errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Filesystem failure creating the target directory
    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
