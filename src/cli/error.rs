//! CLI error types and conversions

use crate::catalog::CatalogError;
use crate::fetcher::FetcherError;
use crate::output::OutputError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Catalog discovery error
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Fetcher error
    #[error("fetcher error: {0}")]
    Fetcher(#[from] FetcherError),

    /// Output error
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Invalid argument, rejected before any network call
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
