//! Page count command

use clap::Args;
use std::sync::Arc;

use super::CliError;
use crate::catalog::{page_count, CatalogDiscovery};
use crate::fetcher::{shared_resources, RetryingFetcher};
use crate::sink::LogStatusSink;

/// Arguments for the `pages` command
#[derive(Debug, Args)]
pub struct PagesArgs {
    /// Search tag to count posts for
    pub tag: String,
}

impl PagesArgs {
    /// Query the total post count and print the derived page total.
    pub async fn execute(&self, base_url: &str) -> Result<(), CliError> {
        let tag = validate_tag(&self.tag)?;

        let status = Arc::new(LogStatusSink);
        let fetcher = Arc::new(RetryingFetcher::new(
            shared_resources::global_http_client(),
            status.clone(),
        ));
        let discovery = CatalogDiscovery::new(fetcher, base_url, status);

        let total = discovery.count_total(tag).await?;
        let pages = page_count(total);

        println!("Total number of pages for the tag '{tag}': {pages} ({total} posts)");
        Ok(())
    }
}

/// Reject empty or whitespace-only tags before any network call.
pub(crate) fn validate_tag(tag: &str) -> Result<&str, CliError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(CliError::InvalidArgument(
            "tag must not be empty".to_string(),
        ));
    }
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tag_trims() {
        assert_eq!(validate_tag("  scenery ").unwrap(), "scenery");
    }

    #[test]
    fn test_validate_tag_rejects_empty() {
        assert!(matches!(
            validate_tag("   "),
            Err(CliError::InvalidArgument(_))
        ));
        assert!(matches!(validate_tag(""), Err(CliError::InvalidArgument(_))));
    }
}
