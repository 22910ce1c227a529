//! Sequential paginated catalog discovery

use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::catalog::{xml, CatalogError, CatalogResult};
use crate::fetcher::Fetch;
use crate::sink::StatusSink;
use crate::{Catalog, PostRecord};

/// Walks the tag query API and accumulates the full URL catalog for a tag.
///
/// All HTTP goes through the injected [`Fetch`] implementation; pages are
/// requested one at a time, in order.
pub struct CatalogDiscovery {
    fetcher: Arc<dyn Fetch>,
    base_url: String,
    status: Arc<dyn StatusSink>,
}

impl CatalogDiscovery {
    /// Create a discovery client for one upstream host.
    ///
    /// `base_url` is the scheme-and-host part, e.g. `https://rule34.xxx`.
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        base_url: impl Into<String>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            status,
        }
    }

    /// Total number of posts matching `tag`.
    ///
    /// Issues one metadata-only query (`limit=1`) and reads the `count`
    /// attribute from the XML root.
    pub async fn count_total(&self, tag: &str) -> CatalogResult<u64> {
        let url = self.query_url(&[("limit", "1"), ("tags", tag)])?;
        let body = self.fetcher.fetch(url.as_str()).await?;
        let body = String::from_utf8_lossy(&body);
        let total = xml::parse_post_count(&body)?;
        debug!(tag, total, "counted posts");
        Ok(total)
    }

    /// Fetch one API page and return its records, in document order.
    pub async fn list_page(&self, tag: &str, page: u64) -> CatalogResult<Vec<PostRecord>> {
        let page_str = page.to_string();
        let url = self.query_url(&[("pid", page_str.as_str()), ("tags", tag)])?;
        let body = self.fetcher.fetch(url.as_str()).await?;
        let body = String::from_utf8_lossy(&body);
        xml::parse_posts(&body)
    }

    /// Fetch pages `0..pages` sequentially and accumulate the catalog.
    ///
    /// The caller may pass fewer pages than the discovered total; fetching a
    /// subset is valid and intentional. One status line is emitted per page.
    pub async fn discover(&self, tag: &str, pages: u64) -> CatalogResult<Catalog> {
        let mut catalog = Catalog::new();

        for page in 0..pages {
            self.status
                .status(&format!("Processing page {}/{}", page + 1, pages));
            let records = self.list_page(tag, page).await?;
            debug!(tag, page, records = records.len(), "listed page");
            catalog.extend(records);
        }

        info!(tag, pages, urls = catalog.len(), "catalog discovery complete");
        Ok(catalog)
    }

    /// Build the API query URL with the shared `page=dapi` parameters.
    fn query_url(&self, extra: &[(&str, &str)]) -> CatalogResult<Url> {
        let base = [("page", "dapi"), ("s", "post"), ("q", "index")];
        let endpoint = format!("{}/index.php", self.base_url.trim_end_matches('/'));
        Url::parse_with_params(&endpoint, base.iter().chain(extra.iter()))
            .map_err(|e| CatalogError::Protocol(format!("invalid base URL {endpoint:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetcherError, FetcherResult};
    use crate::sink::NullStatusSink;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned bodies keyed by full URL and records every request.
    struct CannedFetcher {
        responses: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl CannedFetcher {
        fn new(responses: &[(&str, &str)]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetch for CannedFetcher {
        async fn fetch(&self, url: &str) -> FetcherResult<Bytes> {
            self.requests.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .map(|body| Bytes::from(body.clone()))
                .ok_or_else(|| FetcherError::HttpStatus(404))
        }
    }

    fn discovery(fetcher: Arc<CannedFetcher>) -> CatalogDiscovery {
        CatalogDiscovery::new(fetcher, "https://booru.test", Arc::new(NullStatusSink))
    }

    const COUNT_URL: &str =
        "https://booru.test/index.php?page=dapi&s=post&q=index&limit=1&tags=sky";
    const PAGE0_URL: &str = "https://booru.test/index.php?page=dapi&s=post&q=index&pid=0&tags=sky";
    const PAGE1_URL: &str = "https://booru.test/index.php?page=dapi&s=post&q=index&pid=1&tags=sky";

    #[tokio::test]
    async fn test_count_total_reads_root_attribute() {
        let fetcher = Arc::new(CannedFetcher::new(&[(
            COUNT_URL,
            r#"<posts count="57" offset="0"/>"#,
        )]));
        let discovery = discovery(fetcher.clone());

        assert_eq!(discovery.count_total("sky").await.unwrap(), 57);
        assert_eq!(fetcher.requests(), vec![COUNT_URL.to_string()]);
    }

    #[tokio::test]
    async fn test_count_total_missing_attribute_is_protocol_error() {
        let fetcher = Arc::new(CannedFetcher::new(&[(COUNT_URL, r#"<posts offset="0"/>"#)]));
        let err = discovery(fetcher).count_total("sky").await.unwrap_err();
        assert!(matches!(err, CatalogError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_discover_accumulates_in_page_order() {
        let fetcher = Arc::new(CannedFetcher::new(&[
            (
                PAGE0_URL,
                r#"<posts count="3"><post file_url="https://cdn.test/a.jpg" tags="sky"/><post file_url="https://cdn.test/b.png" tags="sky sun"/></posts>"#,
            ),
            (
                PAGE1_URL,
                r#"<posts count="3"><post file_url="https://cdn.test/c.gif" tags=""/></posts>"#,
            ),
        ]));
        let discovery = discovery(fetcher.clone());

        let catalog = discovery.discover("sky", 2).await.unwrap();
        let urls: Vec<&str> = catalog.iter().map(|r| r.file_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://cdn.test/a.jpg",
                "https://cdn.test/b.png",
                "https://cdn.test/c.gif"
            ]
        );
        // Pages requested sequentially, in order.
        assert_eq!(
            fetcher.requests(),
            vec![PAGE0_URL.to_string(), PAGE1_URL.to_string()]
        );
    }

    #[tokio::test]
    async fn test_discover_zero_pages_is_empty() {
        let fetcher = Arc::new(CannedFetcher::new(&[]));
        let discovery = discovery(fetcher.clone());

        let catalog = discovery.discover("sky", 0).await.unwrap();
        assert!(catalog.is_empty());
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_discover_propagates_fetch_failure() {
        // Page 1 has no canned response, so the fetcher reports 404.
        let fetcher = Arc::new(CannedFetcher::new(&[(
            PAGE0_URL,
            r#"<posts count="50"></posts>"#,
        )]));
        let err = discovery(fetcher).discover("sky", 2).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Fetcher(FetcherError::HttpStatus(404))
        ));
    }

    #[test]
    fn test_query_url_encodes_tag() {
        let fetcher = Arc::new(CannedFetcher::new(&[]));
        let discovery = discovery(fetcher);
        let url = discovery
            .query_url(&[("limit", "1"), ("tags", "blue sky&sun")])
            .unwrap();
        let s = url.as_str();
        assert!(s.starts_with("https://booru.test/index.php?page=dapi&s=post&q=index&limit=1"));
        assert!(s.contains("tags=blue+sky%26sun") || s.contains("tags=blue%20sky%26sun"));
    }
}
