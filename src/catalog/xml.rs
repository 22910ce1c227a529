//! XML response parsing
//!
//! The upstream answers every query with an XML document whose root element
//! carries a `count` attribute and whose `<post>` children carry `file_url`
//! and `tags` attributes. Only those three attributes matter here; everything
//! else in the document is ignored.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::catalog::{CatalogError, CatalogResult};
use crate::{has_supported_extension, PostRecord};

/// Read the total post count from the root element's `count` attribute.
///
/// Fails with [`CatalogError::Protocol`] if the document has no root element,
/// the attribute is absent, or its value is not an integer.
pub fn parse_post_count(body: &str) -> CatalogResult<u64> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                for attr in e.attributes().with_checks(false) {
                    let attr = attr
                        .map_err(|e| CatalogError::Protocol(format!("malformed attribute: {e}")))?;
                    if attr.key.as_ref() == b"count" {
                        let value = attr.unescape_value().map_err(|e| {
                            CatalogError::Protocol(format!("malformed 'count' value: {e}"))
                        })?;
                        return value.parse::<u64>().map_err(|_| {
                            CatalogError::Protocol(format!(
                                "'count' attribute is not an integer: {value:?}"
                            ))
                        });
                    }
                }
                return Err(CatalogError::Protocol(
                    "could not find 'count' attribute in the response".to_string(),
                ));
            }
            Ok(Event::Eof) => {
                return Err(CatalogError::Protocol(
                    "empty response: no root element".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => {
                return Err(CatalogError::Protocol(format!("invalid XML: {e}")));
            }
        }
    }
}

/// Extract every `<post>` element's record from a page response.
///
/// A post missing `file_url`, or whose extension is outside the image
/// allow-list, is silently dropped. A missing `tags` attribute defaults to
/// the empty string.
pub fn parse_posts(body: &str) -> CatalogResult<Vec<PostRecord>> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);
    let mut records = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"post" => {
                let mut file_url: Option<String> = None;
                let mut tags = String::new();

                for attr in e.attributes().with_checks(false) {
                    let attr = attr
                        .map_err(|e| CatalogError::Protocol(format!("malformed attribute: {e}")))?;
                    match attr.key.as_ref() {
                        b"file_url" => {
                            if let Ok(value) = attr.unescape_value() {
                                file_url = Some(value.into_owned());
                            }
                        }
                        b"tags" => {
                            if let Ok(value) = attr.unescape_value() {
                                tags = value.into_owned();
                            }
                        }
                        _ => {}
                    }
                }

                if let Some(url) = file_url {
                    if has_supported_extension(&url) {
                        records.push(PostRecord { tags, file_url: url });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(CatalogError::Protocol(format!("invalid XML: {e}")));
            }
        }
    }

    Ok(records)
}
