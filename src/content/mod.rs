//! Content processing for successful responses
//!
//! A [`ContentProcessor`] turns a 2xx response into [`CrawledContent`]: media
//! metadata, outgoing links, the canonical URI and the page robots rules. The
//! crawler fills in the raw body afterwards.

mod html;

pub use html::HtmlContentProcessor;

use crate::state::CrawledContent;
use reqwest::header::HeaderMap;
use url::Url;

/// Parses a fetched document
pub trait ContentProcessor: Send + Sync {
    /// Parses the body of `request_uri` given the response headers
    fn parse(&self, request_uri: &Url, headers: &HeaderMap, body: &[u8]) -> CrawledContent;
}
