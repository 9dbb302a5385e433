//! HTML content processor
//!
//! Extracts:
//! - content type, charset and encoding from the response headers
//! - page robots rules from `X-Robots-Tag` headers and `<meta name="robots">`
//! - the canonical URI from `<link rel="canonical">`
//! - every `<a href>` with its title, text and `rel`, resolved against `<base href>`

use super::ContentProcessor;
use crate::state::{CrawlLink, CrawledContent};
use crate::url::resolve_href;
use reqwest::header::{HeaderMap, CONTENT_ENCODING, CONTENT_TYPE};
use scraper::{Html, Selector};
use url::Url;

/// Default processor used for every successful response
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlContentProcessor;

impl HtmlContentProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl ContentProcessor for HtmlContentProcessor {
    /// Parses HTML content and extracts links and metadata
    ///
    /// # Example
    ///
    /// ```
    /// use site_crawler::content::{ContentProcessor, HtmlContentProcessor};
    /// use reqwest::header::HeaderMap;
    /// use url::Url;
    ///
    /// let html = br#"<html><body><a href="/page" title="Next">Link</a></body></html>"#;
    /// let uri = Url::parse("https://example.com/").unwrap();
    /// let content = HtmlContentProcessor::new().parse(&uri, &HeaderMap::new(), html);
    /// assert_eq!(content.links[0].location.as_str(), "https://example.com/page");
    /// assert_eq!(content.links[0].title.as_deref(), Some("Next"));
    /// ```
    fn parse(&self, request_uri: &Url, headers: &HeaderMap, body: &[u8]) -> CrawledContent {
        let html = String::from_utf8_lossy(body);
        let document = Html::parse_document(&html);

        let (content_type, character_set) = parse_content_type(headers);

        let mut page_robot_rules: Vec<String> = headers
            .get_all("x-robots-tag")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        page_robot_rules.extend(extract_meta_robots(&document));

        CrawledContent {
            content_type,
            character_set,
            content_encoding: parse_content_encoding(headers),
            raw_content: String::new(),
            canonical_uri: extract_canonical(&document),
            links: extract_links(&document, request_uri),
            page_robot_rules,
        }
    }
}

/// Splits `Content-Type` into its media type and `charset` parameter
fn parse_content_type(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return (None, None);
    };

    let mut parts = value.split(';');
    let media_type = parts
        .next()
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty());

    let charset = parts.find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    });

    (media_type, charset)
}

/// Joins every `Content-Encoding` value with commas
fn parse_content_encoding(headers: &HeaderMap) -> Option<String> {
    let encodings: Vec<&str> = headers
        .get_all(CONTENT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();

    (!encodings.is_empty()).then(|| encodings.join(","))
}

fn extract_meta_robots(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("meta[name][content]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| {
            element
                .value()
                .attr("name")
                .is_some_and(|name| name.trim().eq_ignore_ascii_case("robots"))
        })
        .filter_map(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .collect()
}

/// Returns the first absolute canonical URI declared in the document
fn extract_canonical(document: &Html) -> Option<Url> {
    let selector = Selector::parse("link[rel][href]").ok()?;

    document
        .select(&selector)
        .filter(|element| {
            element.value().attr("rel").is_some_and(|rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("canonical"))
            })
        })
        .filter_map(|element| element.value().attr("href"))
        .find_map(|href| Url::parse(href.trim()).ok())
}

fn extract_base_href(document: &Html) -> Option<String> {
    let selector = Selector::parse("base[href]").ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .map(str::to_string)
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, request_uri: &Url) -> Vec<CrawlLink> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let base_href = extract_base_href(document);
    let mut links = Vec::new();

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        // Invalid links are ignored
        let Some(location) = resolve_href(request_uri, href, base_href.as_deref()) else {
            continue;
        };

        let text = element.text().collect::<String>();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

        links.push(CrawlLink {
            location,
            title: element.value().attr("title").map(str::to_string),
            text: (!text.is_empty()).then_some(text),
            relationship: element.value().attr("rel").map(str::to_string),
        });
    }

    links
}
