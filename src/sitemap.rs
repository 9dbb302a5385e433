//! Sitemap discovery
//!
//! Seeds the frontier from the sitemaps advertised in robots.txt, falling back
//! to `/sitemap.xml`. Sitemap index documents are followed to a bounded depth.

use crate::crawler::HttpTransport;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use url::Url;

/// Maximum number of sitemap documents fetched per crawl
const MAX_SITEMAP_DOCUMENTS: usize = 16;

/// Maximum nesting of sitemap index documents
const MAX_SITEMAP_DEPTH: usize = 2;

/// Discovers page URIs listed in the site's sitemaps
///
/// Failures are logged and skipped; a site without a sitemap yields no URIs.
/// The returned list is de-duplicated and keeps document order.
///
/// # Arguments
///
/// * `transport` - The transport to fetch with
/// * `base_uri` - The site's base authority
/// * `robots_sitemaps` - `Sitemap:` values from robots.txt
/// * `request_timeout` - Deadline for each fetch
pub async fn discover_sitemap_uris(
    transport: &dyn HttpTransport,
    base_uri: &Url,
    robots_sitemaps: &[String],
    request_timeout: Duration,
) -> Vec<Url> {
    let mut sources: VecDeque<(Url, usize)> = robots_sitemaps
        .iter()
        .filter_map(|s| base_uri.join(s).ok())
        .map(|uri| (uri, 0))
        .collect();

    if sources.is_empty() {
        if let Ok(default_sitemap) = base_uri.join("/sitemap.xml") {
            sources.push_back((default_sitemap, 0));
        }
    }

    let mut fetched = HashSet::new();
    let mut discovered = HashSet::new();
    let mut uris = Vec::new();

    while let Some((sitemap_uri, depth)) = sources.pop_front() {
        if fetched.len() >= MAX_SITEMAP_DOCUMENTS {
            tracing::debug!("Sitemap document limit reached, skipping remaining sitemaps");
            break;
        }
        if !fetched.insert(sitemap_uri.clone()) {
            continue;
        }

        let Some(xml) = fetch_document(transport, &sitemap_uri, request_timeout).await else {
            continue;
        };

        let is_index = xml.contains("<sitemapindex");
        let mut count = 0usize;

        for loc in extract_loc_values(&xml) {
            let Ok(uri) = Url::parse(&loc) else {
                tracing::trace!("Skipping malformed sitemap entry: {}", loc);
                continue;
            };
            if uri.scheme() != "http" && uri.scheme() != "https" {
                continue;
            }

            if is_index {
                if depth < MAX_SITEMAP_DEPTH {
                    sources.push_back((uri, depth + 1));
                }
            } else if discovered.insert(uri.clone()) {
                uris.push(uri);
                count += 1;
            }
        }

        tracing::debug!(
            "Sitemap {} listed {} new {}",
            sitemap_uri,
            count,
            if is_index { "sitemaps" } else { "URIs" }
        );
    }

    tracing::info!("Discovered {} URIs from sitemaps", uris.len());
    uris
}

async fn fetch_document(
    transport: &dyn HttpTransport,
    uri: &Url,
    request_timeout: Duration,
) -> Option<String> {
    match tokio::time::timeout(request_timeout, transport.get(uri)).await {
        Ok(Ok(response)) if response.status.is_success() => {
            Some(String::from_utf8_lossy(&response.body).into_owned())
        }
        Ok(Ok(response)) => {
            tracing::debug!("No sitemap at {} ({})", uri, response.status);
            None
        }
        Ok(Err(e)) => {
            tracing::warn!("Failed to fetch sitemap {}: {}", uri, e);
            None
        }
        Err(_) => {
            tracing::warn!("Timed out fetching sitemap {}", uri);
            None
        }
    }
}

/// Extracts every `<loc>` value from a sitemap document
fn extract_loc_values(xml: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0usize;
    while let Some(open_idx) = xml[start..].find("<loc>") {
        let open = start + open_idx + 5;
        let Some(close_rel) = xml[open..].find("</loc>") else {
            break;
        };
        let close = open + close_rel;
        let value = unwrap_cdata(xml[open..close].trim());
        if !value.is_empty() {
            out.push(decode_entities(value));
        }
        start = close + 6;
    }
    out
}

fn unwrap_cdata(value: &str) -> &str {
    value
        .strip_prefix("<![CDATA[")
        .and_then(|v| v.strip_suffix("]]>"))
        .map(str::trim)
        .unwrap_or(value)
}

fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }

    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
