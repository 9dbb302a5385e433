use crate::{UrlError, UrlResult};
use url::Url;

/// Schemes that never lead to a crawlable page
const IGNORED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Returns the URI without its fragment
///
/// Fragment-only differences never denote distinct pages, so every URI is
/// stripped before it is used as a frontier key. Case is kept as given.
///
/// # Examples
///
/// ```
/// use site_crawler::url::strip_fragment;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/Page#Section").unwrap();
/// assert_eq!(strip_fragment(&url).as_str(), "https://example.com/Page");
/// ```
pub fn strip_fragment(url: &Url) -> Url {
    let mut stripped = url.clone();
    stripped.set_fragment(None);
    stripped
}

/// Parses a seed URI given on the command line or in code
///
/// # Errors
///
/// * `UrlError::Parse` - The string is not an absolute URL
/// * `UrlError::InvalidScheme` - The scheme is not HTTP(S)
/// * `UrlError::MissingHost` - The URL has no host
pub fn parse_seed(seed: &str) -> UrlResult<Url> {
    let url = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Resolves an href found on a page to an absolute URL
///
/// Relative hrefs are resolved against `base_href` when the page declares a
/// `<base href>`, otherwise against the page URI. The fragment of the href is
/// kept; the frontier strips it when the link is offered.
///
/// Returns `None` when the link should be ignored:
/// - empty or fragment-only hrefs
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - hrefs that cannot be resolved
/// - non-HTTP(S) results
pub fn resolve_href(page_uri: &Url, href: &str, base_href: Option<&str>) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if IGNORED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }

    let base_uri = base_href
        .map(str::trim)
        .filter(|base| !base.is_empty())
        .and_then(|base| page_uri.join(base).ok())
        .unwrap_or_else(|| page_uri.clone());

    match base_uri.join(href) {
        Ok(absolute_url) if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" => {
            Some(absolute_url)
        }
        _ => None,
    }
}
