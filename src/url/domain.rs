use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the host from a URL in lowercase
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_crawler::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Resolves the base authority of a seed URI
///
/// The base authority keeps the scheme, host and port of the seed and drops
/// everything else, so `https://example.com:8443/blog/post?x=1` becomes
/// `https://example.com:8443/`.
///
/// # Errors
///
/// * `UrlError::InvalidScheme` - The seed is not HTTP(S)
/// * `UrlError::MissingHost` - The seed has no host
pub fn base_authority(seed: &Url) -> UrlResult<Url> {
    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(seed.scheme().to_string()));
    }

    let host = seed.host_str().ok_or(UrlError::MissingHost)?;
    let authority = match seed.port() {
        Some(port) => format!("{}://{}:{}/", seed.scheme(), host, port),
        None => format!("{}://{}/", seed.scheme(), host),
    };

    Url::parse(&authority).map_err(|e| UrlError::Parse(e.to_string()))
}
