//! URL handling module for Site-Crawler
//!
//! This module provides fragment stripping, base-authority resolution, href
//! resolution and the host-scope check that decides which URIs belong to the
//! site being crawled.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{base_authority, extract_host};
pub use matcher::matches_wildcard;
pub use normalize::{parse_seed, resolve_href, strip_fragment};

use url::Url;

/// Host-scope rules for a crawl
///
/// A URI is in scope when its host equals the base authority's host or matches
/// one of the configured aliases. Aliases may be wildcard patterns such as
/// `*.example.com`.
#[derive(Debug, Clone)]
pub struct HostScope {
    base_host: String,
    aliases: Vec<String>,
}

impl HostScope {
    /// Creates the scope for a base authority and its aliases
    pub fn new(base_uri: &Url, aliases: &[String]) -> Self {
        Self {
            base_host: extract_host(base_uri).unwrap_or_default(),
            aliases: aliases.iter().map(|a| a.to_lowercase()).collect(),
        }
    }

    /// Returns the host of the base authority
    pub fn base_host(&self) -> &str {
        &self.base_host
    }

    /// Returns true if the URI's host is part of the site
    ///
    /// # Examples
    ///
    /// ```
    /// use site_crawler::url::HostScope;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://example.com/").unwrap();
    /// let scope = HostScope::new(&base, &["*.cdn.example.net".to_string()]);
    ///
    /// assert!(scope.contains(&Url::parse("https://example.com/a").unwrap()));
    /// assert!(scope.contains(&Url::parse("https://img.cdn.example.net/").unwrap()));
    /// assert!(!scope.contains(&Url::parse("https://other.example/").unwrap()));
    /// ```
    pub fn contains(&self, uri: &Url) -> bool {
        let Some(host) = extract_host(uri) else {
            return false;
        };

        host == self.base_host
            || self
                .aliases
                .iter()
                .any(|alias| matches_wildcard(alias, &host))
    }
}
