//! Finalized crawl records

use super::{CrawlRequest, CrawlStatus, CrawledUriRedirect, UriCrawlState};
use chrono::{DateTime, Utc};
use std::time::Duration;
use url::Url;

/// A hyperlink found in crawled content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlLink {
    /// Absolute location, fragment kept as written
    pub location: Url,
    pub title: Option<String>,
    pub text: Option<String>,

    /// Raw `rel` attribute value
    pub relationship: Option<String>,
}

impl CrawlLink {
    pub fn new(location: Url) -> Self {
        Self {
            location,
            title: None,
            text: None,
            relationship: None,
        }
    }

    /// True when the `rel` attribute contains the `nofollow` token
    pub fn is_nofollow(&self) -> bool {
        self.relationship.as_deref().is_some_and(|rel| {
            rel.split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case("nofollow"))
        })
    }
}

/// Parsed content of a successful response
#[derive(Debug, Clone, Default)]
pub struct CrawledContent {
    pub content_type: Option<String>,
    pub character_set: Option<String>,
    pub content_encoding: Option<String>,
    pub raw_content: String,
    pub canonical_uri: Option<Url>,
    pub links: Vec<CrawlLink>,

    /// Every robots directive string found in headers and meta tags
    pub page_robot_rules: Vec<String>,
}

/// Final record for one URI
#[derive(Debug, Clone)]
pub struct CrawledUri {
    pub location: Url,
    pub status: CrawlStatus,
    pub redirect_chain: Vec<CrawledUriRedirect>,
    pub requests: Vec<CrawlRequest>,
    pub content: Option<CrawledContent>,
}

impl CrawledUri {
    /// Finalizes an in-progress state into a record
    pub fn from_state(state: UriCrawlState, status: CrawlStatus, content: Option<CrawledContent>) -> Self {
        Self {
            location: state.location,
            status,
            redirect_chain: state.redirects,
            requests: state.requests,
            content,
        }
    }

    /// Status code of the last attempt, if it got a response
    pub fn last_status_code(&self) -> Option<reqwest::StatusCode> {
        self.requests.last().and_then(CrawlRequest::status_code)
    }

    /// Total attempts including the ones made at every redirect hop
    pub fn total_requests(&self) -> usize {
        self.requests.len()
            + self
                .redirect_chain
                .iter()
                .map(|hop| hop.requests.len())
                .sum::<usize>()
    }
}

/// Result of a whole crawl
#[derive(Debug, Clone)]
pub struct CrawlResult {
    pub crawl_start: DateTime<Utc>,
    pub elapsed_time: Duration,
    pub crawled_uris: Vec<CrawledUri>,
}

impl CrawlResult {
    /// Looks a record up by location
    pub fn find(&self, location: &Url) -> Option<&CrawledUri> {
        self.crawled_uris.iter().find(|uri| &uri.location == location)
    }

    /// Counts records with the given status
    pub fn count_with_status(&self, status: CrawlStatus) -> usize {
        self.crawled_uris
            .iter()
            .filter(|uri| uri.status == status)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn uri(path: &str) -> Url {
        Url::parse("http://localhost/").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_nofollow_detection() {
        let mut link = CrawlLink::new(uri("/a"));
        assert!(!link.is_nofollow());

        link.relationship = Some("noopener NoFollow".to_string());
        assert!(link.is_nofollow());

        link.relationship = Some("nofollowed".to_string());
        assert!(!link.is_nofollow());
    }

    #[test]
    fn test_from_state_carries_history() {
        let mut state = UriCrawlState::new(uri("/old"));
        state
            .requests
            .push(CrawlRequest::response(Utc::now(), Duration::ZERO, StatusCode::FOUND));
        let mut state = state.into_redirect(uri("/new"));
        state
            .requests
            .push(CrawlRequest::response(Utc::now(), Duration::ZERO, StatusCode::OK));

        let record = CrawledUri::from_state(state, CrawlStatus::Crawled, None);
        assert_eq!(record.location, uri("/new"));
        assert_eq!(record.redirect_chain.len(), 1);
        assert_eq!(record.last_status_code(), Some(StatusCode::OK));
        assert_eq!(record.total_requests(), 2);
    }

    #[test]
    fn test_result_lookup() {
        let result = CrawlResult {
            crawl_start: Utc::now(),
            elapsed_time: Duration::from_secs(1),
            crawled_uris: vec![
                CrawledUri::from_state(UriCrawlState::new(uri("/a")), CrawlStatus::Crawled, None),
                CrawledUri::from_state(
                    UriCrawlState::new(uri("/b")),
                    CrawlStatus::RobotsBlocked,
                    None,
                ),
            ],
        };

        assert!(result.find(&uri("/a")).is_some());
        assert!(result.find(&uri("/c")).is_none());
        assert_eq!(result.count_with_status(CrawlStatus::RobotsBlocked), 1);
        assert_eq!(result.count_with_status(CrawlStatus::MaxRetries), 0);
    }
}
