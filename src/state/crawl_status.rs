/// Terminal crawl outcome definitions
///
/// Every URI that enters the frontier ends in exactly one of these states.
use std::fmt;

/// Terminal classification of a crawled URI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlStatus {
    /// The URI was fetched and a final response was recorded
    ///
    /// This includes client errors such as 404, which are recorded without content.
    Crawled,

    /// Blocked by robots.txt (no request made) or by a page-level `noindex`
    RobotsBlocked,

    /// Every allowed attempt failed with a transport error or a server error
    MaxRetries,

    /// The redirect chain reached the configured limit
    MaxRedirects,
}

impl CrawlStatus {
    /// Returns true if a response was received and classified for this URI
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Crawled)
    }

    /// Returns true if the crawl gave up on the URI because of a configured limit
    pub fn is_limit(&self) -> bool {
        matches!(self, Self::MaxRetries | Self::MaxRedirects)
    }

    /// Short snake_case name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crawled => "crawled",
            Self::RobotsBlocked => "robots_blocked",
            Self::MaxRetries => "max_retries",
            Self::MaxRedirects => "max_redirects",
        }
    }

    /// Returns all terminal states in report order
    pub fn all() -> [Self; 4] {
        [
            Self::Crawled,
            Self::RobotsBlocked,
            Self::MaxRetries,
            Self::MaxRedirects,
        ]
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
