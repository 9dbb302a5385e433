//! Robots.txt handling module
//!
//! This module fetches and parses a site's robots.txt and interprets page-level
//! robots directives. Both are consulted by the frontier before and after a fetch.

mod page;
mod parser;

pub use page::PageRobotRules;
pub use parser::{product_token, ParsedRobots};

use crate::crawler::HttpTransport;
use std::time::Duration;
use url::Url;

/// Maximum redirects followed while fetching robots.txt
const MAX_ROBOTS_REDIRECTS: usize = 5;

/// Site-level access policy consulted before a URI is queued
pub trait RobotsPolicy: Send + Sync {
    /// Whether the agent may fetch the URI
    fn is_allowed_access(&self, uri: &Url, user_agent: &str) -> bool;

    /// Minimum delay between requests requested for the agent, in seconds
    fn crawl_delay(&self, user_agent: &str) -> Option<f64>;
}

impl RobotsPolicy for ParsedRobots {
    fn is_allowed_access(&self, uri: &Url, user_agent: &str) -> bool {
        self.is_allowed(uri.as_str(), user_agent)
    }

    fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        ParsedRobots::crawl_delay(self, user_agent)
    }
}

/// Fetches robots.txt for a site
///
/// Never fails: every problem degrades to a permissive or restrictive policy.
///
/// | Outcome | Policy |
/// |---------|--------|
/// | 2xx | parsed content |
/// | 401, 403 | disallow all |
/// | other 4xx | allow all |
/// | 5xx | disallow all |
/// | transport failure or timeout | allow all |
///
/// # Arguments
///
/// * `transport` - The transport to fetch with
/// * `base_uri` - The site's base authority (`scheme://host[:port]/`)
/// * `request_timeout` - Deadline for each fetch
pub async fn fetch_robots(
    transport: &dyn HttpTransport,
    base_uri: &Url,
    request_timeout: Duration,
) -> ParsedRobots {
    let mut robots_uri = match base_uri.join("/robots.txt") {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!("Cannot build robots.txt URI for {}: {}", base_uri, e);
            return ParsedRobots::allow_all();
        }
    };

    for _ in 0..=MAX_ROBOTS_REDIRECTS {
        let response = match tokio::time::timeout(request_timeout, transport.get(&robots_uri)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!("Failed to fetch {}: {}", robots_uri, e);
                return ParsedRobots::allow_all();
            }
            Err(_) => {
                tracing::warn!("Timed out fetching {}", robots_uri);
                return ParsedRobots::allow_all();
            }
        };

        let status = response.status;

        if status.is_redirection() {
            let next = response
                .header("location")
                .and_then(|location| robots_uri.join(location).ok());
            match next {
                Some(next) => {
                    tracing::debug!("robots.txt redirected: {} -> {}", robots_uri, next);
                    robots_uri = next;
                    continue;
                }
                None => return ParsedRobots::allow_all(),
            }
        }

        if status.is_success() {
            let content = String::from_utf8_lossy(&response.body);
            tracing::debug!("Loaded robots.txt from {} ({} bytes)", robots_uri, content.len());
            return ParsedRobots::from_content(&content);
        }

        if status.as_u16() == 401 || status.as_u16() == 403 || status.is_server_error() {
            tracing::info!(
                "robots.txt at {} returned {}, disallowing all",
                robots_uri,
                status
            );
            return ParsedRobots::deny_all();
        }

        tracing::debug!("No robots.txt at {} ({})", robots_uri, status);
        return ParsedRobots::allow_all();
    }

    tracing::warn!("Too many redirects fetching robots.txt for {}", base_uri);
    ParsedRobots::allow_all()
}
