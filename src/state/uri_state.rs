//! In-progress knowledge about a single URI

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

/// What came back from one HTTP attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The server answered with a status code
    Response { status: StatusCode },

    /// No response: connection failure, timeout or other transport error
    TransportFailure { reason: String },
}

/// One HTTP attempt; appended to a history and never changed afterwards
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// Wall-clock time the fetch was issued (after the start delay)
    pub request_start: DateTime<Utc>,

    /// Fetch latency, excluding start delay and response handling
    pub elapsed_time: Duration,

    pub outcome: AttemptOutcome,
}

impl CrawlRequest {
    pub fn response(request_start: DateTime<Utc>, elapsed_time: Duration, status: StatusCode) -> Self {
        Self {
            request_start,
            elapsed_time,
            outcome: AttemptOutcome::Response { status },
        }
    }

    pub fn failure(
        request_start: DateTime<Utc>,
        elapsed_time: Duration,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            request_start,
            elapsed_time,
            outcome: AttemptOutcome::TransportFailure {
                reason: reason.into(),
            },
        }
    }

    /// Status code of the response, absent on transport failure
    pub fn status_code(&self) -> Option<StatusCode> {
        match &self.outcome {
            AttemptOutcome::Response { status } => Some(*status),
            AttemptOutcome::TransportFailure { .. } => None,
        }
    }

    /// True when the server answered with a 2xx status
    pub fn is_successful_status(&self) -> bool {
        self.status_code().is_some_and(|status| status.is_success())
    }
}

/// One hop of a redirect chain
#[derive(Debug, Clone)]
pub struct CrawledUriRedirect {
    /// The URI that answered with a redirect
    pub location: Url,

    /// The attempts made at that hop
    pub requests: Vec<CrawlRequest>,
}

/// Accumulated attempt and redirect history of a URI still in the frontier
#[derive(Debug, Clone)]
pub struct UriCrawlState {
    pub location: Url,
    pub requests: Vec<CrawlRequest>,

    /// Hops that led to this URI; empty when it was reached directly
    pub redirects: Vec<CrawledUriRedirect>,
}

impl UriCrawlState {
    pub fn new(location: Url) -> Self {
        Self {
            location,
            requests: Vec::new(),
            redirects: Vec::new(),
        }
    }

    /// Whether the most recent attempt got a 2xx response
    pub fn last_request_succeeded(&self) -> bool {
        self.requests
            .last()
            .is_some_and(CrawlRequest::is_successful_status)
    }

    /// Builds the state of a redirect target, carrying this state's history
    ///
    /// The current location and its attempts become the newest hop of the chain.
    pub fn into_redirect(self, target: Url) -> Self {
        let mut redirects = self.redirects;
        redirects.push(CrawledUriRedirect {
            location: self.location,
            requests: self.requests,
        });

        Self {
            location: target,
            requests: Vec::new(),
            redirects,
        }
    }

    /// Returns true if the URI already appears as a hop in the chain
    pub fn chain_contains(&self, uri: &Url) -> bool {
        self.redirects.iter().any(|hop| &hop.location == uri)
    }
}
