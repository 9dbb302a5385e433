//! Crawl frontier
//!
//! Owns the seen-set, the per-URI attempt history and the terminal records of
//! one crawl. Every URI admitted here ends in exactly one [`CrawledUri`], except
//! URIs rejected by host scope or the page limit, which leave no record.

use super::scheduler::{RequestOutcome, RequestResult, Scheduler};
use super::transport::{HttpResponse, HttpTransport};
use crate::config::{CrawlerConfig, SchedulerConfig};
use crate::robots::{PageRobotRules, RobotsPolicy};
use crate::state::{CrawlLink, CrawlRequest, CrawlStatus, CrawledContent, CrawledUri, UriCrawlState};
use crate::url::{strip_fragment, HostScope};
use crate::Result;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Decides what a received HTTP response means for the frontier
///
/// Called once per response (never for transport failures). An error returned
/// here aborts the whole crawl.
#[async_trait]
pub trait ResponseHandler: Send + Sync {
    async fn handle(&self, frontier: &Frontier, location: &Url, response: HttpResponse) -> Result<()>;
}

pub struct Frontier {
    base_uri: Url,
    scope: HostScope,
    settings: CrawlerConfig,
    robots: Arc<dyn RobotsPolicy>,
    scheduler: Scheduler,

    /// URIs ever admitted; inserted before the URI is queued
    seen: DashSet<Url>,

    /// History of URIs not yet finalized
    states: DashMap<Url, UriCrawlState>,

    /// Terminal records keyed by final location
    crawled: DashMap<Url, CrawledUri>,

    /// URIs turned away at the page limit, offered again when a slot frees
    deferred: Mutex<VecDeque<Url>>,

    /// Fires on caller cancellation or when the page limit is reached
    cancel: CancellationToken,
}

impl Frontier {
    /// Creates the frontier for one crawl
    ///
    /// # Arguments
    ///
    /// * `base_uri` - The site's base authority; its host defines the scope
    /// * `settings` - Retry, redirect, page limit and host alias settings
    /// * `robots` - Site-level access policy
    /// * `parent` - Caller cancellation; the frontier cancels a child of it
    pub fn new(
        base_uri: Url,
        settings: CrawlerConfig,
        robots: Arc<dyn RobotsPolicy>,
        parent: &CancellationToken,
    ) -> Self {
        let scope = HostScope::new(&base_uri, &settings.host_aliases);

        Self {
            base_uri,
            scope,
            settings,
            robots,
            scheduler: Scheduler::new(),
            seen: DashSet::new(),
            states: DashMap::new(),
            crawled: DashMap::new(),
            deferred: Mutex::new(VecDeque::new()),
            cancel: parent.child_token(),
        }
    }

    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Number of terminal records produced so far
    pub fn crawled_count(&self) -> usize {
        self.crawled.len()
    }

    /// Number of requests queued or in flight
    pub fn pending_requests(&self) -> usize {
        self.scheduler.pending_requests()
    }

    pub fn is_seen(&self, uri: &Url) -> bool {
        self.seen.contains(&strip_fragment(uri))
    }

    /// Offers a URI for crawling
    ///
    /// The URI is dropped without a record when it is out of scope and ignored
    /// when it was seen before. While the page limit is fully accounted for by
    /// records and pending requests, the URI is deferred instead.
    pub fn add_request(&self, uri: &Url) {
        let uri = strip_fragment(uri);

        if !self.scope.contains(&uri) {
            tracing::debug!("{} is not in the list of allowed hosts", uri);
            return;
        }

        if self.at_page_limit() {
            if !self.seen.contains(&uri) {
                tracing::debug!("Page crawl limit defers request for {}", uri);
                self.lock_deferred().push_back(uri);
            }
            return;
        }

        if !self.seen.insert(uri.clone()) {
            return;
        }

        self.admit(&uri);
    }

    /// Offers a link found in page content
    ///
    /// Links marked `rel="nofollow"` are never followed.
    pub fn add_link(&self, link: &CrawlLink) {
        if link.is_nofollow() {
            tracing::trace!("Skipping nofollow link to {}", link.location);
            return;
        }

        self.add_request(&link.location);
    }

    /// Offers a URI again after a failed attempt
    ///
    /// Bypasses the seen-set and the page limit; the retry limit still applies.
    pub fn requeue(&self, uri: &Url) {
        self.admit(&strip_fragment(uri));
    }

    /// Records a redirect hop and offers its target
    ///
    /// The target inherits the full history. Redirects may always complete
    /// their chain, even at the page limit.
    pub fn add_redirect(&self, from: &Url, to: &Url) {
        let Some((_, state)) = self.states.remove(from) else {
            tracing::warn!("Redirect from {} has no crawl state", from);
            return;
        };

        let target = strip_fragment(to);

        if !self.scope.contains(&target) {
            tracing::debug!("Redirect from {} leaves the site: {}", from, target);
            return;
        }

        let state = state.into_redirect(target.clone());

        if state.chain_contains(&target) {
            tracing::debug!("Redirect loop at {}", target);
            self.finalize(state, CrawlStatus::MaxRedirects, None);
            return;
        }

        if !self.seen.insert(target.clone()) {
            tracing::debug!(
                "Redirect target {} from {} was already crawled or queued",
                target,
                from
            );
            return;
        }

        self.states.insert(target.clone(), state);
        self.admit(&target);
    }

    /// Finalizes a fetched URI
    ///
    /// Page robots rules may turn a successful fetch into `RobotsBlocked`, and
    /// decide whether the page's links are followed. `None` content records the
    /// URI as crawled without content.
    pub fn add_result(&self, location: &Url, content: Option<CrawledContent>) {
        let Some((_, state)) = self.states.remove(location) else {
            tracing::warn!("Result for {} has no crawl state", location);
            return;
        };

        let Some(content) = content else {
            self.finalize(state, CrawlStatus::Crawled, None);
            return;
        };

        let rules = PageRobotRules::parse(&content.page_robot_rules);
        let user_agent = &self.settings.user_agent;

        if !rules.can_index(user_agent) {
            tracing::debug!("{} is blocked by page robots rules", location);
            self.finalize(state, CrawlStatus::RobotsBlocked, None);
            return;
        }

        let links = if rules.can_follow_links(user_agent) {
            content.links.clone()
        } else {
            tracing::debug!("Not following links on {}", location);
            Vec::new()
        };

        self.finalize(state, CrawlStatus::Crawled, Some(content));

        for link in &links {
            self.add_link(link);
        }
    }

    /// Appends an attempt to the URI's history, creating the state if needed
    pub fn record_attempt(&self, location: &Url, request: CrawlRequest) {
        self.states
            .entry(location.clone())
            .or_insert_with(|| UriCrawlState::new(location.clone()))
            .requests
            .push(request);
    }

    /// Drives the scheduler until the frontier is exhausted or cancelled
    ///
    /// Transport failures are recorded and retried here. Every response is
    /// passed to `handler`. Returns the terminal records, draining them from
    /// the frontier.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by `handler`.
    pub async fn process<H>(
        &self,
        transport: &dyn HttpTransport,
        handler: &H,
        options: &SchedulerConfig,
    ) -> Result<Vec<CrawledUri>>
    where
        H: ResponseHandler,
    {
        let frontier = self;

        self.scheduler
            .process(
                transport,
                move |result| async move { frontier.handle_request_result(result, handler).await },
                options,
                &self.cancel,
            )
            .await?;

        if !self.states.is_empty() {
            tracing::debug!("{} URIs left unresolved", self.states.len());
        }

        Ok(self.take_crawled())
    }

    async fn handle_request_result<H>(&self, result: RequestResult, handler: &H) -> Result<()>
    where
        H: ResponseHandler,
    {
        let location = result.request_uri;

        match result.outcome {
            RequestOutcome::Failure(e) => {
                let attempt =
                    CrawlRequest::failure(result.request_start, result.elapsed_time, e.to_string());
                self.record_attempt(&location, attempt);
                // Retry failed requests
                self.requeue(&location);
                Ok(())
            }
            RequestOutcome::Response(response) => {
                let attempt = CrawlRequest::response(
                    result.request_start,
                    result.elapsed_time,
                    response.status,
                );
                self.record_attempt(&location, attempt);
                handler.handle(self, &location, response).await?;
                // A request may end without a record (redirected off-site or
                // to a known URI), leaving room under the page limit
                self.resume_deferred();
                Ok(())
            }
        }
    }

    /// Offers deferred URIs again while the page limit has room for them
    fn resume_deferred(&self) {
        while !self.cancel.is_cancelled() && !self.at_page_limit() {
            let Some(uri) = self.lock_deferred().pop_front() else {
                break;
            };
            self.add_request(&uri);
        }
    }

    fn lock_deferred(&self) -> MutexGuard<'_, VecDeque<Url>> {
        self.deferred
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Applies history limits and robots rules, then queues or finalizes
    fn admit(&self, uri: &Url) {
        let limit = self.states.get(uri).and_then(|state| {
            if state.last_request_succeeded() {
                Some(None)
            } else if state.requests.len() >= self.settings.number_of_retries as usize {
                Some(Some(CrawlStatus::MaxRetries))
            } else if state.redirects.len() >= self.settings.max_number_of_redirects as usize {
                Some(Some(CrawlStatus::MaxRedirects))
            } else {
                None
            }
        });

        match limit {
            // Already resolved
            Some(None) => return,
            Some(Some(status)) => {
                if let Some((_, state)) = self.states.remove(uri) {
                    self.finalize(state, status, None);
                }
                return;
            }
            None => {}
        }

        if self.robots.is_allowed_access(uri, &self.settings.user_agent) {
            tracing::trace!("Queueing {}", uri);
            self.scheduler.add(uri.clone());
        } else {
            let state = self
                .states
                .remove(uri)
                .map(|(_, state)| state)
                .unwrap_or_else(|| UriCrawlState::new(uri.clone()));
            tracing::debug!("{} is blocked by robots.txt", uri);
            self.finalize(state, CrawlStatus::RobotsBlocked, None);
        }
    }

    fn at_page_limit(&self) -> bool {
        let max = self.settings.max_number_of_pages_to_crawl;
        max > 0 && self.crawled.len() + self.scheduler.pending_requests() >= max
    }

    /// Produces the terminal record for a state, at most once per location
    fn finalize(&self, state: UriCrawlState, status: CrawlStatus, content: Option<CrawledContent>) {
        let max = self.settings.max_number_of_pages_to_crawl;
        if max > 0 && self.crawled.len() >= max {
            tracing::debug!("Page crawl limit reached, discarding {}", state.location);
            return;
        }

        let location = state.location.clone();
        match self.crawled.entry(location.clone()) {
            Entry::Occupied(_) => {
                tracing::debug!("{} was already finalized", location);
                return;
            }
            Entry::Vacant(entry) => {
                entry.insert(CrawledUri::from_state(state, status, content));
            }
        }

        tracing::debug!("{} finalized as {}", location, status);

        if max > 0 && self.crawled.len() >= max {
            tracing::info!("Page crawl limit of {} reached, stopping", max);
            self.cancel.cancel();
        }
    }

    fn take_crawled(&self) -> Vec<CrawledUri> {
        let locations: Vec<Url> = self.crawled.iter().map(|e| e.key().clone()).collect();
        locations
            .into_iter()
            .filter_map(|location| self.crawled.remove(&location).map(|(_, uri)| uri))
            .collect()
    }
}
