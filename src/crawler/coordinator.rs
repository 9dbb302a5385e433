//! Crawler coordinator - main crawl orchestration logic
//!
//! This module wires the collaborators together for one crawl:
//! - Resolving the base authority and fetching robots.txt
//! - Reconciling the configured start delay with the robots `Crawl-delay`
//! - Seeding the frontier from the seed URI and the sitemaps
//! - Classifying every HTTP response for the frontier
//! - Assembling the final [`CrawlResult`]

use super::frontier::{Frontier, ResponseHandler};
use super::transport::{HttpResponse, HttpTransport, ReqwestTransport};
use crate::config::{validate, Config, SchedulerConfig};
use crate::content::{ContentProcessor, HtmlContentProcessor};
use crate::robots::{fetch_robots, RobotsPolicy};
use crate::sitemap::discover_sitemap_uris;
use crate::state::CrawlResult;
use crate::url::base_authority;
use crate::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Main crawler structure
///
/// Holds the transport and content processor; every call to [`Crawler::crawl`]
/// owns its own frontier, so one `Crawler` can run several crawls.
pub struct Crawler {
    transport: Arc<dyn HttpTransport>,
    content_processor: Arc<dyn ContentProcessor>,
}

impl Crawler {
    /// Creates a crawler with the default reqwest transport and HTML processor
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::Reqwest` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.crawler.user_agent)?;

        Ok(Self {
            transport: Arc::new(transport),
            content_processor: Arc::new(HtmlContentProcessor::new()),
        })
    }

    /// Replaces the HTTP transport
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replaces the content processor used for successful responses
    pub fn with_content_processor(mut self, content_processor: Arc<dyn ContentProcessor>) -> Self {
        self.content_processor = content_processor;
        self
    }

    /// Crawls the site the seed URI belongs to
    ///
    /// # Errors
    ///
    /// * `CrawlError::Config` - The configuration is invalid
    /// * `CrawlError::UrlError` - The seed has no usable authority
    /// * Any error raised while handling a response
    ///
    /// Network failures never surface here; they are part of the result.
    pub async fn crawl(&self, seed: &Url, config: &Config) -> Result<CrawlResult> {
        self.crawl_with_cancellation(seed, config, CancellationToken::new())
            .await
    }

    /// Crawls the site, stopping early when `cancel` fires
    ///
    /// Cancellation stops new requests from starting. Requests already in
    /// flight finish and their records are part of the result.
    pub async fn crawl_with_cancellation(
        &self,
        seed: &Url,
        config: &Config,
        cancel: CancellationToken,
    ) -> Result<CrawlResult> {
        validate(config)?;

        let crawl_start = Utc::now();
        let timer = Instant::now();

        let base_uri = base_authority(seed)?;
        let user_agent = &config.crawler.user_agent;
        let request_timeout = config.scheduler.request_timeout();

        tracing::info!("Starting crawl of {} as {}", base_uri, user_agent);

        let robots = fetch_robots(self.transport.as_ref(), &base_uri, request_timeout).await;
        let options = apply_crawl_delay(&config.scheduler, robots.crawl_delay(user_agent));
        let robots_sitemaps = robots.sitemaps();
        let robots: Arc<dyn RobotsPolicy> = Arc::new(robots);

        let frontier = Frontier::new(base_uri.clone(), config.crawler.clone(), robots, &cancel);
        frontier.add_request(seed);

        // Use any links referred to by the sitemap as a starting point
        let sitemap_uris = discover_sitemap_uris(
            self.transport.as_ref(),
            &base_uri,
            &robots_sitemaps,
            request_timeout,
        )
        .await;
        for uri in &sitemap_uris {
            frontier.add_request(uri);
        }

        let handler = PageResponseHandler {
            content_processor: Arc::clone(&self.content_processor),
        };
        let crawled_uris = frontier
            .process(self.transport.as_ref(), &handler, &options)
            .await?;

        let elapsed_time = timer.elapsed();
        tracing::info!(
            "Crawl of {} complete: {} URIs in {:.2}s",
            base_uri,
            crawled_uris.len(),
            elapsed_time.as_secs_f64()
        );

        Ok(CrawlResult {
            crawl_start,
            elapsed_time,
            crawled_uris,
        })
    }
}

/// Raises the start delay to the robots `Crawl-delay` when that is larger
fn apply_crawl_delay(options: &SchedulerConfig, crawl_delay: Option<f64>) -> SchedulerConfig {
    let mut options = options.clone();

    if let Some(seconds) = crawl_delay {
        let robots_delay_ms = (seconds * 1000.0).round() as u64;
        if robots_delay_ms > options.delay_between_request_start {
            tracing::info!(
                "Using robots.txt crawl delay of {}ms between requests",
                robots_delay_ms
            );
            options.delay_between_request_start = robots_delay_ms;
        }
    }

    options
}

/// Classifies responses by status class
///
/// | Status | Action |
/// |--------|--------|
/// | 3xx with Location | record redirect hop |
/// | 3xx without Location | crawled, no content |
/// | 2xx | parse content and finalize |
/// | 5xx | retry |
/// | other | crawled, no content |
struct PageResponseHandler {
    content_processor: Arc<dyn ContentProcessor>,
}

#[async_trait]
impl ResponseHandler for PageResponseHandler {
    async fn handle(&self, frontier: &Frontier, location: &Url, response: HttpResponse) -> Result<()> {
        let status = response.status;

        if status.is_redirection() {
            let target = response
                .header("location")
                .and_then(|value| location.join(value.trim()).ok());

            match target {
                Some(target) => {
                    tracing::debug!("{} redirected ({}) to {}", location, status, target);
                    frontier.add_redirect(location, &target);
                }
                None => {
                    tracing::debug!("{} returned {} without a usable Location", location, status);
                    frontier.add_result(location, None);
                }
            }
        } else if status.is_success() {
            let mut content =
                self.content_processor
                    .parse(location, &response.headers, &response.body);
            content.raw_content = String::from_utf8_lossy(&response.body).into_owned();
            frontier.add_result(location, Some(content));
        } else if status.is_server_error() {
            tracing::debug!("{} returned {}, retrying", location, status);
            frontier.requeue(location);
        } else {
            frontier.add_result(location, None);
        }

        Ok(())
    }
}
