//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The HTTP transport abstraction and its reqwest implementation
//! - Request scheduling with adaptive throttling
//! - The crawl frontier state machine
//! - Overall crawl coordination

mod coordinator;
mod frontier;
mod scheduler;
mod throttle;
mod transport;

pub use coordinator::Crawler;
pub use frontier::{Frontier, ResponseHandler};
pub use scheduler::{RequestOutcome, RequestResult, Scheduler};
pub use throttle::Throttle;
pub use transport::{build_http_client, HttpResponse, HttpTransport, ReqwestTransport};

use crate::config::Config;
use crate::state::CrawlResult;
use url::Url;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Fetch robots.txt and apply its crawl delay
/// 3. Seed the frontier from the seed URI and the sitemaps
/// 4. Fetch pages, following links and redirects within the site
/// 5. Return a record for every URI visited
///
/// # Example
///
/// ```no_run
/// use site_crawler::{crawl, Config};
/// use url::Url;
///
/// # async fn run() -> site_crawler::Result<()> {
/// let seed = Url::parse("https://example.com/").unwrap();
/// let result = crawl(&seed, &Config::default()).await?;
/// println!("Crawled {} URIs", result.crawled_uris.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(seed: &Url, config: &Config) -> crate::Result<CrawlResult> {
    Crawler::new(config)?.crawl(seed, config).await
}
