//! Statistics derived from a crawl result
//!
//! This module provides functionality for summarising and displaying the
//! records of a finished crawl.

use crate::state::{CrawlResult, CrawlStatus};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Total number of terminal records
    pub total_uris: usize,

    /// Count of records by status
    pub uris_by_status: HashMap<CrawlStatus, usize>,

    /// Every attempt made, including attempts at redirect hops
    pub total_requests: usize,

    /// Attempts that got no response
    pub failed_requests: usize,

    /// Redirect hops followed across all records
    pub redirect_hops: usize,

    /// Records that needed more than one attempt
    pub retried_uris: usize,

    /// Links extracted from crawled content
    pub total_links: usize,

    /// Distinct hosts the crawled content links to
    pub linked_hosts: usize,

    /// Mean fetch latency over attempts that got a response
    pub average_response_time: Option<Duration>,

    pub elapsed_time: Duration,
}

impl CrawlStatistics {
    /// Computes statistics for a crawl result
    pub fn from_result(result: &CrawlResult) -> Self {
        let mut stats = Self {
            total_uris: result.crawled_uris.len(),
            elapsed_time: result.elapsed_time,
            ..Self::default()
        };

        let mut hosts = HashSet::new();
        let mut response_time = Duration::ZERO;
        let mut responses = 0u32;

        for crawled in &result.crawled_uris {
            *stats.uris_by_status.entry(crawled.status).or_insert(0) += 1;

            stats.redirect_hops += crawled.redirect_chain.len();
            stats.total_requests += crawled.total_requests();
            if crawled.requests.len() > 1 {
                stats.retried_uris += 1;
            }

            let attempts = crawled
                .requests
                .iter()
                .chain(crawled.redirect_chain.iter().flat_map(|hop| hop.requests.iter()));
            for attempt in attempts {
                if attempt.status_code().is_some() {
                    response_time += attempt.elapsed_time;
                    responses += 1;
                } else {
                    stats.failed_requests += 1;
                }
            }

            if let Some(content) = &crawled.content {
                stats.total_links += content.links.len();
                hosts.extend(
                    content
                        .links
                        .iter()
                        .filter_map(|link| link.location.host_str().map(str::to_lowercase)),
                );
            }
        }

        stats.linked_hosts = hosts.len();
        stats.average_response_time = (responses > 0).then(|| response_time / responses);
        stats
    }

    /// Number of records with the given status
    pub fn count(&self, status: CrawlStatus) -> usize {
        self.uris_by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  URIs recorded: {}", stats.total_uris);
    println!("  Requests made: {}", stats.total_requests);
    println!("  Failed requests: {}", stats.failed_requests);
    println!("  Redirect hops: {}", stats.redirect_hops);
    println!("  Retried URIs: {}", stats.retried_uris);
    println!("  Links found: {} ({} hosts)", stats.total_links, stats.linked_hosts);
    if let Some(average) = stats.average_response_time {
        println!("  Average response time: {}ms", average.as_millis());
    }
    println!("  Elapsed: {:.2}s", stats.elapsed_time.as_secs_f64());
    println!();

    println!("URIs by Status:");
    for status in CrawlStatus::all() {
        let count = stats.count(status);
        let percentage = if stats.total_uris > 0 {
            (count as f64 / stats.total_uris as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
}
