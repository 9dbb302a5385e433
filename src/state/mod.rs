//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UriCrawlState`: history of a URI still being worked on (attempts and redirect hops)
//! - `CrawledUri`: the final record produced exactly once per URI
//! - `CrawlStatus`: terminal classification of a record
//! - `CrawledContent` / `CrawlLink`: parsed page data attached to successful records

mod crawl_status;
mod crawled;
mod uri_state;

// Re-export main types
pub use crawl_status::CrawlStatus;
pub use crawled::{CrawlLink, CrawlResult, CrawledContent, CrawledUri};
pub use uri_state::{AttemptOutcome, CrawlRequest, CrawledUriRedirect, UriCrawlState};
