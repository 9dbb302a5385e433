//! Output module for reporting crawl results
//!
//! This module handles:
//! - Computing statistics over a finished crawl
//! - Printing those statistics to the terminal
//! - Generating markdown summaries of crawl results

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_statistics, CrawlStatistics};
