//! Markdown summary generation
//!
//! This module generates a human-readable markdown report of a crawl: run
//! information, overall statistics, a status breakdown and one table row per
//! recorded URI.

use super::stats::CrawlStatistics;
use crate::state::{CrawlResult, CrawlStatus, CrawledUri};
use crate::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;

/// Generates a markdown summary and writes it to `output_path`
///
/// # Arguments
///
/// * `result` - The crawl result
/// * `seed` - The seed URI the crawl started from
/// * `config_hash` - Hash of the configuration file, if one was used
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(
    result: &CrawlResult,
    seed: &Url,
    config_hash: Option<&str>,
    output_path: &Path,
) -> Result<()> {
    let markdown = format_markdown_summary(result, seed, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl result as markdown
pub fn format_markdown_summary(result: &CrawlResult, seed: &Url, config_hash: Option<&str>) -> String {
    let stats = CrawlStatistics::from_result(result);
    let mut md = String::new();

    md.push_str("# Site Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", seed));
    md.push_str(&format!("- **Started**: {}\n", result.crawl_start.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        result.elapsed_time.as_secs_f64()
    ));
    if let Some(hash) = config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **URIs Recorded**: {}\n", stats.total_uris));
    md.push_str(&format!("- **Requests Made**: {}\n", stats.total_requests));
    md.push_str(&format!("- **Failed Requests**: {}\n", stats.failed_requests));
    md.push_str(&format!("- **Redirect Hops**: {}\n", stats.redirect_hops));
    md.push_str(&format!("- **Retried URIs**: {}\n", stats.retried_uris));
    md.push_str(&format!("- **Links Found**: {}\n", stats.total_links));
    if let Some(average) = stats.average_response_time {
        md.push_str(&format!(
            "- **Average Response Time**: {}ms\n",
            average.as_millis()
        ));
    }
    md.push('\n');

    // Status breakdown
    md.push_str("## Status Breakdown\n\n");
    md.push_str("| Status | Count |\n");
    md.push_str("|--------|-------|\n");
    for status in CrawlStatus::all() {
        md.push_str(&format!("| {} | {} |\n", status, stats.count(status)));
    }
    md.push('\n');

    // Per-URI table
    if !result.crawled_uris.is_empty() {
        let mut crawled: Vec<&CrawledUri> = result.crawled_uris.iter().collect();
        crawled.sort_by(|a, b| a.location.as_str().cmp(b.location.as_str()));

        md.push_str("## URIs\n\n");
        md.push_str("| URI | Status | HTTP | Requests | Redirects | Links |\n");
        md.push_str("|-----|--------|------|----------|-----------|-------|\n");

        for uri in crawled {
            let http = uri
                .last_status_code()
                .map(|code| code.as_u16().to_string())
                .unwrap_or_else(|| "-".to_string());
            let links = uri.content.as_ref().map_or(0, |c| c.links.len());

            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                escape_cell(uri.location.as_str()),
                uri.status,
                http,
                uri.requests.len(),
                uri.redirect_chain.len(),
                links
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
