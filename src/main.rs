//! Site-Crawler main entry point
//!
//! This is the command-line interface for the Site-Crawler single-site crawler.

use anyhow::Context;
use clap::Parser;
use site_crawler::config::{load_config_with_hash, Config};
use site_crawler::output::{generate_markdown_summary, print_statistics, CrawlStatistics};
use site_crawler::url::parse_seed;
use site_crawler::Crawler;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Site-Crawler: a bounded, polite single-site web crawler
///
/// Site-Crawler starts from a seed URI, discovers pages through the site's
/// sitemaps and in-page links, and reports every URI it visited. It respects
/// robots.txt, page-level robots directives and adaptive rate limits.
#[derive(Parser, Debug)]
#[command(name = "site-crawler")]
#[command(version)]
#[command(about = "A bounded, polite single-site web crawler", long_about = None)]
struct Cli {
    /// Seed URI to start crawling from
    #[arg(value_name = "SEED")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the maximum number of pages to crawl (0 = unlimited)
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Write a markdown summary to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let seed = parse_seed(&cli.seed).with_context(|| format!("invalid seed URI: {}", cli.seed))?;

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            (Config::default(), None)
        }
    };

    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_number_of_pages_to_crawl = max_pages;
    }
    if let Some(summary) = &cli.summary {
        config.output.summary_path = Some(summary.display().to_string());
    }

    site_crawler::config::validate(&config).context("configuration is invalid")?;

    if cli.dry_run {
        handle_dry_run(&seed, &config);
        return Ok(());
    }

    handle_crawl(&seed, &config, config_hash.as_deref()).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_crawler=info,warn"),
            1 => EnvFilter::new("site_crawler=debug,info"),
            2 => EnvFilter::new("site_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(seed: &Url, config: &Config) {
    println!("=== Site-Crawler Dry Run ===\n");

    println!("Seed: {}", seed);

    println!("\nCrawler Configuration:");
    println!("  User agent: {}", config.crawler.user_agent);
    println!("  Retries per URI: {}", config.crawler.number_of_retries);
    println!(
        "  Max redirects: {}",
        config.crawler.max_number_of_redirects
    );
    match config.crawler.max_number_of_pages_to_crawl {
        0 => println!("  Max pages: unlimited"),
        max => println!("  Max pages: {}", max),
    }

    println!("\nHost Aliases ({}):", config.crawler.host_aliases.len());
    for alias in &config.crawler.host_aliases {
        println!("  - {}", alias);
    }

    let scheduler = &config.scheduler;
    println!("\nScheduler Configuration:");
    println!(
        "  Max simultaneous requests: {}",
        scheduler.max_number_of_simultaneous_requests
    );
    println!(
        "  Delay between request start: {}ms (+ up to {}ms jitter)",
        scheduler.delay_between_request_start, scheduler.delay_jitter
    );
    println!("  Request timeout: {}ms", scheduler.request_timeout);
    if scheduler.timeout_before_throttle == 0 {
        println!("  Throttling: disabled");
    } else {
        println!(
            "  Throttling: +{}ms above {}ms latency, reduced after {} fast responses",
            scheduler.throttling_request_backoff,
            scheduler.timeout_before_throttle,
            scheduler.min_sequential_successes_to_minimise_throttling
        );
    }

    println!("\nOutput:");
    match &config.output.summary_path {
        Some(path) => println!("  Summary: {}", path),
        None => println!("  Summary: none"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(seed: &Url, config: &Config, config_hash: Option<&str>) -> anyhow::Result<()> {
    tracing::info!("Starting crawl of {}", seed);

    let crawler = Crawler::new(config).context("failed to build HTTP client")?;
    let result = match crawler.crawl(seed, config).await {
        Ok(result) => {
            tracing::info!(
                "Crawl completed: {} URIs in {:.2}s",
                result.crawled_uris.len(),
                result.elapsed_time.as_secs_f64()
            );
            result
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    print_statistics(&CrawlStatistics::from_result(&result));

    if let Some(path) = &config.output.summary_path {
        tracing::info!("Generating markdown summary...");
        generate_markdown_summary(&result, seed, config_hash, Path::new(path))
            .with_context(|| format!("failed to write summary to {}", path))?;
        println!("\n✓ Summary exported to: {}", path);
    }

    Ok(())
}
