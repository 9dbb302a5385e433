//! Site-Crawler: a bounded, polite single-site web crawler
//!
//! Given a seed authority, the crawler discovers pages from the site's sitemap and
//! in-page links, fetches them under concurrency and adaptive rate limits, honors
//! robots.txt and page-level robots directives, and returns a record of every URI
//! visited with its full request, redirect and retry history.

pub mod config;
pub mod content;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod sitemap;
pub mod state;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for crawl operations
///
/// Only configuration and programming faults surface through this type. Network
/// failures during a crawl are recorded as failed attempts instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid host pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Transport-level failures of a single request
///
/// These are never raised out of the scheduler; they travel inside a
/// [`crawler::RequestResult`] so the caller decides whether to retry.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timeout for {url} after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Connection failed for {url}: {message}")]
    Connection { url: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Crawler};
pub use state::{CrawlResult, CrawlStatus, CrawledUri};
