use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for a crawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Frontier behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// User agent sent with every request and matched against robots rules
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Extra hosts treated as part of the site (supports "*.example.com")
    #[serde(rename = "host-aliases", default)]
    pub host_aliases: Vec<String>,

    /// Maximum number of attempts for a URI before it is given up on
    #[serde(rename = "number-of-retries", default = "default_number_of_retries")]
    pub number_of_retries: u32,

    /// Maximum length of a redirect chain
    #[serde(
        rename = "max-number-of-redirects",
        default = "default_max_number_of_redirects"
    )]
    pub max_number_of_redirects: u32,

    /// Maximum number of terminal records (0 = unlimited)
    #[serde(rename = "max-number-of-pages-to-crawl", default)]
    pub max_number_of_pages_to_crawl: usize,
}

/// Request scheduler tuning; all durations are in milliseconds
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum number of fetches in flight at once
    #[serde(
        rename = "max-number-of-simultaneous-requests",
        default = "default_max_simultaneous_requests"
    )]
    pub max_number_of_simultaneous_requests: usize,

    /// Base delay before each request starts
    #[serde(
        rename = "delay-between-request-start",
        default = "default_delay_between_request_start"
    )]
    pub delay_between_request_start: u64,

    /// Upper bound of the random addition to the start delay
    #[serde(rename = "delay-jitter", default = "default_delay_jitter")]
    pub delay_jitter: u64,

    /// Fetch latency above which backoff is increased (0 disables throttling)
    #[serde(
        rename = "timeout-before-throttle",
        default = "default_timeout_before_throttle"
    )]
    pub timeout_before_throttle: u64,

    /// Backoff step added or removed by the throttle
    #[serde(
        rename = "throttling-request-backoff",
        default = "default_throttling_request_backoff"
    )]
    pub throttling_request_backoff: u64,

    /// Consecutive fast responses needed before backoff is reduced
    #[serde(
        rename = "min-sequential-successes-to-minimise-throttling",
        default = "default_min_sequential_successes"
    )]
    pub min_sequential_successes_to_minimise_throttling: u32,

    /// Deadline for a single fetch
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to the markdown summary file, if one should be written
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

impl SchedulerConfig {
    pub fn delay_between_request_start(&self) -> Duration {
        Duration::from_millis(self.delay_between_request_start)
    }

    pub fn delay_jitter(&self) -> Duration {
        Duration::from_millis(self.delay_jitter)
    }

    pub fn timeout_before_throttle(&self) -> Duration {
        Duration::from_millis(self.timeout_before_throttle)
    }

    pub fn throttling_request_backoff(&self) -> Duration {
        Duration::from_millis(self.throttling_request_backoff)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }

    /// Options with no start delay and no jitter, handy for local targets
    pub fn no_delay() -> Self {
        Self {
            delay_between_request_start: 0,
            delay_jitter: 0,
            ..Self::default()
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            host_aliases: Vec::new(),
            number_of_retries: default_number_of_retries(),
            max_number_of_redirects: default_max_number_of_redirects(),
            max_number_of_pages_to_crawl: 0,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_number_of_simultaneous_requests: default_max_simultaneous_requests(),
            delay_between_request_start: default_delay_between_request_start(),
            delay_jitter: default_delay_jitter(),
            timeout_before_throttle: default_timeout_before_throttle(),
            throttling_request_backoff: default_throttling_request_backoff(),
            min_sequential_successes_to_minimise_throttling: default_min_sequential_successes(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    format!("site-crawler/{}", env!("CARGO_PKG_VERSION"))
}

fn default_number_of_retries() -> u32 {
    3
}

fn default_max_number_of_redirects() -> u32 {
    3
}

fn default_max_simultaneous_requests() -> usize {
    10
}

fn default_delay_between_request_start() -> u64 {
    1000
}

fn default_delay_jitter() -> u64 {
    1000
}

fn default_timeout_before_throttle() -> u64 {
    2500
}

fn default_throttling_request_backoff() -> u64 {
    5000
}

fn default_min_sequential_successes() -> u32 {
    5
}

fn default_request_timeout() -> u64 {
    30_000
}
