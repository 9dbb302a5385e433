use crate::config::types::{Config, CrawlerConfig, SchedulerConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_scheduler_config(&config.scheduler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates frontier configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.number_of_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "number_of_retries must be >= 1, got {}",
            config.number_of_retries
        )));
    }

    for alias in &config.host_aliases {
        validate_host_pattern(alias)?;
    }

    Ok(())
}

/// Validates request scheduler configuration
fn validate_scheduler_config(config: &SchedulerConfig) -> Result<(), ConfigError> {
    if config.max_number_of_simultaneous_requests < 1
        || config.max_number_of_simultaneous_requests > 100
    {
        return Err(ConfigError::Validation(format!(
            "max_number_of_simultaneous_requests must be between 1 and 100, got {}",
            config.max_number_of_simultaneous_requests
        )));
    }

    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "request_timeout must be greater than 0ms".to_string(),
        ));
    }

    if config.min_sequential_successes_to_minimise_throttling < 1 {
        return Err(ConfigError::Validation(format!(
            "min_sequential_successes_to_minimise_throttling must be >= 1, got {}",
            config.min_sequential_successes_to_minimise_throttling
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.summary_path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "summary_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates a host alias pattern (supports a leading "*." wildcard)
fn validate_host_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(host) => validate_host_string(host),
        None => validate_host_string(pattern),
    }
}

/// Validates a host string (without wildcard prefix)
///
/// Single-label hosts such as `localhost` are accepted.
fn validate_host_string(host: &str) -> Result<(), ConfigError> {
    if host.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host cannot be empty".to_string(),
        ));
    }

    if !host
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' contains invalid characters",
            host
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.starts_with('-') || host.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' cannot start or end with '.' or '-'",
            host
        )));
    }

    if host.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' cannot contain consecutive dots",
            host
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_host_pattern() {
        assert!(validate_host_pattern("example.com").is_ok());
        assert!(validate_host_pattern("*.example.com").is_ok());
        assert!(validate_host_pattern("sub.example.com").is_ok());
        assert!(validate_host_pattern("localhost").is_ok());
        assert!(validate_host_pattern("127.0.0.1").is_ok());

        assert!(validate_host_pattern("").is_err());
        assert!(validate_host_pattern("*.").is_err());
        assert!(validate_host_pattern(".example.com").is_err());
        assert!(validate_host_pattern("example.com.").is_err());
        assert!(validate_host_pattern("exa mple.com").is_err());
        assert!(validate_host_pattern("example..com").is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_zero_retries() {
        let mut config = Config::default();
        config.crawler.number_of_retries = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_concurrency() {
        let mut config = Config::default();
        config.scheduler.max_number_of_simultaneous_requests = 101;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_request_timeout() {
        let mut config = Config::default();
        config.scheduler.request_timeout = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_delays_are_allowed() {
        let config = Config {
            scheduler: SchedulerConfig::no_delay(),
            ..Config::default()
        };
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_bad_alias() {
        let mut config = Config::default();
        config.crawler.host_aliases = vec!["bad host".to_string()];
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidPattern(_))
        ));
    }
}
