use crate::config::types::{Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;

const MAX_TIMEOUT_SECS: u64 = 600;
const MAX_QUEUE_CAPACITY: usize = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_relays(&config.relays)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.query_timeout_secs < 1 || config.query_timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "query_timeout_secs must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, config.query_timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 || config.connect_timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, config.connect_timeout_secs
        )));
    }

    if config.queue_capacity < 1 || config.queue_capacity > MAX_QUEUE_CAPACITY {
        return Err(ConfigError::Validation(format!(
            "queue_capacity must be between 1 and {}, got {}",
            MAX_QUEUE_CAPACITY, config.queue_capacity
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates seed relay addresses
///
/// Only emptiness is checked here. Unusable addresses are per-relay failures
/// discovered at connect time, like any hinted relay.
pub fn validate_relays(relays: &[String]) -> Result<(), ConfigError> {
    for relay in relays {
        if relay.trim().is_empty() {
            return Err(ConfigError::InvalidRelay(
                "relay address cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
