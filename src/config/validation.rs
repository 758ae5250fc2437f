use crate::config::types::{Config, ScraperConfig, ServerConfig, StorageConfig};
use crate::ConfigError;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_storage_config(&config.storage)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates the extraction engine settings
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    validate_url(&config.target_url, "target_url", &["http", "https"])?;
    validate_url(&config.feed_url, "feed_url", &["ws", "wss"])?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.frame_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "frame_timeout_secs must be >= 1, got {}",
            config.frame_timeout_secs
        )));
    }

    if config.max_frames < 1 {
        return Err(ConfigError::Validation(format!(
            "max_frames must be >= 1, got {}",
            config.max_frames
        )));
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("Invalid bind address '{}': {}", config.bind, e))
    })?;
    Ok(())
}

/// Checks that `value` parses as a URL with one of the allowed schemes
fn validate_url(value: &str, field: &str, schemes: &[&str]) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", field, e)))?;

    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use one of the schemes {:?}",
            field, value, schemes
        )));
    }

    Ok(())
}
