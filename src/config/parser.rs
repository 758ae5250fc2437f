use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variables that override configuration values
const ENV_TARGET_URL: &str = "POOL_LOGGER_TARGET_URL";
const ENV_FEED_URL: &str = "POOL_LOGGER_WS_URL";
const ENV_USER_AGENT: &str = "POOL_LOGGER_USER_AGENT";
const ENV_DATABASE_PATH: &str = "POOL_LOGGER_DB";
const ENV_BIND: &str = "POOL_LOGGER_BIND";

/// Loads the configuration
///
/// Starts from the built-in defaults, reads the TOML file when a path is
/// given, applies `POOL_LOGGER_*` environment overrides and validates the
/// result.
///
/// # Arguments
///
/// * `path` - Optional path to a TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to read, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use pool_logger::config::load_config;
///
/// let config = load_config(Some(Path::new("pool-logger.toml"))).unwrap();
/// println!("Database: {}", config.storage.database_path);
/// ```
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config);
    validate(&config)?;

    Ok(config)
}

/// Parses and validates configuration from a TOML string, without overrides
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Applies `POOL_LOGGER_*` environment variables on top of `config`
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Applies overrides looked up through `lookup`
///
/// Empty values are ignored so an exported-but-blank variable does not wipe
/// out a default.
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(value) = get(ENV_TARGET_URL) {
        config.scraper.target_url = value;
    }
    if let Some(value) = get(ENV_FEED_URL) {
        config.scraper.feed_url = value;
    }
    if let Some(value) = get(ENV_USER_AGENT) {
        config.scraper.user_agent = value;
    }
    if let Some(value) = get(ENV_DATABASE_PATH) {
        config.storage.database_path = value;
    }
    if let Some(value) = get(ENV_BIND) {
        config.server.bind = value;
    }
}
