//! Configuration module for Pool Logger
//!
//! This module handles loading, parsing, and validating the configuration.
//! Values come from built-in defaults, an optional TOML file, and finally
//! `POOL_LOGGER_*` environment variables.
//!
//! # Example
//!
//! ```no_run
//! use pool_logger::config::load_config;
//!
//! let config = load_config(None).unwrap();
//! println!("Scraping {}", config.scraper.target_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ScraperConfig, ServerConfig, StorageConfig, DEFAULT_BIND, DEFAULT_DATABASE_PATH,
    DEFAULT_FEED_URL, DEFAULT_TARGET_URL, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{apply_env_overrides, apply_overrides_from, load_config, parse_config};
pub use validation::validate;
