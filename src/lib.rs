//! Pool Logger: occupancy tracking for a public indoor pool
//!
//! This crate scrapes the current guest count from the municipal pool page,
//! falls back to the crowd-monitoring live feed when the page markup does not
//! carry the number, persists every observation and serves the history.

pub mod api;
pub mod config;
pub mod logger;
pub mod scraper;
pub mod storage;

use thiserror::Error;

/// Main error type for Pool Logger operations
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Guest count error: {0}")]
    GuestCount(#[from] scraper::GuestCountError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Pool Logger operations
pub type Result<T> = std::result::Result<T, PoolError>;

// Re-export commonly used types
pub use config::Config;
pub use scraper::{fetch_guest_count, GuestCountError, Observation};
pub use storage::{ObservationStore, SqliteStorage};
