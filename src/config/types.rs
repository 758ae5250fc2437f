use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Municipal page listing the city indoor pool
pub const DEFAULT_TARGET_URL: &str = "https://www.stadt-zuerich.ch/de/stadtleben/sport-und-erholung/sport-und-badeanlagen/hallenbaeder/city.html";

/// Crowd-monitoring live feed used by the page itself
pub const DEFAULT_FEED_URL: &str = "wss://badi-public.crowdmonitor.ch:9591/api";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36";

pub const DEFAULT_DATABASE_PATH: &str = "data/guest_logs.db";

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Main configuration structure for Pool Logger
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

/// Settings consumed by the extraction engine
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// Page carrying the guest count
    pub target_url: String,

    /// WebSocket endpoint of the live feed
    pub feed_url: String,

    /// User agent sent on the page request and the feed handshake
    pub user_agent: String,

    /// Timeout for the whole page request (seconds)
    pub request_timeout_secs: u64,

    /// Wait for each live feed frame (seconds)
    pub frame_timeout_secs: u64,

    /// Number of feed frames inspected before giving up
    pub max_frames: u32,

    /// Where the raw page is written when nothing could be extracted
    pub debug_dump_path: Option<PathBuf>,
}

impl ScraperConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn frame_timeout(&self) -> Duration {
        Duration::from_secs(self.frame_timeout_secs)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            feed_url: DEFAULT_FEED_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
            frame_timeout_secs: 10,
            max_frames: 3,
            debug_dump_path: Some(PathBuf::from("data/last_response.html")),
        }
    }
}

/// Observation store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Path to the SQLite database file
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
        }
    }
}

/// Read API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the API listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}
