//! Pool Logger main entry point
//!
//! This is the command-line interface for logging and serving pool guest counts.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pool_logger::config::{load_config, Config};
use pool_logger::logger::{log_guest_count, watch};
use pool_logger::scraper::{build_http_client, fetch_guest_count, fetch_guest_count_via_feed};
use pool_logger::storage::{ObservationStore, SqliteStorage};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Pool Logger: guest counts of the city indoor pool
///
/// Scrapes the current number of guests from the municipal page (falling
/// back to the live crowd-monitoring feed), stores every observation and
/// serves the history over HTTP.
#[derive(Parser, Debug)]
#[command(name = "pool-logger")]
#[command(version)]
#[command(about = "Logs guest counts of the city indoor pool", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the guest count once and store it
    Log,

    /// Fetch and store the guest count on a fixed interval until Ctrl-C
    Watch {
        /// Seconds between fetches
        #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },

    /// Fetch the guest count and print it without storing
    Probe {
        /// Skip page extraction and read the live feed directly
        #[arg(long)]
        force_feed: bool,
    },

    /// Print stored observations, newest first
    History {
        /// Number of observations to show
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },

    /// Serve the read API
    Serve {
        /// Address to listen on (overrides the configuration)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Log => handle_log(&config).await,
        Command::Watch { interval } => handle_watch(&config, interval).await,
        Command::Probe { force_feed } => handle_probe(&config, force_feed).await,
        Command::History { limit } => handle_history(&config, limit),
        Command::Serve { bind } => handle_serve(config, bind).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber
///
/// Verbosity flags win; otherwise `POOL_LOGGER_LOG_LEVEL` (default `info`)
/// sets the crate's level.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => {
                let level = std::env::var("POOL_LOGGER_LOG_LEVEL")
                    .map(|level| level.to_lowercase())
                    .unwrap_or_else(|_| "info".to_string());
                EnvFilter::try_new(format!("pool_logger={},warn", level))
                    .unwrap_or_else(|_| EnvFilter::new("pool_logger=info,warn"))
            }
            1 => EnvFilter::new("pool_logger=debug,info"),
            2 => EnvFilter::new("pool_logger=trace,debug"),
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

fn open_store(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.storage.database_path);
    SqliteStorage::new(path).with_context(|| format!("opening database {}", path.display()))
}

/// Handles `log`: one observation, non-zero exit on failure
async fn handle_log(config: &Config) -> anyhow::Result<()> {
    let store = Mutex::new(open_store(config)?);
    log_guest_count(&config.scraper, None, &store)
        .await
        .context("Failed to fetch guest count")?;
    Ok(())
}

/// Handles `watch`: scheduled observations until Ctrl-C
async fn handle_watch(config: &Config, interval: u64) -> anyhow::Result<()> {
    let store = Mutex::new(open_store(config)?);
    let client = build_http_client(&config.scraper)?;

    tracing::info!(
        "Logging guest count every {}s from {}",
        interval,
        config.scraper.target_url
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    watch(
        &config.scraper,
        &client,
        &store,
        Duration::from_secs(interval),
        shutdown,
    )
    .await;
    Ok(())
}

/// Handles `probe`: prints the observation without storing it
async fn handle_probe(config: &Config, force_feed: bool) -> anyhow::Result<()> {
    let observation = if force_feed {
        fetch_guest_count_via_feed(&config.scraper, None).await?
    } else {
        fetch_guest_count(&config.scraper, None).await?
    };

    println!("Timestamp: {}", observation.timestamp.to_rfc3339());
    println!("Guests:    {}", observation.count);
    match observation.capacity {
        Some(capacity) => println!("Capacity:  {}", capacity),
        None => println!("Capacity:  unknown"),
    }

    Ok(())
}

/// Handles `history`: prints stored observations
fn handle_history(config: &Config, limit: u32) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let records = store.history(limit)?;

    if records.is_empty() {
        println!("No observations stored in {}", config.storage.database_path);
        return Ok(());
    }

    for record in records {
        let capacity = record
            .capacity
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {:>4} / {}",
            record.recorded_at.to_rfc3339(),
            record.count,
            capacity
        );
    }

    Ok(())
}

/// Handles `serve`: runs the read API
async fn handle_serve(mut config: Config, bind: Option<String>) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    let store = open_store(&config)?;
    pool_logger::api::serve(&config, store).await?;
    Ok(())
}
