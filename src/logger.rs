//! Fetch-and-persist helpers shared by the CLI and the read API

use crate::config::ScraperConfig;
use crate::scraper::fetch_guest_count;
use crate::storage::{ObservationRecord, ObservationStore};
use crate::Result;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::Mutex;

/// Runs the engine once and appends the observation to `store`
///
/// Nothing is written when the engine fails.
pub async fn log_guest_count<S>(
    config: &ScraperConfig,
    client: Option<&Client>,
    store: &Mutex<S>,
) -> Result<ObservationRecord>
where
    S: ObservationStore,
{
    let observation = fetch_guest_count(config, client).await?;
    let record = store.lock().await.record(&observation)?;
    tracing::info!(
        "Logged {} guests at {}",
        record.count,
        record.recorded_at.to_rfc3339()
    );
    Ok(record)
}

/// Logs the guest count every `interval` until `shutdown` resolves
///
/// Failures are logged and the loop continues with the next tick. Returns
/// the number of successful observations.
pub async fn watch<S, F>(
    config: &ScraperConfig,
    client: &Client,
    store: &Mutex<S>,
    interval: Duration,
    shutdown: F,
) -> u64
where
    S: ObservationStore,
    F: std::future::Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut logged = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Stopping after {} observations", logged);
                return logged;
            }
            _ = ticker.tick() => {
                match log_guest_count(config, Some(client), store).await {
                    Ok(_) => logged += 1,
                    Err(e) => tracing::error!("Failed to log guest count: {}", e),
                }
            }
        }
    }
}
