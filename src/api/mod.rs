//! Read API over the observation store
//!
//! Routes:
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/healthz` | Liveness |
//! | GET | `/api/latest` | Newest observation or `null` |
//! | GET | `/api/history?limit=N` | Newest first, `N` clamped to 1..=1000 |
//! | GET | `/api/daily?days=N` | Per-day aggregates, `N` clamped to 1..=90 |
//! | POST | `/api/log` | Fetch once and persist |

mod handlers;

pub use handlers::{ApiError, DailyParams, HistoryParams, LogResponse};

use crate::config::{Config, ScraperConfig};
use crate::logger::log_guest_count;
use crate::scraper::build_http_client;
use crate::storage::{ObservationStore, SqliteStorage};
use axum::routing::{get, post};
use axum::Router;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared state of the API handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<SqliteStorage>>,
    pub scraper: Arc<ScraperConfig>,
    pub client: Client,
}

impl AppState {
    pub fn new(scraper: ScraperConfig, client: Client, store: SqliteStorage) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            scraper: Arc::new(scraper),
            client,
        }
    }
}

/// Builds the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/latest", get(handlers::latest))
        .route("/api/history", get(handlers::history))
        .route("/api/daily", get(handlers::daily))
        .route("/api/log", post(handlers::log))
        .with_state(state)
}

/// Serves the API until the listener fails
///
/// When the store is empty, one fetch runs in the background so the first
/// visitors see data; its failure is only logged.
pub async fn serve(config: &Config, store: SqliteStorage) -> crate::Result<()> {
    let client = build_http_client(&config.scraper)?;
    let state = AppState::new(config.scraper.clone(), client, store);

    if state.store.lock().await.count()? == 0 {
        let warmup = state.clone();
        tokio::spawn(async move {
            if let Err(e) =
                log_guest_count(&warmup.scraper, Some(&warmup.client), &warmup.store).await
            {
                tracing::warn!("Startup fetch failed: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("Read API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
