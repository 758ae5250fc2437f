use super::AppState;
use crate::logger::log_guest_count;
use crate::storage::{DailySummary, ObservationRecord, ObservationStore};
use crate::PoolError;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

const DEFAULT_HISTORY_LIMIT: i64 = 100;
const MAX_HISTORY_LIMIT: i64 = 1000;
const DEFAULT_DAILY_DAYS: i64 = 7;
const MAX_DAILY_DAYS: i64 = 90;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DailyParams {
    pub days: Option<i64>,
}

/// Body of a successful `POST /api/log`
#[derive(Debug, Serialize, Deserialize)]
pub struct LogResponse {
    pub success: bool,
    pub count: u64,
    pub capacity: Option<u64>,
    pub recorded_at: DateTime<Utc>,
}

/// Error response with a `{"detail": ...}` body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl From<PoolError> for ApiError {
    fn from(error: PoolError) -> Self {
        let status = match &error {
            PoolError::GuestCount(e) if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let detail = match error {
            PoolError::GuestCount(e) => e.to_string(),
            other => other.to_string(),
        };
        Self { status, detail }
    }
}

impl From<crate::storage::StorageError> for ApiError {
    fn from(error: crate::storage::StorageError) -> Self {
        PoolError::from(error).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("API error ({}): {}", self.status.as_u16(), self.detail);
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub(super) async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub(super) async fn latest(
    State(state): State<AppState>,
) -> Result<Json<Option<ObservationRecord>>, ApiError> {
    let latest = state.store.lock().await.latest()?;
    Ok(Json(latest))
}

pub(super) async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<ObservationRecord>>, ApiError> {
    let limit = clamp_param(params.limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT);
    let records = state.store.lock().await.history(limit)?;
    Ok(Json(records))
}

pub(super) async fn daily(
    State(state): State<AppState>,
    Query(params): Query<DailyParams>,
) -> Result<Json<Vec<DailySummary>>, ApiError> {
    let days = clamp_param(params.days, DEFAULT_DAILY_DAYS, MAX_DAILY_DAYS);
    let summary = state.store.lock().await.daily_summary(days)?;
    Ok(Json(summary))
}

pub(super) async fn log(State(state): State<AppState>) -> Result<Json<LogResponse>, ApiError> {
    let record = log_guest_count(&state.scraper, Some(&state.client), &state.store).await?;
    Ok(Json(LogResponse {
        success: true,
        count: record.count,
        capacity: record.capacity,
        recorded_at: record.recorded_at,
    }))
}

/// Applies the default and clamps to `1..=max`
fn clamp_param(value: Option<i64>, default: i64, max: i64) -> u32 {
    let clamped = value.unwrap_or(default).clamp(1, max);
    u32::try_from(clamped).unwrap_or(1)
}
