//! Live feed client
//!
//! The crowd-monitoring vendor exposes a WebSocket endpoint. Sending the text
//! frame `all` requests a snapshot; the server answers with frames holding a
//! JSON array of facility records:
//!
//! ```json
//! [{"uid": "SSD-4", "currentfill": "68", "maxspace": "120"}, ...]
//! ```
//!
//! Values may be numbers or numeric strings. Snapshots can be split or
//! reordered across frames, so a small bounded number of frames is read.

use super::GuestCountError;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::Once;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::USER_AGENT;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Request frame asking for all tracked facilities
const SNAPSHOT_REQUEST: &str = "all";

type FeedStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

static CRYPTO_PROVIDER: Once = Once::new();

/// Installs the ring provider as the process-wide rustls default
///
/// `wss://` handshakes panic without one. An error means another provider
/// was installed first, which is just as good.
fn ensure_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            tracing::debug!("rustls crypto provider already installed");
        }
    });
}

/// Connection parameters for one feed session
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// WebSocket endpoint
    pub url: String,

    /// User agent sent on the handshake
    pub user_agent: String,

    /// Wait for the handshake and for each data frame
    pub frame_timeout: Duration,

    /// Data frames inspected before giving up
    pub max_frames: u32,
}

impl FeedOptions {
    pub fn new(url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_agent: user_agent.into(),
            frame_timeout: Duration::from_secs(10),
            max_frames: 3,
        }
    }
}

/// Count and capacity read from a feed record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedReading {
    pub count: u64,
    pub capacity: Option<u64>,
}

/// Reads the current count for facility `uid` from the live feed
///
/// # Protocol
///
/// 1. Connect with the configured `User-Agent` on the handshake
/// 2. Send the text frame `all`
/// 3. Read up to `max_frames` data frames, each within `frame_timeout`
/// 4. Return the first record whose `uid` matches and whose `currentfill`
///    is numeric
///
/// The connection is closed before returning, whatever the outcome.
///
/// # Errors
///
/// * `ClientSetup` - The handshake request could not be built
/// * `FeedFailed` - Connection, timeout, invalid JSON, closed stream, or no
///   matching record within the frame budget
pub async fn fetch_count_via_feed(
    uid: &str,
    options: &FeedOptions,
) -> Result<FeedReading, GuestCountError> {
    let request = build_request(options)?;
    ensure_crypto_provider();

    tracing::debug!("Connecting to live feed {} for uid={}", options.url, uid);
    let (mut ws, _response) = match timeout(options.frame_timeout, connect_async(request)).await {
        Ok(Ok(connected)) => connected,
        Ok(Err(e)) => return Err(feed_error(uid, format!("connection failed: {}", e))),
        Err(_) => {
            return Err(feed_error(
                uid,
                format!("connection not established within {:?}", options.frame_timeout),
            ))
        }
    };

    let result = read_snapshot(&mut ws, uid, options).await;

    if let Err(e) = ws.close(None).await {
        tracing::debug!("Closing live feed connection failed: {}", e);
    }

    result
}

/// Builds the handshake request carrying the user agent
fn build_request(options: &FeedOptions) -> Result<Request, GuestCountError> {
    let mut request = options.url.as_str().into_client_request().map_err(|e| {
        GuestCountError::ClientSetup(format!("invalid feed URL '{}': {}", options.url, e))
    })?;

    let user_agent = HeaderValue::from_str(&options.user_agent)
        .map_err(|e| GuestCountError::ClientSetup(format!("invalid user agent: {}", e)))?;
    request.headers_mut().insert(USER_AGENT, user_agent);

    Ok(request)
}

async fn read_snapshot(
    ws: &mut FeedStream,
    uid: &str,
    options: &FeedOptions,
) -> Result<FeedReading, GuestCountError> {
    ws.send(Message::text(SNAPSHOT_REQUEST))
        .await
        .map_err(|e| feed_error(uid, format!("snapshot request failed: {}", e)))?;

    for frame in 1..=options.max_frames {
        let payload = match timeout(options.frame_timeout, next_data_frame(ws)).await {
            Ok(Ok(payload)) => payload,
            Ok(Err(reason)) => return Err(feed_error(uid, reason)),
            Err(_) => {
                return Err(feed_error(
                    uid,
                    format!("no frame within {:?}", options.frame_timeout),
                ))
            }
        };

        match scan_frame(&payload, uid) {
            Ok(Some(reading)) => {
                tracing::debug!("Found uid={} in feed frame {}", uid, frame);
                return Ok(reading);
            }
            Ok(None) => tracing::debug!("Feed frame {} has no record for uid={}", frame, uid),
            Err(e) => return Err(feed_error(uid, format!("invalid JSON in frame {}: {}", frame, e))),
        }
    }

    Err(feed_error(
        uid,
        format!("no matching record in {} frames", options.max_frames),
    ))
}

/// Waits for the next text or binary frame, skipping control frames
async fn next_data_frame(ws: &mut FeedStream) -> Result<String, String> {
    while let Some(message) = ws.next().await {
        match message.map_err(|e| format!("receive failed: {}", e))? {
            Message::Text(text) => return Ok(text),
            Message::Binary(bytes) => {
                return String::from_utf8(bytes)
                    .map_err(|e| format!("binary frame is not UTF-8: {}", e))
            }
            Message::Close(_) => return Err("connection closed by peer".to_string()),
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        }
    }

    Err("stream ended".to_string())
}

/// Scans one feed frame for the record of facility `uid`
///
/// Non-array payloads and records without a numeric `currentfill` are not
/// matches. A `maxspace` that is null or not numeric leaves capacity unset.
///
/// # Errors
///
/// Returns the JSON error when the payload is not valid JSON.
pub fn scan_frame(payload: &str, uid: &str) -> Result<Option<FeedReading>, serde_json::Error> {
    let value: Value = serde_json::from_str(payload)?;

    let Some(records) = value.as_array() else {
        return Ok(None);
    };

    let reading = records
        .iter()
        .filter(|record| record.get("uid").and_then(Value::as_str) == Some(uid))
        .find_map(|record| {
            let count = record.get("currentfill").and_then(coerce_int)?;
            let capacity = record.get("maxspace").and_then(coerce_int);
            Some(FeedReading { count, capacity })
        });

    Ok(reading)
}

/// Float-then-integer coercion of a number or numeric string
fn coerce_int(value: &Value) -> Option<u64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    let truncated = number.trunc();
    if !truncated.is_finite() || truncated < 0.0 || truncated >= u64::MAX as f64 {
        return None;
    }

    Some(truncated as u64)
}

fn feed_error(uid: &str, reason: String) -> GuestCountError {
    GuestCountError::FeedFailed {
        uid: uid.to_string(),
        reason,
    }
}
