//! Minimal live feed server for tests

use futures::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

/// What the server saw from the client
#[derive(Debug, Default)]
pub struct FeedSession {
    pub user_agent: Option<String>,
    pub request: Option<String>,
    pub closed_by_client: bool,
}

/// Frame the server sends after the snapshot request
pub enum Frame {
    Text(String),
    Ping,
}

/// Starts a server accepting one connection
///
/// After receiving the first message it sends `frames` in order, then waits
/// for the client to close the connection.
pub async fn spawn_feed_server(frames: Vec<Frame>) -> (String, JoinHandle<FeedSession>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/api", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();

        let user_agent = Arc::new(Mutex::new(None));
        let seen = user_agent.clone();
        let callback = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            *seen.lock().unwrap() = request
                .headers()
                .get("user-agent")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            Ok(response)
        };

        let mut ws = accept_hdr_async(stream, callback).await.unwrap();
        let mut session = FeedSession {
            user_agent: user_agent.lock().unwrap().clone(),
            ..FeedSession::default()
        };

        if let Some(Ok(Message::Text(text))) = ws.next().await {
            session.request = Some(text);
        }

        for frame in frames {
            let message = match frame {
                Frame::Text(text) => Message::text(text),
                Frame::Ping => Message::Ping(Vec::new()),
            };
            if ws.send(message).await.is_err() {
                return session;
            }
        }

        while let Some(message) = ws.next().await {
            match message {
                Ok(Message::Close(_)) => {
                    session.closed_by_client = true;
                    break;
                }
                Ok(_) => continue,
                Err(_) => break,
            }
        }

        session
    });

    (url, handle)
}

/// Returns a URL on which nothing is listening
pub async fn unused_feed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}/api", addr)
}

/// Returns a `wss://` URL whose listener answers the TLS hello with plain HTTP
pub async fn plaintext_wss_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("wss://{}/api", listener.local_addr().unwrap());

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let _ = stream
                .write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n")
                .await;
            let _ = stream.shutdown().await;
        }
    });

    url
}

pub fn text(payload: &str) -> Frame {
    Frame::Text(payload.to_string())
}
