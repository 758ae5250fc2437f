use crate::feed_server::{plaintext_wss_url, spawn_feed_server, text, unused_feed_url, Frame};
use pool_logger::scraper::{fetch_count_via_feed, FeedOptions, FeedReading};
use pool_logger::GuestCountError;
use std::time::Duration;

const OTHER_POOLS: &str = r#"[{"uid":"SSD-1","currentfill":"10","maxspace":"50"},
                             {"uid":"SSD-2","currentfill":"3","maxspace":null}]"#;

const TARGET_POOL: &str = r#"[{"uid":"SSD-1","currentfill":"11","maxspace":"50"},
                             {"uid":"SSD-4","currentfill":"68","maxspace":"120"}]"#;

fn options(url: &str) -> FeedOptions {
    FeedOptions {
        frame_timeout: Duration::from_millis(500),
        ..FeedOptions::new(url, "PoolLoggerTest/1.0")
    }
}

#[tokio::test]
async fn test_match_in_second_of_three_frames() {
    let (url, server) =
        spawn_feed_server(vec![text(OTHER_POOLS), text(TARGET_POOL), text(OTHER_POOLS)]).await;

    let reading = fetch_count_via_feed("SSD-4", &options(&url)).await.unwrap();
    assert_eq!(
        reading,
        FeedReading {
            count: 68,
            capacity: Some(120)
        }
    );

    let session = server.await.unwrap();
    assert_eq!(session.request.as_deref(), Some("all"));
    assert_eq!(session.user_agent.as_deref(), Some("PoolLoggerTest/1.0"));
    assert!(session.closed_by_client);
}

#[tokio::test]
async fn test_fails_after_three_frames_without_match() {
    let (url, server) = spawn_feed_server(vec![
        text(OTHER_POOLS),
        text(OTHER_POOLS),
        text(OTHER_POOLS),
        text(TARGET_POOL),
    ])
    .await;

    let result = fetch_count_via_feed("SSD-4", &options(&url)).await;
    match result {
        Err(GuestCountError::FeedFailed { uid, reason }) => {
            assert_eq!(uid, "SSD-4");
            assert!(reason.contains("3 frames"), "unexpected reason: {}", reason);
        }
        other => panic!("expected FeedFailed, got {:?}", other),
    }

    assert!(server.await.unwrap().closed_by_client);
}

#[tokio::test]
async fn test_ping_frames_do_not_count() {
    let (url, server) = spawn_feed_server(vec![
        Frame::Ping,
        text(OTHER_POOLS),
        Frame::Ping,
        text(OTHER_POOLS),
        text(TARGET_POOL),
    ])
    .await;

    let reading = fetch_count_via_feed("SSD-4", &options(&url)).await.unwrap();
    assert_eq!(reading.count, 68);
    server.await.unwrap();
}

#[tokio::test]
async fn test_invalid_json_fails() {
    let (url, server) = spawn_feed_server(vec![text("<html>not json</html>")]).await;

    let result = fetch_count_via_feed("SSD-4", &options(&url)).await;
    assert!(matches!(result, Err(GuestCountError::FeedFailed { .. })));
    assert!(server.await.unwrap().closed_by_client);
}

#[tokio::test]
async fn test_silent_feed_times_out_and_closes() {
    let (url, server) = spawn_feed_server(vec![]).await;

    let result = fetch_count_via_feed("SSD-4", &options(&url)).await;
    match result {
        Err(GuestCountError::FeedFailed { reason, .. }) => {
            assert!(reason.contains("no frame"), "unexpected reason: {}", reason);
        }
        other => panic!("expected FeedFailed, got {:?}", other),
    }

    assert!(server.await.unwrap().closed_by_client);
}

#[tokio::test]
async fn test_connection_refused() {
    let url = unused_feed_url().await;

    let result = fetch_count_via_feed("SSD-4", &options(&url)).await;
    assert!(matches!(result, Err(GuestCountError::FeedFailed { .. })));
}

#[tokio::test]
async fn test_failed_tls_handshake_is_an_error() {
    let url = plaintext_wss_url().await;

    // Spawned so a panic inside the TLS setup surfaces as a JoinError
    let joined = tokio::spawn(async move { fetch_count_via_feed("SSD-4", &options(&url)).await }).await;

    match joined {
        Ok(Err(GuestCountError::FeedFailed { uid, reason })) => {
            assert_eq!(uid, "SSD-4");
            assert!(reason.contains("connection failed"), "unexpected reason: {}", reason);
        }
        Ok(other) => panic!("expected FeedFailed, got {:?}", other),
        Err(e) => panic!("feed client panicked: {}", e),
    }
}

#[tokio::test]
async fn test_bad_count_skipped_then_missing_capacity() {
    let (url, server) = spawn_feed_server(vec![
        text(r#"[{"uid":"SSD-4","currentfill":"n/a","maxspace":"120"}]"#),
        text(r#"[{"uid":"SSD-4","currentfill":42.0,"maxspace":"unknown"}]"#),
    ])
    .await;

    let reading = fetch_count_via_feed("SSD-4", &options(&url)).await.unwrap();
    assert_eq!(
        reading,
        FeedReading {
            count: 42,
            capacity: None
        }
    );
    server.await.unwrap();
}
