use pool_logger::config::ScraperConfig;
use pool_logger::logger::{log_guest_count, watch};
use pool_logger::scraper::build_http_client;
use pool_logger::storage::{ObservationStore, SqliteStorage};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ScraperConfig {
    ScraperConfig {
        target_url: format!("{}/city.html", server.uri()),
        feed_url: "ws://127.0.0.1:1/api".to_string(),
        debug_dump_path: None,
        ..ScraperConfig::default()
    }
}

#[tokio::test]
async fn test_log_writes_to_database_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Anzahl Gäste 73 von 250"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("data").join("guest_logs.db");
    let store = Mutex::new(SqliteStorage::new(&db_path).unwrap());

    let record = log_guest_count(&config_for(&server), None, &store)
        .await
        .unwrap();
    assert_eq!(record.count, 73);
    drop(store);

    let reopened = SqliteStorage::new(&db_path).unwrap();
    let latest = reopened.latest().unwrap().unwrap();
    assert_eq!(latest.count, 73);
    assert_eq!(latest.capacity, Some(250));
}

#[tokio::test]
async fn test_failed_fetch_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Keine Angaben verfügbar"))
        .mount(&server)
        .await;

    let store = Mutex::new(SqliteStorage::new_in_memory().unwrap());
    let result = log_guest_count(&config_for(&server), None, &store).await;

    assert!(result.is_err());
    assert_eq!(store.lock().await.count().unwrap(), 0);
}

#[tokio::test]
async fn test_watch_logs_until_shutdown_and_survives_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Anzahl Gäste 5"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let client = build_http_client(&config).unwrap();
    let store = Mutex::new(SqliteStorage::new_in_memory().unwrap());

    let logged = watch(
        &config,
        &client,
        &store,
        Duration::from_millis(50),
        tokio::time::sleep(Duration::from_millis(400)),
    )
    .await;

    assert!(logged >= 1, "expected at least one observation");
    assert_eq!(store.lock().await.count().unwrap(), logged);
}
