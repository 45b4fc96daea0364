//! Unit tests for the coordinator
//!
//! End-to-end scenarios over the public API live in the top-level tests
//! directory; these cover cancellation, pacing and event ordering.

use std::path::Path;
use std::time::{Duration, Instant};

use serde_json::json;
use tempfile::TempDir;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::app::client::{ClientConfig, FetcherConfig, IndexClient};

use super::*;

/// Fetcher settings with short backoff for tests
pub fn create_test_fetcher_config() -> FetcherConfig {
    FetcherConfig {
        retry_base_delay: Duration::from_millis(10),
        read_timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

/// Coordinator against a mock index, with its event receiver
pub fn create_test_coordinator(
    server: &MockServer,
    pacing_delay: Duration,
) -> (Coordinator, mpsc::UnboundedReceiver<BatchEvent>) {
    let client_config = ClientConfig {
        rate_limit_rps: 100,
        ..ClientConfig::default().with_base_url(server.uri())
    };
    let resolver = ArtifactResolver::new(IndexClient::with_config(client_config).unwrap());
    let fetcher = StreamingFetcher::new(create_test_fetcher_config()).unwrap();
    let (reporter, rx) = ProgressReporter::channel();
    let config = CoordinatorConfig::default().with_pacing_delay(pacing_delay);

    (Coordinator::new(config, resolver, fetcher, reporter), rx)
}

/// Index answers no hits unless a more specific mock matches
pub async fn mount_empty_search(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": []})))
        .with_priority(10)
        .mount(server)
        .await;
}

/// Index entry for `name` whose single fabric version points back at the server
pub async fn mount_mod(server: &MockServer, name: &str, version: &str, file_status: u16) {
    let project_id = format!("id-{}", name);
    let file_path = format!("/files/{}-{}.jar", name, version);

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", name))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"hits": [{"project_id": project_id, "slug": name}]})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/project/{}/version", project_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "version_number": version,
            "loaders": ["fabric"],
            "game_versions": ["1.21.1"],
            "files": [{"url": format!("{}{}", server.uri(), file_path)}]
        }])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(file_status).set_body_bytes(vec![7u8; 1024]))
        .mount(server)
        .await;
}

/// Write `entries` as the mod list and return the batch parameters
pub fn create_test_batch(dir: &Path, entries: serde_json::Value) -> BatchConfig {
    let input = dir.join("mods.json");
    std::fs::write(&input, entries.to_string()).unwrap();
    BatchConfig::new(input, dir.join("out"), "fabric", "1.21.1")
}

fn drain(rx: &mut mpsc::UnboundedReceiver<BatchEvent>) -> Vec<BatchEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_events_follow_input_order() {
    let server = MockServer::start().await;
    mount_empty_search(&server).await;
    mount_mod(&server, "sodium", "0.6.0", 200).await;

    let temp_dir = TempDir::new().unwrap();
    let batch = create_test_batch(
        temp_dir.path(),
        json!([{"name": "sodium"}, {"name": "bogus-mod-xyz"}]),
    );
    let (coordinator, mut rx) = create_test_coordinator(&server, Duration::ZERO);

    let result = coordinator.run(&batch).await.unwrap();
    let events = drain(&mut rx);

    let expected_log_dir = batch.output_dir.join("failed_downloads.log");
    assert_eq!(
        events[..6],
        [
            BatchEvent::Progress {
                completed: 0,
                total: 2
            },
            BatchEvent::Log("Downloading sodium (Version: 0.6.0)...".to_string()),
            BatchEvent::Log("Successfully downloaded sodium.".to_string()),
            BatchEvent::Progress {
                completed: 1,
                total: 2
            },
            BatchEvent::Log(
                "Failed to resolve URL for bogus-mod-xyz: No matching mod found.".to_string()
            ),
            BatchEvent::Progress {
                completed: 2,
                total: 2
            },
        ]
    );
    assert_eq!(
        events[6],
        BatchEvent::Log(format!(
            "Failed downloads logged to {}",
            expected_log_dir.display()
        ))
    );
    match &events[7] {
        BatchEvent::Log(line) => assert!(line.starts_with("Download process complete in ")),
        other => panic!("Expected completion line, got {:?}", other),
    }
    assert_eq!(events.len(), 8);

    assert_eq!(result.saved.len(), 1);
    assert_eq!(result.failure_log, Some(expected_log_dir));
    assert!(!result.cancelled);
}

#[tokio::test]
async fn test_fetch_failure_leaves_no_files() {
    let server = MockServer::start().await;
    mount_mod(&server, "sodium", "0.6.0", 404).await;

    let temp_dir = TempDir::new().unwrap();
    let batch = create_test_batch(temp_dir.path(), json!([{"name": "sodium"}]));
    let (coordinator, _rx) = create_test_coordinator(&server, Duration::ZERO);

    let result = coordinator.run(&batch).await.unwrap();

    assert!(result.saved.is_empty());
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].name, "sodium");
    assert!(result.failures[0]
        .reason
        .starts_with("An error occurred during the request:"));

    let artifact = batch.output_dir.join("sodium_0.6.0_fabric.jar");
    assert!(!artifact.exists());
    assert!(!batch.output_dir.join("sodium_0.6.0_fabric.jar.meta.json").exists());
}

#[tokio::test]
async fn test_cancelled_batch_records_every_entry() {
    let server = MockServer::start().await;
    mount_empty_search(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let batch = create_test_batch(
        temp_dir.path(),
        json!([{"name": "sodium"}, {"url": "https://example.com"}, {"name": "lithium"}]),
    );
    let (coordinator, mut rx) = create_test_coordinator(&server, Duration::ZERO);
    let token = CancellationToken::new();
    let coordinator = coordinator.with_cancellation(token.clone());
    token.cancel();

    let result = coordinator.run(&batch).await.unwrap();

    assert!(result.cancelled);
    assert!(result.progress.is_complete());
    assert_eq!(
        result.failures,
        vec![
            FailureRecord::new("sodium", reasons::CANCELLED),
            FailureRecord::new("Unknown", reasons::CANCELLED),
            FailureRecord::new("lithium", reasons::CANCELLED),
        ]
    );
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(result.failure_log.unwrap().exists());

    let skipped: Vec<String> = drain(&mut rx)
        .into_iter()
        .filter_map(|event| match event {
            BatchEvent::Log(line) if line.starts_with("Skipping ") => Some(line),
            _ => None,
        })
        .collect();
    assert_eq!(
        skipped,
        vec![
            format!("Skipping sodium: {}", reasons::CANCELLED),
            format!("Skipping Unknown: {}", reasons::CANCELLED),
            format!("Skipping lithium: {}", reasons::CANCELLED),
        ]
    );
}

#[tokio::test]
async fn test_pacing_applies_only_to_index_requests() {
    let server = MockServer::start().await;
    mount_empty_search(&server).await;
    let temp_dir = TempDir::new().unwrap();

    let batch = create_test_batch(temp_dir.path(), json!([{"url": "x"}, {"name": ""}, 42]));
    let (coordinator, _rx) = create_test_coordinator(&server, Duration::from_millis(300));
    let start = Instant::now();
    let result = coordinator.run(&batch).await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(300));
    assert_eq!(result.failures.len(), 3);

    let batch = create_test_batch(temp_dir.path(), json!([{"name": "a"}, {"name": "b"}]));
    let (coordinator, _rx) = create_test_coordinator(&server, Duration::from_millis(150));
    let start = Instant::now();
    coordinator.run(&batch).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_cancellation_interrupts_pacing() {
    let server = MockServer::start().await;
    mount_empty_search(&server).await;
    let temp_dir = TempDir::new().unwrap();

    let batch = create_test_batch(temp_dir.path(), json!([{"name": "a"}, {"name": "b"}]));
    let (coordinator, _rx) = create_test_coordinator(&server, Duration::from_secs(30));
    let token = CancellationToken::new();
    let coordinator = coordinator.with_cancellation(token.clone());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let start = Instant::now();
    let result = coordinator.run(&batch).await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(result.cancelled);
    assert_eq!(result.failures[0].reason, "No matching mod found.");
    assert_eq!(result.failures[1].reason, reasons::CANCELLED);
}

#[tokio::test]
async fn test_unwritable_output_dir_aborts() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let mut batch = create_test_batch(temp_dir.path(), json!([{"name": "a"}]));
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, b"file").unwrap();
    batch.output_dir = blocker.join("out");

    let (coordinator, mut rx) = create_test_coordinator(&server, Duration::ZERO);
    let result = coordinator.run(&batch).await;

    assert!(matches!(result, Err(BatchError::OutputDir { .. })));
    assert!(drain(&mut rx).is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}
