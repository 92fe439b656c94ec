use std::time::Duration;

use api::{MojangClient, MojangConfig};
use database::{create_schema, PlayerRecord, PlayerStore};
use sqlx::sqlite::SqlitePoolOptions;
use tracker::files::{load_cursor, load_json, NameChangeLog};
use tracker::ingest::SCRAPE_METHOD;
use tracker::{DataFiles, NameIngestor};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mojang(server: &MockServer) -> MojangClient {
    MojangClient::new(MojangConfig {
        profile_base_url: server.uri(),
        session_base_url: server.uri(),
        request_delay: Duration::ZERO,
        max_retries: 3,
        backoff_start: Duration::from_millis(1),
        backoff_cap: Duration::from_millis(4),
    })
}

async fn memory_store() -> PlayerStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory pool");
    create_schema(&pool).await.expect("Failed to create schema");
    PlayerStore::new(pool)
}

fn scraped_files(dir: &tempfile::TempDir, contents: &str) -> DataFiles {
    let files = DataFiles::new(dir.path());
    files.ensure_dirs().unwrap();
    std::fs::write(files.scraped_names(), contents).unwrap();
    files
}

fn uuid_a() -> Uuid {
    Uuid::parse_str("b876ec32-e396-476b-a115-8438d83c67d4").unwrap()
}

fn uuid_b() -> Uuid {
    Uuid::parse_str("069a79f4-44e9-4726-a5be-fca90e38aaf5").unwrap()
}

fn profile_body(uuid: Uuid, name: &str) -> serde_json::Value {
    serde_json::json!({ "id": uuid.simple().to_string(), "name": name })
}

#[tokio::test]
async fn resolved_names_are_queued_and_the_cursor_advances() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/profiles/minecraft/PlayerOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body(uuid_a(), "PlayerOne")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/profiles/minecraft/PlayerTwo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body(uuid_b(), "PlayerTwo")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let files = scraped_files(&dir, "PlayerOne\n\nPlayerTwo\n");
    let store = memory_store().await;

    let mut ingestor = NameIngestor::new(mojang(&server), store.clone(), files.clone())
        .await
        .unwrap();
    let added = ingestor.process_scraped_names().await.unwrap();
    assert_eq!(added, 2);

    // past the blank line too
    assert_eq!(load_cursor(&files.ingest_progress()), 3);

    let pending = store.pending_discoveries(10).await.unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|e| e.method.as_deref() == Some(SCRAPE_METHOD)));
}

#[tokio::test]
async fn unknown_names_are_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/profiles/minecraft/Ghost"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let files = scraped_files(&dir, "Ghost\n");
    let store = memory_store().await;

    let mut ingestor = NameIngestor::new(mojang(&server), store.clone(), files.clone())
        .await
        .unwrap();
    assert_eq!(ingestor.process_scraped_names().await.unwrap(), 0);
    assert_eq!(load_cursor(&files.ingest_progress()), 1);

    // the cursor is already past the line, so no second lookup happens
    assert_eq!(ingestor.process_scraped_names().await.unwrap(), 0);
    assert!(store.pending_discoveries(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn transient_failures_stop_the_pass_with_the_cursor_unmoved() {
    let server = MockServer::start().await;
    // three attempts, all failing: the resolver gives up for this run
    Mock::given(method("GET"))
        .and(path("/users/profiles/minecraft/Flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(3)
        .mount(&server)
        .await;
    // recovery for the second run
    Mock::given(method("GET"))
        .and(path("/users/profiles/minecraft/Flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body(uuid_a(), "Flaky")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/profiles/minecraft/Next"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body(uuid_b(), "Next")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let files = scraped_files(&dir, "Flaky\nNext\n");
    let store = memory_store().await;

    let mut ingestor = NameIngestor::new(mojang(&server), store.clone(), files.clone())
        .await
        .unwrap();

    // first pass dies on Flaky; Next is never reached
    assert_eq!(ingestor.process_scraped_names().await.unwrap(), 0);
    assert_eq!(load_cursor(&files.ingest_progress()), 0);
    assert!(store.pending_discoveries(10).await.unwrap().is_empty());

    // second pass resumes exactly where it stopped and finishes the file
    assert_eq!(ingestor.process_scraped_names().await.unwrap(), 2);
    assert_eq!(load_cursor(&files.ingest_progress()), 2);
    assert_eq!(store.pending_discoveries(10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn cached_names_verify_against_the_session_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/session/minecraft/profile/{}",
            uuid_a().simple()
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body(uuid_a(), "Known")))
        .expect(1)
        .mount(&server)
        .await;

    let store = memory_store().await;
    store
        .upsert_player(&PlayerRecord {
            uuid: uuid_a(),
            username: "Known".to_string(),
            discovery_method: "test".to_string(),
            bedwars_level: 0,
            last_login: None,
        })
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let files = scraped_files(&dir, "Known\n");

    let mut ingestor = NameIngestor::new(mojang(&server), store.clone(), files.clone())
        .await
        .unwrap();
    // resolved from the store, but already a known player: nothing queued
    assert_eq!(ingestor.process_scraped_names().await.unwrap(), 0);
    assert_eq!(load_cursor(&files.ingest_progress()), 1);
    assert!(store.pending_discoveries(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn cached_names_pick_up_renames() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/session/minecraft/profile/{}",
            uuid_a().simple()
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body(uuid_a(), "Shiny")))
        .mount(&server)
        .await;

    let store = memory_store().await;
    store
        .upsert_player(&PlayerRecord {
            uuid: uuid_a(),
            username: "Dusty".to_string(),
            discovery_method: "test".to_string(),
            bedwars_level: 0,
            last_login: None,
        })
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let files = scraped_files(&dir, "Dusty\n");

    let mut ingestor = NameIngestor::new(mojang(&server), store.clone(), files.clone())
        .await
        .unwrap();
    ingestor.process_scraped_names().await.unwrap();

    let changes: NameChangeLog = load_json(&files.name_changes()).unwrap().unwrap();
    assert_eq!(changes.0["Dusty"][0].new_name, "Shiny");
}
