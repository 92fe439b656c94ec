//! Integration tests for the PlayerStore against a real SQLite schema.

use chrono::{Duration, Utc};
use database::{
    create_schema, DatabaseConfig, Metric, PlayerRecord, PlayerStore, StatSnapshot,
};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Row;
use uuid::Uuid;

async fn memory_store() -> PlayerStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to connect");
    create_schema(&pool).await.expect("Failed to create schema");
    PlayerStore::new(pool)
}

fn player(name: &str) -> PlayerRecord {
    PlayerRecord {
        uuid: Uuid::new_v4(),
        username: name.to_string(),
        discovery_method: "leaderboard_BEDWARS_Wins".to_string(),
        bedwars_level: 0,
        last_login: None,
    }
}

/// Store opened through the config gets WAL journaling and the schema.
#[tokio::test]
async fn open_applies_journal_mode_and_schema() {
    let dir = tempfile::tempdir().expect("Failed to create tempdir");
    let config = DatabaseConfig {
        path: dir
            .path()
            .join("bedwars_database.db")
            .to_string_lossy()
            .into_owned(),
        max_connections: 2,
        busy_retries: 3,
        busy_retry_delay: std::time::Duration::from_millis(10),
    };

    let store = PlayerStore::open(&config).await.expect("Failed to open store");

    let journal = sqlx::query("PRAGMA journal_mode")
        .fetch_one(store.pool())
        .await
        .expect("Failed to query pragma");
    let mode: String = journal.get("journal_mode");
    assert_eq!(mode.to_lowercase(), "wal");

    let totals = store.totals().await.expect("Failed to query totals");
    assert_eq!(totals.total_players, 0);
    assert_eq!(totals.total_stat_records, 0);
}

/// record_stats writes the identity row before the snapshot, atomically.
#[tokio::test]
async fn record_stats_persists_player_and_snapshot() {
    let store = memory_store().await;
    let record = player("Purpled");
    let mut snapshot = StatSnapshot::at(Utc::now());
    snapshot.wins = 12;
    snapshot.losses = 3;
    snapshot.final_kills = 40;
    snapshot.experience = 12_000;

    let snapshot_id = store
        .record_stats(&record, &snapshot)
        .await
        .expect("Failed to record stats");
    assert!(snapshot_id > 0);

    let totals = store.totals().await.expect("Failed to query totals");
    assert_eq!(totals.total_players, 1);
    assert_eq!(totals.total_stat_records, 1);
    assert_eq!(totals.updated_today, 1);

    let found = store
        .uuid_for_username("Purpled")
        .await
        .expect("Failed to look up uuid");
    assert_eq!(found, Some(record.uuid));
}

/// Username lookups are case-insensitive, matching how operators type names.
#[tokio::test]
async fn username_lookup_ignores_case() {
    let store = memory_store().await;
    let record = player("Technoblade");
    store.upsert_player(&record).await.expect("Failed to upsert");

    let found = store
        .uuid_for_username("tEcHnObLaDe")
        .await
        .expect("Failed to look up uuid");
    assert_eq!(found, Some(record.uuid));

    let name = store
        .username_for_uuid(&record.uuid)
        .await
        .expect("Failed to look up username");
    assert_eq!(name.as_deref(), Some("Technoblade"));
}

/// Re-upserting a player keeps the original first_seen but refreshes the rest.
#[tokio::test]
async fn upsert_preserves_first_seen() {
    let store = memory_store().await;
    let mut record = player("gamerboy80");
    store.upsert_player(&record).await.expect("Failed to upsert");

    let first: String = sqlx::query("SELECT first_seen FROM players WHERE uuid = ?")
        .bind(record.uuid.to_string())
        .fetch_one(store.pool())
        .await
        .expect("Failed to read first_seen")
        .get("first_seen");

    record.username = "gamerboy81".to_string();
    record.bedwars_level = 500;
    store.upsert_player(&record).await.expect("Failed to upsert again");

    let row = sqlx::query("SELECT first_seen, username, bedwars_level FROM players WHERE uuid = ?")
        .bind(record.uuid.to_string())
        .fetch_one(store.pool())
        .await
        .expect("Failed to read player row");
    let first_after: String = row.get("first_seen");
    let username: String = row.get("username");
    let level: i64 = row.get("bedwars_level");

    assert_eq!(first, first_after);
    assert_eq!(username, "gamerboy81");
    assert_eq!(level, 500);
}

/// The generated ratio columns fall back to the numerator at zero denominator.
#[tokio::test]
async fn ratio_columns_follow_the_flawless_convention() {
    let store = memory_store().await;
    let record = player("Astelic");
    let mut snapshot = StatSnapshot::at(Utc::now());
    snapshot.wins = 10;
    snapshot.losses = 0;
    snapshot.final_kills = 9;
    snapshot.final_deaths = 2;
    snapshot.beds_broken = 7;
    snapshot.beds_lost = 0;
    store
        .record_stats(&record, &snapshot)
        .await
        .expect("Failed to record stats");

    let row = sqlx::query("SELECT wlr, fkdr, bblr FROM bedwars_stats WHERE uuid = ?")
        .bind(record.uuid.to_string())
        .fetch_one(store.pool())
        .await
        .expect("Failed to read ratios");
    let wlr: f64 = row.get("wlr");
    let fkdr: f64 = row.get("fkdr");
    let bblr: f64 = row.get("bblr");

    assert_eq!(wlr, 10.0);
    assert_eq!(fkdr, 4.5);
    assert_eq!(bblr, 7.0);
}

/// Rankings read only the most recent snapshot per player, newest wins first.
#[tokio::test]
async fn leaderboard_ranks_latest_snapshots_by_metric() {
    let store = memory_store().await;
    let now = Utc::now();

    let first = player("LowWins");
    let mut snap = StatSnapshot::at(now);
    snap.wins = 10;
    store.record_stats(&first, &snap).await.expect("Failed to record");

    // second player has an older snapshot that must be ignored
    let second = player("HighWins");
    let mut stale = StatSnapshot::at(now - Duration::minutes(10));
    stale.wins = 1;
    store.record_stats(&second, &stale).await.expect("Failed to record");
    let mut fresh = StatSnapshot::at(now + Duration::seconds(5));
    fresh.wins = 50;
    store.record_stats(&second, &fresh).await.expect("Failed to record");

    let third = player("MidWins");
    let mut snap = StatSnapshot::at(now);
    snap.wins = 30;
    store.record_stats(&third, &snap).await.expect("Failed to record");

    let rows = store
        .leaderboard(Metric::Wins)
        .await
        .expect("Failed to query leaderboard");
    let order: Vec<(String, i64)> = rows.iter().map(|r| (r.username.clone(), r.wins)).collect();
    assert_eq!(
        order,
        vec![
            ("HighWins".to_string(), 50),
            ("MidWins".to_string(), 30),
            ("LowWins".to_string(), 10),
        ]
    );

    let top = store.top_by_wins(2).await.expect("Failed to query top players");
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].username, "HighWins");
}

/// Ratio metrics order by the generated columns.
#[tokio::test]
async fn leaderboard_supports_ratio_metrics() {
    let store = memory_store().await;
    let now = Utc::now();

    let flawless = player("Flawless");
    let mut snap = StatSnapshot::at(now);
    snap.wins = 10;
    snap.losses = 0;
    store.record_stats(&flawless, &snap).await.expect("Failed to record");

    let grinder = player("Grinder");
    let mut snap = StatSnapshot::at(now);
    snap.wins = 30;
    snap.losses = 10;
    store.record_stats(&grinder, &snap).await.expect("Failed to record");

    let rows = store
        .leaderboard(Metric::WinLossRatio)
        .await
        .expect("Failed to query leaderboard");
    assert_eq!(rows[0].username, "Flawless");
    assert_eq!(rows[0].wlr, 10.0);
    assert_eq!(rows[1].username, "Grinder");
    assert_eq!(rows[1].wlr, 3.0);
}

/// Level recomputation reads the newest experience and updates in one pass.
#[tokio::test]
async fn latest_experience_feeds_level_updates() {
    let store = memory_store().await;
    let record = player("Prestige");
    let now = Utc::now();

    let mut early = StatSnapshot::at(now - Duration::hours(1));
    early.experience = 500;
    store.record_stats(&record, &early).await.expect("Failed to record");
    let mut late = StatSnapshot::at(now);
    late.experience = 487_000;
    store.record_stats(&record, &late).await.expect("Failed to record");

    let experience = store
        .latest_experience(&record.uuid)
        .await
        .expect("Failed to read experience");
    assert_eq!(experience, Some(487_000));

    store
        .update_levels(&[(record.uuid, 100)])
        .await
        .expect("Failed to update levels");
    let players = store
        .players_with_levels()
        .await
        .expect("Failed to list players");
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].bedwars_level, 100);
}

/// The inspection helper reports every user table in the schema.
#[tokio::test]
async fn table_row_counts_cover_the_schema() {
    let store = memory_store().await;
    store
        .upsert_player(&player("Solo"))
        .await
        .expect("Failed to upsert");

    let counts = store
        .table_row_counts()
        .await
        .expect("Failed to count tables");
    let names: Vec<&str> = counts.iter().map(|(name, _)| name.as_str()).collect();
    assert!(names.contains(&"players"));
    assert!(names.contains(&"bedwars_stats"));
    assert!(names.contains(&"player_discovery"));
    assert!(names.contains(&"leaderboard_cache"));

    let players_count = counts
        .iter()
        .find(|(name, _)| name == "players")
        .map(|(_, count)| *count);
    assert_eq!(players_count, Some(1));
}

/// Cached leaderboard payloads land in leaderboard_cache as JSON text.
#[tokio::test]
async fn cache_leaderboard_stores_payload() {
    let store = memory_store().await;
    let data = serde_json::json!(["uuid-one", "uuid-two"]);
    store
        .cache_leaderboard("Wins", "BEDWARS", "Overall", &data)
        .await
        .expect("Failed to cache leaderboard");

    let row = sqlx::query("SELECT leaderboard_type, game_type, period, data FROM leaderboard_cache")
        .fetch_one(store.pool())
        .await
        .expect("Failed to read cache");
    let stored: String = row.get("data");
    assert_eq!(row.get::<String, _>("game_type"), "BEDWARS");
    assert_eq!(stored, data.to_string());
}
