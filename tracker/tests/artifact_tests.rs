use chrono::Utc;
use database::{create_schema, Metric, PlayerRecord, PlayerStore, StatSnapshot};
use sqlx::sqlite::SqlitePoolOptions;
use tracker::files::load_json;
use tracker::leaderboards::{LeaderboardArtifact, LeaderboardGenerator};
use tracker::maintenance::{export_usernames, recompute_levels};
use tracker::DataFiles;
use uuid::Uuid;

async fn memory_store() -> PlayerStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory pool");
    create_schema(&pool).await.expect("Failed to create schema");
    PlayerStore::new(pool)
}

async fn seed_player(store: &PlayerStore, name: &str, wins: i64, losses: i64, final_kills: i64) {
    let uuid = Uuid::new_v4();
    let record = PlayerRecord {
        uuid,
        username: name.to_string(),
        discovery_method: "test".to_string(),
        bedwars_level: 1,
        last_login: None,
    };
    let mut snapshot = StatSnapshot::at(Utc::now());
    snapshot.wins = wins;
    snapshot.losses = losses;
    snapshot.final_kills = final_kills;
    snapshot.final_deaths = 10;
    snapshot.beds_broken = wins * 2;
    snapshot.beds_lost = losses;
    snapshot.solos_wins = wins / 2;
    store.record_stats(&record, &snapshot).await.unwrap();
}

#[tokio::test]
async fn artifacts_cover_every_metric() {
    let store = memory_store().await;
    seed_player(&store, "Alpha", 300, 30, 900).await;

    let dir = tempfile::tempdir().unwrap();
    let files = DataFiles::new(dir.path());
    LeaderboardGenerator::new(store, files.clone())
        .generate_all()
        .await
        .unwrap();

    for metric in Metric::ALL {
        let path = files.leaderboard(metric.column());
        assert!(path.exists(), "missing artifact for {}", metric.column());
        let artifact: LeaderboardArtifact = load_json(&path).unwrap().unwrap();
        assert_eq!(artifact.title, metric.title());
        assert_eq!(artifact.total_players, 1);
    }
}

#[tokio::test]
async fn rankings_order_and_round() {
    let store = memory_store().await;
    seed_player(&store, "Second", 200, 60, 100).await;
    seed_player(&store, "First", 500, 3, 800).await;
    seed_player(&store, "Third", 100, 90, 50).await;

    let dir = tempfile::tempdir().unwrap();
    let files = DataFiles::new(dir.path());
    LeaderboardGenerator::new(store, files.clone())
        .generate_all()
        .await
        .unwrap();

    let wins: LeaderboardArtifact = load_json(&files.leaderboard("wins")).unwrap().unwrap();
    let names: Vec<&str> = wins.players.iter().map(|p| p.username.as_str()).collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
    assert_eq!(wins.players[0].rank, 1);
    assert_eq!(wins.players[2].rank, 3);

    // 200 wins / 60 losses rounds to three decimals
    assert_eq!(wins.players[1].wlr, 3.333);

    let wlr: LeaderboardArtifact = load_json(&files.leaderboard("wlr")).unwrap().unwrap();
    assert_eq!(wlr.players[0].username, "First");
}

#[tokio::test]
async fn only_the_latest_snapshot_ranks() {
    let store = memory_store().await;
    let uuid = Uuid::new_v4();
    let record = PlayerRecord {
        uuid,
        username: "Improver".to_string(),
        discovery_method: "test".to_string(),
        bedwars_level: 1,
        last_login: None,
    };
    let mut old = StatSnapshot::at(Utc::now() - chrono::Duration::hours(2));
    old.wins = 10;
    store.record_stats(&record, &old).await.unwrap();
    let mut new = StatSnapshot::at(Utc::now());
    new.wins = 45;
    store.record_stats(&record, &new).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let files = DataFiles::new(dir.path());
    LeaderboardGenerator::new(store, files.clone())
        .generate_all()
        .await
        .unwrap();

    let wins: LeaderboardArtifact = load_json(&files.leaderboard("wins")).unwrap().unwrap();
    assert_eq!(wins.total_players, 1);
    assert_eq!(wins.players[0].wins, 45);
}

#[tokio::test]
async fn stale_levels_are_recomputed_from_experience() {
    let store = memory_store().await;
    let uuid = Uuid::new_v4();
    let record = PlayerRecord {
        uuid,
        username: "Leveler".to_string(),
        discovery_method: "test".to_string(),
        // wrong on purpose, as if written by the old formula
        bedwars_level: 3,
        last_login: None,
    };
    let mut snapshot = StatSnapshot::at(Utc::now());
    snapshot.experience = 974_000; // exactly two prestiges
    store.record_stats(&record, &snapshot).await.unwrap();

    let updated = recompute_levels(&store).await.unwrap();
    assert_eq!(updated, 1);

    let players = store.players_with_levels().await.unwrap();
    assert_eq!(players[0].bedwars_level, 200);

    // a second run finds nothing to do
    assert_eq!(recompute_levels(&store).await.unwrap(), 0);
}

#[tokio::test]
async fn players_without_snapshots_keep_their_level() {
    let store = memory_store().await;
    store
        .upsert_player(&PlayerRecord {
            uuid: Uuid::new_v4(),
            username: "NoStats".to_string(),
            discovery_method: "test".to_string(),
            bedwars_level: 7,
            last_login: None,
        })
        .await
        .unwrap();

    assert_eq!(recompute_levels(&store).await.unwrap(), 0);
    assert_eq!(store.players_with_levels().await.unwrap()[0].bedwars_level, 7);
}

#[tokio::test]
async fn exported_names_are_one_per_line() {
    let store = memory_store().await;
    seed_player(&store, "Alpha", 10, 1, 5).await;
    seed_player(&store, "Beta", 20, 2, 10).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all_player_names.txt");
    let exported = export_usernames(&store, &path).await.unwrap();
    assert_eq!(exported, 2);

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines: Vec<&str> = content.lines().collect();
    lines.sort_unstable();
    assert_eq!(lines, vec!["Alpha", "Beta"]);
}
