use sqlx::SqlitePool;

use crate::error::StoreError;

/// Idempotent schema script shared by every component that opens the store.
/// Ratio columns bake in the convention "numerator / denominator, or the
/// bare numerator when the denominator is zero".
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    uuid TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    first_seen TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    last_updated TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    discovery_method TEXT,
    is_active BOOLEAN DEFAULT TRUE,
    bedwars_level INTEGER DEFAULT 0,
    last_login TIMESTAMP
);

CREATE TABLE IF NOT EXISTS bedwars_stats (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT,
    timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    wins INTEGER DEFAULT 0,
    losses INTEGER DEFAULT 0,
    kills INTEGER DEFAULT 0,
    deaths INTEGER DEFAULT 0,
    final_kills INTEGER DEFAULT 0,
    final_deaths INTEGER DEFAULT 0,
    beds_broken INTEGER DEFAULT 0,
    beds_lost INTEGER DEFAULT 0,
    winstreak INTEGER,
    coins INTEGER DEFAULT 0,
    experience INTEGER DEFAULT 0,
    games_played INTEGER DEFAULT 0,
    solos_wins INTEGER DEFAULT 0,
    solos_losses INTEGER DEFAULT 0,
    solos_winstreak INTEGER,
    doubles_wins INTEGER DEFAULT 0,
    doubles_losses INTEGER DEFAULT 0,
    doubles_winstreak INTEGER,
    threes_wins INTEGER DEFAULT 0,
    threes_losses INTEGER DEFAULT 0,
    threes_winstreak INTEGER,
    fours_wins INTEGER DEFAULT 0,
    fours_losses INTEGER DEFAULT 0,
    fours_winstreak INTEGER,
    wlr REAL GENERATED ALWAYS AS (CASE WHEN losses > 0 THEN CAST(wins AS REAL) / losses ELSE wins END) STORED,
    kdr REAL GENERATED ALWAYS AS (CASE WHEN deaths > 0 THEN CAST(kills AS REAL) / deaths ELSE kills END) STORED,
    fkdr REAL GENERATED ALWAYS AS (CASE WHEN final_deaths > 0 THEN CAST(final_kills AS REAL) / final_deaths ELSE final_kills END) STORED,
    bblr REAL GENERATED ALWAYS AS (CASE WHEN beds_lost > 0 THEN CAST(beds_broken AS REAL) / beds_lost ELSE beds_broken END) STORED,
    FOREIGN KEY (uuid) REFERENCES players (uuid)
);

CREATE TABLE IF NOT EXISTS player_discovery (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    discovered_uuid TEXT,
    source_uuid TEXT,
    discovery_method TEXT,
    discovered_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    processed BOOLEAN DEFAULT FALSE
);

CREATE TABLE IF NOT EXISTS leaderboard_cache (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    leaderboard_type TEXT,
    game_type TEXT,
    period TEXT,
    fetched_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    data TEXT
);

CREATE INDEX IF NOT EXISTS idx_stats_uuid ON bedwars_stats(uuid);
CREATE INDEX IF NOT EXISTS idx_stats_timestamp ON bedwars_stats(timestamp);
CREATE INDEX IF NOT EXISTS idx_stats_wins ON bedwars_stats(wins DESC);
CREATE INDEX IF NOT EXISTS idx_stats_wlr ON bedwars_stats(wlr DESC);
CREATE INDEX IF NOT EXISTS idx_stats_fkdr ON bedwars_stats(fkdr DESC);
CREATE INDEX IF NOT EXISTS idx_discovery_processed ON player_discovery(processed);
CREATE INDEX IF NOT EXISTS idx_players_active ON players(is_active, last_updated);
"#;

pub async fn create_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;
    Ok(())
}
