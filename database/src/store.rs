use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::models::{
    DiscoveryEntry, LeaderboardRow, Metric, PlayerLevel, PlayerRecord, StatSnapshot, StoreTotals,
    TopPlayer,
};
use crate::schema::create_schema;

/// Shared SQLite store behind every component process.
#[derive(Clone)]
pub struct PlayerStore {
    pool: SqlitePool,
}

impl PlayerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the store and ensures the schema exists.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = config
            .create_pool()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        create_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn upsert_player(&self, player: &PlayerRecord) -> Result<(), StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        upsert_player_on(&mut conn, player, Utc::now()).await
    }

    /// Persists one fetch atomically: the identity row first, then the
    /// append-only snapshot. Returns the snapshot's rowid.
    pub async fn record_stats(
        &self,
        player: &PlayerRecord,
        snapshot: &StatSnapshot,
    ) -> Result<i64, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        upsert_player_on(&mut tx, player, snapshot.timestamp).await?;

        let result = sqlx::query(
            "INSERT INTO bedwars_stats \
             (uuid, timestamp, wins, losses, kills, deaths, final_kills, final_deaths, \
              beds_broken, beds_lost, winstreak, coins, experience, games_played, \
              solos_wins, solos_losses, solos_winstreak, \
              doubles_wins, doubles_losses, doubles_winstreak, \
              threes_wins, threes_losses, threes_winstreak, \
              fours_wins, fours_losses, fours_winstreak) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(player.uuid.to_string())
        .bind(snapshot.timestamp)
        .bind(snapshot.wins)
        .bind(snapshot.losses)
        .bind(snapshot.kills)
        .bind(snapshot.deaths)
        .bind(snapshot.final_kills)
        .bind(snapshot.final_deaths)
        .bind(snapshot.beds_broken)
        .bind(snapshot.beds_lost)
        .bind(snapshot.winstreak)
        .bind(snapshot.coins)
        .bind(snapshot.experience)
        .bind(snapshot.games_played)
        .bind(snapshot.solos_wins)
        .bind(snapshot.solos_losses)
        .bind(snapshot.solos_winstreak)
        .bind(snapshot.doubles_wins)
        .bind(snapshot.doubles_losses)
        .bind(snapshot.doubles_winstreak)
        .bind(snapshot.threes_wins)
        .bind(snapshot.threes_losses)
        .bind(snapshot.threes_winstreak)
        .bind(snapshot.fours_wins)
        .bind(snapshot.fours_losses)
        .bind(snapshot.fours_winstreak)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;
        Ok(result.last_insert_rowid())
    }

    pub async fn uuid_for_username(&self, username: &str) -> Result<Option<Uuid>, StoreError> {
        let row = sqlx::query("SELECT uuid FROM players WHERE username = ? COLLATE NOCASE")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(match row {
            Some(r) => {
                let uuid: String = r.get("uuid");
                Some(Uuid::parse_str(&uuid)?)
            }
            None => None,
        })
    }

    pub async fn username_for_uuid(&self, uuid: &Uuid) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT username FROM players WHERE uuid = ?")
            .bind(uuid.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(row.map(|r| r.get("username")))
    }

    pub async fn all_usernames(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT username FROM players")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(rows.iter().map(|r| r.get("username")).collect())
    }

    pub async fn username_uuid_pairs(&self) -> Result<Vec<(String, Uuid)>, StoreError> {
        let rows = sqlx::query("SELECT username, uuid FROM players")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut pairs = Vec::with_capacity(rows.len());
        for row in rows {
            let uuid: String = row.get("uuid");
            pairs.push((row.get("username"), Uuid::parse_str(&uuid)?));
        }
        Ok(pairs)
    }

    /// Queues an identity for its first stat fetch unless it is already a
    /// known player or already waiting. Accepts either UUID spelling and
    /// checks both, since upstream sources mix them.
    pub async fn enqueue_discovery(
        &self,
        raw_uuid: &str,
        source: Option<Uuid>,
        method: &str,
    ) -> Result<bool, StoreError> {
        let formatted = Uuid::parse_str(raw_uuid)?.hyphenated().to_string();

        let known = sqlx::query("SELECT 1 FROM players WHERE uuid = ? OR uuid = ?")
            .bind(raw_uuid)
            .bind(&formatted)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        if known.is_some() {
            return Ok(false);
        }

        let queued = sqlx::query(
            "SELECT 1 FROM player_discovery \
             WHERE (discovered_uuid = ? OR discovered_uuid = ?) AND processed = FALSE",
        )
        .bind(raw_uuid)
        .bind(&formatted)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;
        if queued.is_some() {
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO player_discovery (discovered_uuid, source_uuid, discovery_method, discovered_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&formatted)
        .bind(source.map(|u| u.to_string()))
        .bind(method)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(true)
    }

    pub async fn pending_discoveries(&self, limit: i64) -> Result<Vec<DiscoveryEntry>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, discovered_uuid, source_uuid, discovery_method FROM player_discovery \
             WHERE processed = FALSE ORDER BY discovered_at LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let uuid: String = row.get("discovered_uuid");
            let source: Option<String> = row.get("source_uuid");
            entries.push(DiscoveryEntry {
                id: row.get("id"),
                uuid: Uuid::parse_str(&uuid)?,
                source_uuid: source.as_deref().map(Uuid::parse_str).transpose()?,
                method: row.get("discovery_method"),
            });
        }
        Ok(entries)
    }

    /// Consumption marks an entry processed exactly once, before the fetch
    /// is attempted, so a failed fetch is never re-selected.
    pub async fn mark_discovery_processed(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("UPDATE player_discovery SET processed = TRUE WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    pub async fn cache_leaderboard(
        &self,
        leaderboard_type: &str,
        game_type: &str,
        period: &str,
        data: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(data)?;
        sqlx::query(
            "INSERT INTO leaderboard_cache (leaderboard_type, game_type, period, fetched_at, data) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(leaderboard_type)
        .bind(game_type)
        .bind(period)
        .bind(Utc::now())
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    /// Top 100 by `metric` over each player's most recent snapshot only.
    pub async fn leaderboard(&self, metric: Metric) -> Result<Vec<LeaderboardRow>, StoreError> {
        let sql = format!(
            "SELECT p.username, s.wins, s.losses, s.final_kills, s.final_deaths, \
             s.beds_broken, s.beds_lost, s.wlr, s.fkdr, s.bblr, \
             s.solos_wins, s.doubles_wins, s.threes_wins, s.fours_wins \
             FROM bedwars_stats s \
             JOIN players p ON s.uuid = p.uuid \
             WHERE s.timestamp = (SELECT MAX(timestamp) FROM bedwars_stats s2 WHERE s2.uuid = s.uuid) \
             ORDER BY s.{} DESC \
             LIMIT 100",
            metric.column()
        );

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| LeaderboardRow {
                username: row.get("username"),
                wins: row.get("wins"),
                losses: row.get("losses"),
                final_kills: row.get("final_kills"),
                final_deaths: row.get("final_deaths"),
                beds_broken: row.get("beds_broken"),
                beds_lost: row.get("beds_lost"),
                wlr: row.get("wlr"),
                fkdr: row.get("fkdr"),
                bblr: row.get("bblr"),
                solos_wins: row.get("solos_wins"),
                doubles_wins: row.get("doubles_wins"),
                threes_wins: row.get("threes_wins"),
                fours_wins: row.get("fours_wins"),
            })
            .collect())
    }

    pub async fn totals(&self) -> Result<StoreTotals, StoreError> {
        let total_players = self
            .count("SELECT COUNT(*) AS count FROM players WHERE is_active = TRUE")
            .await?;
        let total_stat_records = self.count("SELECT COUNT(*) AS count FROM bedwars_stats").await?;
        let discovery_queue = self
            .count("SELECT COUNT(*) AS count FROM player_discovery WHERE processed = FALSE")
            .await?;

        let cutoff = Utc::now() - chrono::Duration::days(1);
        let row = sqlx::query("SELECT COUNT(*) AS count FROM players WHERE last_updated > ?")
            .bind(cutoff)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(StoreTotals {
            total_players,
            total_stat_records,
            discovery_queue,
            updated_today: row.get("count"),
        })
    }

    pub async fn top_by_wins(&self, limit: i64) -> Result<Vec<TopPlayer>, StoreError> {
        let rows = sqlx::query(
            "SELECT p.username, s.wins, s.wlr, s.fkdr \
             FROM bedwars_stats s \
             JOIN players p ON s.uuid = p.uuid \
             WHERE s.timestamp = (SELECT MAX(timestamp) FROM bedwars_stats s2 WHERE s2.uuid = s.uuid) \
             ORDER BY s.wins DESC \
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| TopPlayer {
                username: row.get("username"),
                wins: row.get("wins"),
                wlr: row.get("wlr"),
                fkdr: row.get("fkdr"),
            })
            .collect())
    }

    pub async fn discovery_method_counts(&self) -> Result<Vec<(Option<String>, i64)>, StoreError> {
        let rows = sqlx::query(
            "SELECT discovery_method, COUNT(*) AS count FROM players \
             GROUP BY discovery_method ORDER BY COUNT(*) DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(rows
            .iter()
            .map(|row| (row.get("discovery_method"), row.get("count")))
            .collect())
    }

    pub async fn players_with_levels(&self) -> Result<Vec<PlayerLevel>, StoreError> {
        let rows = sqlx::query("SELECT uuid, username, bedwars_level FROM players")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut players = Vec::with_capacity(rows.len());
        for row in rows {
            let uuid: String = row.get("uuid");
            players.push(PlayerLevel {
                uuid: Uuid::parse_str(&uuid)?,
                username: row.get("username"),
                bedwars_level: row.get("bedwars_level"),
            });
        }
        Ok(players)
    }

    pub async fn latest_experience(&self, uuid: &Uuid) -> Result<Option<i64>, StoreError> {
        let row = sqlx::query(
            "SELECT experience FROM bedwars_stats WHERE uuid = ? ORDER BY timestamp DESC LIMIT 1",
        )
        .bind(uuid.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(row.map(|r| r.get("experience")))
    }

    /// Applies recomputed levels in a single transaction.
    pub async fn update_levels(&self, updates: &[(Uuid, i64)]) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        for (uuid, level) in updates {
            sqlx::query("UPDATE players SET bedwars_level = ? WHERE uuid = ?")
                .bind(*level)
                .bind(uuid.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Query(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;
        Ok(())
    }

    /// Row counts for every user table, for the inspection tool.
    pub async fn table_row_counts(&self) -> Result<Vec<(String, i64)>, StoreError> {
        let tables = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut counts = Vec::with_capacity(tables.len());
        for table in tables {
            let name: String = table.get("name");
            let row = sqlx::query(&format!("SELECT COUNT(*) AS count FROM \"{}\"", name))
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StoreError::Query(e.to_string()))?;
            counts.push((name, row.get("count")));
        }
        Ok(counts)
    }

    async fn count(&self, sql: &str) -> Result<i64, StoreError> {
        let row = sqlx::query(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(row.get("count"))
    }
}

async fn upsert_player_on(
    conn: &mut SqliteConnection,
    player: &PlayerRecord,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO players (uuid, username, first_seen, last_updated, discovery_method, bedwars_level, last_login) \
         VALUES (?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(uuid) DO UPDATE SET \
             username = excluded.username, \
             last_updated = excluded.last_updated, \
             discovery_method = excluded.discovery_method, \
             bedwars_level = excluded.bedwars_level, \
             last_login = excluded.last_login",
    )
    .bind(player.uuid.to_string())
    .bind(&player.username)
    .bind(now)
    .bind(now)
    .bind(&player.discovery_method)
    .bind(player.bedwars_level)
    .bind(player.last_login)
    .execute(conn)
    .await
    .map_err(|e| StoreError::Query(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_store() -> PlayerStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to connect");
        create_schema(&pool).await.expect("Failed to create schema");
        PlayerStore::new(pool)
    }

    #[tokio::test]
    async fn enqueue_deduplicates_both_uuid_spellings() {
        let store = setup_store().await;
        let dashed = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let compact = "3fa85f6457174562b3fc2c963f66afa6";

        assert!(store.enqueue_discovery(dashed, None, "guild").await.unwrap());
        assert!(!store.enqueue_discovery(dashed, None, "guild").await.unwrap());
        assert!(!store.enqueue_discovery(compact, None, "guild").await.unwrap());
    }

    #[tokio::test]
    async fn known_players_are_not_requeued() {
        let store = setup_store().await;
        let uuid = Uuid::new_v4();
        let player = PlayerRecord {
            uuid,
            username: "Technoblade".to_string(),
            discovery_method: "guild".to_string(),
            bedwars_level: 0,
            last_login: None,
        };
        store.upsert_player(&player).await.unwrap();

        assert!(!store
            .enqueue_discovery(&uuid.to_string(), None, "guild")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn consumed_entries_are_never_reselected() {
        let store = setup_store().await;
        let uuid = Uuid::new_v4().to_string();
        store.enqueue_discovery(&uuid, None, "leaderboard").await.unwrap();

        let pending = store.pending_discoveries(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        store.mark_discovery_processed(pending[0].id).await.unwrap();

        // no player row was written, as if the stat fetch failed
        assert!(store.pending_discoveries(10).await.unwrap().is_empty());
    }
}
