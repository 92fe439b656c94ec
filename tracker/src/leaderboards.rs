use chrono::{DateTime, Utc};
use database::{LeaderboardRow, Metric, PlayerStore};
use serde::{Deserialize, Serialize};
use types::round3;

use crate::error::TrackerResult;
use crate::files::{save_json, DataFiles};

/// Cuts ranking artifacts from the latest snapshot per player, one JSON
/// file per metric under `leaderboards/`.
pub struct LeaderboardGenerator {
    store: PlayerStore,
    files: DataFiles,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardArtifact {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub total_players: usize,
    pub players: Vec<RankedPlayer>,
}

/// One row of a generated leaderboard. Every artifact carries the same
/// column set regardless of its ranking metric, so consumers only need one
/// shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub rank: usize,
    pub username: String,
    pub wins: i64,
    pub losses: i64,
    pub final_kills: i64,
    pub final_deaths: i64,
    pub beds_broken: i64,
    pub beds_lost: i64,
    pub wlr: f64,
    pub fkdr: f64,
    pub bblr: f64,
    pub solos_wins: i64,
    pub doubles_wins: i64,
    pub threes_wins: i64,
    pub fours_wins: i64,
}

impl RankedPlayer {
    fn from_row(rank: usize, row: LeaderboardRow) -> Self {
        Self {
            rank,
            username: row.username,
            wins: row.wins,
            losses: row.losses,
            final_kills: row.final_kills,
            final_deaths: row.final_deaths,
            beds_broken: row.beds_broken,
            beds_lost: row.beds_lost,
            wlr: round3(row.wlr),
            fkdr: round3(row.fkdr),
            bblr: round3(row.bblr),
            solos_wins: row.solos_wins,
            doubles_wins: row.doubles_wins,
            threes_wins: row.threes_wins,
            fours_wins: row.fours_wins,
        }
    }
}

impl LeaderboardGenerator {
    pub fn new(store: PlayerStore, files: DataFiles) -> Self {
        Self { store, files }
    }

    pub async fn generate(&self, metric: Metric) -> TrackerResult<()> {
        let rows = self.store.leaderboard(metric).await?;
        let artifact = LeaderboardArtifact {
            title: metric.title().to_string(),
            generated_at: Utc::now(),
            total_players: rows.len(),
            players: rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| RankedPlayer::from_row(i + 1, row))
                .collect(),
        };
        save_json(&self.files.leaderboard(metric.column()), &artifact)?;
        Ok(())
    }

    pub async fn generate_all(&self) -> TrackerResult<()> {
        log::info!("Generating leaderboards");
        self.files.ensure_dirs()?;
        for metric in Metric::ALL {
            self.generate(metric).await?;
        }
        log::info!("Generated {} leaderboard file(s)", Metric::ALL.len());
        Ok(())
    }
}
