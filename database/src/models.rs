use serde::{Deserialize, Serialize};
use uuid::Uuid;

use types::GameMode;

/// Identity fields written on every successful stat fetch. `first_seen` and
/// the activity flag are owned by the store itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub uuid: Uuid,
    pub username: String,
    pub discovery_method: String,
    pub bedwars_level: i64,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
}

/// One fetched copy of a player's cumulative counters. Append-only; the
/// win/loss, kill/death, final and bed ratios are generated columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatSnapshot {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub wins: i64,
    pub losses: i64,
    pub kills: i64,
    pub deaths: i64,
    pub final_kills: i64,
    pub final_deaths: i64,
    pub beds_broken: i64,
    pub beds_lost: i64,
    pub winstreak: Option<i64>,
    pub coins: i64,
    pub experience: i64,
    pub games_played: i64,
    pub solos_wins: i64,
    pub solos_losses: i64,
    pub solos_winstreak: Option<i64>,
    pub doubles_wins: i64,
    pub doubles_losses: i64,
    pub doubles_winstreak: Option<i64>,
    pub threes_wins: i64,
    pub threes_losses: i64,
    pub threes_winstreak: Option<i64>,
    pub fours_wins: i64,
    pub fours_losses: i64,
    pub fours_winstreak: Option<i64>,
}

impl StatSnapshot {
    /// Zeroed snapshot taken at `timestamp`, with every winstreak hidden.
    pub fn at(timestamp: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            timestamp,
            wins: 0,
            losses: 0,
            kills: 0,
            deaths: 0,
            final_kills: 0,
            final_deaths: 0,
            beds_broken: 0,
            beds_lost: 0,
            winstreak: None,
            coins: 0,
            experience: 0,
            games_played: 0,
            solos_wins: 0,
            solos_losses: 0,
            solos_winstreak: None,
            doubles_wins: 0,
            doubles_losses: 0,
            doubles_winstreak: None,
            threes_wins: 0,
            threes_losses: 0,
            threes_winstreak: None,
            fours_wins: 0,
            fours_losses: 0,
            fours_winstreak: None,
        }
    }
}

/// Unprocessed discovery queue entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryEntry {
    pub id: i64,
    pub uuid: Uuid,
    pub source_uuid: Option<Uuid>,
    pub method: Option<String>,
}

/// One latest-snapshot row of a ranking query, before ranks are assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardRow {
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

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StoreTotals {
    pub total_players: i64,
    pub total_stat_records: i64,
    pub discovery_queue: i64,
    pub updated_today: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopPlayer {
    pub username: String,
    pub wins: i64,
    pub wlr: f64,
    pub fkdr: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerLevel {
    pub uuid: Uuid,
    pub username: String,
    pub bedwars_level: i64,
}

/// Ranking metrics the leaderboard generator emits, one artifact each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Wins,
    WinLossRatio,
    FinalKills,
    FinalKillDeathRatio,
    BedsBroken,
    BedBreakLossRatio,
    ModeWins(GameMode),
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::Wins,
        Metric::WinLossRatio,
        Metric::FinalKills,
        Metric::FinalKillDeathRatio,
        Metric::BedsBroken,
        Metric::BedBreakLossRatio,
        Metric::ModeWins(GameMode::Solos),
        Metric::ModeWins(GameMode::Doubles),
        Metric::ModeWins(GameMode::Threes),
        Metric::ModeWins(GameMode::Fours),
    ];

    /// Snapshot column the ranking orders by. Also used as the artifact
    /// file stem, e.g. `fkdr_leaderboard.json`.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Wins => "wins",
            Metric::WinLossRatio => "wlr",
            Metric::FinalKills => "final_kills",
            Metric::FinalKillDeathRatio => "fkdr",
            Metric::BedsBroken => "beds_broken",
            Metric::BedBreakLossRatio => "bblr",
            Metric::ModeWins(GameMode::Solos) => "solos_wins",
            Metric::ModeWins(GameMode::Doubles) => "doubles_wins",
            Metric::ModeWins(GameMode::Threes) => "threes_wins",
            Metric::ModeWins(GameMode::Fours) => "fours_wins",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Metric::Wins => "Top 100 Players by Wins",
            Metric::WinLossRatio => "Top 100 Players by W/L Ratio",
            Metric::FinalKills => "Top 100 Players by Final Kills",
            Metric::FinalKillDeathRatio => "Top 100 Players by FKDR",
            Metric::BedsBroken => "Top 100 Players by Beds Broken",
            Metric::BedBreakLossRatio => "Top 100 Players by BB/BL Ratio",
            Metric::ModeWins(GameMode::Solos) => "Top 100 Solo Players",
            Metric::ModeWins(GameMode::Doubles) => "Top 100 Doubles Players",
            Metric::ModeWins(GameMode::Threes) => "Top 100 Threes Players",
            Metric::ModeWins(GameMode::Fours) => "Top 100 Fours Players",
        }
    }
}
