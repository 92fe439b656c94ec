//! Wire shapes for the Hypixel and Mojang APIs.
//!
//! Hypixel stat payloads omit any counter the player has never touched and
//! any field the player hides, so every counter carries a serde default.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use types::{GameMode, ModeStats, StatsSummary};

/// Envelope of the `/player` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub player: Option<PlayerData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerData {
    #[serde(default)]
    pub displayname: Option<String>,
    /// Epoch milliseconds; absent when the player hides their status.
    #[serde(default, rename = "lastLogin")]
    pub last_login: Option<i64>,
    #[serde(default)]
    pub stats: PlayerStats,
}

impl PlayerData {
    pub fn bedwars(&self) -> Option<&BedwarsStats> {
        self.stats.bedwars.as_ref()
    }

    pub fn last_login_time(&self) -> Option<DateTime<Utc>> {
        self.last_login.and_then(DateTime::from_timestamp_millis)
    }
}

/// Per-game sections of a player document. Only Bedwars is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerStats {
    #[serde(default, rename = "Bedwars")]
    pub bedwars: Option<BedwarsStats>,
}

/// Cumulative Bedwars counters as the API reports them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BedwarsStats {
    #[serde(default, rename = "wins_bedwars")]
    pub wins: i64,
    #[serde(default, rename = "losses_bedwars")]
    pub losses: i64,
    #[serde(default, rename = "kills_bedwars")]
    pub kills: i64,
    #[serde(default, rename = "deaths_bedwars")]
    pub deaths: i64,
    #[serde(default, rename = "final_kills_bedwars")]
    pub final_kills: i64,
    #[serde(default, rename = "final_deaths_bedwars")]
    pub final_deaths: i64,
    #[serde(default, rename = "beds_broken_bedwars")]
    pub beds_broken: i64,
    #[serde(default, rename = "beds_lost_bedwars")]
    pub beds_lost: i64,
    #[serde(default)]
    pub coins: i64,
    /// Fractional for some accounts, hence not an integer.
    #[serde(default, rename = "Experience")]
    pub experience: f64,
    #[serde(default, rename = "games_played_bedwars")]
    pub games_played: i64,
    #[serde(default)]
    pub winstreak: Option<i64>,
    #[serde(default, rename = "eight_one_wins_bedwars")]
    pub solos_wins: i64,
    #[serde(default, rename = "eight_one_losses_bedwars")]
    pub solos_losses: i64,
    #[serde(default, rename = "eight_one_winstreak")]
    pub solos_winstreak: Option<i64>,
    #[serde(default, rename = "eight_two_wins_bedwars")]
    pub doubles_wins: i64,
    #[serde(default, rename = "eight_two_losses_bedwars")]
    pub doubles_losses: i64,
    #[serde(default, rename = "eight_two_winstreak")]
    pub doubles_winstreak: Option<i64>,
    #[serde(default, rename = "four_three_wins_bedwars")]
    pub threes_wins: i64,
    #[serde(default, rename = "four_three_losses_bedwars")]
    pub threes_losses: i64,
    #[serde(default, rename = "four_three_winstreak")]
    pub threes_winstreak: Option<i64>,
    #[serde(default, rename = "four_four_wins_bedwars")]
    pub fours_wins: i64,
    #[serde(default, rename = "four_four_losses_bedwars")]
    pub fours_losses: i64,
    #[serde(default, rename = "four_four_winstreak")]
    pub fours_winstreak: Option<i64>,
}

impl BedwarsStats {
    pub fn mode_wins(&self, mode: GameMode) -> i64 {
        match mode {
            GameMode::Solos => self.solos_wins,
            GameMode::Doubles => self.doubles_wins,
            GameMode::Threes => self.threes_wins,
            GameMode::Fours => self.fours_wins,
        }
    }

    pub fn mode_losses(&self, mode: GameMode) -> i64 {
        match mode {
            GameMode::Solos => self.solos_losses,
            GameMode::Doubles => self.doubles_losses,
            GameMode::Threes => self.threes_losses,
            GameMode::Fours => self.fours_losses,
        }
    }

    pub fn mode_winstreak(&self, mode: GameMode) -> Option<i64> {
        match mode {
            GameMode::Solos => self.solos_winstreak,
            GameMode::Doubles => self.doubles_winstreak,
            GameMode::Threes => self.threes_winstreak,
            GameMode::Fours => self.fours_winstreak,
        }
    }

    /// Session-tracker view of these counters: overall plus all four modes.
    pub fn summary(&self) -> StatsSummary {
        let mut summary = StatsSummary::new(self.wins, self.losses, self.winstreak);
        for mode in GameMode::ALL {
            summary.modes.insert(
                mode,
                ModeStats::new(
                    self.mode_wins(mode),
                    self.mode_losses(mode),
                    self.mode_winstreak(mode),
                ),
            );
        }
        summary
    }
}

/// Envelope of the `/recentgames` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentGamesReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub games: Vec<RawGame>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGame {
    /// Game start, epoch milliseconds.
    #[serde(default)]
    pub date: i64,
    #[serde(default, rename = "gameType")]
    pub game_type: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub map: Option<String>,
}

/// Envelope of the `/leaderboards` endpoint, keyed by game type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardsReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub leaderboards: std::collections::HashMap<String, Vec<LeaderboardListing>>,
}

/// One official leaderboard: a title, a period prefix and the leading UUIDs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardListing {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub leaders: Vec<String>,
}

/// Envelope of the `/guild` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub guild: Option<Guild>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Guild {
    #[serde(default)]
    pub members: Vec<GuildMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildMember {
    /// Undashed in guild payloads.
    #[serde(default)]
    pub uuid: String,
}

/// A Mojang profile: the canonical UUID and current username.
#[derive(Debug, Clone, Deserialize)]
pub struct MojangProfile {
    pub id: Uuid,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_counters_default_to_zero() {
        let stats: BedwarsStats = serde_json::from_str("{}").expect("parse empty stats");
        assert_eq!(stats.wins, 0);
        assert_eq!(stats.winstreak, None);
        assert_eq!(stats.experience, 0.0);
    }

    #[test]
    fn summary_covers_every_mode() {
        let stats = BedwarsStats {
            wins: 12,
            losses: 4,
            winstreak: Some(3),
            solos_wins: 5,
            solos_losses: 1,
            fours_wins: 7,
            fours_losses: 3,
            ..Default::default()
        };
        let summary = stats.summary();
        assert_eq!(summary.wins, 12);
        assert_eq!(summary.wlr, 3.0);
        assert_eq!(summary.mode(GameMode::Solos).map(|m| m.wins), Some(5));
        assert_eq!(summary.mode(GameMode::Threes).map(|m| m.wins), Some(0));
        assert_eq!(summary.modes.len(), 4);
    }

    #[test]
    fn profile_accepts_undashed_ids() {
        let profile: MojangProfile =
            serde_json::from_str(r#"{"id": "b876ec32e396476ba1158438d83c67d4", "name": "Techno"}"#)
                .expect("parse profile");
        assert_eq!(
            profile.id,
            Uuid::parse_str("b876ec32-e396-476b-a115-8438d83c67d4").expect("uuid")
        );
    }

    #[test]
    fn last_login_converts_from_millis() {
        let data = PlayerData {
            last_login: Some(1_687_219_200_000),
            ..Default::default()
        };
        let when = data.last_login_time().expect("timestamp");
        assert_eq!(when.timestamp(), 1_687_219_200);
    }
}
