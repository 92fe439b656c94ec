use std::cmp::Reverse;
use std::collections::HashSet;

use api::RawGame;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use types::GameMode;

/// Games kept per player, newest first. The API itself only exposes a short
/// recent window, so this is history the poller accumulates over time.
pub const MAX_TRACKED_GAMES: usize = 50;

/// One finished Bedwars game. The id glues together start time, raw mode
/// code and map so overlapping API reads collapse to a single entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEntry {
    pub game_id: String,
    pub timestamp: i64,
    pub mode: String,
    pub map: String,
}

impl GameEntry {
    pub fn from_raw(game: &RawGame) -> Self {
        let code = game.mode.as_deref().unwrap_or("UNKNOWN");
        let map = game.map.as_deref().unwrap_or("UNKNOWN");
        Self {
            game_id: format!("{}_{}_{}", game.date, code, map),
            timestamp: game.date,
            mode: GameMode::readable_code(code),
            map: game.map.clone().unwrap_or_else(|| "Unknown Map".to_string()),
        }
    }
}

/// Per-player recent-games file. `api_enabled` mirrors whether the last
/// read returned anything at all, since players can hide the endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecentGamesLog {
    #[serde(default)]
    pub api_enabled: bool,
    #[serde(default)]
    pub recent_games: Vec<GameEntry>,
}

impl RecentGamesLog {
    /// Snapshot of one API read, keeping only Bedwars games.
    pub fn from_api(games: &[RawGame]) -> Self {
        let recent_games = games
            .iter()
            .filter(|g| g.game_type == "BEDWARS")
            .map(GameEntry::from_raw)
            .collect();
        Self {
            api_enabled: !games.is_empty(),
            recent_games,
        }
    }

    /// Folds a fresh read into this log. Unseen games are added, the list
    /// stays newest-first and capped at [`MAX_TRACKED_GAMES`]. Returns how
    /// many games were new.
    pub fn merge(&mut self, fetched: RecentGamesLog) -> usize {
        let known: HashSet<String> = self
            .recent_games
            .iter()
            .map(|g| g.game_id.clone())
            .collect();
        let new_games: Vec<GameEntry> = fetched
            .recent_games
            .into_iter()
            .filter(|g| !known.contains(&g.game_id))
            .collect();

        let added = new_games.len();
        if added > 0 {
            let existing = std::mem::take(&mut self.recent_games);
            self.recent_games = new_games
                .into_iter()
                .chain(existing)
                .sorted_by_key(|g| Reverse(g.timestamp))
                .take(MAX_TRACKED_GAMES)
                .collect();
        }
        self.api_enabled = fetched.api_enabled;
        added
    }
}
