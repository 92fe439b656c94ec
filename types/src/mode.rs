use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The four tracked Bedwars queue modes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Solos,
    Doubles,
    Threes,
    Fours,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Solos,
        GameMode::Doubles,
        GameMode::Threes,
        GameMode::Fours,
    ];

    /// Key prefix used by the stats API for this mode's counters,
    /// e.g. `eight_one_wins_bedwars`.
    pub fn api_prefix(self) -> &'static str {
        match self {
            GameMode::Solos => "eight_one",
            GameMode::Doubles => "eight_two",
            GameMode::Threes => "four_three",
            GameMode::Fours => "four_four",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GameMode::Solos => "solos",
            GameMode::Doubles => "doubles",
            GameMode::Threes => "threes",
            GameMode::Fours => "fours",
        }
    }

    /// Capitalized label for human-readable output.
    pub fn title(self) -> &'static str {
        match self {
            GameMode::Solos => "Solos",
            GameMode::Doubles => "Doubles",
            GameMode::Threes => "Threes",
            GameMode::Fours => "Fours",
        }
    }

    /// Mode for a raw recent-games code like `BEDWARS_EIGHT_ONE`.
    pub fn from_raw_code(code: &str) -> Option<GameMode> {
        match code {
            "BEDWARS_EIGHT_ONE" => Some(GameMode::Solos),
            "BEDWARS_EIGHT_TWO" => Some(GameMode::Doubles),
            "BEDWARS_FOUR_THREE" => Some(GameMode::Threes),
            "BEDWARS_FOUR_FOUR" => Some(GameMode::Fours),
            _ => None,
        }
    }

    /// Human label for a raw mode code; unrecognized codes pass through.
    pub fn readable_code(code: &str) -> String {
        match GameMode::from_raw_code(code) {
            Some(mode) => mode.label().to_string(),
            None => code.to_string(),
        }
    }
}

impl Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
