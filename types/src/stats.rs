use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mode::GameMode;

/// Ratio convention used everywhere in this workspace: the plain quotient
/// when the denominator is positive, otherwise the numerator itself. A
/// flawless 10-0 record reads as 10.0 rather than dividing by zero.
pub fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        numerator as f64
    }
}

/// Rounds to three decimals for file and artifact output.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeStats {
    pub wins: i64,
    pub losses: i64,
    #[serde(rename = "WLR")]
    pub wlr: f64,
    pub winstreak: Option<i64>,
}

impl ModeStats {
    pub fn new(wins: i64, losses: i64, winstreak: Option<i64>) -> Self {
        Self {
            wins,
            losses,
            wlr: round3(ratio(wins, losses)),
            winstreak,
        }
    }
}

/// Aggregate plus per-mode win/loss counters, the shape persisted as a
/// session baseline. `winstreak` is None when the player hides the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub wins: i64,
    pub losses: i64,
    #[serde(rename = "WLR")]
    pub wlr: f64,
    pub winstreak: Option<i64>,
    pub modes: BTreeMap<GameMode, ModeStats>,
}

impl StatsSummary {
    pub fn new(wins: i64, losses: i64, winstreak: Option<i64>) -> Self {
        Self {
            wins,
            losses,
            wlr: round3(ratio(wins, losses)),
            winstreak,
            modes: BTreeMap::new(),
        }
    }

    pub fn mode(&self, mode: GameMode) -> Option<&ModeStats> {
        self.modes.get(&mode)
    }
}
