use serde::{Deserialize, Serialize};

/// Bracketed winstreak estimate for one scope, maintained across sessions
/// even while the player hides the field from the API. `api_value` records
/// the last literally-reported value and is left in place when later
/// sessions have to fall back to estimation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WinstreakEstimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_value: Option<i64>,
    pub min_possible: i64,
    pub max_possible: i64,
    pub likely: f64,
}

impl WinstreakEstimate {
    pub fn from_api(value: i64) -> Self {
        Self {
            api_value: Some(value),
            min_possible: value,
            max_possible: value,
            likely: value as f64,
        }
    }

    /// Folds one session's outcome into the estimate. A visible API value
    /// overrides everything. Otherwise a session with losses caps the streak
    /// at the session's wins, while an all-win session extends the bracket.
    pub fn apply_session(&mut self, wins: i64, losses: i64, reported: Option<i64>) {
        if let Some(value) = reported {
            *self = Self::from_api(value);
            return;
        }
        if losses > 0 {
            self.min_possible = 0;
            self.max_possible = wins;
            self.likely = wins as f64 / (losses + 1) as f64;
        } else {
            self.min_possible += wins;
            self.max_possible += wins;
            self.likely += wins as f64;
        }
    }
}
