use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mode::GameMode;
use crate::stats::{ratio, round3, StatsSummary};
use crate::winstreak::WinstreakEstimate;

/// Win/loss delta for one scope of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeDiff {
    pub wins: i64,
    pub losses: i64,
    #[serde(rename = "WLR")]
    pub wlr: f64,
}

impl ScopeDiff {
    pub fn new(wins: i64, losses: i64) -> Self {
        Self {
            wins,
            losses,
            wlr: round3(ratio(wins, losses)),
        }
    }

    pub fn games(&self) -> i64 {
        self.wins + self.losses
    }

    pub fn is_empty(&self) -> bool {
        self.wins == 0 && self.losses == 0
    }
}

/// Delta between a stored baseline and freshly fetched stats.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDiff {
    pub overall: ScopeDiff,
    pub modes: BTreeMap<GameMode, ScopeDiff>,
}

impl SessionDiff {
    /// Subtracts `baseline` from `current`, scope by scope. Modes missing
    /// from the baseline count from zero; modes where nothing moved are
    /// dropped from the breakdown.
    pub fn between(baseline: &StatsSummary, current: &StatsSummary) -> Self {
        let overall = ScopeDiff::new(
            current.wins - baseline.wins,
            current.losses - baseline.losses,
        );
        let mut modes = BTreeMap::new();
        for (mode, stats) in &current.modes {
            let (base_wins, base_losses) = match baseline.modes.get(mode) {
                Some(base) => (base.wins, base.losses),
                None => (0, 0),
            };
            let diff = ScopeDiff::new(stats.wins - base_wins, stats.losses - base_losses);
            if !diff.is_empty() {
                modes.insert(*mode, diff);
            }
        }
        Self { overall, modes }
    }

    /// True when overall wins and losses are both unchanged, which the
    /// tracker treats as "no games played" rather than an error.
    pub fn is_empty(&self) -> bool {
        self.overall.is_empty()
    }
}

/// One recorded session: the overall delta plus the modes played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub session: u32,
    pub overall: ScopeDiff,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modes: BTreeMap<GameMode, ScopeDiff>,
}

/// Per-player session history: numbered deltas, winstreak estimates keyed
/// by scope name, and a regenerated human-readable summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionLog {
    #[serde(default)]
    pub winstreak: BTreeMap<String, WinstreakEstimate>,
    #[serde(default)]
    pub sessions: Vec<SessionEntry>,
    #[serde(default)]
    pub summary: Vec<String>,
}

/// Scope key for the aggregate estimate in [`SessionLog::winstreak`].
pub const OVERALL_SCOPE: &str = "overall";

impl SessionLog {
    /// Session numbers run densely from 1.
    pub fn next_session_number(&self) -> u32 {
        self.sessions.len() as u32 + 1
    }

    /// Appends an entry for `diff` and regenerates the summary. Returns the
    /// number assigned to the new session.
    pub fn record(&mut self, diff: &SessionDiff) -> u32 {
        let number = self.next_session_number();
        self.sessions.push(SessionEntry {
            session: number,
            overall: diff.overall.clone(),
            modes: diff.modes.clone(),
        });
        self.rebuild_summary();
        number
    }

    /// One line per session, listing each mode played. The overall scope
    /// gets no entry of its own.
    pub fn rebuild_summary(&mut self) {
        self.summary.clear();
        for entry in &self.sessions {
            let mut parts = vec![format!("Session {}:", entry.session)];
            for (mode, scope) in &entry.modes {
                parts.push(format!("{} W/L: {}/{}", mode.title(), scope.wins, scope.losses));
            }
            self.summary.push(parts.join(" "));
        }
    }

    /// Folds a session into the winstreak estimates, using the literal API
    /// values from `current` where the player exposes them.
    pub fn update_winstreaks(&mut self, diff: &SessionDiff, current: &StatsSummary) {
        self.winstreak
            .entry(OVERALL_SCOPE.to_string())
            .or_default()
            .apply_session(diff.overall.wins, diff.overall.losses, current.winstreak);
        for (mode, scope) in &diff.modes {
            let reported = current.mode(*mode).and_then(|stats| stats.winstreak);
            self.winstreak
                .entry(mode.label().to_string())
                .or_default()
                .apply_session(scope.wins, scope.losses, reported);
        }
    }
}
