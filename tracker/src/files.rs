use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::TrackerResult;

/// Directory layout for the per-player JSON state and generated artifacts,
/// rooted at the configured data directory.
#[derive(Debug, Clone)]
pub struct DataFiles {
    root: PathBuf,
}

impl DataFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn ensure_dirs(&self) -> io::Result<()> {
        for dir in [
            "bedwars_baseline",
            "bedwars_sessions",
            "recent_games",
            "player_names",
            "leaderboards",
        ] {
            fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }

    pub fn baseline(&self, player: &str) -> PathBuf {
        self.root.join("bedwars_baseline").join(format!("{player}.json"))
    }

    pub fn session_log(&self, player: &str) -> PathBuf {
        self.root.join("bedwars_sessions").join(format!("{player}.json"))
    }

    pub fn recent_games(&self, player: &str) -> PathBuf {
        self.root.join("recent_games").join(format!("{player}.json"))
    }

    pub fn cooldowns(&self) -> PathBuf {
        self.root.join("player_cooldowns.json")
    }

    pub fn name_changes(&self) -> PathBuf {
        self.root.join("player_names").join("name_changes.json")
    }

    pub fn scraped_names(&self) -> PathBuf {
        self.root.join("player_names").join("scraped_names_to_process.txt")
    }

    pub fn ingest_progress(&self) -> PathBuf {
        self.root.join("player_names").join("ingestor_progress.txt")
    }

    pub fn leaderboard(&self, column: &str) -> PathBuf {
        self.root.join("leaderboards").join(format!("{column}_leaderboard.json"))
    }

    pub fn exported_names(&self) -> PathBuf {
        self.root.join("all_player_names.txt")
    }
}

/// Reads a JSON state file. A missing or empty file is simply absent; a
/// malformed one is an error the caller logs and skips past.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> TrackerResult<Option<T>> {
    match fs::read_to_string(path) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Pretty-printed so the files stay hand-inspectable.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> TrackerResult<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Line cursor into the scraped-names file. Missing or unreadable means
/// start from the top.
pub fn load_cursor(path: &Path) -> u64 {
    match fs::read_to_string(path) {
        Ok(raw) => match raw.trim().parse() {
            Ok(line) => line,
            Err(_) => {
                log::warn!("Unreadable cursor in {}, starting from line 1", path.display());
                0
            }
        },
        Err(_) => 0,
    }
}

pub fn save_cursor(path: &Path, line: u64) -> io::Result<()> {
    fs::write(path, line.to_string())
}

/// Cooldown record for a player whose API visibility was just confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownEntry {
    pub last_check: DateTime<Utc>,
    pub api_on: bool,
}

pub type CooldownMap = HashMap<String, CooldownEntry>;

/// One observed rename, stored under the name the change was noticed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameChangeRecord {
    pub new_name: String,
    pub date: DateTime<Utc>,
}

/// On-disk rename history. The same rename can be noticed by several
/// components, so recording is idempotent per (old, new) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameChangeLog(pub HashMap<String, Vec<NameChangeRecord>>);

impl NameChangeLog {
    /// Returns true when the rename was new and the log should be saved.
    pub fn record(&mut self, old_name: &str, new_name: &str) -> bool {
        let records = self.0.entry(old_name.to_string()).or_default();
        if records.iter().any(|r| r.new_name == new_name) {
            return false;
        }
        records.push(NameChangeRecord {
            new_name: new_name.to_string(),
            date: Utc::now(),
        });
        true
    }
}
