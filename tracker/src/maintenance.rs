use std::path::Path;

use database::PlayerStore;
use regex::Regex;
use types::level_for_experience;

use crate::error::TrackerResult;

/// Recomputes every player's Bedwars level from their newest experience
/// figure and writes back only the rows that changed, in one transaction.
/// Exists because the level formula was corrected after launch and old rows
/// still carry values from the broken one.
pub async fn recompute_levels(store: &PlayerStore) -> TrackerResult<usize> {
    let players = store.players_with_levels().await?;
    log::info!("Checking levels for {} player(s)", players.len());

    let mut updates = Vec::new();
    for player in &players {
        let Some(experience) = store.latest_experience(&player.uuid).await? else {
            log::debug!("{}: no snapshots, skipping", player.username);
            continue;
        };
        let level = level_for_experience(experience.max(0) as u64) as i64;
        if level != player.bedwars_level {
            log::info!(
                "{}: level {} -> {} (XP: {experience})",
                player.username,
                player.bedwars_level,
                level
            );
            updates.push((player.uuid, level));
        }
    }

    if updates.is_empty() {
        log::info!("All player levels are already correct");
        return Ok(0);
    }
    store.update_levels(&updates).await?;
    log::info!("Updated {} of {} level(s)", updates.len(), players.len());
    Ok(updates.len())
}

/// Dumps every stored username to `path`, one per line.
pub async fn export_usernames(store: &PlayerStore, path: &Path) -> TrackerResult<usize> {
    let names = store.all_usernames().await?;
    let mut out = String::with_capacity(names.len() * 12);
    for name in &names {
        out.push_str(name);
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(names.len())
}

/// Result of scanning a scraped-names file for lobby-NPC artifacts.
#[derive(Debug)]
pub struct NpcScan {
    pub total: usize,
    pub suspicious: Vec<String>,
}

impl NpcScan {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.suspicious.len() as f64 / self.total as f64 * 100.0
        }
    }
}

/// Flags names that look machine-generated: exactly ten lowercase
/// alphanumerics, the shape lobby NPCs use. Scrapers pick these up along
/// with real players.
pub fn scan_npc_names(path: &Path) -> TrackerResult<NpcScan> {
    let npc_shape = Regex::new(r"^[a-z0-9]{10}$").expect("Valid NPC name regex");
    let content = std::fs::read_to_string(path)?;
    let mut total = 0;
    let mut suspicious = Vec::new();
    for line in content.lines() {
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        total += 1;
        if npc_shape.is_match(name) {
            suspicious.push(name.to_string());
        }
    }
    Ok(NpcScan { total, suspicious })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npc_scan_flags_ten_char_lowercase_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.txt");
        std::fs::write(
            &path,
            "Technoblade\ngamer40932\n\nShort\nq8zr2m1vx0\nTenLetters\n",
        )
        .unwrap();

        let scan = scan_npc_names(&path).unwrap();
        assert_eq!(scan.total, 5);
        assert_eq!(scan.suspicious, vec!["gamer40932", "q8zr2m1vx0"]);
        assert!((scan.percentage() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn npc_scan_of_empty_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.txt");
        std::fs::write(&path, "\n\n").unwrap();
        let scan = scan_npc_names(&path).unwrap();
        assert_eq!(scan.total, 0);
        assert_eq!(scan.percentage(), 0.0);
    }
}
