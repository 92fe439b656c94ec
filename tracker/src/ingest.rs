use std::collections::HashMap;
use std::time::Duration;

use api::MojangClient;
use database::{retry_with_backoff, PlayerStore};
use uuid::Uuid;

use crate::error::TrackerResult;
use crate::files::{load_cursor, load_json, save_cursor, save_json, DataFiles, NameChangeLog};

/// Provenance tag for identities that arrived through the scraped-names
/// file rather than an API crawl.
pub const SCRAPE_METHOD: &str = "mineflayer_scrape";

/// Turns scraped usernames into queued UUIDs. Works through the
/// scraped-names file line by line behind a persistent cursor, resolving
/// each name against the store first and Mojang second.
pub struct NameIngestor {
    mojang: MojangClient,
    store: PlayerStore,
    files: DataFiles,
    name_changes: NameChangeLog,
    uuid_cache: HashMap<String, Uuid>,
}

impl NameIngestor {
    pub async fn new(
        mojang: MojangClient,
        store: PlayerStore,
        files: DataFiles,
    ) -> TrackerResult<Self> {
        files.ensure_dirs()?;
        let name_changes = load_json(&files.name_changes())?.unwrap_or_default();
        let uuid_cache = store
            .username_uuid_pairs()
            .await?
            .into_iter()
            .collect::<HashMap<_, _>>();
        log::info!("Preloaded {} cached UUID(s) from the store", uuid_cache.len());
        Ok(Self {
            mojang,
            store,
            files,
            name_changes,
            uuid_cache,
        })
    }

    /// One pass over the scraped-names file from the saved cursor. The
    /// cursor only moves past a line once it is enqueued or permanently
    /// unresolvable, so a transient failure ends the pass and the next run
    /// resumes on the exact line that failed. Returns how many identities
    /// were newly queued.
    pub async fn process_scraped_names(&mut self) -> TrackerResult<usize> {
        let scraped = self.files.scraped_names();
        if !scraped.exists() {
            log::info!("No scraped names file at {}", scraped.display());
            return Ok(0);
        }
        let progress = self.files.ingest_progress();
        let start = load_cursor(&progress);
        log::info!("Resuming scraped names from line {}", start + 1);

        let content = std::fs::read_to_string(&scraped)?;
        let mut added = 0;
        for (index, line) in content.lines().enumerate() {
            let number = index as u64 + 1;
            if number <= start {
                continue;
            }
            let name = line.trim();
            if name.is_empty() {
                save_cursor(&progress, number)?;
                continue;
            }
            match self.resolve(name).await {
                Ok(Some(uuid)) => {
                    if self.enqueue(&uuid, name).await {
                        added += 1;
                    }
                    save_cursor(&progress, number)?;
                }
                Ok(None) => {
                    log::info!("{name} does not exist on Mojang, skipping for good");
                    save_cursor(&progress, number)?;
                }
                Err(e) => {
                    log::warn!("Transient failure on {name}: {e}; stopping so the next run retries it");
                    break;
                }
            }
        }
        log::info!("Scraped-names pass done, {added} new player(s) queued");
        Ok(added)
    }

    /// Resolution for one name: the store cache first, Mojang second.
    /// Cache hits are verified against the session server so renames still
    /// get noticed. `Ok(None)` is a definitive "no such player".
    async fn resolve(&mut self, name: &str) -> TrackerResult<Option<Uuid>> {
        if let Some(&uuid) = self.uuid_cache.get(name) {
            match self.mojang.profile(&uuid).await {
                Ok(Some(profile)) if !profile.name.eq_ignore_ascii_case(name) => {
                    log::info!("Name change detected: {name} is now {}", profile.name);
                    if self.name_changes.record(name, &profile.name) {
                        save_json(&self.files.name_changes(), &self.name_changes)?;
                    }
                    self.uuid_cache.remove(name);
                    self.uuid_cache.insert(profile.name, uuid);
                }
                Ok(_) => {}
                Err(e) => log::warn!("Could not verify current name of {name}: {e}"),
            }
            return Ok(Some(uuid));
        }

        match self.mojang.uuid_for_name(name).await? {
            Some(profile) => {
                self.uuid_cache.insert(name.to_string(), profile.id);
                Ok(Some(profile.id))
            }
            None => Ok(None),
        }
    }

    /// Queue insert with bounded busy retries; contention on the shared
    /// database is routine while a discovery crawl runs alongside.
    async fn enqueue(&self, uuid: &Uuid, name: &str) -> bool {
        let raw = uuid.to_string();
        let result = retry_with_backoff(
            || {
                let store = self.store.clone();
                let raw = raw.clone();
                Box::pin(async move { store.enqueue_discovery(&raw, None, SCRAPE_METHOD).await })
            },
            5,
            Duration::from_millis(100),
        )
        .await;
        match result {
            Ok(true) => {
                log::info!("Queued {name} for discovery");
                true
            }
            Ok(false) => {
                log::debug!("{name} already known or queued");
                false
            }
            Err(e) => {
                log::warn!("Could not queue {name}: {e}");
                false
            }
        }
    }
}

/// Appends hand-entered usernames to the scraped-names file for the next
/// ingest pass. Names outside Minecraft's 3-16 alphanumeric-or-underscore
/// shape are rejected. Returns how many were accepted.
pub fn append_manual_names(files: &DataFiles, names: &[String]) -> TrackerResult<usize> {
    files.ensure_dirs()?;
    let mut accepted = Vec::new();
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if valid_username(name) {
            accepted.push(name.to_string());
        } else {
            log::warn!("Rejected invalid username: {name}");
        }
    }
    if accepted.is_empty() {
        return Ok(0);
    }
    let mut content = accepted.join("\n");
    content.push('\n');
    let path = files.scraped_names();
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    file.write_all(content.as_bytes())?;
    Ok(accepted.len())
}

fn valid_username(name: &str) -> bool {
    (3..=16).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_validation_matches_minecraft_rules() {
        assert!(valid_username("Technoblade"));
        assert!(valid_username("x_x"));
        assert!(valid_username("Sixteen_chars_ok"));
        assert!(!valid_username("ab"));
        assert!(!valid_username("seventeen_chars_x"));
        assert!(!valid_username("has space"));
        assert!(!valid_username("tick√"));
    }

    #[test]
    fn manual_names_append_and_filter() {
        let dir = tempfile::tempdir().unwrap();
        let files = DataFiles::new(dir.path());
        let names = vec![
            "GoodName".to_string(),
            "no".to_string(),
            "Another_One".to_string(),
        ];
        let accepted = append_manual_names(&files, &names).unwrap();
        assert_eq!(accepted, 2);
        let content = std::fs::read_to_string(files.scraped_names()).unwrap();
        assert_eq!(content, "GoodName\nAnother_One\n");

        // appending keeps earlier entries
        append_manual_names(&files, &["Third".to_string()]).unwrap();
        let content = std::fs::read_to_string(files.scraped_names()).unwrap();
        assert_eq!(content, "GoodName\nAnother_One\nThird\n");
    }
}
