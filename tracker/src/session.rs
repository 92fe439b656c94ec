use std::time::Duration;

use api::{HypixelClient, MojangClient, PlayerData};
use chrono::Utc;
use database::PlayerStore;
use types::{SessionDiff, SessionLog, StatsSummary};
use uuid::Uuid;

use crate::error::TrackerResult;
use crate::files::{load_json, save_json, CooldownEntry, CooldownMap, DataFiles, NameChangeLog};
use crate::recent_games::RecentGamesLog;

/// Pause between polling cycles.
pub const SLEEP_TIME: Duration = Duration::from_secs(60);

/// How long a player confirmed to have the API on sits out of the rotation.
/// Their session is already captured, so immediate re-checks only burn quota.
pub const PLAYER_COOLDOWN_MINUTES: i64 = 30;

/// Polls tracked players for session deltas, renames and recent games,
/// writing per-player JSON state under the data directory.
pub struct SessionTracker {
    client: HypixelClient,
    files: DataFiles,
    cooldowns: CooldownMap,
    name_changes: NameChangeLog,
}

impl SessionTracker {
    pub fn new(client: HypixelClient, files: DataFiles) -> TrackerResult<Self> {
        files.ensure_dirs()?;
        let cooldowns = load_json(&files.cooldowns())?.unwrap_or_default();
        let name_changes = load_json(&files.name_changes())?.unwrap_or_default();
        Ok(Self {
            client,
            files,
            cooldowns,
            name_changes,
        })
    }

    /// The roster to poll: explicit names when given, otherwise every player
    /// in the store. Names the store does not know yet go through Mojang.
    pub async fn build_roster(
        store: &PlayerStore,
        mojang: &MojangClient,
        manual: &[String],
    ) -> TrackerResult<Vec<(String, Uuid)>> {
        if manual.is_empty() {
            return Ok(store.username_uuid_pairs().await?);
        }
        let mut roster = Vec::with_capacity(manual.len());
        for name in manual {
            match store.uuid_for_username(name).await? {
                Some(uuid) => roster.push((name.clone(), uuid)),
                None => match mojang.uuid_for_name(name).await {
                    Ok(Some(profile)) => {
                        log::info!("Resolved {name} via Mojang: {}", profile.id);
                        roster.push((name.clone(), profile.id));
                    }
                    Ok(None) => log::warn!("No UUID found for {name}, skipping"),
                    Err(e) => log::warn!("Mojang lookup for {name} failed: {e}, skipping"),
                },
            }
        }
        Ok(roster)
    }

    pub fn on_cooldown(&self, player: &str) -> bool {
        self.cooldowns.get(player).is_some_and(|entry| {
            Utc::now() < entry.last_check + chrono::Duration::minutes(PLAYER_COOLDOWN_MINUTES)
        })
    }

    /// One stat check for one player. Seeds the baseline on first sight,
    /// records a session entry when the counters moved, and puts players
    /// caught mid-session (1-2 games) on cooldown.
    pub async fn check_player(&mut self, player: &str, uuid: &Uuid) -> TrackerResult<()> {
        let Some(data) = self.client.player(uuid).await? else {
            log::warn!("No player document for {player}");
            return Ok(());
        };
        self.note_name_change(player, &data)?;
        let Some(bedwars) = data.bedwars() else {
            log::warn!("{player} has no Bedwars stats");
            return Ok(());
        };
        let current = bedwars.summary();

        let baseline_path = self.files.baseline(player);
        let Some(baseline) = load_json::<StatsSummary>(&baseline_path)? else {
            save_json(&baseline_path, &current)?;
            log::info!("Created baseline for {player}");
            return Ok(());
        };
        if current.wins == baseline.wins && current.losses == baseline.losses {
            log::debug!("No new games for {player}");
            return Ok(());
        }

        let diff = SessionDiff::between(&baseline, &current);
        let games = diff.overall.games();
        if (1..=2).contains(&games) {
            // a fresh handful of games means we caught them live
            self.cooldowns.insert(
                player.to_string(),
                CooldownEntry {
                    last_check: Utc::now(),
                    api_on: true,
                },
            );
            save_json(&self.files.cooldowns(), &self.cooldowns)?;
            log::info!("{player} has the API on, adding to cooldown list");
        }

        let session_path = self.files.session_log(player);
        let mut sessions = load_json::<SessionLog>(&session_path)?.unwrap_or_default();
        sessions.update_winstreaks(&diff, &current);
        let number = sessions.record(&diff);
        save_json(&session_path, &sessions)?;
        save_json(&baseline_path, &current)?;
        log::info!(
            "Session {number} for {player}: {}W/{}L over {} mode(s)",
            diff.overall.wins,
            diff.overall.losses,
            diff.modes.len()
        );
        Ok(())
    }

    /// Merges the player's current recent-games window into their history
    /// file.
    pub async fn check_recent_games(&self, player: &str, uuid: &Uuid) -> TrackerResult<()> {
        let games = self.client.recent_games(uuid).await?;
        let fetched = RecentGamesLog::from_api(&games);
        let path = self.files.recent_games(player);
        let mut history = load_json::<RecentGamesLog>(&path)?.unwrap_or_default();
        let added = history.merge(fetched);
        save_json(&path, &history)?;
        if added > 0 {
            log::info!("{player}: {added} new recent game(s)");
        }
        Ok(())
    }

    /// One pass over the roster. Per-player failures are logged and the
    /// pass keeps going; a broken player shouldn't stall everyone else.
    pub async fn run_cycle(&mut self, roster: &[(String, Uuid)]) -> TrackerResult<()> {
        log::info!("Starting check cycle for {} player(s)", roster.len());
        for (i, (player, uuid)) in roster.iter().enumerate() {
            if self.on_cooldown(player) {
                log::debug!("Skipping {player}, on cooldown");
                continue;
            }
            if let Err(e) = self.check_player(player, uuid).await {
                log::warn!("Session check for {player} failed: {e}");
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
            if let Err(e) = self.check_recent_games(player, uuid).await {
                log::warn!("Recent games check for {player} failed: {e}");
            }
            if i + 1 < roster.len() {
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
        Ok(())
    }

    /// Endless polling loop over a fixed roster.
    pub async fn run(&mut self, roster: &[(String, Uuid)]) -> TrackerResult<()> {
        if roster.is_empty() {
            log::warn!("Nothing to track: the roster is empty");
            return Ok(());
        }
        log::info!("Tracking {} player(s)", roster.len());
        loop {
            self.run_cycle(roster).await?;
            tokio::time::sleep(SLEEP_TIME).await;
        }
    }

    /// Writes the shared state files. Called on shutdown; both files are
    /// also saved eagerly whenever they change.
    pub fn flush(&self) -> TrackerResult<()> {
        save_json(&self.files.cooldowns(), &self.cooldowns)?;
        save_json(&self.files.name_changes(), &self.name_changes)?;
        Ok(())
    }

    fn note_name_change(&mut self, known_name: &str, data: &PlayerData) -> TrackerResult<()> {
        let Some(current) = data.displayname.as_deref() else {
            return Ok(());
        };
        if current.eq_ignore_ascii_case(known_name) {
            return Ok(());
        }
        log::info!("Name change detected: {known_name} is now {current}");
        if self.name_changes.record(known_name, current) {
            save_json(&self.files.name_changes(), &self.name_changes)?;
        }
        Ok(())
    }
}
