use std::time::{Duration, Instant};

use api::{BedwarsStats, HypixelClient};
use chrono::{DateTime, Utc};
use database::{retry_with_backoff, PlayerRecord, PlayerStore, StatSnapshot};
use types::level_for_experience;
use uuid::Uuid;

use crate::error::TrackerResult;
use crate::files::DataFiles;
use crate::leaderboards::LeaderboardGenerator;

/// Crawl targets. The target count is aspirational; the crawl keeps
/// refreshing known players once it is reached.
pub const TARGET_PLAYER_COUNT: i64 = 1_000_000;
pub const PLAYERS_PER_CYCLE: i64 = 200;
pub const CYCLE_SLEEP: Duration = Duration::from_secs(300);

/// Minimum Bedwars wins before a discovered player is stored at all.
pub const MIN_BEDWARS_WINS: i64 = 0;

/// The official leaderboards barely change hour to hour.
const SEED_INTERVAL: Duration = Duration::from_secs(3600);

/// Stop draining the queue when this little of the rate window is left.
const RATE_FLOOR: i64 = 5;
/// Guild walks cost an extra request each, so they need more headroom.
const GUILD_RATE_FLOOR: i64 = 20;

/// Grows the player store: seeds identities from the official leaderboards,
/// drains the discovery queue into full stat fetches, and walks guild
/// rosters for more names.
pub struct DiscoveryEngine {
    client: HypixelClient,
    store: PlayerStore,
    boards: LeaderboardGenerator,
    last_seed: Option<Instant>,
}

/// Store row for one fetched stat document.
pub fn snapshot_from(bedwars: &BedwarsStats, timestamp: DateTime<Utc>) -> StatSnapshot {
    StatSnapshot {
        timestamp,
        wins: bedwars.wins,
        losses: bedwars.losses,
        kills: bedwars.kills,
        deaths: bedwars.deaths,
        final_kills: bedwars.final_kills,
        final_deaths: bedwars.final_deaths,
        beds_broken: bedwars.beds_broken,
        beds_lost: bedwars.beds_lost,
        winstreak: bedwars.winstreak,
        coins: bedwars.coins,
        experience: bedwars.experience.max(0.0) as i64,
        games_played: bedwars.games_played,
        solos_wins: bedwars.solos_wins,
        solos_losses: bedwars.solos_losses,
        solos_winstreak: bedwars.solos_winstreak,
        doubles_wins: bedwars.doubles_wins,
        doubles_losses: bedwars.doubles_losses,
        doubles_winstreak: bedwars.doubles_winstreak,
        threes_wins: bedwars.threes_wins,
        threes_losses: bedwars.threes_losses,
        threes_winstreak: bedwars.threes_winstreak,
        fours_wins: bedwars.fours_wins,
        fours_losses: bedwars.fours_losses,
        fours_winstreak: bedwars.fours_winstreak,
    }
}

impl DiscoveryEngine {
    pub fn new(client: HypixelClient, store: PlayerStore, files: DataFiles) -> TrackerResult<Self> {
        files.ensure_dirs()?;
        let boards = LeaderboardGenerator::new(store.clone(), files);
        Ok(Self {
            client,
            store,
            boards,
            last_seed: None,
        })
    }

    /// Pulls the official Bedwars leaderboards and queues every listed
    /// player, tagged with the board they came from. Each listing is also
    /// cached in the store. Rate-gated to once an hour per process.
    pub async fn seed_from_leaderboards(&mut self) -> TrackerResult<usize> {
        if self.last_seed.is_some_and(|at| at.elapsed() < SEED_INTERVAL) {
            log::info!("Leaderboards fetched recently, skipping seed");
            return Ok(0);
        }
        let boards = self.client.leaderboards().await?;
        self.last_seed = Some(Instant::now());

        let mut added = 0;
        for (game_type, listings) in &boards {
            if game_type != "BEDWARS" {
                continue;
            }
            for listing in listings {
                log::info!(
                    "Seeding from {} {} ({} players)",
                    listing.prefix,
                    listing.title,
                    listing.leaders.len()
                );
                self.store
                    .cache_leaderboard(
                        &listing.title,
                        game_type,
                        &listing.prefix,
                        &serde_json::to_value(&listing.leaders)?,
                    )
                    .await?;
                let method = format!("leaderboard_{}_{}", game_type, listing.title);
                for raw in &listing.leaders {
                    match self.store.enqueue_discovery(raw, None, &method).await {
                        Ok(true) => added += 1,
                        Ok(false) => {}
                        Err(e) => log::warn!("Could not queue {raw}: {e}"),
                    }
                }
            }
        }
        log::info!("Seeded {added} new player(s) from leaderboards");
        Ok(added)
    }

    /// Works through pending queue entries, the live rate-limit figure
    /// gating how deep the drain goes. Entries are marked processed before
    /// the fetch so a poisoned one can never wedge the queue.
    pub async fn process_queue(&mut self, limit: i64) -> TrackerResult<usize> {
        let pending = self.store.pending_discoveries(limit).await?;
        let mut processed = 0;
        for entry in pending {
            let remaining = self.client.remaining().await;
            if remaining <= RATE_FLOOR {
                log::warn!("Rate window nearly spent ({remaining} left), stopping queue drain");
                break;
            }
            let method = entry.method.clone().unwrap_or_else(|| "unknown".to_string());
            log::info!("Processing {} (via {method})", entry.uuid);
            self.store.mark_discovery_processed(entry.id).await?;

            match self.fetch_player(&entry.uuid, &method).await {
                Ok(Some((record, snapshot))) => {
                    if self.store_stats(&record, &snapshot).await {
                        processed += 1;
                    }
                    if self.client.remaining().await > GUILD_RATE_FLOOR {
                        match self.discover_from_guild(&entry.uuid).await {
                            Ok(found) if found > 0 => {
                                log::info!("Queued {found} guildmate(s) of {}", record.username)
                            }
                            Ok(_) => {}
                            Err(e) => {
                                log::warn!("Guild walk for {} failed: {e}", entry.uuid)
                            }
                        }
                    }
                }
                Ok(None) => log::info!("No usable stats for {}", entry.uuid),
                Err(e) => log::warn!("Stat fetch for {} failed: {e}", entry.uuid),
            }
        }
        Ok(processed)
    }

    /// Queues every member of the guild this player belongs to.
    pub async fn discover_from_guild(&self, uuid: &Uuid) -> TrackerResult<usize> {
        let members = self.client.guild_members(uuid).await?;
        let mut found = 0;
        for member in &members {
            if member.uuid.is_empty() {
                continue;
            }
            match self
                .store
                .enqueue_discovery(&member.uuid, Some(*uuid), "guild")
                .await
            {
                Ok(true) => found += 1,
                Ok(false) => {}
                Err(e) => log::warn!("Could not queue guild member {}: {e}", member.uuid),
            }
        }
        Ok(found)
    }

    /// One crawl cycle: report store totals, seed while the store is still
    /// small, drain the queue, and regenerate artifacts when enough moved.
    pub async fn run_cycle(&mut self) -> TrackerResult<()> {
        let totals = self.store.totals().await?;
        log::info!(
            "Store: {} players, {} queued, {} updated today",
            totals.total_players,
            totals.discovery_queue,
            totals.updated_today
        );
        if totals.total_players < 1000 {
            if let Err(e) = self.seed_from_leaderboards().await {
                log::warn!("Leaderboard seeding failed: {e}");
            }
        }
        let processed = self.process_queue(PLAYERS_PER_CYCLE).await?;
        log::info!("Processed {processed} player(s) this cycle");
        if totals.total_players % 100 == 0 || processed > 20 {
            self.boards.generate_all().await?;
        }
        Ok(())
    }

    /// Endless crawl toward [`TARGET_PLAYER_COUNT`].
    pub async fn run_automatic(&mut self) -> TrackerResult<()> {
        log::info!(
            "Automatic discovery: {PLAYERS_PER_CYCLE} players every {} min, target {TARGET_PLAYER_COUNT}",
            CYCLE_SLEEP.as_secs() / 60
        );
        if let Err(e) = self.seed_from_leaderboards().await {
            log::warn!("Initial seeding failed: {e}");
        }
        let mut cycle = 0u64;
        loop {
            cycle += 1;
            log::info!(
                "Cycle {cycle}, rate limit remaining: {}",
                self.client.remaining().await
            );
            if let Err(e) = self.run_cycle().await {
                log::warn!("Discovery cycle failed: {e}");
            }
            let totals = self.store.totals().await?;
            if totals.total_players >= TARGET_PLAYER_COUNT {
                log::info!(
                    "Target reached with {} players, switching to refresh crawling",
                    totals.total_players
                );
            }
            tokio::time::sleep(CYCLE_SLEEP).await;
        }
    }

    /// One interactive "find new players" pass: seed when the store or the
    /// queue looks thin, then drain a full cycle's worth.
    pub async fn find_new_players(&mut self) -> TrackerResult<usize> {
        let totals = self.store.totals().await?;
        if totals.total_players < 1000 || totals.discovery_queue < 100 {
            if let Err(e) = self.seed_from_leaderboards().await {
                log::warn!("Leaderboard seeding failed: {e}");
            }
        }
        let processed = self.process_queue(PLAYERS_PER_CYCLE).await?;
        if processed > 20 {
            self.boards.generate_all().await?;
        }
        Ok(processed)
    }

    pub async fn generate_leaderboards(&self) -> TrackerResult<()> {
        self.boards.generate_all().await
    }

    pub fn store(&self) -> &PlayerStore {
        &self.store
    }

    /// Full stat fetch for one discovered identity, filtered by the
    /// minimum-wins bar. `Ok(None)` covers unknown and filtered players.
    async fn fetch_player(
        &self,
        uuid: &Uuid,
        method: &str,
    ) -> TrackerResult<Option<(PlayerRecord, StatSnapshot)>> {
        let Some(data) = self.client.player(uuid).await? else {
            return Ok(None);
        };
        let bedwars = data.bedwars().cloned().unwrap_or_default();
        if bedwars.wins < MIN_BEDWARS_WINS {
            log::debug!("{uuid} has {} wins, below the bar", bedwars.wins);
            return Ok(None);
        }
        let username = match data.displayname.clone() {
            Some(name) => name,
            None => self
                .store
                .username_for_uuid(uuid)
                .await?
                .unwrap_or_else(|| "Unknown".to_string()),
        };
        let record = PlayerRecord {
            uuid: *uuid,
            username,
            discovery_method: method.to_string(),
            bedwars_level: level_for_experience(bedwars.experience.max(0.0) as u64) as i64,
            last_login: data.last_login_time(),
        };
        Ok(Some((record, snapshot_from(&bedwars, Utc::now()))))
    }

    /// Write with bounded busy retries; a write that still fails is
    /// abandoned rather than wedging the whole drain.
    async fn store_stats(&self, record: &PlayerRecord, snapshot: &StatSnapshot) -> bool {
        let result = retry_with_backoff(
            || {
                let store = self.store.clone();
                let record = record.clone();
                let snapshot = snapshot.clone();
                Box::pin(async move { store.record_stats(&record, &snapshot).await })
            },
            5,
            Duration::from_millis(100),
        )
        .await;
        match result {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Giving up on storing stats for {}: {e}", record.username);
                false
            }
        }
    }
}
