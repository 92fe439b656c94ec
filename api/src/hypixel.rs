//! Client for the Hypixel public API.
//!
//! One shared rate-limit view feeds both the pacing delay between requests
//! and the wait after a 429. Pacing stretches the configured base delay as
//! the remaining-request headroom shrinks, so long crawls slow themselves
//! down instead of slamming into the limit.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::model::{
    GuildMember, GuildReply, LeaderboardListing, LeaderboardsReply, PlayerData, PlayerReply,
    RawGame, RecentGamesReply,
};

pub const DEFAULT_BASE_URL: &str = "https://api.hypixel.net";

/// Assumed request allowance before the first response reports the real
/// figure. Matches the allowance of a fresh key.
const INITIAL_REMAINING: i64 = 120;

/// Reset window assumed when a 429 arrives without a reset header.
const DEFAULT_RESET_SECS: u64 = 60;

/// Tuning for a [`HypixelClient`].
#[derive(Debug, Clone)]
pub struct HypixelConfig {
    pub base_url: String,
    pub api_key: String,
    /// Base delay inserted after each successful request. `None` disables
    /// pacing; interactive callers poll one player a minute and need none.
    pub request_delay: Option<Duration>,
    /// Added on top of the server's reset window before retrying a 429.
    pub rate_limit_margin: Duration,
    /// Total time one request may spend waiting out 429 responses before
    /// the client gives up and surfaces the failure.
    pub retry_budget: Duration,
}

impl HypixelConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            request_delay: None,
            rate_limit_margin: Duration::from_secs(5),
            retry_budget: Duration::from_secs(600),
        }
    }
}

struct RateLimit {
    remaining: i64,
}

/// HTTP client for the Hypixel API. Cheap to clone; clones share the
/// rate-limit state.
#[derive(Clone)]
pub struct HypixelClient {
    client: Client,
    config: HypixelConfig,
    limit: Arc<RwLock<RateLimit>>,
}

impl HypixelClient {
    pub fn new(config: HypixelConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            config,
            limit: Arc::new(RwLock::new(RateLimit {
                remaining: INITIAL_REMAINING,
            })),
        }
    }

    /// Requests left in the current window, per the most recent response.
    pub async fn remaining(&self) -> i64 {
        self.limit.read().await.remaining
    }

    /// Fetches a player document. `Ok(None)` when the reply carries no
    /// player, which the API uses for UUIDs it has never seen.
    pub async fn player(&self, uuid: &Uuid) -> ApiResult<Option<PlayerData>> {
        let reply: PlayerReply = self.get_json(&format!("/player?uuid={uuid}")).await?;
        if !reply.success {
            return Ok(None);
        }
        Ok(reply.player)
    }

    /// Recent games for a player. Empty when the player has the recent
    /// games API toggled off in their privacy settings.
    pub async fn recent_games(&self, uuid: &Uuid) -> ApiResult<Vec<RawGame>> {
        let reply: RecentGamesReply = self.get_json(&format!("/recentgames?uuid={uuid}")).await?;
        Ok(reply.games)
    }

    /// Current official leaderboards, keyed by game type.
    pub async fn leaderboards(&self) -> ApiResult<HashMap<String, Vec<LeaderboardListing>>> {
        let reply: LeaderboardsReply = self.get_json("/leaderboards").await?;
        if !reply.success {
            return Err(ApiError::Api("leaderboards reply unsuccessful".to_string()));
        }
        Ok(reply.leaderboards)
    }

    /// Members of the guild the player belongs to, empty when guildless.
    pub async fn guild_members(&self, uuid: &Uuid) -> ApiResult<Vec<GuildMember>> {
        let reply: GuildReply = self.get_json(&format!("/guild?player={uuid}")).await?;
        Ok(reply.guild.map(|guild| guild.members).unwrap_or_default())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = format!("{}{}", self.config.base_url, path);
        let mut waited = Duration::ZERO;

        loop {
            let resp = self
                .client
                .get(&url)
                .header("API-Key", &self.config.api_key)
                .send()
                .await?;

            if let Some(remaining) = header_value(&resp, "RateLimit-Remaining") {
                self.limit.write().await.remaining = remaining;
                if remaining < 10 {
                    warn!("Hypixel rate limit critical: {} requests remaining", remaining);
                } else if remaining < 30 {
                    warn!("Hypixel rate limit low: {} requests remaining", remaining);
                } else {
                    debug!("Hypixel rate limit: {} requests remaining", remaining);
                }
            }

            if resp.status() == StatusCode::TOO_MANY_REQUESTS {
                let reset = header_value(&resp, "RateLimit-Reset").unwrap_or(DEFAULT_RESET_SECS);
                let wait = Duration::from_secs(reset) + self.config.rate_limit_margin;
                if waited + wait > self.config.retry_budget {
                    return Err(ApiError::RateLimitExhausted(waited + wait));
                }
                warn!("Rate limited on {}, waiting {:?} before retrying", path, wait);
                tokio::time::sleep(wait).await;
                waited += wait;
                continue;
            }

            let resp = resp
                .error_for_status()
                .map_err(|e| ApiError::Api(e.to_string()))?;

            self.pace().await;
            return Ok(resp.json().await?);
        }
    }

    /// Sleeps the configured delay, stretched when the window is nearly
    /// spent.
    async fn pace(&self) {
        let Some(base) = self.config.request_delay else {
            return;
        };
        let remaining = self.limit.read().await.remaining;
        let delay = if remaining <= 10 {
            base * 4
        } else if remaining <= 30 {
            base * 2
        } else if remaining <= 60 {
            base.mul_f64(1.5)
        } else {
            base
        };
        tokio::time::sleep(delay).await;
    }
}

fn header_value<T: std::str::FromStr>(resp: &reqwest::Response, name: &str) -> Option<T> {
    resp.headers().get(name)?.to_str().ok()?.parse().ok()
}
