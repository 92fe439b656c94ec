//! Mojang profile lookups for the name ingestion pipeline.
//!
//! Mojang publishes no rate-limit headers, so the client leans on a flat
//! inter-request delay plus jittered exponential backoff when a 429 does
//! arrive. A 404 is permanent: the name has never existed.

use std::time::Duration;

use rand::Rng;
use reqwest::{Client, StatusCode};
use tracing::warn;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::model::MojangProfile;

pub const DEFAULT_PROFILE_BASE_URL: &str = "https://api.mojang.com";
pub const DEFAULT_SESSION_BASE_URL: &str = "https://sessionserver.mojang.com";

/// Tuning for a [`MojangClient`].
#[derive(Debug, Clone)]
pub struct MojangConfig {
    pub profile_base_url: String,
    pub session_base_url: String,
    /// Flat delay after every request.
    pub request_delay: Duration,
    pub max_retries: u32,
    pub backoff_start: Duration,
    pub backoff_cap: Duration,
}

impl Default for MojangConfig {
    fn default() -> Self {
        Self {
            profile_base_url: DEFAULT_PROFILE_BASE_URL.to_string(),
            session_base_url: DEFAULT_SESSION_BASE_URL.to_string(),
            request_delay: Duration::from_secs(2),
            max_retries: 3,
            backoff_start: Duration::from_secs(10),
            backoff_cap: Duration::from_secs(600),
        }
    }
}

#[derive(Clone)]
pub struct MojangClient {
    client: Client,
    config: MojangConfig,
}

impl MojangClient {
    pub fn new(config: MojangConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");

        Self { client, config }
    }

    /// Resolves a username to its profile. `Ok(None)` means Mojang has no
    /// player by that name, which callers may record as permanent.
    /// Transient failures are retried before surfacing an error.
    pub async fn uuid_for_name(&self, name: &str) -> ApiResult<Option<MojangProfile>> {
        let url = format!(
            "{}/users/profiles/minecraft/{}",
            self.config.profile_base_url, name
        );
        let mut backoff = self.config.backoff_start;

        for _ in 0..self.config.max_retries {
            let resp = match self.client.get(&url).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!("Mojang request for {} failed: {}", name, e);
                    continue;
                }
            };
            tokio::time::sleep(self.config.request_delay).await;

            match resp.status() {
                StatusCode::OK => return Ok(Some(resp.json().await?)),
                StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => return Ok(None),
                StatusCode::TOO_MANY_REQUESTS => {
                    let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..1000));
                    let wait = backoff.min(self.config.backoff_cap) + jitter;
                    warn!("Mojang rate limited for {}, backing off {:?}", name, wait);
                    tokio::time::sleep(wait).await;
                    backoff *= 2;
                }
                status => {
                    warn!("Mojang lookup for {} returned {}", name, status);
                }
            }
        }

        Err(ApiError::RetriesExhausted(self.config.max_retries))
    }

    /// Current profile for a UUID from the session server, used to catch
    /// name changes. Single attempt; callers treat a failure as unknown.
    pub async fn profile(&self, uuid: &Uuid) -> ApiResult<Option<MojangProfile>> {
        let url = format!(
            "{}/session/minecraft/profile/{}",
            self.config.session_base_url,
            uuid.simple()
        );
        let resp = self.client.get(&url).send().await?;
        tokio::time::sleep(self.config.request_delay).await;

        match resp.status() {
            StatusCode::OK => Ok(Some(resp.json().await?)),
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Ok(None),
            status => Err(ApiError::Api(format!("session server returned {status}"))),
        }
    }
}
