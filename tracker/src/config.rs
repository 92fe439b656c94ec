use std::path::PathBuf;
use std::time::Duration;

use api::{HypixelConfig, MojangConfig};
use database::DatabaseConfig;
use serde::Deserialize;

use crate::error::{TrackerError, TrackerResult};

/// Flags shared by every tracker binary. Each resolves to a [`TrackerConfig`]
/// via CLI value first, then environment, then the YAML file.
#[derive(clap::Args, Debug)]
pub struct CommonArgs {
    /// Hypixel API key. Falls back to HYPIXEL_API_KEY, then the config file.
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// Path to the shared SQLite database.
    #[arg(short, long)]
    pub database: Option<String>,

    /// Directory holding baselines, session logs and generated artifacts.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// YAML config file with api_key / database / data_dir keys.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Optional YAML file, lowest precedence of the three sources.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_key: Option<String>,
    database: Option<String>,
    data_dir: Option<PathBuf>,
}

/// Everything a tracker process needs to reach the API, the store and the
/// on-disk state files.
pub struct TrackerConfig {
    api_key: Option<String>,
    pub database: DatabaseConfig,
    pub data_dir: PathBuf,
}

impl TrackerConfig {
    pub fn resolve(args: CommonArgs) -> TrackerResult<Self> {
        let file = match &args.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_yaml::from_str::<FileConfig>(&raw)
                    .map_err(|e| TrackerError::Config(format!("bad config file: {e}")))?
            }
            None => FileConfig::default(),
        };

        let api_key = args
            .api_key
            .or_else(|| std::env::var("HYPIXEL_API_KEY").ok())
            .or(file.api_key);
        let database = DatabaseConfig::from_cli_or_env_or_yaml(args.database, file.database);
        let data_dir = args
            .data_dir
            .or(file.data_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            api_key,
            database,
            data_dir,
        })
    }

    pub fn require_api_key(&self) -> TrackerResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            TrackerError::Config(
                "no API key: pass --api-key, set HYPIXEL_API_KEY or add api_key to the config file"
                    .to_string(),
            )
        })
    }

    /// Profile for the session tracker: no pacing between requests, a short
    /// margin on rate-limit waits.
    pub fn hypixel_session(&self) -> TrackerResult<HypixelConfig> {
        let mut config = HypixelConfig::new(self.require_api_key()?);
        config.request_delay = None;
        config.rate_limit_margin = Duration::from_secs(5);
        Ok(config)
    }

    /// Profile for discovery crawls: paced requests and a wider margin, since
    /// the crawl burns the window much faster.
    pub fn hypixel_discovery(&self) -> TrackerResult<HypixelConfig> {
        let mut config = HypixelConfig::new(self.require_api_key()?);
        config.request_delay = Some(Duration::from_millis(1500));
        config.rate_limit_margin = Duration::from_secs(10);
        Ok(config)
    }

    pub fn mojang(&self) -> MojangConfig {
        MojangConfig::default()
    }
}
