//! Long-running Bedwars tracking processes and their shared plumbing.
//!
//! Each binary under `src/bin` wires one workflow out of these modules:
//! session polling, discovery crawling, scraped-name ingestion, artifact
//! generation and a handful of maintenance one-shots. They all share the
//! SQLite store and a directory of per-player JSON state files.

pub mod config;
pub mod discovery;
pub mod error;
pub mod files;
pub mod ingest;
pub mod leaderboards;
pub mod maintenance;
pub mod recent_games;
pub mod session;

pub use config::{CommonArgs, TrackerConfig};
pub use discovery::DiscoveryEngine;
pub use error::{TrackerError, TrackerResult};
pub use files::DataFiles;
pub use ingest::NameIngestor;
pub use leaderboards::LeaderboardGenerator;
pub use session::SessionTracker;
