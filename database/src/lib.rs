pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod schema;
pub mod store;

pub use config::DatabaseConfig;
pub use error::StoreError;
pub use models::{
    DiscoveryEntry, LeaderboardRow, Metric, PlayerLevel, PlayerRecord, StatSnapshot, StoreTotals,
    TopPlayer,
};
pub use retry::retry_with_backoff;
pub use schema::create_schema;
pub use store::PlayerStore;
