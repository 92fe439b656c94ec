//! HTTP clients for the player-data services.
//!
//! [`HypixelClient`] wraps the stats endpoints behind shared rate-limit
//! pacing; [`MojangClient`] resolves usernames for ingestion. Both take an
//! explicit config so tests can point them at a local mock server.

pub mod error;
pub mod hypixel;
pub mod model;
pub mod mojang;

pub use error::{ApiError, ApiResult};
pub use hypixel::{HypixelClient, HypixelConfig, DEFAULT_BASE_URL};
pub use model::{
    BedwarsStats, Guild, GuildMember, GuildReply, LeaderboardListing, LeaderboardsReply,
    MojangProfile, PlayerData, PlayerReply, PlayerStats, RawGame, RecentGamesReply,
};
pub use mojang::{MojangClient, MojangConfig};
