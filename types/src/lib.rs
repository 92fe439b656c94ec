pub mod leveling;
pub mod mode;
pub mod session;
pub mod stats;
pub mod winstreak;

pub use leveling::{level_for_experience, PRESTIGE_XP};
pub use mode::GameMode;
pub use session::{ScopeDiff, SessionDiff, SessionEntry, SessionLog, OVERALL_SCOPE};
pub use stats::{ratio, round3, ModeStats, StatsSummary};
pub use winstreak::WinstreakEstimate;
