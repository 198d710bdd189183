//! Leaderboard persistence on SQLite.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub(crate) use models::NewUniqueIp;
pub use models::{
    EntryId, LeaderboardEntry, NewLeaderboardEntry, NotificationStatus, UniqueIp, UniqueIpStats,
};
pub use repository::LeaderboardRepository;
