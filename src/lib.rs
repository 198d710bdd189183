//! InnerWords - timed word chaining with a ranked leaderboard
//!
//! The rules engine lives in [`innerwords_rules`]; this crate adds the
//! pieces around it.
//!
//! # Architecture
//!
//! - **Game**: [`GameRunner`] owns one run and turns engine results into
//!   player feedback and sound cues
//! - **Leaderboard**: [`LeaderboardService`] stores finished runs, answers
//!   top-N and rank queries, and dispatches score notifications
//! - **Persistence**: [`LeaderboardRepository`] on SQLite via diesel
//! - **Notifications**: [`Notifier`] with an HTTP implementation
//! - **Config**: [`AppConfig`] from TOML plus environment overrides
//!
//! # Example
//!
//! ```no_run
//! use innerwords::{LeaderboardRepository, LeaderboardService, Submission};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let repository = LeaderboardRepository::new("innerwords.db".to_string())?;
//! repository.run_migrations()?;
//! let service = LeaderboardService::new(repository);
//!
//! let receipt = service.submit(Submission::new(
//!     "Ada".to_string(),
//!     42,
//!     5,
//!     "CORIANDER".to_string(),
//!     None,
//! ))?;
//! println!("Stored {}", receipt.entry_id());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod db;
mod game;
mod leaderboard;
mod notify;

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError, NotificationSettings, load_word_list};

// Crate-level exports - Persistence
pub use db::{
    DbError, EntryId, LeaderboardEntry, LeaderboardRepository, NewLeaderboardEntry,
    NotificationStatus, UniqueIp, UniqueIpStats,
};

// Crate-level exports - Game runner
pub use game::{Feedback, FeedbackKind, GameRunner, SharedOracle, SharedSink};

// Crate-level exports - Leaderboard service
pub use leaderboard::{ClientMeta, DEFAULT_LIMIT, LeaderboardService, SubmitReceipt, Submission};

// Crate-level exports - Notifications
pub use notify::{HttpNotifier, NotificationTemplate, Notifier, NotifyError, ScoreNotification};
