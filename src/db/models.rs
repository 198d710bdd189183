//! Database models and domain types.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use innerwords_rules::Turn;
use serde::Serialize;
use tracing::instrument;

use crate::db::{DbError, schema};

/// Opaque identifier of a leaderboard entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, derive_more::Display,
)]
#[display("#{_0}")]
pub struct EntryId(pub(crate) i32);

impl EntryId {
    /// Raw row id.
    pub fn get(self) -> i32 {
        self.0
    }
}

/// A persisted leaderboard entry.
///
/// Immutable once written except for `notification_status`.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::leaderboard)]
pub struct LeaderboardEntry {
    id: i32,
    player_name: String,
    score: i32,
    turns: i32,
    word: String,
    submitted_at: NaiveDateTime,
    ip_address: Option<String>,
    user_agent: Option<String>,
    notification_status: String,
    turn_history: Option<String>,
}

impl LeaderboardEntry {
    /// Typed identifier of this entry.
    pub fn entry_id(&self) -> EntryId {
        EntryId(self.id)
    }

    /// Parses the stored status string into a [`NotificationStatus`].
    #[instrument(skip(self), fields(status = %self.notification_status))]
    pub fn parse_notification_status(&self) -> Result<NotificationStatus, DbError> {
        NotificationStatus::from_db_string(self.notification_status())
    }

    /// Decodes the stored turn log, oldest turn first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored JSON does not describe turns.
    #[instrument(skip(self), fields(entry_id = self.id))]
    pub fn parse_turn_history(&self) -> Result<Option<Vec<Turn>>, DbError> {
        self.turn_history
            .as_deref()
            .map(serde_json::from_str::<Vec<Turn>>)
            .transpose()
            .map_err(DbError::from)
    }
}

/// Insertable entry for a finished run.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::leaderboard)]
pub struct NewLeaderboardEntry {
    player_name: String,
    score: i32,
    turns: i32,
    word: String,
    submitted_at: NaiveDateTime,
    ip_address: Option<String>,
    user_agent: Option<String>,
    notification_status: String,
    turn_history: Option<String>,
}

/// Delivery state of the score notification for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    /// Dispatch scheduled, no attempt finished yet.
    Pending,
    /// Endpoint acknowledged with a 2xx response.
    Sent,
    /// Last attempt failed; a retry may be scheduled.
    Failed,
}

impl NotificationStatus {
    /// Converts status to the string stored in the database.
    #[instrument]
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    /// Parses status from the string stored in the database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the string is not a valid status value.
    #[instrument(skip(s), fields(s = %s))]
    pub fn from_db_string(s: &str) -> Result<Self, DbError> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            _ => Err(DbError::new(format!("Invalid notification status: '{}'", s))),
        }
    }
}

/// A distinct client address that has submitted scores.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::unique_ips)]
pub struct UniqueIp {
    id: i32,
    ip_address: String,
    first_visit: NaiveDateTime,
    last_visit: NaiveDateTime,
    visit_count: i32,
    user_agent: Option<String>,
}

/// Insertable first sighting of a client address.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::unique_ips)]
pub struct NewUniqueIp {
    ip_address: String,
    first_visit: NaiveDateTime,
    last_visit: NaiveDateTime,
    visit_count: i32,
    user_agent: Option<String>,
}

/// Visitor counts across all submissions.
#[derive(Debug, Clone, Getters)]
pub struct UniqueIpStats {
    unique_ip_count: usize,
    total_visits: i64,
    recent: Vec<UniqueIp>,
}

impl UniqueIpStats {
    /// Creates new visitor statistics.
    #[instrument(skip(recent))]
    pub fn new(unique_ip_count: usize, total_visits: i64, recent: Vec<UniqueIp>) -> Self {
        Self {
            unique_ip_count,
            total_visits,
            recent,
        }
    }
}
