//! Leaderboard business logic: submissions, rankings and notification dispatch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use derive_getters::Getters;
use derive_new::new;
use innerwords_rules::Turn;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::db::{
    DbError, EntryId, LeaderboardEntry, LeaderboardRepository, NewLeaderboardEntry,
    NotificationStatus, UniqueIpStats,
};
use crate::notify::{NotificationTemplate, Notifier};

/// Default number of rows returned by [`LeaderboardService::top_scores`].
pub const DEFAULT_LIMIT: i64 = 10;

/// Optional request metadata recorded alongside an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, new, Getters)]
pub struct ClientMeta {
    ip_address: Option<String>,
    user_agent: Option<String>,
}

/// A finished run offered to the leaderboard.
#[derive(Debug, Clone, new, Getters)]
pub struct Submission {
    player_name: String,
    score: u32,
    turns: u32,
    word: String,
    turn_history: Option<Vec<Turn>>,
    #[new(default)]
    client: ClientMeta,
}

impl Submission {
    /// Attaches client metadata.
    pub fn with_client(mut self, client: ClientMeta) -> Self {
        self.client = client;
        self
    }
}

/// Returned by [`LeaderboardService::submit`] as soon as the row is stored.
#[derive(Debug)]
pub struct SubmitReceipt {
    entry_id: EntryId,
    dispatch: JoinHandle<()>,
}

impl SubmitReceipt {
    /// Identifier of the stored entry.
    pub fn entry_id(&self) -> EntryId {
        self.entry_id
    }

    /// Handle of the detached notification task.
    ///
    /// Dropping it does not cancel the dispatch.
    pub fn into_dispatch(self) -> JoinHandle<()> {
        self.dispatch
    }
}

/// Notifier plus the fields every message carries.
#[derive(Debug, Clone)]
struct NotificationChannel {
    notifier: Arc<dyn Notifier>,
    template: NotificationTemplate,
}

/// Service layer over [`LeaderboardRepository`].
///
/// Storage is synchronous; notification delivery runs on detached tokio
/// tasks, so [`submit`](Self::submit) and
/// [`resume_notifications`](Self::resume_notifications) must be called from
/// within a tokio runtime.
#[derive(Debug, Clone)]
pub struct LeaderboardService {
    repository: LeaderboardRepository,
    channel: Option<NotificationChannel>,
    retry_delay: Duration,
}

impl LeaderboardService {
    /// Creates a service that marks every notification as failed.
    #[instrument(skip(repository))]
    pub fn new(repository: LeaderboardRepository) -> Self {
        info!("Creating LeaderboardService without notifications");
        Self {
            repository,
            channel: None,
            retry_delay: Duration::from_secs(60),
        }
    }

    /// Creates a service that delivers notifications through `notifier`.
    #[instrument(skip(repository, notifier, template))]
    pub fn with_notifier(
        repository: LeaderboardRepository,
        notifier: Arc<dyn Notifier>,
        template: NotificationTemplate,
        retry_delay: Duration,
    ) -> Self {
        info!(?retry_delay, "Creating LeaderboardService");
        Self {
            repository,
            channel: Some(NotificationChannel { notifier, template }),
            retry_delay,
        }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &LeaderboardRepository {
        &self.repository
    }

    /// Stores a finished run and schedules its notification.
    ///
    /// The entry is written with status `pending` and the id returned at
    /// once; delivery happens on a detached task.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the player name is blank, a count does not fit
    /// the schema, or the insert fails. Inserts are never retried.
    #[instrument(skip(self, submission), fields(word = %submission.word, score = submission.score))]
    pub fn submit(&self, submission: Submission) -> Result<SubmitReceipt, DbError> {
        let player_name = submission.player_name.trim().to_string();
        if player_name.is_empty() {
            return Err(DbError::new("Player name is required"));
        }
        let score = i32::try_from(submission.score)
            .map_err(|_| DbError::new(format!("Score {} out of range", submission.score)))?;
        let turns = i32::try_from(submission.turns)
            .map_err(|_| DbError::new(format!("Turn count {} out of range", submission.turns)))?;
        let turn_history = submission
            .turn_history
            .filter(|turns| !turns.is_empty())
            .map(|turns| serde_json::to_string(&turns))
            .transpose()?;

        let now = Utc::now().naive_utc();
        let ClientMeta {
            ip_address,
            user_agent,
        } = submission.client;

        if let Some(ip) = ip_address.as_deref()
            && let Err(e) = self.repository.track_visit(ip, user_agent.as_deref(), now)
        {
            warn!(error = %e, "Failed to track visitor");
        }

        let entry = self.repository.insert_entry(NewLeaderboardEntry::new(
            player_name,
            score,
            turns,
            submission.word,
            now,
            ip_address,
            user_agent,
            NotificationStatus::Pending.to_db_string().to_string(),
            turn_history,
        ))?;

        let entry_id = entry.entry_id();
        let dispatch = self.spawn_dispatch(entry_id);
        info!(%entry_id, "Score submitted");
        Ok(SubmitReceipt { entry_id, dispatch })
    }

    /// Top entries for `word`, highest score first, ties in submission order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    #[instrument(skip(self))]
    pub fn top_scores(&self, word: &str, limit: i64) -> Result<Vec<LeaderboardEntry>, DbError> {
        self.repository.top_scores(word, limit)
    }

    /// 1 plus the number of entries for `word` scoring strictly higher.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    #[instrument(skip(self))]
    pub fn rank_of(&self, word: &str, score: u32) -> Result<i64, DbError> {
        let score = i32::try_from(score).unwrap_or(i32::MAX);
        let higher = self.repository.count_higher(word, score)?;
        debug!(higher, "Rank computed");
        Ok(higher + 1)
    }

    /// Number of entries submitted for `word`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    #[instrument(skip(self))]
    pub fn entry_count(&self, word: &str) -> Result<i64, DbError> {
        self.repository.count_for_word(word)
    }

    /// Visitor totals and the most recent visitors.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    #[instrument(skip(self))]
    pub fn unique_ip_stats(&self) -> Result<UniqueIpStats, DbError> {
        self.repository.unique_ip_stats()
    }

    /// Re-dispatches every entry whose notification is pending or failed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the entries cannot be listed.
    #[instrument(skip(self))]
    pub fn resume_notifications(&self) -> Result<Vec<JoinHandle<()>>, DbError> {
        let entries = self
            .repository
            .entries_with_status(&[NotificationStatus::Pending, NotificationStatus::Failed])?;
        info!(count = entries.len(), "Resuming notifications");
        Ok(entries
            .iter()
            .map(|entry| self.spawn_dispatch(entry.entry_id()))
            .collect())
    }

    fn spawn_dispatch(&self, entry_id: EntryId) -> JoinHandle<()> {
        let repository = self.repository.clone();
        let channel = self.channel.clone();
        let retry_delay = self.retry_delay;
        tokio::spawn(dispatch(repository, channel, retry_delay, entry_id))
    }
}

/// Sends the notification for one entry until the endpoint accepts it.
///
/// Without a configured channel the entry is marked failed once. Otherwise
/// each attempt re-reads the entry and renders it afresh; every failure marks
/// it failed and the send repeats after `retry_delay`, with no cap on attempts.
/// Storage calls run on the blocking pool.
#[instrument(skip(repository, channel, retry_delay))]
async fn dispatch(
    repository: LeaderboardRepository,
    channel: Option<NotificationChannel>,
    retry_delay: Duration,
    entry_id: EntryId,
) {
    let Some(channel) = channel else {
        warn!("Notification endpoint or recipient not configured");
        mark(&repository, entry_id, NotificationStatus::Failed).await;
        return;
    };

    let mut attempt: u64 = 0;
    loop {
        attempt += 1;
        let entry = match blocking(&repository, move |repo| repo.get_entry(entry_id)).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                error!("Entry vanished before dispatch");
                return;
            }
            Err(e) => {
                error!(attempt, error = %e, "Failed to load entry for dispatch");
                tokio::time::sleep(retry_delay).await;
                continue;
            }
        };

        let notification = channel.template.render(&entry);
        match channel.notifier.send(&notification).await {
            Ok(()) => {
                info!(attempt, "Notification delivered");
                mark(&repository, entry_id, NotificationStatus::Sent).await;
                return;
            }
            Err(e) => {
                warn!(attempt, error = %e, ?retry_delay, "Notification failed, retrying");
                mark(&repository, entry_id, NotificationStatus::Failed).await;
                tokio::time::sleep(retry_delay).await;
            }
        }
    }
}

async fn mark(repository: &LeaderboardRepository, entry_id: EntryId, status: NotificationStatus) {
    let result = blocking(repository, move |repo| {
        repo.set_notification_status(entry_id, status)
    })
    .await;
    if let Err(e) = result {
        error!(%entry_id, error = %e, "Failed to record notification status");
    }
}

/// Runs a repository call on tokio's blocking pool.
async fn blocking<T, F>(repository: &LeaderboardRepository, call: F) -> Result<T, DbError>
where
    T: Send + 'static,
    F: FnOnce(&LeaderboardRepository) -> Result<T, DbError> + Send + 'static,
{
    let repository = repository.clone();
    tokio::task::spawn_blocking(move || call(&repository))
        .await
        .map_err(|e| DbError::new(format!("Storage task failed: {}", e)))?
}
