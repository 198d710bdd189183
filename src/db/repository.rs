//! Database repository for leaderboard entries and visitor tracking.

use chrono::NaiveDateTime;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{
    DbError, EntryId, LeaderboardEntry, NewLeaderboardEntry, NewUniqueIp, NotificationStatus,
    UniqueIp, UniqueIpStats, schema,
};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Number of recent visitors reported by [`LeaderboardRepository::unique_ip_stats`].
const RECENT_VISITORS: usize = 10;

/// Database repository for leaderboard operations.
///
/// Opens a connection per call, so clones can be shared freely across
/// tasks and threads.
#[derive(Debug, Clone)]
pub struct LeaderboardRepository {
    db_path: String,
}

impl LeaderboardRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating LeaderboardRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))?;
        conn.batch_execute(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS};"))?;
        Ok(conn)
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migrations failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Appends a leaderboard entry.
    ///
    /// A single INSERT; never reads or rewrites existing rows.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, entry), fields(word = %entry.word(), score = entry.score()))]
    pub fn insert_entry(&self, entry: NewLeaderboardEntry) -> Result<LeaderboardEntry, DbError> {
        debug!("Inserting leaderboard entry");
        let mut conn = self.connection()?;

        let stored = diesel::insert_into(schema::leaderboard::table)
            .values(&entry)
            .returning(LeaderboardEntry::as_returning())
            .get_result(&mut conn)?;

        info!(entry_id = stored.id(), player = %stored.player_name(), "Leaderboard entry stored");
        Ok(stored)
    }

    /// Gets an entry by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_entry(&self, id: EntryId) -> Result<Option<LeaderboardEntry>, DbError> {
        let mut conn = self.connection()?;
        let entry = schema::leaderboard::table
            .find(id.get())
            .select(LeaderboardEntry::as_select())
            .first(&mut conn)
            .optional()?;
        if entry.is_none() {
            debug!("Entry not found");
        }
        Ok(entry)
    }

    /// Returns up to `limit` entries for `word`, highest score first.
    ///
    /// Equal scores keep insertion order: the earlier submission comes first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn top_scores(&self, word: &str, limit: i64) -> Result<Vec<LeaderboardEntry>, DbError> {
        let mut conn = self.connection()?;

        let entries = schema::leaderboard::table
            .filter(schema::leaderboard::word.eq(word))
            .order((
                schema::leaderboard::score.desc(),
                schema::leaderboard::id.asc(),
            ))
            .limit(limit.max(0))
            .select(LeaderboardEntry::as_select())
            .load(&mut conn)?;

        debug!(count = entries.len(), "Top scores loaded");
        Ok(entries)
    }

    /// Counts entries for `word` with a score strictly greater than `score`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count_higher(&self, word: &str, score: i32) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        let count = schema::leaderboard::table
            .filter(schema::leaderboard::word.eq(word))
            .filter(schema::leaderboard::score.gt(score))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }

    /// Counts all entries for `word`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count_for_word(&self, word: &str) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        let count = schema::leaderboard::table
            .filter(schema::leaderboard::word.eq(word))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }

    /// Sets the notification status of an entry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the entry does not exist or a database error occurs.
    #[instrument(skip(self))]
    pub fn set_notification_status(
        &self,
        id: EntryId,
        status: NotificationStatus,
    ) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let updated = diesel::update(schema::leaderboard::table.find(id.get()))
            .set(schema::leaderboard::notification_status.eq(status.to_db_string()))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(DbError::new(format!("No leaderboard entry {}", id)));
        }
        debug!(status = status.to_db_string(), "Notification status updated");
        Ok(())
    }

    /// Lists entries whose notification is in any of `statuses`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn entries_with_status(
        &self,
        statuses: &[NotificationStatus],
    ) -> Result<Vec<LeaderboardEntry>, DbError> {
        let mut conn = self.connection()?;
        let wanted: Vec<&str> = statuses.iter().map(NotificationStatus::to_db_string).collect();
        let entries = schema::leaderboard::table
            .filter(schema::leaderboard::notification_status.eq_any(wanted))
            .order(schema::leaderboard::id.asc())
            .select(LeaderboardEntry::as_select())
            .load(&mut conn)?;
        info!(count = entries.len(), "Entries loaded by notification status");
        Ok(entries)
    }

    /// Records a visit from `ip_address`, creating the visitor on first sight.
    ///
    /// A single upsert, so concurrent visits from one address all count.
    /// The user agent of the first visit is kept.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, user_agent))]
    pub fn track_visit(
        &self,
        ip_address: &str,
        user_agent: Option<&str>,
        at: NaiveDateTime,
    ) -> Result<UniqueIp, DbError> {
        use schema::unique_ips::dsl;

        let mut conn = self.connection()?;
        let visitor = diesel::insert_into(dsl::unique_ips)
            .values(&NewUniqueIp::new(
                ip_address.to_string(),
                at,
                at,
                1,
                user_agent.map(str::to_string),
            ))
            .on_conflict(dsl::ip_address)
            .do_update()
            .set((
                dsl::last_visit.eq(at),
                dsl::visit_count.eq(dsl::visit_count + 1),
            ))
            .returning(UniqueIp::as_returning())
            .get_result(&mut conn)?;

        debug!(visits = visitor.visit_count(), "Visit tracked");
        Ok(visitor)
    }

    /// Gets visitor totals and the most recent visitors.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn unique_ip_stats(&self) -> Result<UniqueIpStats, DbError> {
        let mut conn = self.connection()?;
        let visitors = schema::unique_ips::table
            .order(schema::unique_ips::last_visit.desc())
            .select(UniqueIp::as_select())
            .load(&mut conn)?;

        let total_visits: i64 = visitors.iter().map(|v| i64::from(*v.visit_count())).sum();
        let count = visitors.len();
        let recent = visitors.into_iter().take(RECENT_VISITORS).collect();

        info!(unique = count, total_visits, "Visitor stats computed");
        Ok(UniqueIpStats::new(count, total_visits, recent))
    }
}
