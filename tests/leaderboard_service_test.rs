//! Tests for submissions, rankings and notification retries.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use innerwords::{
    ClientMeta, EntryId, LeaderboardRepository, LeaderboardService, NotificationStatus,
    NotificationTemplate, Notifier, NotifyError, ScoreNotification, Submission,
};
use innerwords_rules::{Session, WordList};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

/// Fails the first `failures` sends, then succeeds.
#[derive(Debug, Default)]
struct FlakyNotifier {
    failures: usize,
    attempts: AtomicUsize,
    delivered: Mutex<Vec<ScoreNotification>>,
}

impl FlakyNotifier {
    fn failing(failures: usize) -> Self {
        Self {
            failures,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Notifier for FlakyNotifier {
    async fn send(&self, notification: &ScoreNotification) -> Result<(), NotifyError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(NotifyError::new("endpoint unavailable"));
        }
        self.delivered.lock().await.push(notification.clone());
        Ok(())
    }
}

fn setup_repo() -> (NamedTempFile, LeaderboardRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo = LeaderboardRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    (db_file, repo)
}

fn template() -> NotificationTemplate {
    NotificationTemplate::new(
        "scores@example.com".to_string(),
        "chat-1".to_string(),
        "InnerWords".to_string(),
        "s3cret".to_string(),
    )
}

fn submission(player: &str, score: u32, word: &str) -> Submission {
    Submission::new(player.to_string(), score, 2, word.to_string(), None)
}

fn status_of(repo: &LeaderboardRepository, id: EntryId) -> NotificationStatus {
    repo.get_entry(id)
        .expect("Query failed")
        .expect("Entry missing")
        .parse_notification_status()
        .expect("Bad status")
}

#[tokio::test]
async fn test_submit_stores_pending_and_returns_immediately() {
    let (_db, repo) = setup_repo();
    let notifier = Arc::new(FlakyNotifier::failing(0));
    let service = LeaderboardService::with_notifier(
        repo.clone(),
        notifier.clone(),
        template(),
        Duration::from_millis(10),
    );

    let receipt = service
        .submit(submission("  Ada  ", 42, "CORIANDER"))
        .expect("Submit failed");
    let id = receipt.entry_id();

    let stored = repo
        .get_entry(id)
        .expect("Query failed")
        .expect("Entry missing");
    assert_eq!(stored.player_name(), "Ada");
    assert_eq!(stored.score(), &42);

    receipt.into_dispatch().await.expect("Dispatch panicked");
    assert_eq!(status_of(&repo, id), NotificationStatus::Sent);

    let delivered = notifier.delivered.lock().await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].to_email(), "scores@example.com");
    assert_eq!(delivered[0].subject(), "New InnerWords Score: 42 points!");
    assert!(delivered[0].message().contains("Player: Ada"));
    assert!(delivered[0].message().contains("Word: CORIANDER"));
}

#[tokio::test]
async fn test_failed_notification_is_retried_until_sent() {
    let (_db, repo) = setup_repo();
    let notifier = Arc::new(FlakyNotifier::failing(3));
    let service = LeaderboardService::with_notifier(
        repo.clone(),
        notifier.clone(),
        template(),
        Duration::from_millis(10),
    );

    let receipt = service
        .submit(submission("Ada", 12, "ACRE"))
        .expect("Submit failed");
    let id = receipt.entry_id();

    tokio::time::timeout(Duration::from_secs(5), receipt.into_dispatch())
        .await
        .expect("Dispatch did not finish")
        .expect("Dispatch panicked");

    assert_eq!(notifier.attempts.load(Ordering::SeqCst), 4);
    assert_eq!(status_of(&repo, id), NotificationStatus::Sent);
}

#[tokio::test]
async fn test_entry_is_failed_while_retrying() {
    let (_db, repo) = setup_repo();
    let notifier = Arc::new(FlakyNotifier::failing(usize::MAX));
    let service = LeaderboardService::with_notifier(
        repo.clone(),
        notifier.clone(),
        template(),
        Duration::from_millis(10),
    );

    let receipt = service
        .submit(submission("Ada", 12, "ACRE"))
        .expect("Submit failed");
    let id = receipt.entry_id();

    let mut waited = 0;
    while notifier.attempts.load(Ordering::SeqCst) < 3 && waited < 500 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        waited += 1;
    }
    assert!(notifier.attempts.load(Ordering::SeqCst) >= 3);
    assert_eq!(status_of(&repo, id), NotificationStatus::Failed);

    receipt.into_dispatch().abort();
}

#[tokio::test]
async fn test_missing_notification_config_marks_failed_without_retry() {
    let (_db, repo) = setup_repo();
    let service = LeaderboardService::new(repo.clone());

    let receipt = service
        .submit(submission("Ada", 12, "ACRE"))
        .expect("Submit failed");
    let id = receipt.entry_id();
    receipt.into_dispatch().await.expect("Dispatch panicked");

    assert_eq!(status_of(&repo, id), NotificationStatus::Failed);
}

#[tokio::test]
async fn test_resume_notifications_resends_failed_entries() {
    let (_db, repo) = setup_repo();
    let offline = LeaderboardService::new(repo.clone());
    let receipt = offline
        .submit(submission("Ada", 12, "ACRE"))
        .expect("Submit failed");
    let id = receipt.entry_id();
    receipt.into_dispatch().await.expect("Dispatch panicked");
    assert_eq!(status_of(&repo, id), NotificationStatus::Failed);

    let notifier = Arc::new(FlakyNotifier::failing(0));
    let online = LeaderboardService::with_notifier(
        repo.clone(),
        notifier.clone(),
        template(),
        Duration::from_millis(10),
    );
    let handles = online.resume_notifications().expect("Resume failed");
    assert_eq!(handles.len(), 1);
    for handle in handles {
        handle.await.expect("Dispatch panicked");
    }
    assert_eq!(status_of(&repo, id), NotificationStatus::Sent);
}

#[tokio::test]
async fn test_blank_player_name_is_rejected() {
    let (_db, repo) = setup_repo();
    let service = LeaderboardService::new(repo.clone());
    assert!(service.submit(submission("   ", 12, "ACRE")).is_err());
    assert_eq!(service.entry_count("ACRE").expect("Count failed"), 0);
}

#[tokio::test]
async fn test_rank_ties_share_a_rank_and_list_in_submission_order() {
    let (_db, repo) = setup_repo();
    let service = LeaderboardService::new(repo.clone());
    for (player, score) in [("first", 20), ("second", 20), ("top", 30)] {
        service
            .submit(submission(player, score, "ACRE"))
            .expect("Submit failed");
    }

    assert_eq!(service.rank_of("ACRE", 30).expect("Rank failed"), 1);
    assert_eq!(service.rank_of("ACRE", 20).expect("Rank failed"), 2);
    assert_eq!(service.rank_of("ACRE", 25).expect("Rank failed"), 2);
    assert_eq!(service.rank_of("ACRE", 5).expect("Rank failed"), 4);
    assert_eq!(service.rank_of("MASTODON", 5).expect("Rank failed"), 1);

    let top = service
        .top_scores("ACRE", innerwords::DEFAULT_LIMIT)
        .expect("Query failed");
    let names: Vec<&str> = top.iter().map(|e| e.player_name().as_str()).collect();
    assert_eq!(names, vec!["top", "first", "second"]);
    assert_eq!(service.entry_count("ACRE").expect("Count failed"), 3);
}

#[tokio::test]
async fn test_turn_history_and_client_meta_are_stored() {
    let (_db, repo) = setup_repo();
    let service = LeaderboardService::new(repo.clone());

    let dictionary = WordList::new(["SAND", "HANDY"]);
    let mut session = Session::new("CORIANDER".parse().expect("valid word"));
    session.submit_turn("sand", &dictionary).expect("SAND accepted");
    session.submit_turn("handy", &dictionary).expect("HANDY accepted");

    let client = ClientMeta::new(Some("10.1.2.3".to_string()), Some("tests".to_string()));
    let receipt = service
        .submit(
            Submission::new(
                "Ada".to_string(),
                session.score(),
                2,
                "CORIANDER".to_string(),
                Some(session.turns().to_vec()),
            )
            .with_client(client),
        )
        .expect("Submit failed");

    let stored = repo
        .get_entry(receipt.entry_id())
        .expect("Query failed")
        .expect("Entry missing");
    let history = stored
        .parse_turn_history()
        .expect("Bad history")
        .expect("History missing");
    assert_eq!(history, session.turns());
    assert_eq!(stored.ip_address().as_deref(), Some("10.1.2.3"));

    let stats = service.unique_ip_stats().expect("Stats failed");
    assert_eq!(stats.unique_ip_count(), &1);
}

#[tokio::test]
async fn test_empty_turn_history_is_stored_as_absent() {
    let (_db, repo) = setup_repo();
    let service = LeaderboardService::new(repo.clone());
    let receipt = service
        .submit(Submission::new(
            "Ada".to_string(),
            0,
            0,
            "ACRE".to_string(),
            Some(Vec::new()),
        ))
        .expect("Submit failed");
    let stored = repo
        .get_entry(receipt.entry_id())
        .expect("Query failed")
        .expect("Entry missing");
    assert!(stored.turn_history().is_none());
}

#[tokio::test]
async fn test_each_retry_rereads_the_entry() {
    use diesel::connection::SimpleConnection;
    use diesel::{Connection, RunQueryDsl, SqliteConnection};

    let (db, repo) = setup_repo();
    let notifier = Arc::new(FlakyNotifier::failing(usize::MAX));
    let service = LeaderboardService::with_notifier(
        repo.clone(),
        notifier.clone(),
        template(),
        Duration::from_millis(20),
    );

    let receipt = service
        .submit(submission("Ada", 12, "ACRE"))
        .expect("Submit failed");

    let mut waited = 0;
    while notifier.attempts.load(Ordering::SeqCst) < 2 && waited < 500 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        waited += 1;
    }
    assert!(notifier.attempts.load(Ordering::SeqCst) >= 2);

    let db_path = db.path().to_str().expect("Invalid path").to_string();
    let mut conn = SqliteConnection::establish(&db_path).expect("Failed to connect");
    conn.batch_execute("PRAGMA busy_timeout = 5000;")
        .expect("Pragma failed");
    diesel::sql_query("DELETE FROM leaderboard")
        .execute(&mut conn)
        .expect("Delete failed");

    tokio::time::timeout(Duration::from_secs(5), receipt.into_dispatch())
        .await
        .expect("Dispatch kept retrying a deleted entry")
        .expect("Dispatch panicked");
}

#[tokio::test]
async fn test_bulk_dispatch_leaves_the_runtime_responsive() {
    let (_db, repo) = setup_repo();
    let offline = LeaderboardService::new(repo.clone());
    for i in 0..20 {
        offline
            .submit(submission(&format!("p{}", i), i, "ACRE"))
            .expect("Submit failed")
            .into_dispatch()
            .await
            .expect("Dispatch panicked");
    }

    let notifier = Arc::new(FlakyNotifier::failing(0));
    let online = LeaderboardService::with_notifier(
        repo.clone(),
        notifier.clone(),
        template(),
        Duration::from_millis(10),
    );
    let handles = online.resume_notifications().expect("Resume failed");
    assert_eq!(handles.len(), 20);

    let mut ticker = tokio::time::interval(Duration::from_millis(1));
    ticker.tick().await;
    tokio::time::timeout(Duration::from_secs(1), ticker.tick())
        .await
        .expect("Runtime starved by dispatch");

    for handle in handles {
        handle.await.expect("Dispatch panicked");
    }
    assert_eq!(notifier.attempts.load(Ordering::SeqCst), 20);
    assert!(
        repo.entries_with_status(&[NotificationStatus::Pending, NotificationStatus::Failed])
            .expect("Query failed")
            .is_empty()
    );
}
