//! Score-submitted notifications sent to an external HTTP endpoint.

use async_trait::async_trait;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::db::LeaderboardEntry;

/// JSON body posted to the notification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct ScoreNotification {
    to_email: String,
    subject: String,
    message: String,
    chat_id: String,
    app_name: String,
    secret_key: String,
}

/// Recipient and routing fields shared by every notification.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct NotificationTemplate {
    recipient_email: String,
    chat_id: String,
    app_name: String,
    secret_key: String,
}

impl NotificationTemplate {
    /// Creates a template.
    #[instrument(skip(secret_key))]
    pub fn new(
        recipient_email: String,
        chat_id: String,
        app_name: String,
        secret_key: String,
    ) -> Self {
        Self {
            recipient_email,
            chat_id,
            app_name,
            secret_key,
        }
    }

    /// Renders the notification for a stored entry.
    #[instrument(skip(self, entry), fields(entry_id = entry.id()))]
    pub fn render(&self, entry: &LeaderboardEntry) -> ScoreNotification {
        let mut message = format!(
            "New high score achieved in InnerWords!\n\n\
             Player: {}\n\
             Score: {} points\n\
             Turns: {}\n\
             Word: {}\n\
             Time: {} UTC\n",
            entry.player_name(),
            entry.score(),
            entry.turns(),
            entry.word().to_uppercase(),
            entry.submitted_at().format("%Y-%m-%d %H:%M:%S"),
        );
        if let Some(ip) = entry.ip_address() {
            message.push_str(&format!("IP Address: {}\n", ip));
        }
        message.push_str("\nGreat job!");

        ScoreNotification {
            to_email: self.recipient_email.clone(),
            subject: format!("New InnerWords Score: {} points!", entry.score()),
            message,
            chat_id: self.chat_id.clone(),
            app_name: self.app_name.clone(),
            secret_key: self.secret_key.clone(),
        }
    }
}

/// Delivers a rendered notification.
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Sends one notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] on transport failure or a non-2xx response.
    async fn send(&self, notification: &ScoreNotification) -> Result<(), NotifyError>;
}

/// Posts notifications as JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotifier {
    /// Creates a notifier for `endpoint`.
    #[instrument]
    pub fn new(endpoint: String) -> Self {
        info!(endpoint = %endpoint, "Creating HTTP notifier");
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// The endpoint notifications are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    #[instrument(skip(self, notification), fields(endpoint = %self.endpoint))]
    async fn send(&self, notification: &ScoreNotification) -> Result<(), NotifyError> {
        debug!("Posting score notification");
        let response = self
            .client
            .post(&self.endpoint)
            .json(notification)
            .send()
            .await
            .map_err(|e| NotifyError::new(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, body = %body, "Notification endpoint responded");

        if status.is_success() {
            info!("Score notification sent");
            Ok(())
        } else {
            warn!(status = %status, body = %body, "Notification endpoint refused");
            Err(NotifyError::new(format!("Endpoint returned {}: {}", status, body)))
        }
    }
}

/// Notification delivery error.
#[derive(Debug, Clone, Display, Error)]
#[display("Notification error: {} at {}:{}", message, file, line)]
pub struct NotifyError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl NotifyError {
    /// Creates a new notification error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
