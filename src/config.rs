//! Application configuration: TOML file plus environment overrides.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use innerwords_rules::{DEFAULT_DURATION, WordList};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::notify::NotificationTemplate;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database path.
    #[serde(default = "default_db_path")]
    db_path: String,

    /// Newline-separated word list used as the dictionary.
    #[serde(default = "default_dictionary_path")]
    dictionary_path: String,

    /// Countdown length in seconds.
    #[serde(default = "default_timer_seconds")]
    timer_seconds: u32,

    /// Score notification settings.
    #[serde(default)]
    notifications: NotificationSettings,
}

/// Where and how score notifications are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Endpoint receiving the JSON POST.
    #[serde(default)]
    endpoint: Option<String>,

    /// Address the notification is routed to.
    #[serde(default)]
    recipient_email: Option<String>,

    /// Opaque routing field forwarded to the endpoint.
    #[serde(default)]
    chat_id: String,

    /// Application name forwarded to the endpoint.
    #[serde(default = "default_app_name")]
    app_name: String,

    /// Shared secret forwarded to the endpoint.
    #[serde(default)]
    secret_key: String,

    /// Delay before re-sending a failed notification.
    #[serde(default = "default_retry_delay_secs")]
    retry_delay_secs: u64,
}

#[instrument]
fn default_db_path() -> String {
    "innerwords.db".to_string()
}

#[instrument]
fn default_dictionary_path() -> String {
    "words.txt".to_string()
}

#[instrument]
fn default_timer_seconds() -> u32 {
    DEFAULT_DURATION
}

#[instrument]
fn default_app_name() -> String {
    "InnerWords".to_string()
}

#[instrument]
fn default_retry_delay_secs() -> u64 {
    60
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            recipient_email: None,
            chat_id: String::new(),
            app_name: default_app_name(),
            secret_key: String::new(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

impl NotificationSettings {
    /// Retry delay as a [`Duration`].
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Builds the message template, if a recipient is configured.
    #[instrument(skip(self))]
    pub fn template(&self) -> Option<NotificationTemplate> {
        let recipient = self.recipient_email.clone()?;
        Some(NotificationTemplate::new(
            recipient,
            self.chat_id.clone(),
            self.app_name.clone(),
            self.secret_key.clone(),
        ))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            dictionary_path: default_dictionary_path(),
            timer_seconds: default_timer_seconds(),
            notifications: NotificationSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if config.timer_seconds == 0 {
            return Err(ConfigError::new("timer_seconds must be at least 1"));
        }
        info!(db_path = %config.db_path, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists (defaults otherwise), then applies
    /// environment overrides.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(p) if p.exists() => Self::from_file(p)?,
            Some(p) => {
                info!("Config file not found at {}, using defaults", p.display());
                Self::default()
            }
            None => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Applies overrides looked up by environment variable name.
    ///
    /// Recognised keys: `INNERWORDS_DB`, `INNERWORDS_DICTIONARY`,
    /// `EMAIL_NOTIFICATION_ENDPOINT`, `RECIPIENT_EMAIL`, `CHAT_ID`,
    /// `APP_NAME`, `SECRET_KEY`.
    #[instrument(skip(self, lookup))]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("INNERWORDS_DB") {
            self.db_path = v;
        }
        if let Some(v) = lookup("INNERWORDS_DICTIONARY") {
            self.dictionary_path = v;
        }
        let n = &mut self.notifications;
        if let Some(v) = lookup("EMAIL_NOTIFICATION_ENDPOINT") {
            n.endpoint = Some(v);
        }
        if let Some(v) = lookup("RECIPIENT_EMAIL") {
            n.recipient_email = Some(v);
        }
        if let Some(v) = lookup("CHAT_ID") {
            n.chat_id = v;
        }
        if let Some(v) = lookup("APP_NAME") {
            n.app_name = v;
        }
        if let Some(v) = lookup("SECRET_KEY") {
            n.secret_key = v;
        }
        self
    }

    /// Replaces the database path.
    pub fn set_db_path(&mut self, db_path: String) {
        self.db_path = db_path;
    }

    /// Replaces the dictionary path.
    pub fn set_dictionary_path(&mut self, dictionary_path: String) {
        self.dictionary_path = dictionary_path;
    }
}

/// Reads a newline-separated word list from disk.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_word_list(path: impl AsRef<Path>) -> Result<WordList, ConfigError> {
    let content = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ConfigError::new(format!("Failed to read dictionary: {}", e)))?;
    let list = WordList::from_lines(&content);
    if list.is_empty() {
        warn!("Dictionary is empty; every move will be rejected");
    }
    info!(words = list.len(), "Dictionary loaded");
    Ok(list)
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
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
