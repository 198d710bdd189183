//! Tests for configuration loading and overrides.

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use innerwords::{AppConfig, load_word_list};
use innerwords_rules::WordOracle;
use tempfile::NamedTempFile;

#[test]
fn test_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.db_path(), "innerwords.db");
    assert_eq!(config.dictionary_path(), "words.txt");
    assert_eq!(config.timer_seconds(), &60);
    assert!(config.notifications().endpoint().is_none());
    assert_eq!(config.notifications().retry_delay(), Duration::from_secs(60));
    assert!(config.notifications().template().is_none());
}

#[test]
fn test_from_toml_partial_file() {
    let config = AppConfig::from_toml(
        r#"
        db_path = "scores.db"
        timer_seconds = 90

        [notifications]
        endpoint = "https://example.com/notify"
        recipient_email = "me@example.com"
        retry_delay_secs = 5
        "#,
    )
    .expect("Parse failed");

    assert_eq!(config.db_path(), "scores.db");
    assert_eq!(config.dictionary_path(), "words.txt");
    assert_eq!(config.timer_seconds(), &90);
    let n = config.notifications();
    assert_eq!(n.endpoint().as_deref(), Some("https://example.com/notify"));
    assert_eq!(n.app_name(), "InnerWords");
    assert_eq!(n.retry_delay(), Duration::from_secs(5));
    let template = n.template().expect("Template missing");
    assert_eq!(template.recipient_email(), "me@example.com");
}

#[test]
fn test_from_toml_rejects_zero_timer() {
    assert!(AppConfig::from_toml("timer_seconds = 0").is_err());
}

#[test]
fn test_from_toml_rejects_garbage() {
    let err = AppConfig::from_toml("db_path = [").expect_err("Should fail");
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_from_file_missing_fails() {
    assert!(AppConfig::from_file("/definitely/not/here.toml").is_err());
}

#[test]
fn test_overrides_replace_file_values() {
    let vars: HashMap<&str, &str> = [
        ("INNERWORDS_DB", "/tmp/other.db"),
        ("EMAIL_NOTIFICATION_ENDPOINT", "https://hooks.example.com"),
        ("RECIPIENT_EMAIL", "ops@example.com"),
        ("CHAT_ID", "42"),
        ("APP_NAME", "Inner"),
        ("SECRET_KEY", "k"),
    ]
    .into_iter()
    .collect();

    let config = AppConfig::default().with_overrides(|key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(config.db_path(), "/tmp/other.db");
    assert_eq!(config.dictionary_path(), "words.txt");
    let n = config.notifications();
    assert_eq!(n.endpoint().as_deref(), Some("https://hooks.example.com"));
    assert_eq!(n.chat_id(), "42");
    assert_eq!(n.app_name(), "Inner");
    assert_eq!(n.secret_key(), "k");
    assert!(n.template().is_some());
}

#[test]
fn test_load_without_file_uses_defaults() {
    let config = AppConfig::load(Some(std::path::Path::new("/no/such/innerwords.toml")))
        .expect("Load failed");
    assert_eq!(config.timer_seconds(), &60);
}

#[test]
fn test_load_word_list() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "sand\nHandy\n\n  ardor  ").expect("Write failed");

    let words = load_word_list(file.path()).expect("Load failed");
    assert_eq!(words.len(), 3);
    assert!(words.is_valid_word("SAND"));
    assert!(words.is_valid_word("handy"));
    assert!(words.is_valid_word("Ardor"));
    assert!(!words.is_valid_word("CAR"));
}

#[test]
fn test_load_word_list_missing_file_fails() {
    assert!(load_word_list("/no/such/words.txt").is_err());
}
