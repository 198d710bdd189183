//! InnerWords - terminal client
//!
//! Plays runs line by line and reads the leaderboard.

#![warn(missing_docs)]

mod cli;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use innerwords::{
    AppConfig, ClientMeta, FeedbackKind, GameRunner, HttpNotifier, LeaderboardRepository,
    LeaderboardService, SharedOracle, SharedSink, load_word_list,
};
use innerwords_rules::{Challenge, SilentSink, SoundSink, TickOutcome, Word, normalize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

/// How long the client waits for the first notification attempt before exiting.
const DISPATCH_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(Some(cli.config.as_path()))?;
    if let Some(db) = cli.db {
        config.set_db_path(db);
    }

    match cli.command {
        Command::Play {
            word,
            challenge,
            player,
            dictionary,
            no_submit,
            bell,
        } => {
            if let Some(path) = dictionary {
                config.set_dictionary_path(path);
            }
            let puzzle = pick_puzzle(word, challenge)?;
            run_play(config, puzzle, player, no_submit, bell).await
        }
        Command::Top { word, limit } => show_top(&config, word, limit),
        Command::Rank { word, score } => show_rank(&config, &word, score),
        Command::Challenges => {
            show_challenges();
            Ok(())
        }
        Command::Visitors => show_visitors(&config),
        Command::Resend => resend(&config).await,
    }
}

/// Rings the terminal bell for every audible cue.
struct TerminalBell;

impl SoundSink for TerminalBell {
    fn play_success(&self) {
        ring(1);
    }

    fn play_inner_sequence(&self) {
        ring(2);
    }

    fn play_error(&self) {
        ring(1);
    }
}

fn ring(times: usize) {
    let mut err = std::io::stderr();
    let _ = err.write_all("\x07".repeat(times).as_bytes());
    let _ = err.flush();
}

#[instrument]
fn pick_puzzle(word: Option<String>, challenge: Option<u32>) -> Result<Word> {
    let challenge = match (word, challenge) {
        (Some(word), _) => return Ok(Word::parse(&word)?),
        (None, Some(number)) => Challenge::by_number(number)
            .with_context(|| format!("No challenge #{}", number))?,
        (None, None) => Challenge::latest(),
    };
    println!(
        "Challenge #{} ({}): {}",
        challenge.number(),
        challenge.date(),
        challenge.example_hint()
    );
    Ok(challenge.puzzle()?)
}

#[instrument(skip(config))]
fn build_service(config: &AppConfig) -> Result<LeaderboardService> {
    let repository = LeaderboardRepository::new(config.db_path().clone())?;
    repository.run_migrations()?;

    let settings = config.notifications();
    let service = match (settings.endpoint(), settings.template()) {
        (Some(endpoint), Some(template)) => LeaderboardService::with_notifier(
            repository,
            Arc::new(HttpNotifier::new(endpoint.clone())),
            template,
            settings.retry_delay(),
        ),
        _ => {
            warn!("Notifications not configured; scores will be marked failed");
            LeaderboardService::new(repository)
        }
    };
    Ok(service)
}

#[instrument(skip(config, puzzle), fields(puzzle = %puzzle))]
async fn run_play(
    config: AppConfig,
    puzzle: Word,
    player: Option<String>,
    no_submit: bool,
    bell: bool,
) -> Result<()> {
    let oracle: SharedOracle = Arc::new(load_word_list(config.dictionary_path())?);
    let sink: SharedSink = if bell {
        Arc::new(TerminalBell)
    } else {
        Arc::new(SilentSink)
    };
    let mut runner = GameRunner::new(puzzle, *config.timer_seconds(), oracle, sink);

    println!(
        "Start word: {}. Type a word sharing two or more consecutive letters.",
        runner.session().current_word()
    );
    println!(
        "The {}s timer starts on your first accepted word. Commands: :end, :reset",
        runner.session().duration()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match runner.tick() {
                    (_, Some(feedback)) => {
                        println!("\n{}", feedback.text());
                        break;
                    }
                    (TickOutcome::Remaining(left), None) if left % 10 == 0 => {
                        println!("{}s left", left);
                    }
                    _ => {}
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    if let Some(feedback) = runner.end_now() {
                        println!("{}", feedback.text());
                    }
                    break;
                };
                match line.trim() {
                    ":end" => {
                        if let Some(feedback) = runner.end_now() {
                            println!("{}", feedback.text());
                        }
                        break;
                    }
                    ":reset" => {
                        runner.play_again();
                        println!("Back to {}. Score 0.", runner.session().current_word());
                    }
                    "" => {}
                    input => {
                        if let Some(feedback) = runner.submit(input) {
                            let marker = match feedback.kind() {
                                FeedbackKind::Success => "+",
                                FeedbackKind::Error => "!",
                                FeedbackKind::Info => "-",
                            };
                            println!("{} {}", marker, feedback.text());
                            let session = runner.session();
                            println!(
                                "  Now: {}  Score: {}  Time: {}s",
                                session.current_word(),
                                session.score(),
                                session.remaining()
                            );
                        }
                    }
                }
            }
        }
    }

    let chain: Vec<String> = runner
        .session()
        .word_chain()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    if !chain.is_empty() {
        println!("Chain: {} -> {}", runner.session().puzzle(), chain.join(" -> "));
    }

    if no_submit || runner.session().turns().is_empty() {
        return Ok(());
    }

    let player = match player {
        Some(name) => name,
        None => {
            println!("Name for the leaderboard (blank to skip):");
            lines.next_line().await?.unwrap_or_default()
        }
    };
    if player.trim().is_empty() {
        info!("Submission skipped");
        return Ok(());
    }

    let client = ClientMeta::new(
        None,
        Some(format!("innerwords-cli/{}", env!("CARGO_PKG_VERSION"))),
    );
    let submission = runner
        .submission(&player, client)
        .context("Run has not ended")?;
    let word = submission.word().clone();
    let score = *submission.score();

    let service = build_service(&config)?;
    let receipt = service.submit(submission)?;
    let rank = service.rank_of(&word, score)?;
    let players = service.entry_count(&word)?;
    println!(
        "Saved as {}. Rank {} of {} for {}.",
        receipt.entry_id(),
        rank,
        players,
        word
    );

    if tokio::time::timeout(DISPATCH_GRACE, receipt.into_dispatch())
        .await
        .is_err()
    {
        println!("Notification still pending; run `innerwords resend` later.");
    }
    Ok(())
}

#[instrument(skip(config))]
fn show_top(config: &AppConfig, word: Option<String>, limit: i64) -> Result<()> {
    let word = word
        .map(|w| normalize(&w))
        .unwrap_or_else(|| Challenge::latest().word().to_string());
    let service = build_service(config)?;
    let entries = service.top_scores(&word, limit)?;
    if entries.is_empty() {
        println!("No scores yet for {}.", word);
        return Ok(());
    }
    println!("Top scores for {}:", word);
    for (position, entry) in entries.iter().enumerate() {
        println!(
            "{:>3}. {:<20} {:>5} pts  {:>3} turns  {}",
            position + 1,
            entry.player_name(),
            entry.score(),
            entry.turns(),
            entry.submitted_at().format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

#[instrument(skip(config))]
fn show_rank(config: &AppConfig, word: &str, score: u32) -> Result<()> {
    let word = normalize(word);
    let service = build_service(config)?;
    let rank = service.rank_of(&word, score)?;
    let players = service.entry_count(&word)?;
    println!("{} points on {} ranks {} of {}.", score, word, rank, players.max(rank));
    Ok(())
}

fn show_challenges() {
    for challenge in Challenge::all() {
        println!(
            "#{:<3} {:<12} {}",
            challenge.number(),
            challenge.date(),
            challenge.word()
        );
    }
}

#[instrument(skip(config))]
fn show_visitors(config: &AppConfig) -> Result<()> {
    let stats = build_service(config)?.unique_ip_stats()?;
    println!(
        "{} unique visitors, {} visits",
        stats.unique_ip_count(),
        stats.total_visits()
    );
    for visitor in stats.recent() {
        println!(
            "  {:<40} {:>4} visits  last {}",
            visitor.ip_address(),
            visitor.visit_count(),
            visitor.last_visit().format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

#[instrument(skip(config))]
async fn resend(config: &AppConfig) -> Result<()> {
    let service = build_service(config)?;
    let handles = service.resume_notifications()?;
    println!("Re-sending {} notifications. Ctrl+C to stop.", handles.len());
    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "Dispatch task failed");
        }
    }
    Ok(())
}
