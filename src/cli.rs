//! Command-line interface for innerwords.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// InnerWords - chain words through shared letter runs against the clock
#[derive(Parser, Debug)]
#[command(name = "innerwords")]
#[command(about = "Timed word-chaining game with a leaderboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = "innerwords.toml")]
    pub config: PathBuf,

    /// Override the database path
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a run in the terminal
    Play {
        /// Starting word (defaults to today's challenge)
        #[arg(short, long, conflicts_with = "challenge")]
        word: Option<String>,

        /// Challenge number to play
        #[arg(long)]
        challenge: Option<u32>,

        /// Name recorded on the leaderboard
        #[arg(short, long)]
        player: Option<String>,

        /// Override the dictionary path
        #[arg(long)]
        dictionary: Option<String>,

        /// Do not submit the finished run
        #[arg(long)]
        no_submit: bool,

        /// Ring the terminal bell on accepted and refused moves
        #[arg(long)]
        bell: bool,
    },

    /// Show the top scores for a word
    Top {
        /// Puzzle word (defaults to today's challenge)
        word: Option<String>,

        /// Maximum number of rows
        #[arg(short, long, default_value_t = innerwords::DEFAULT_LIMIT)]
        limit: i64,
    },

    /// Show the rank a score would have for a word
    Rank {
        /// Puzzle word
        word: String,

        /// Score to rank
        score: u32,
    },

    /// List the challenge catalog
    Challenges,

    /// Show visitor statistics
    Visitors,

    /// Re-send notifications still pending or failed
    Resend,
}
