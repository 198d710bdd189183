//! Drives one player's run: submissions, ticks and feedback.

use std::sync::Arc;

use derive_getters::Getters;
use innerwords_rules::{
    Grade, Phase, Session, SoundSink, TickOutcome, Turn, TurnRejection, Word, WordOracle,
    cue_accepted, cue_rejected,
};
use tracing::{debug, info, instrument};

use crate::leaderboard::{ClientMeta, Submission};

/// Shared dictionary handle.
pub type SharedOracle = Arc<dyn WordOracle + Send + Sync>;

/// Shared audio sink handle.
pub type SharedSink = Arc<dyn SoundSink + Send + Sync>;

/// Tone of a feedback line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum FeedbackKind {
    /// A move was accepted.
    Success,
    /// A move was refused.
    Error,
    /// Neutral status, such as the end of a run.
    Info,
}

/// A line of text for the player.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Feedback {
    kind: FeedbackKind,
    text: String,
}

impl Feedback {
    fn new(kind: FeedbackKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Owns a [`Session`] together with its dictionary and sound capabilities.
pub struct GameRunner {
    session: Session,
    oracle: SharedOracle,
    sink: SharedSink,
}

impl std::fmt::Debug for GameRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameRunner")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl GameRunner {
    /// Starts a run on `puzzle` with a countdown of `duration` ticks.
    #[instrument(skip(oracle, sink), fields(puzzle = %puzzle))]
    pub fn new(puzzle: Word, duration: u32, oracle: SharedOracle, sink: SharedSink) -> Self {
        info!(duration, "New run");
        Self {
            session: Session::with_duration(puzzle, duration),
            oracle,
            sink,
        }
    }

    /// The underlying session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Plays `raw` as the next move.
    ///
    /// Returns `None` for submissions after the run has ended; those are
    /// dropped without feedback or sound.
    #[instrument(skip(self))]
    pub fn submit(&mut self, raw: &str) -> Option<Feedback> {
        match self.session.submit_turn(raw, self.oracle.as_ref()) {
            Ok(turn) => {
                cue_accepted(self.sink.as_ref(), *turn.kind());
                Some(Feedback::new(FeedbackKind::Success, turn.describe()))
            }
            Err(rejection) => {
                cue_rejected(self.sink.as_ref(), &rejection);
                if rejection.is_silent() {
                    debug!("Submission dropped");
                    None
                } else {
                    Some(Feedback::new(FeedbackKind::Error, rejection.to_string()))
                }
            }
        }
    }

    /// Plays `raw` and hands back the raw engine result.
    pub fn try_submit(&mut self, raw: &str) -> Result<Turn, TurnRejection> {
        self.session.submit_turn(raw, self.oracle.as_ref())
    }

    /// Advances the countdown by one second.
    ///
    /// Returns the time-up message on the tick that ends the run.
    #[instrument(skip(self))]
    pub fn tick(&mut self) -> (TickOutcome, Option<Feedback>) {
        let outcome = self.session.tick();
        let feedback = match outcome {
            TickOutcome::TimeUp => Some(self.final_feedback()),
            _ => None,
        };
        (outcome, feedback)
    }

    /// Ends the run now. Returns `None` if it had already ended.
    #[instrument(skip(self))]
    pub fn end_now(&mut self) -> Option<Feedback> {
        self.session.end_now().then(|| self.final_feedback())
    }

    /// Starts over on the same puzzle word.
    #[instrument(skip(self))]
    pub fn play_again(&mut self) {
        debug!(score = self.session.score(), "Previous run discarded");
        self.session = self.session.clone().reset();
    }

    /// Packages a finished run for the leaderboard.
    ///
    /// Returns `None` while the run is still in progress.
    #[instrument(skip(self, client))]
    pub fn submission(&self, player_name: &str, client: ClientMeta) -> Option<Submission> {
        if !self.session.is_ended() {
            return None;
        }
        let turns = self.session.turns();
        Some(
            Submission::new(
                player_name.to_string(),
                self.session.score(),
                u32::try_from(turns.len()).unwrap_or(u32::MAX),
                self.session.puzzle().to_string(),
                Some(turns.to_vec()),
            )
            .with_client(client),
        )
    }

    /// Letter grade for the current score.
    pub fn grade(&self) -> Grade {
        Grade::for_score(self.session.score())
    }

    fn final_feedback(&self) -> Feedback {
        let reason = match self.session.phase() {
            Phase::Ended(reason) => reason.message(),
            _ => "",
        };
        Feedback::new(
            FeedbackKind::Info,
            format!(
                "{} Final score: {} (grade {}) in {} turns.",
                reason,
                self.session.score(),
                self.grade(),
                self.session.turns().len()
            ),
        )
    }
}
