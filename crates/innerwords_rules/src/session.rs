//! One player's run through a chain of words.
//!
//! A session moves `NotStarted → Running → Ended`. The first accepted turn
//! starts the countdown; the countdown reaching zero or an explicit
//! [`Session::end_now`] ends it. Ended is terminal: [`Session::reset`]
//! discards the run and returns a fresh one for the same puzzle word.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::invariants::{InvariantSet, SessionInvariants};
use crate::{
    MIN_MOVE_LEN, Turn, TurnRejection, Word, WordOracle, find_governing_sequence, normalize,
    verify_structure,
};

/// Default countdown length in ticks (seconds in the terminal client).
pub const DEFAULT_DURATION: u32 = 60;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// The countdown reached zero.
    TimeUp,
    /// The player ended the run.
    EndedByPlayer,
}

impl EndReason {
    /// Player-facing message shown when the run ends.
    pub fn message(self) -> &'static str {
        match self {
            Self::TimeUp => "Time is up! Check out your final score above.",
            Self::EndedByPlayer => "Run ended. Check out your final score above.",
        }
    }
}

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Timer idle, no turns yet.
    NotStarted,
    /// Countdown running.
    Running,
    /// Frozen; no further turns.
    Ended(EndReason),
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer not started; nothing changed.
    Idle,
    /// Countdown advanced; this many ticks remain.
    Remaining(u32),
    /// This tick ended the run. Reported once per session.
    TimeUp,
    /// The run had already ended.
    Ended,
}

/// Mutable run state, exclusively owned by one player.
#[derive(Debug, Clone)]
pub struct Session {
    puzzle: Word,
    current: Word,
    pub(crate) score: u32,
    previous_len: usize,
    pub(crate) turns: Vec<Turn>,
    phase: Phase,
    duration: u32,
    remaining: u32,
}

impl Session {
    /// Creates a session for `puzzle` with the default countdown.
    #[instrument(skip_all, fields(puzzle = %puzzle))]
    pub fn new(puzzle: Word) -> Self {
        Self::with_duration(puzzle, DEFAULT_DURATION)
    }

    /// Creates a session for `puzzle` with a countdown of `duration` ticks.
    #[instrument(skip_all, fields(puzzle = %puzzle, duration = duration))]
    pub fn with_duration(puzzle: Word, duration: u32) -> Self {
        debug!("Creating session");
        Self {
            current: puzzle.clone(),
            previous_len: puzzle.len(),
            puzzle,
            score: 0,
            turns: Vec::new(),
            phase: Phase::NotStarted,
            duration,
            remaining: duration,
        }
    }

    /// Validates and scores `raw` against the current word.
    ///
    /// Checks run in order and stop at the first failure: run over, too
    /// short, invalid characters, unknown word, no shared sequence, malformed
    /// insertion. On success the turn is appended, the score and current word
    /// advance, and the first accepted turn starts the countdown.
    ///
    /// # Errors
    ///
    /// Returns the [`TurnRejection`] for the first failed check. The session
    /// is unchanged.
    #[instrument(skip(self, oracle), fields(current = %self.current, score = self.score))]
    pub fn submit_turn<O>(&mut self, raw: &str, oracle: &O) -> Result<Turn, TurnRejection>
    where
        O: WordOracle + ?Sized,
    {
        if self.is_ended() {
            debug!("Ignoring submission after run ended");
            return Err(TurnRejection::RunOver);
        }

        let candidate = self.validate(raw, oracle).inspect_err(|rejection| {
            debug!(%rejection, "Turn rejected");
        })?;

        let sequence = find_governing_sequence(&self.current, &candidate).ok_or_else(|| {
            debug!(candidate = %candidate, "No shared sequence");
            TurnRejection::NoSequenceFound {
                source: self.current.to_string(),
                candidate: candidate.to_string(),
            }
        })?;

        if !verify_structure(&candidate, &sequence) {
            warn!(candidate = %candidate, sequence = %sequence.text(), "Structural guard failed");
            return Err(TurnRejection::MalformedInsertion {
                sequence: sequence.text().clone(),
            });
        }

        if self.phase == Phase::NotStarted {
            self.start();
        }

        let turn = Turn::score(
            self.current.clone(),
            candidate.clone(),
            &sequence,
            self.previous_len,
            self.score,
        );
        self.score = *turn.total_score();
        self.previous_len = candidate.len();
        self.current = candidate;
        self.turns.push(turn.clone());

        debug_assert!(
            SessionInvariants::check_all(self).is_ok(),
            "Session invariants violated after turn"
        );

        info!(
            to = %turn.to(),
            sequence = %turn.sequence(),
            kind = %turn.kind(),
            points = turn.points(),
            total = turn.total_score(),
            "Turn accepted"
        );
        Ok(turn)
    }

    fn validate<O>(&self, raw: &str, oracle: &O) -> Result<Word, TurnRejection>
    where
        O: WordOracle + ?Sized,
    {
        let normalized = normalize(raw);
        if normalized.chars().count() < MIN_MOVE_LEN {
            return Err(TurnRejection::TooShort);
        }
        let candidate = Word::parse(&normalized).map_err(|_| TurnRejection::InvalidCharacters)?;
        if !oracle.is_valid_word(candidate.as_str()) {
            return Err(TurnRejection::NotAWord(candidate.to_string()));
        }
        Ok(candidate)
    }

    /// Starts the countdown. Driven by the first accepted turn.
    #[instrument(skip(self))]
    fn start(&mut self) {
        info!(duration = self.duration, "Timer started");
        self.phase = Phase::Running;
        self.remaining = self.duration;
    }

    /// Consumes one elapsed tick.
    ///
    /// Only a running session counts down. The tick that reaches zero ends
    /// the run and returns [`TickOutcome::TimeUp`]; later ticks return
    /// [`TickOutcome::Ended`].
    #[instrument(skip(self), fields(remaining = self.remaining))]
    pub fn tick(&mut self) -> TickOutcome {
        match self.phase {
            Phase::NotStarted => TickOutcome::Idle,
            Phase::Ended(_) => TickOutcome::Ended,
            Phase::Running => {
                self.remaining = self.remaining.saturating_sub(1);
                if self.remaining == 0 {
                    info!(score = self.score, turns = self.turns.len(), "Time up");
                    self.phase = Phase::Ended(EndReason::TimeUp);
                    TickOutcome::TimeUp
                } else {
                    TickOutcome::Remaining(self.remaining)
                }
            }
        }
    }

    /// Ends the run immediately. Returns false if it had already ended.
    #[instrument(skip(self))]
    pub fn end_now(&mut self) -> bool {
        if self.is_ended() {
            return false;
        }
        info!(score = self.score, turns = self.turns.len(), "Run ended by player");
        self.phase = Phase::Ended(EndReason::EndedByPlayer);
        true
    }

    /// Discards this run and returns a fresh one for the same puzzle word.
    #[instrument(skip(self), fields(puzzle = %self.puzzle))]
    pub fn reset(self) -> Session {
        Session::with_duration(self.puzzle, self.duration)
    }

    /// The puzzle word the chain started from.
    pub fn puzzle(&self) -> &Word {
        &self.puzzle
    }

    /// The word the next move must bridge from.
    pub fn current_word(&self) -> &Word {
        &self.current
    }

    /// Cumulative score.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Length of the most recent word, used for the length bonus.
    pub fn previous_len(&self) -> usize {
        self.previous_len
    }

    /// Accepted turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Accepted turns, newest first, for display.
    pub fn turns_newest_first(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter().rev()
    }

    /// Words formed during the run, oldest first.
    pub fn word_chain(&self) -> Vec<&Word> {
        self.turns.iter().map(Turn::to).collect()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True once the run has ended.
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended(_))
    }

    /// Ticks left on the countdown.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Full countdown length.
    pub fn duration(&self) -> u32 {
        self.duration
    }
}
