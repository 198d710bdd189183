//! First-class invariants over a session's turn log.
//!
//! Each invariant is a logical property that must hold after every accepted
//! turn. They are checked in debug builds by [`Session::submit_turn`] and can
//! be tested independently.
//!
//! [`Session::submit_turn`]: crate::Session::submit_turn

use crate::{Session, Turn, length_bonus};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<_> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ]
        .into_iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Invariant: every turn's points decompose into sequence points and bonus.
///
/// `points == sequence_points + length_bonus` and
/// `sequence_points == sequence.len() * multiplier(kind)`.
pub struct PointsDecompose;

impl PointsDecompose {
    /// Checks a single turn.
    pub fn turn_holds(turn: &Turn) -> bool {
        let expected_seq = turn.sequence().len() as u32 * turn.kind().multiplier();
        *turn.sequence_points() == expected_seq
            && *turn.points() == turn.sequence_points() + turn.length_bonus()
    }
}

impl Invariant<Session> for PointsDecompose {
    fn holds(session: &Session) -> bool {
        session.turns().iter().all(Self::turn_holds)
    }

    fn description() -> &'static str {
        "Turn points equal sequence points plus length bonus"
    }
}

/// Invariant: running totals are prefix sums of points and end at the score.
pub struct RunningTotal;

impl Invariant<Session> for RunningTotal {
    fn holds(session: &Session) -> bool {
        let mut sum = 0u32;
        for turn in session.turns() {
            sum += turn.points();
            if *turn.total_score() != sum {
                return false;
            }
        }
        sum == session.score()
    }

    fn description() -> &'static str {
        "Running totals are prefix sums of points and match the session score"
    }
}

/// Invariant: the log forms an unbroken chain from the puzzle word to the
/// current word, and each bonus is measured against the previous word.
pub struct UnbrokenChain;

impl Invariant<Session> for UnbrokenChain {
    fn holds(session: &Session) -> bool {
        let mut expected_from = session.puzzle();
        for turn in session.turns() {
            if turn.from() != expected_from {
                return false;
            }
            if *turn.length_bonus() != length_bonus(turn.to().len(), expected_from.len()) {
                return false;
            }
            expected_from = turn.to();
        }
        expected_from == session.current_word() && expected_from.len() == session.previous_len()
    }

    fn description() -> &'static str {
        "Turns chain from the puzzle word to the current word"
    }
}

/// All session invariants as a composable set.
pub type SessionInvariants = (PointsDecompose, RunningTotal, UnbrokenChain);
