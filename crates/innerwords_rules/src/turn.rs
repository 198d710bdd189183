//! Accepted moves and the reasons a move can be refused.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

use crate::{SequenceKind, SequenceMatch, Word};

/// Why a candidate word was refused.
///
/// Every variant is a user input problem: the session is left untouched and
/// the caller re-prompts with the [`Display`](std::fmt::Display) text.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum TurnRejection {
    /// The run is over; submissions are ignored without feedback.
    #[display("The run is over.")]
    RunOver,

    /// Fewer than two letters.
    #[display("New word must be at least 2 letters.")]
    TooShort,

    /// Something other than A–Z.
    #[display("New word must be letters only (A–Z).")]
    InvalidCharacters,

    /// The dictionary does not know the word.
    #[display("\"{_0}\" is not a valid English word. Please try a different word.")]
    NotAWord(String),

    /// No run of two or more letters is shared with the current word.
    #[display(
        "No contiguous sequence from {source} found in {candidate}. The new word must contain at least 2 consecutive letters from the current word."
    )]
    NoSequenceFound {
        /// The current word.
        source: String,
        /// The refused candidate.
        candidate: String,
    },

    /// Letters were inserted inside the sequence rather than around it.
    #[display("Letters cannot be inserted inside the sequence \"{sequence}\".")]
    MalformedInsertion {
        /// The sequence that failed to reconstruct the candidate.
        sequence: String,
    },
}

impl std::error::Error for TurnRejection {}

impl TurnRejection {
    /// True for rejections that should produce no player-facing message.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::RunOver)
    }
}

/// Points earned by growing from `previous_len` letters to `new_len`.
pub fn length_bonus(new_len: usize, previous_len: usize) -> u32 {
    new_len.saturating_sub(previous_len) as u32
}

/// One accepted move.
///
/// Serializes to the stored turn-history shape:
/// `{ from, to, sequence, type, points, sequencePoints, lengthBonus, totalScore }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    /// Word the sequence was taken from.
    from: Word,
    /// Word the player formed.
    to: Word,
    /// The governing sequence.
    sequence: String,
    /// Where the sequence sat in `from`.
    #[serde(rename = "type")]
    kind: SequenceKind,
    /// `sequence_points + length_bonus`.
    points: u32,
    /// Sequence length times the kind multiplier.
    sequence_points: u32,
    /// Growth over the previous word, floored at zero.
    length_bonus: u32,
    /// Session score after this turn.
    total_score: u32,
}

impl Turn {
    /// Scores a move from `from` to `to` through `sequence`.
    ///
    /// `previous_len` is the length of the word played before `to`, and
    /// `score_before` the session score before this move.
    pub(crate) fn score(
        from: Word,
        to: Word,
        sequence: &SequenceMatch,
        previous_len: usize,
        score_before: u32,
    ) -> Self {
        let sequence_points = sequence.points();
        let length_bonus = length_bonus(to.len(), previous_len);
        let points = sequence_points + length_bonus;
        Self {
            from,
            to,
            sequence: sequence.text().clone(),
            kind: *sequence.kind(),
            points,
            sequence_points,
            length_bonus,
            total_score: score_before + points,
        }
    }

    /// Player-facing summary, e.g.
    /// `+7 points (Inner 3-letter sequence: "AND", +1 length bonus).`
    pub fn describe(&self) -> String {
        let bonus = if self.length_bonus > 0 {
            format!(", +{} length bonus", self.length_bonus)
        } else {
            String::new()
        };
        format!(
            "+{} points ({} {}-letter sequence: \"{}\"{}).",
            self.points,
            self.kind,
            self.sequence.len(),
            self.sequence,
            bonus
        )
    }
}

/// Letter grade for a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
pub enum Grade {
    /// 100 and above.
    S,
    /// 90–99.
    A,
    /// 80–89.
    B,
    /// 60–79.
    C,
    /// 40–59.
    D,
    /// Below 40.
    E,
}

impl Grade {
    /// Grades a final score.
    pub fn for_score(score: u32) -> Self {
        match score {
            100.. => Self::S,
            90..=99 => Self::A,
            80..=89 => Self::B,
            60..=79 => Self::C,
            40..=59 => Self::D,
            _ => Self::E,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_with_bonus() {
        let m = SequenceMatch::new("AND", 4, 1, 9);
        let turn = Turn::score(
            Word::parse("CORIANDER").unwrap(),
            Word::parse("HANDY").unwrap(),
            &m,
            4,
            0,
        );
        assert_eq!(*turn.points(), 7);
        assert_eq!(
            turn.describe(),
            "+7 points (Inner 3-letter sequence: \"AND\", +1 length bonus)."
        );
    }

    #[test]
    fn test_turn_json_shape() {
        let m = SequenceMatch::new("AND", 4, 1, 9);
        let turn = Turn::score(
            Word::parse("CORIANDER").unwrap(),
            Word::parse("SAND").unwrap(),
            &m,
            9,
            10,
        );
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["from"], "CORIANDER");
        assert_eq!(json["type"], "INNER");
        assert_eq!(json["sequencePoints"], 6);
        assert_eq!(json["lengthBonus"], 0);
        assert_eq!(json["totalScore"], 16);
    }

    #[test]
    fn test_length_bonus_floors_at_zero() {
        assert_eq!(length_bonus(4, 9), 0);
        assert_eq!(length_bonus(9, 4), 5);
    }

    #[test]
    fn test_grades() {
        assert_eq!(Grade::for_score(120), Grade::S);
        assert_eq!(Grade::for_score(90), Grade::A);
        assert_eq!(Grade::for_score(89), Grade::B);
        assert_eq!(Grade::for_score(60), Grade::C);
        assert_eq!(Grade::for_score(40), Grade::D);
        assert_eq!(Grade::for_score(0), Grade::E);
    }

    #[test]
    fn test_run_over_is_silent() {
        assert!(TurnRejection::RunOver.is_silent());
        assert!(!TurnRejection::TooShort.is_silent());
    }
}
