//! Numbered daily challenges.

use derive_getters::Getters;

use crate::{Word, WordError};

/// A daily puzzle: its number, the day it ran, and the starting word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct Challenge {
    number: u32,
    date: &'static str,
    word: &'static str,
}

const CHALLENGES: &[Challenge] = &[
    Challenge::new(1, "Jan 1, 2025", "REWINDER"),
    Challenge::new(2, "Jan 2, 2025", "ACRE"),
    Challenge::new(3, "Jan 3, 2025", "CHEWINESS"),
    Challenge::new(4, "Jan 4, 2025", "MASTODON"),
    Challenge::new(5, "Jan 5, 2025", "CORIANDER"),
    Challenge::new(6, "Jan 6, 2025", "UNPRECEDENTED"),
    Challenge::new(7, "Jan 7, 2025", "EVERYTHING"),
    Challenge::new(8, "Jan 8, 2025", "FLUCTUATION"),
];

impl Challenge {
    const fn new(number: u32, date: &'static str, word: &'static str) -> Self {
        Self { number, date, word }
    }

    /// Every challenge, oldest first.
    pub fn all() -> &'static [Challenge] {
        CHALLENGES
    }

    /// Today's challenge: the highest-numbered one.
    pub fn latest() -> &'static Challenge {
        &CHALLENGES[CHALLENGES.len() - 1]
    }

    /// Looks up a challenge by number.
    pub fn by_number(number: u32) -> Option<&'static Challenge> {
        CHALLENGES.iter().find(|c| c.number == number)
    }

    /// The starting word as a [`Word`].
    ///
    /// # Errors
    ///
    /// Returns [`WordError`] if the catalog entry is not letters only.
    pub fn puzzle(&self) -> Result<Word, WordError> {
        Word::parse(self.word)
    }

    /// Hint text with two sample moves for this challenge's word.
    pub fn example_hint(&self) -> String {
        format!("E.g. {}", example_moves(self.word).join(", "))
    }
}

/// Sample moves shown as a hint for a starting word.
pub fn example_moves(word: &str) -> &'static [&'static str] {
    match word {
        "CORIANDER" => &["ARIA", "ORDAIN"],
        "CHEWINESS" => &["WINE", "CHESS"],
        "MASTODON" => &["MAST", "DONKEY"],
        "SCUTTLING" => &["CUTTING", "GUTTURAL"],
        _ => &["WORD", "EXAMPLE"],
    }
}
