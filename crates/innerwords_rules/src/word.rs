//! Normalized word tokens.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Minimum number of letters in a submitted move.
pub const MIN_MOVE_LEN: usize = 2;

/// An uppercase token made only of the letters A–Z.
///
/// Every `Word` has passed [`Word::parse`], so byte offsets and character
/// offsets coincide and slicing by byte index is always on a char boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display)]
#[serde(try_from = "String", into = "String")]
pub struct Word(String);

/// Reasons a raw token cannot become a [`Word`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum WordError {
    /// Nothing left after trimming.
    #[display("word is empty")]
    Empty,
    /// Contains a character outside A–Z.
    #[display("word must be letters only (A–Z)")]
    InvalidCharacters,
}

/// Trims surrounding whitespace and uppercases.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

impl Word {
    /// Normalizes `raw` and checks that it is non-empty and letters only.
    ///
    /// # Errors
    ///
    /// Returns [`WordError`] when the normalized token is empty or contains
    /// anything other than A–Z.
    #[instrument]
    pub fn parse(raw: &str) -> Result<Self, WordError> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Err(WordError::Empty);
        }
        if !normalized.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(WordError::InvalidCharacters);
        }
        Ok(Self(normalized))
    }

    /// The word as an uppercase string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of letters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a parsed word; provided for API completeness.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Word {
    type Error = WordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.0
    }
}

impl std::str::FromStr for Word {
    type Err = WordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
