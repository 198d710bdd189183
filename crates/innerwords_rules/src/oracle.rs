//! Dictionary capability consulted by the turn validator.

use std::collections::HashSet;

use tracing::{debug, instrument};

/// Answers whether a token is a recognised word.
///
/// Implementations must be case-insensitive and side-effect free.
pub trait WordOracle {
    /// Returns true if `token` is a valid word.
    fn is_valid_word(&self, token: &str) -> bool;
}

impl<F> WordOracle for F
where
    F: Fn(&str) -> bool,
{
    fn is_valid_word(&self, token: &str) -> bool {
        self(token)
    }
}

/// A fixed word list held as uppercase entries for O(1) lookup.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    /// Builds a list from any iterator of words, uppercasing each entry.
    ///
    /// Blank entries are skipped.
    #[instrument(skip(words))]
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: HashSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_uppercase())
            .filter(|w| !w.is_empty())
            .collect();
        debug!(count = words.len(), "Word list built");
        Self { words }
    }

    /// Parses a newline-separated word list.
    pub fn from_lines(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True if the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordOracle for WordList {
    fn is_valid_word(&self, token: &str) -> bool {
        self.words.contains(&token.trim().to_uppercase())
    }
}

impl<S: AsRef<str>> FromIterator<S> for WordList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let list = WordList::from_lines("sand\nHandy\n\n");
        assert_eq!(list.len(), 2);
        assert!(list.is_valid_word("SAND"));
        assert!(list.is_valid_word("handy"));
        assert!(!list.is_valid_word("rand"));
    }

    #[test]
    fn test_closure_oracle() {
        let oracle = |token: &str| token.len() > 3;
        assert!(oracle.is_valid_word("WORD"));
        assert!(!oracle.is_valid_word("AB"));
    }
}
