//! Governing-sequence discovery between a source word and a candidate.
//!
//! A sequence is the literal bridge between two words in a chain: a run of
//! at least two letters that appears contiguously in both.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::Word;

/// Shortest run of letters that can bridge two words.
pub const MIN_SEQUENCE_LEN: usize = 2;

/// Where a sequence sat in its source word.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum SequenceKind {
    /// Touches the first or last letter of the source word.
    #[display("Edge")]
    Edge,
    /// Strictly inside the source word.
    #[display("Inner")]
    Inner,
}

impl SequenceKind {
    /// Classifies a run of `len` letters starting at `start` in a word of
    /// `source_len` letters.
    pub fn classify(start: usize, len: usize, source_len: usize) -> Self {
        if start == 0 || start + len == source_len {
            Self::Edge
        } else {
            Self::Inner
        }
    }

    /// Points awarded per letter of the sequence.
    pub fn multiplier(self) -> u32 {
        match self {
            Self::Edge => 1,
            Self::Inner => 2,
        }
    }
}

/// The governing sequence found between a source word and a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
pub struct SequenceMatch {
    /// Sequence letters.
    text: String,
    /// Offset of the sequence in the source word.
    source_offset: usize,
    /// Offset of the leftmost occurrence in the candidate.
    candidate_offset: usize,
    /// Edge or inner.
    kind: SequenceKind,
}

impl SequenceMatch {
    /// Builds a match by hand, classifying it against `source_len`.
    ///
    /// [`find_governing_sequence`] is the normal way to obtain one; this
    /// exists for replaying stored turns and for exercising the guard.
    pub fn new(
        text: impl Into<String>,
        source_offset: usize,
        candidate_offset: usize,
        source_len: usize,
    ) -> Self {
        let text = text.into();
        let kind = SequenceKind::classify(source_offset, text.len(), source_len);
        Self {
            text,
            source_offset,
            candidate_offset,
            kind,
        }
    }

    /// Number of letters in the sequence.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True if the sequence has no letters (never produced by the matcher).
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Points for the sequence alone: one per letter, doubled when inner.
    pub fn points(&self) -> u32 {
        self.text.len() as u32 * self.kind.multiplier()
    }
}

/// Finds the longest run of `source` (at least two letters) that occurs
/// contiguously in `candidate`.
///
/// Runs are scanned by start offset, then by end offset, both ascending.
/// Only a strictly longer run replaces the current best, so among runs of
/// the winning length the first one scanned is kept. The candidate offset is
/// that of the leftmost occurrence.
#[instrument(skip_all, fields(source = %source, candidate = %candidate))]
pub fn find_governing_sequence(source: &Word, candidate: &Word) -> Option<SequenceMatch> {
    let src = source.as_str();
    let cand = candidate.as_str();
    let mut best: Option<SequenceMatch> = None;

    for start in 0..src.len() {
        for end in (start + MIN_SEQUENCE_LEN)..=src.len() {
            let run = &src[start..end];
            // A longer run from the same start contains this one.
            let Some(offset) = cand.find(run) else {
                break;
            };
            if best.as_ref().is_none_or(|b| run.len() > b.len()) {
                best = Some(SequenceMatch::new(run, start, offset, src.len()));
            }
        }
    }

    match &best {
        Some(m) => debug!(sequence = %m.text, kind = %m.kind, "Governing sequence found"),
        None => debug!("No shared sequence"),
    }
    best
}

/// Checks that `candidate` is exactly the letters before the match offset,
/// then the sequence, then the letters after it.
///
/// Fails for any match whose offsets do not reconstruct the candidate,
/// including offsets that run past its end.
#[instrument(skip_all, fields(candidate = %candidate, sequence = %m.text))]
pub fn verify_structure(candidate: &Word, m: &SequenceMatch) -> bool {
    let word = candidate.as_str();
    let offset = m.candidate_offset;
    let Some(prefix) = word.get(..offset) else {
        return false;
    };
    let Some(suffix) = word.get(offset + m.text.len()..) else {
        return false;
    };
    let rebuilt = format!("{prefix}{}{suffix}", m.text);
    rebuilt == word
}
