//! InnerWords rules engine.
//!
//! A player chains words by lifting a run of at least two letters out of
//! the current word and building a new word around it. Runs taken from the
//! interior of a word score double; growing the word earns a length bonus.
//!
//! # Architecture
//!
//! - **Sequence matcher**: [`find_governing_sequence`] and the structural
//!   guard [`verify_structure`]
//! - **Validator and scorer**: [`Session::submit_turn`]
//! - **Session state machine**: [`Session`], [`Phase`], [`TickOutcome`]
//! - **Capabilities**: [`WordOracle`] for the dictionary, [`SoundSink`] for
//!   audio cues
//!
//! # Example
//!
//! ```
//! use innerwords_rules::{Session, SequenceKind, WordList};
//!
//! let dictionary = WordList::new(["SAND", "HANDY"]);
//! let mut session = Session::new("CORIANDER".parse()?);
//!
//! let turn = session.submit_turn("sand", &dictionary)?;
//! assert_eq!(turn.sequence(), "AND");
//! assert_eq!(*turn.kind(), SequenceKind::Inner);
//! assert_eq!(session.score(), 6);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod challenge;
pub mod invariants;
mod oracle;
mod sequence;
mod session;
mod sound;
mod turn;
mod word;

pub use challenge::{Challenge, example_moves};
pub use oracle::{WordList, WordOracle};
pub use sequence::{
    MIN_SEQUENCE_LEN, SequenceKind, SequenceMatch, find_governing_sequence, verify_structure,
};
pub use session::{DEFAULT_DURATION, EndReason, Phase, Session, TickOutcome};
pub use sound::{SilentSink, SoundSink, cue_accepted, cue_rejected};
pub use turn::{Grade, Turn, TurnRejection, length_bonus};
pub use word::{MIN_MOVE_LEN, Word, WordError, normalize};
