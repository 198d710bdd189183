//! Audio cues as an injected capability.

use crate::{SequenceKind, TurnRejection};

/// Receives audio cues at the boundary between the engine and its front end.
///
/// Nothing in the engine plays sounds itself; a front end passes its sink to
/// whatever drives the session and decides how (or whether) to play them.
pub trait SoundSink {
    /// An edge-sequence turn was accepted.
    fn play_success(&self);

    /// An inner-sequence turn was accepted.
    fn play_inner_sequence(&self);

    /// A turn was refused.
    fn play_error(&self);
}

/// Plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl SoundSink for SilentSink {
    fn play_success(&self) {}
    fn play_inner_sequence(&self) {}
    fn play_error(&self) {}
}

/// Plays the cue for an accepted turn of the given kind.
pub fn cue_accepted(sink: &(impl SoundSink + ?Sized), kind: SequenceKind) {
    match kind {
        SequenceKind::Inner => sink.play_inner_sequence(),
        SequenceKind::Edge => sink.play_success(),
    }
}

/// Plays the error cue unless the rejection is silent.
pub fn cue_rejected(sink: &(impl SoundSink + ?Sized), rejection: &TurnRejection) {
    if !rejection.is_silent() {
        sink.play_error();
    }
}
