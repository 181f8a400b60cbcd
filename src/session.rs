//! Capabilities provided by the presentation layer
//!
//! The round state machine never talks to a speech engine or a screen
//! directly. It is handed a [`Presenter`] that reads text aloud and a
//! [`StatusSink`] that renders status events. Implementations might drive a
//! browser's speech synthesis, a desktop TTS engine, or simply print to a
//! terminal.

use super::{StatusMessage, speech::Utterance};

/// Reads text aloud and reports when it is done
///
/// Completion is reported back to the state machine as a
/// `Command::SpeechFinished` carrying the utterance id. An implementation
/// must report at most one completion per utterance, and never for an
/// utterance that was canceled.
pub trait Presenter {
    /// Starts reading the utterance, replacing anything still being read
    fn speak(&self, utterance: &Utterance);

    /// Stops the current utterance
    ///
    /// Calling this when nothing is being read has no effect.
    fn cancel(&self);
}

/// Receives the status events emitted by the state machine
///
/// This is the only coupling between the round logic and whatever renders
/// it.
pub trait StatusSink {
    /// Delivers one status event
    fn send_status(&self, status: &StatusMessage);
}
