//! # Tossup
//!
//! This library provides the core logic of a single-player quiz bowl
//! practice tool. A question is read aloud, a countdown runs, the player
//! may buzz in, answers, and is scored against a simulated opponent that
//! takes the point whenever the player misses or runs out of time. A correct
//! toss-up unlocks its bonus question for the next round.
//!
//! The crate owns no clock and no speech engine. Hosts implement
//! [`session::Presenter`] and [`session::StatusSink`], forward player input as
//! [`round::Command`]s, and deliver scheduled [`AlarmMessage`]s back after the
//! requested delay.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

use serde::{Deserialize, Serialize};
use web_time::Duration;

pub mod config;
pub mod constants;
pub mod question;
pub mod round;
pub mod score;
pub mod session;
pub mod speech;
pub mod timer;

use question::QuestionKind;
use round::{Outcome, Rejection};

/// Alarm messages for timed transitions
///
/// The host delivers each alarm back to [`round::Round::receive_alarm`] once
/// the requested delay has elapsed. Alarms that no longer apply are ignored,
/// so the host never needs to cancel them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::From, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Countdown alarms
    Timer(timer::AlarmMessage),
    /// Round alarms
    Round(round::AlarmMessage),
}

/// Status events emitted towards the rendering layer
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum StatusMessage {
    /// A question is being read
    Presenting {
        /// Sequence number of the round
        round: u64,
        /// Category label
        subject: String,
        /// Short answer or multiple choice
        kind: QuestionKind,
        /// Whether this is a bonus follow-up
        is_bonus: bool,
    },
    /// Reading finished; the countdown runs
    AwaitingAnswer {
        /// Length of the countdown
        seconds: u64,
        /// Whether option selection is enabled
        options_enabled: bool,
    },
    /// One second of the countdown elapsed
    Tick {
        /// Seconds left
        remaining_seconds: u64,
    },
    /// The player buzzed; answers are refused for the lockout
    Locked {
        /// Length of the lockout
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        lockout: Duration,
    },
    /// The lockout is over; an answer is expected
    LockoutEnded {
        /// Whether option selection is enabled
        options_enabled: bool,
    },
    /// The round was graded
    Graded {
        /// How the round ended
        outcome: Outcome,
        /// Points the player received
        player_points: u64,
        /// Points the opponent received
        opponent_points: u64,
    },
    /// Running score after grading
    Score {
        /// Player total
        player: u64,
        /// Opponent total
        opponent: u64,
    },
    /// No question could be drawn
    EmptySource,
    /// The drawn record could not be used
    MalformedQuestion {
        /// Why the record was rejected
        reason: String,
    },
    /// An input was ignored
    Rejected {
        /// Why it was ignored
        reason: Rejection,
    },
}

impl StatusMessage {
    /// Converts the status to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}
