//! Configuration constants for the practice round system
//!
//! This module contains the timing bounds, point values and spoken phrases
//! used throughout the round state machine so that every component agrees
//! on the same numbers.

/// Timing constants for the answer window and lockout
pub mod timing {
    /// Default number of seconds the player has to answer once the question was read
    pub const DEFAULT_TIMER_SECONDS: u64 = 10;
    /// Number of seconds used by the stricter variant of the round
    pub const STRICT_TIMER_SECONDS: u64 = 5;
    /// Minimum configurable answer window in seconds
    pub const MIN_TIMER_SECONDS: u64 = 1;
    /// Maximum configurable answer window in seconds
    pub const MAX_TIMER_SECONDS: u64 = 240;
    /// Length of the mandatory pause after buzzing, in milliseconds
    pub const LOCKOUT_MILLIS: u64 = 1000;
    /// Upper bound for a configurable lockout, in milliseconds
    pub const MAX_LOCKOUT_MILLIS: u64 = 10_000;
    /// Interval between two countdown ticks, in milliseconds
    pub const TICK_MILLIS: u64 = 1000;
}

/// Point values awarded when a round is graded
pub mod points {
    /// Points for a correct toss-up
    pub const TOSSUP: u64 = 1;
    /// Points for a correct bonus
    pub const BONUS: u64 = 10;
    /// Points the opponent gets for a miss or a timeout
    pub const OPPONENT: u64 = 1;
}

/// Question source limits
pub mod source {
    /// Number of malformed records skipped before a round start gives up
    pub const MAX_MALFORMED_RETRIES: usize = 3;
    /// Maximum length of a prompt in characters
    pub const MAX_PROMPT_LENGTH: usize = 2000;
    /// Maximum length of a canonical answer in characters
    pub const MAX_ANSWER_LENGTH: usize = 500;
    /// Maximum length of a subject label in characters
    pub const MAX_SUBJECT_LENGTH: usize = 100;
}

/// Phrases sent to the presenter outside of the question itself
pub mod phrases {
    /// Spoken right after a buzz
    pub const BUZZ_CONFIRMATION: &str = "Bee one";
    /// Spoken after a correct answer
    pub const CORRECT: &str = "Correct";
    /// Spoken after a wrong answer
    pub const INCORRECT: &str = "Incorrect";
    /// Prefix for bonus questions
    pub const BONUS_PREFIX: &str = "Bonus, ";
}
