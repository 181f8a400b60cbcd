//! Round configuration
//!
//! [`Options`] gathers everything a practice session can tune: the length of
//! the answer window, the lockout after a buzz, how short answers are
//! compared, and which subjects are drawn. Options are validated with
//! `garde` before a session starts.

use std::time::Duration;

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    constants::timing::{
        DEFAULT_TIMER_SECONDS, LOCKOUT_MILLIS, MAX_LOCKOUT_MILLIS, MAX_TIMER_SECONDS,
        MIN_TIMER_SECONDS, STRICT_TIMER_SECONDS,
    },
    question::Filter,
};

type ValidationResult = garde::Result;

/// Validates that a whole number of seconds falls within bounds
fn validate_duration<const MIN_SECONDS: u64, const MAX_SECONDS: u64>(
    val: &Duration,
    _ctx: &(),
) -> ValidationResult {
    if val.subsec_nanos() == 0 && (MIN_SECONDS..=MAX_SECONDS).contains(&val.as_secs()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "must be a whole number of seconds in [{MIN_SECONDS},{MAX_SECONDS}]",
        )))
    }
}

fn validate_lockout(val: &Duration, _ctx: &()) -> ValidationResult {
    if val.as_millis() <= u128::from(MAX_LOCKOUT_MILLIS) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "lockout longer than {MAX_LOCKOUT_MILLIS}ms"
        )))
    }
}

/// How a short answer submission is compared with the canonical answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMatching {
    /// Trimmed submission must equal the stored answer exactly
    #[default]
    Exact,
    /// Both sides are trimmed and compared without regard to case
    IgnoreCase,
}

impl AnswerMatching {
    /// Whether `submission` counts as `canonical`
    pub fn matches(self, submission: &str, canonical: &str) -> bool {
        match self {
            Self::Exact => submission.trim() == canonical,
            Self::IgnoreCase => submission.trim().to_lowercase() == canonical.trim().to_lowercase(),
        }
    }
}

/// Settings for a practice session
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Options {
    /// Answer window started once the question has been read
    #[garde(custom(validate_duration::<MIN_TIMER_SECONDS, MAX_TIMER_SECONDS>))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    timer_duration: Duration,
    /// Pause after a buzz during which answers are refused
    #[garde(custom(validate_lockout))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    lockout: Duration,
    /// Short answer comparison
    #[garde(skip)]
    #[serde(default)]
    answer_matching: AnswerMatching,
    /// Restricts the questions drawn
    #[garde(skip)]
    #[serde(default)]
    filter: Filter,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timer_duration: Duration::from_secs(DEFAULT_TIMER_SECONDS),
            lockout: Duration::from_millis(LOCKOUT_MILLIS),
            answer_matching: AnswerMatching::default(),
            filter: Filter::default(),
        }
    }
}

impl Options {
    /// The stricter variant with a five second window
    pub fn strict() -> Self {
        Self::default().with_timer_seconds(STRICT_TIMER_SECONDS)
    }

    /// Sets the answer window
    #[must_use]
    pub fn with_timer_seconds(mut self, seconds: u64) -> Self {
        self.timer_duration = Duration::from_secs(seconds);
        self
    }

    /// Sets the lockout after a buzz
    #[must_use]
    pub fn with_lockout(mut self, lockout: Duration) -> Self {
        self.lockout = lockout;
        self
    }

    /// Sets the short answer comparison
    #[must_use]
    pub fn with_answer_matching(mut self, answer_matching: AnswerMatching) -> Self {
        self.answer_matching = answer_matching;
        self
    }

    /// Sets the question filter
    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Answer window in whole seconds
    pub fn timer_seconds(&self) -> u64 {
        self.timer_duration.as_secs()
    }

    /// Lockout after a buzz
    pub fn lockout(&self) -> Duration {
        self.lockout
    }

    /// Short answer comparison
    pub fn answer_matching(&self) -> AnswerMatching {
        self.answer_matching
    }

    /// Question filter
    pub fn filter(&self) -> &Filter {
        &self.filter
    }
}
