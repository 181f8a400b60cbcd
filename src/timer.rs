//! Round countdown timer
//!
//! The timer never sleeps. Like every other timed transition in the crate it
//! asks the host to deliver an [`AlarmMessage`] after a delay, one tick per
//! second. Each arming bumps a generation number that is carried in the
//! alarm, so a tick that was already queued when the timer was canceled or
//! re-armed is recognized as stale and dropped.

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::constants::timing::TICK_MILLIS;

/// Alarm messages driving the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// One second elapsed for the timer armed as `generation`
    Tick {
        /// Generation the tick belongs to
        generation: u64,
    },
}

/// Result of delivering a tick to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belongs to a canceled or replaced countdown
    Stale,
    /// The countdown continues with this many seconds left
    Running(u64),
    /// The countdown reached zero; reported exactly once per arming
    Expired,
}

/// One-shot countdown
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RoundTimer {
    generation: u64,
    armed: bool,
    remaining: u64,
}

impl RoundTimer {
    /// Arms the countdown, implicitly canceling any armed one
    pub fn start<S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        seconds: u64,
        mut schedule_message: S,
    ) {
        if self.armed {
            log::debug!("re-arming timer, dropping generation {}", self.generation);
        }
        self.generation += 1;
        self.armed = true;
        self.remaining = seconds;
        Self::schedule_tick(self.generation, &mut schedule_message);
    }

    /// Disarms the countdown; does nothing if it is not armed
    pub fn cancel(&mut self) {
        self.armed = false;
    }

    /// Whether a countdown is running
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Seconds left on the current countdown
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Handles a tick alarm
    pub fn receive_tick<S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        generation: u64,
        mut schedule_message: S,
    ) -> TickOutcome {
        if !self.armed || generation != self.generation {
            return TickOutcome::Stale;
        }

        self.remaining = self.remaining.saturating_sub(1);

        if self.remaining == 0 {
            self.armed = false;
            TickOutcome::Expired
        } else {
            Self::schedule_tick(self.generation, &mut schedule_message);
            TickOutcome::Running(self.remaining)
        }
    }

    fn schedule_tick<S: FnMut(crate::AlarmMessage, Duration)>(
        generation: u64,
        schedule_message: &mut S,
    ) {
        schedule_message(
            AlarmMessage::Tick { generation }.into(),
            Duration::from_millis(TICK_MILLIS),
        );
    }
}
