//! Running score against the simulated opponent

use serde::{Deserialize, Serialize};

/// Player and opponent points
///
/// Both counters only grow. They are reset only by starting a new game.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTracker {
    player: u64,
    opponent: u64,
}

impl ScoreTracker {
    /// Adds points to the player
    pub fn award_player(&mut self, points: u64) {
        self.player = self.player.saturating_add(points);
    }

    /// Adds points to the opponent
    pub fn award_opponent(&mut self, points: u64) {
        self.opponent = self.opponent.saturating_add(points);
    }

    /// Player points
    pub fn player(&self) -> u64 {
        self.player
    }

    /// Opponent points
    pub fn opponent(&self) -> u64 {
        self.opponent
    }
}
