//! Score and combo multiplier
//!
//! Kills pay `floor(points * combo)` and grow the combo. After a long stretch
//! without a kill (or a player hit) the combo bleeds back toward 1 a little
//! every tick.

use crate::tuning::ComboTuning;

#[derive(Debug, Clone)]
pub struct ScoreEngine {
    score: u64,
    /// Always >= 1
    combo: f64,
    /// Frame clock time of the last kill or player hit
    last_hit_at: f64,
    tuning: ComboTuning,
}

impl ScoreEngine {
    pub fn new(tuning: ComboTuning, now: f64) -> Self {
        Self {
            score: 0,
            combo: 1.0,
            last_hit_at: now,
            tuning,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> f64 {
        self.combo
    }

    pub fn last_hit_at(&self) -> f64 {
        self.last_hit_at
    }

    /// Credit a kill; returns the points actually awarded
    pub fn on_hit(&mut self, points: u32, now: f64) -> u64 {
        let awarded = (points as f64 * self.combo).floor() as u64;
        self.score += awarded;
        self.combo += self.tuning.step;
        self.last_hit_at = now;
        awarded
    }

    /// The player was hit: combo drops straight back to 1
    pub fn on_player_hit(&mut self, now: f64) {
        self.combo = 1.0;
        self.last_hit_at = now;
    }

    /// Idle decay, called once per tick. Returns true if the combo moved.
    pub fn decay_combo(&mut self, now: f64) -> bool {
        if now - self.last_hit_at > self.tuning.decay_after_ms && self.combo > 1.0 {
            self.combo = (self.combo * self.tuning.decay_factor).max(1.0);
            return true;
        }
        false
    }

    pub fn reset(&mut self, now: f64) {
        self.score = 0;
        self.combo = 1.0;
        self.last_hit_at = now;
    }
}
