//! Enemy spawn scheduling
//!
//! The first enemy arrives `initial_delay_ms` into a session. That spawn arms a
//! recurring timer whose delay starts at the midpoint of the interval range and
//! shrinks by `difficulty_factor` after every timed spawn, down to
//! `min_interval_ms`. The timer is a plain "next spawn due" timestamp.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{EnemyKind, WorldBounds};
use crate::consts::OFFSCREEN_MARGIN;
use crate::error::ConfigError;
use crate::tuning::{SpawnTuning, Tuning};
use crate::{angle_between, heading_to_velocity};

/// What to spawn and where
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub kind: EnemyKind,
    /// Just off the right edge
    pub pos: Vec2,
    /// Random offset (radians) added to the aim at the player
    pub heading_jitter: f32,
}

impl SpawnRequest {
    /// Fixed velocity aimed at `target` (the player's current position)
    pub fn velocity_toward(&self, target: Vec2, speed: f32) -> Vec2 {
        heading_to_velocity(angle_between(self.pos, target) + self.heading_jitter, speed)
    }
}

#[derive(Debug, Clone)]
pub struct SpawnController {
    rng: Pcg32,
    /// Spawnable kinds only (weight > 0), in table order
    table: Vec<(EnemyKind, u32)>,
    /// Sum of `table` weights (cannot overflow: at most five u32 terms)
    total_weight: u64,
    tuning: SpawnTuning,
    world: WorldBounds,
    /// Current inter-spawn delay (ms), never below `min_interval_ms`
    current_delay: f64,
    next_spawn_at: f64,
    /// False until the initial-delay spawn has come due
    timer_armed: bool,
}

impl SpawnController {
    /// Fails if the world is too short for the spawn band
    pub fn new(seed: u64, tuning: &Tuning, world: WorldBounds, now: f64) -> Result<Self, ConfigError> {
        world.validate(tuning.spawn.edge_margin)?;
        let table: Vec<_> = tuning
            .enemies
            .weights()
            .into_iter()
            .filter(|&(_, weight)| weight > 0)
            .collect();
        let total_weight = table.iter().map(|&(_, w)| u64::from(w)).sum();
        let spawn = tuning.spawn.clone();

        Ok(Self {
            rng: Pcg32::seed_from_u64(seed),
            table,
            total_weight,
            current_delay: spawn.seeded_delay(),
            next_spawn_at: now + spawn.initial_delay_ms,
            timer_armed: false,
            tuning: spawn,
            world,
        })
    }

    /// Current inter-spawn delay (ms)
    pub fn current_delay(&self) -> f64 {
        self.current_delay
    }

    /// Frame clock time the next spawn is due
    pub fn next_spawn_at(&self) -> f64 {
        self.next_spawn_at
    }

    /// Re-seed the delay and re-arm the initial delay (RNG stream continues)
    pub fn reset(&mut self, now: f64) {
        self.current_delay = self.tuning.seeded_delay();
        self.next_spawn_at = now + self.tuning.initial_delay_ms;
        self.timer_armed = false;
    }

    /// Decide whether an enemy spawns this tick
    pub fn tick(&mut self, now: f64, active_enemy_count: usize) -> Option<SpawnRequest> {
        if now < self.next_spawn_at {
            return None;
        }

        if active_enemy_count >= self.tuning.max_enemies as usize || self.total_weight == 0 {
            // Skipped occurrence: the timer keeps its delay and its schedule
            self.timer_armed = true;
            self.schedule_next(now);
            log::debug!(
                "Spawn skipped at {:.0} ms ({} enemies alive)",
                now,
                active_enemy_count
            );
            return None;
        }

        if self.timer_armed {
            self.current_delay =
                (self.current_delay * self.tuning.difficulty_factor).max(self.tuning.min_interval_ms);
        } else {
            self.timer_armed = true;
        }
        self.schedule_next(now);

        let kind = self.choose_kind();
        let margin = self.tuning.edge_margin;
        let y = self.rng.random_range(margin..=self.world.height - margin);
        let jitter = self.tuning.aim_jitter;
        let heading_jitter = self.rng.random_range(-jitter..=jitter);

        Some(SpawnRequest {
            kind,
            pos: Vec2::new(self.world.width + OFFSCREEN_MARGIN, y),
            heading_jitter,
        })
    }

    /// Advance the schedule by one delay from when the spawn was due, not from
    /// the frame that noticed it. A clock that fell a whole delay behind
    /// resyncs to `now` instead of bursting.
    fn schedule_next(&mut self, now: f64) {
        let next = self.next_spawn_at + self.current_delay;
        self.next_spawn_at = if next > now { next } else { now + self.current_delay };
    }

    /// Weighted pick, independent per call
    fn choose_kind(&mut self) -> EnemyKind {
        let mut roll = self.rng.random_range(0..self.total_weight);
        for &(kind, weight) in &self.table {
            let weight = u64::from(weight);
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        // Unreachable while total_weight is the sum of the table
        self.table.last().map(|&(kind, _)| kind).unwrap_or(EnemyKind::Green)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn controller(seed: u64) -> SpawnController {
        SpawnController::new(seed, &Tuning::default(), WorldBounds::default(), 0.0).unwrap()
    }

    #[test]
    fn test_initial_delay() {
        let mut spawner = controller(1);
        assert!(spawner.tick(0.0, 0).is_none());
        assert!(spawner.tick(1999.0, 0).is_none());
        assert!(spawner.tick(2000.0, 0).is_some());
        // The initial spawn arms the timer without speeding it up
        assert_eq!(spawner.current_delay(), 2250.0);
        assert_eq!(spawner.next_spawn_at(), 4250.0);
    }

    #[test]
    fn test_delay_shrinks_after_each_timed_spawn() {
        let mut spawner = controller(1);
        spawner.tick(2000.0, 0).unwrap();
        assert!(spawner.tick(4249.0, 0).is_none());
        spawner.tick(4250.0, 1).unwrap();
        assert_eq!(spawner.current_delay(), 2250.0 * 0.95);
        assert_eq!(spawner.next_spawn_at(), 4250.0 + 2250.0 * 0.95);
    }

    #[test]
    fn test_delay_floors_at_min_interval() {
        let mut spawner = controller(3);
        let mut prev = spawner.current_delay();
        for _ in 0..100 {
            let due = spawner.next_spawn_at();
            spawner.tick(due, 0).unwrap();
            assert!(spawner.current_delay() <= prev);
            assert!(spawner.current_delay() >= 1500.0);
            prev = spawner.current_delay();
        }
        assert_eq!(spawner.current_delay(), 1500.0);
    }

    #[test]
    fn test_no_spawn_at_cap_and_delay_untouched() {
        let mut spawner = controller(1);
        spawner.tick(2000.0, 0).unwrap();
        assert!(spawner.tick(4250.0, 15).is_none());
        assert_eq!(spawner.current_delay(), 2250.0);
        // Comes due again one delay later
        assert_eq!(spawner.next_spawn_at(), 6500.0);
        assert!(spawner.tick(5000.0, 3).is_none());
        assert!(spawner.tick(6500.0, 14).is_some());
        assert_eq!(spawner.current_delay(), 2250.0 * 0.95);
    }

    #[test]
    fn test_late_ticks_do_not_drift_the_schedule() {
        let mut spawner = controller(1);
        // Noticed 10 ms late: still due 2250 ms after 2000
        spawner.tick(2010.0, 0).unwrap();
        assert_eq!(spawner.next_spawn_at(), 4250.0);
        // Skipped at the cap, noticed 16 ms late
        assert!(spawner.tick(4266.0, 15).is_none());
        assert_eq!(spawner.next_spawn_at(), 6500.0);
        assert!(spawner.tick(6505.0, 15).is_none());
        assert_eq!(spawner.next_spawn_at(), 8750.0);
    }

    #[test]
    fn test_stalled_clock_resyncs_without_burst() {
        let mut spawner = controller(1);
        spawner.tick(2000.0, 0).unwrap();
        spawner.tick(50_000.0, 0).unwrap();
        let delay = spawner.current_delay();
        assert_eq!(spawner.next_spawn_at(), 50_000.0 + delay);
        assert!(spawner.tick(50_016.0, 0).is_none());
    }

    #[test]
    fn test_short_world_is_rejected() {
        let err = SpawnController::new(1, &Tuning::default(), WorldBounds::new(800.0, 99.0), 0.0)
            .unwrap_err();
        assert!(matches!(err, ConfigError::WorldBounds { .. }));
        assert!(SpawnController::new(1, &Tuning::default(), WorldBounds::new(800.0, 100.0), 0.0).is_ok());
    }

    #[test]
    fn test_huge_weights_do_not_overflow() {
        let mut tuning = Tuning::default();
        tuning.enemies.green.spawn_weight = u32::MAX;
        tuning.enemies.yellow.spawn_weight = u32::MAX;
        let mut spawner = SpawnController::new(8, &tuning, WorldBounds::default(), 0.0).unwrap();
        let kind = spawner.tick(2000.0, 0).unwrap().kind;
        assert!(matches!(kind, EnemyKind::Green | EnemyKind::Yellow));
    }

    #[test]
    fn test_skipped_initial_spawn_still_arms_timer() {
        let mut spawner = controller(1);
        assert!(spawner.tick(2000.0, 99).is_none());
        assert_eq!(spawner.next_spawn_at(), 4250.0);
        spawner.tick(4250.0, 0).unwrap();
        assert_eq!(spawner.current_delay(), 2250.0 * 0.95);
    }

    #[test]
    fn test_spawn_position_is_off_right_edge() {
        let mut spawner = controller(11);
        for _ in 0..200 {
            let now = spawner.next_spawn_at();
            let req = spawner.tick(now, 0).unwrap();
            assert_eq!(req.pos.x, 850.0);
            assert!(req.pos.y >= 50.0 && req.pos.y <= 550.0);
            assert!(req.heading_jitter.abs() <= 0.2);
        }
    }

    #[test]
    fn test_weighted_selection_skips_disabled_kinds() {
        let mut spawner = controller(42);
        let (mut green, mut yellow) = (0, 0);
        for _ in 0..4000 {
            let now = spawner.next_spawn_at();
            match spawner.tick(now, 0).unwrap().kind {
                EnemyKind::Green => green += 1,
                EnemyKind::Yellow => yellow += 1,
                other => panic!("disabled kind spawned: {:?}", other),
            }
        }
        // Weights 5:3
        let ratio = green as f64 / (green + yellow) as f64;
        assert!((ratio - 0.625).abs() < 0.05, "green ratio {}", ratio);
    }

    #[test]
    fn test_single_enabled_kind() {
        let mut tuning = Tuning::default();
        tuning.enemies.green.spawn_weight = 0;
        tuning.enemies.yellow.spawn_weight = 0;
        tuning.enemies.red.spawn_weight = 1;
        let mut spawner = SpawnController::new(5, &tuning, WorldBounds::default(), 0.0).unwrap();
        for _ in 0..50 {
            let now = spawner.next_spawn_at();
            assert_eq!(spawner.tick(now, 0).unwrap().kind, EnemyKind::Red);
        }
    }

    #[test]
    fn test_velocity_aims_at_target() {
        let req = SpawnRequest {
            kind: EnemyKind::Green,
            pos: Vec2::new(850.0, 300.0),
            heading_jitter: 0.0,
        };
        let vel = req.velocity_toward(Vec2::new(400.0, 300.0), 100.0);
        assert!((vel.x + 100.0).abs() < 1e-3);
        assert!(vel.y.abs() < 1e-3);

        let tilted = SpawnRequest {
            heading_jitter: 0.2,
            ..req
        };
        let vel = tilted.velocity_toward(Vec2::new(400.0, 300.0), 100.0);
        assert!((vel.length() - 100.0).abs() < 1e-3);
        assert!(vel.y < 0.0);
    }

    #[test]
    fn test_reset_rearms_initial_delay() {
        let mut spawner = controller(1);
        for _ in 0..5 {
            let now = spawner.next_spawn_at();
            spawner.tick(now, 0);
        }
        assert!(spawner.current_delay() < 2250.0);
        spawner.reset(20_000.0);
        assert_eq!(spawner.current_delay(), 2250.0);
        assert_eq!(spawner.next_spawn_at(), 22_000.0);
        assert!(spawner.tick(21_999.0, 0).is_none());
        spawner.tick(22_000.0, 0).unwrap();
        assert_eq!(spawner.current_delay(), 2250.0);
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = controller(99);
        let mut b = controller(99);
        for _ in 0..20 {
            let now = a.next_spawn_at();
            assert_eq!(a.tick(now, 0), b.tick(now, 0));
        }
    }

    proptest! {
        #[test]
        fn prop_delay_never_below_floor(
            seed in any::<u64>(),
            counts in proptest::collection::vec(0usize..20, 1..100),
        ) {
            let mut spawner = controller(seed);
            for count in counts {
                let now = spawner.next_spawn_at();
                let spawned = spawner.tick(now, count);
                prop_assert_eq!(spawned.is_some(), count < 15);
                prop_assert!(spawner.current_delay() >= 1500.0);
                prop_assert!(spawner.next_spawn_at() > now);
            }
        }
    }
}
