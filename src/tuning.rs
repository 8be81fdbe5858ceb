//! Data-driven game balance
//!
//! Every gameplay constant that a designer may want to tweak lives here.
//! Tuning is plain JSON; missing keys fall back to the defaults below, so a
//! file overriding a single value is valid.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, non_negative, unit_factor};
use crate::sim::EnemyKind;

/// Player ship balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Movement speed (units/s) along each pressed axis
    pub speed: f32,
    /// Bullet speed (units/s), always rightward
    pub bullet_speed: f32,
    /// Milliseconds between shots
    pub fire_rate_ms: f64,
    /// Canonical start position (also used on restart)
    pub start: Vec2,
    /// Bullets spawn this far ahead of the ship
    pub muzzle_offset: f32,
    /// Live bullet pool size
    pub max_bullets: usize,
    /// Ship collision footprint (full width/height)
    pub size: Vec2,
    /// Bullet collision footprint (full width/height)
    pub bullet_size: Vec2,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: 300.0,
            bullet_speed: 500.0,
            fire_rate_ms: 200.0,
            start: Vec2::new(400.0, 550.0),
            muzzle_offset: 30.0,
            max_bullets: 50,
            size: Vec2::new(32.0, 32.0),
            bullet_size: Vec2::new(12.0, 6.0),
        }
    }
}

/// Per-variant enemy stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub points: u32,
    pub speed: f32,
    pub health: u8,
    /// Relative spawn likelihood; 0 disables the variant
    pub spawn_weight: u32,
    /// Collision footprint (full width/height)
    pub size: Vec2,
}

impl EnemyStats {
    fn new(points: u32, speed: f32, health: u8, spawn_weight: u32, size: f32) -> Self {
        Self {
            points,
            speed,
            health,
            spawn_weight,
            size: Vec2::splat(size),
        }
    }
}

/// Stat table for every enemy variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTable {
    pub green: EnemyStats,
    pub yellow: EnemyStats,
    pub blue: EnemyStats,
    pub purple: EnemyStats,
    pub red: EnemyStats,
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self {
            green: EnemyStats::new(10, 100.0, 1, 5, 28.0),
            yellow: EnemyStats::new(25, 150.0, 1, 3, 32.0),
            blue: EnemyStats::new(50, 120.0, 2, 0, 36.0),
            purple: EnemyStats::new(100, 180.0, 3, 0, 40.0),
            red: EnemyStats::new(500, 100.0, 10, 0, 64.0),
        }
    }
}

impl EnemyTable {
    pub fn get(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Green => &self.green,
            EnemyKind::Yellow => &self.yellow,
            EnemyKind::Blue => &self.blue,
            EnemyKind::Purple => &self.purple,
            EnemyKind::Red => &self.red,
        }
    }

    /// (kind, weight) pairs in declaration order
    pub fn weights(&self) -> Vec<(EnemyKind, u32)> {
        EnemyKind::ALL
            .iter()
            .map(|&kind| (kind, self.get(kind).spawn_weight))
            .collect()
    }
}

/// Spawn pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Delay before the first spawn of a session (ms)
    pub initial_delay_ms: f64,
    /// Floor for the inter-spawn delay (ms)
    pub min_interval_ms: f64,
    /// Upper end of the interval range (ms); the delay starts at the midpoint
    pub max_interval_ms: f64,
    /// Multiplier applied to the delay after each timed spawn, in (0, 1)
    pub difficulty_factor: f64,
    /// No spawns while this many enemies are alive
    pub max_enemies: u32,
    /// Enemies spawn this far inside the top/bottom edges
    pub edge_margin: f32,
    /// Random heading jitter (radians, +/-)
    pub aim_jitter: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            initial_delay_ms: 2000.0,
            min_interval_ms: 1500.0,
            max_interval_ms: 3000.0,
            difficulty_factor: 0.95,
            max_enemies: 15,
            edge_margin: 50.0,
            aim_jitter: 0.2,
        }
    }
}

impl SpawnTuning {
    /// Delay a fresh session starts with
    pub fn seeded_delay(&self) -> f64 {
        self.min_interval_ms + (self.max_interval_ms - self.min_interval_ms) * 0.5
    }
}

/// Combo multiplier dynamics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboTuning {
    /// Added to the multiplier on every kill
    pub step: f64,
    /// Idle time (ms) before the multiplier starts decaying
    pub decay_after_ms: f64,
    /// Per-tick decay factor once idle, in (0, 1)
    pub decay_factor: f64,
}

impl Default for ComboTuning {
    fn default() -> Self {
        Self {
            step: 0.1,
            decay_after_ms: 10_000.0,
            decay_factor: 0.99,
        }
    }
}

/// Complete game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub enemies: EnemyTable,
    pub spawn: SpawnTuning,
    pub combo: ComboTuning,
    /// Delay between game over and the score submission (ms)
    pub submit_delay_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: PlayerTuning::default(),
            enemies: EnemyTable::default(),
            spawn: SpawnTuning::default(),
            combo: ComboTuning::default(),
            submit_delay_ms: 500.0,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let player = &self.player;
        non_negative("player.speed", player.speed as f64)?;
        non_negative("player.bullet_speed", player.bullet_speed as f64)?;
        non_negative("player.fire_rate_ms", player.fire_rate_ms)?;
        non_negative("player.muzzle_offset", player.muzzle_offset as f64)?;
        for (field, v) in [
            ("player.start", player.start),
            ("player.size", player.size),
            ("player.bullet_size", player.bullet_size),
        ] {
            non_negative(field, v.x as f64)?;
            non_negative(field, v.y as f64)?;
        }

        let spawn = &self.spawn;
        non_negative("spawn.initial_delay_ms", spawn.initial_delay_ms)?;
        non_negative("spawn.min_interval_ms", spawn.min_interval_ms)?;
        non_negative("spawn.max_interval_ms", spawn.max_interval_ms)?;
        non_negative("spawn.edge_margin", spawn.edge_margin as f64)?;
        non_negative("spawn.aim_jitter", spawn.aim_jitter as f64)?;
        if spawn.min_interval_ms > spawn.max_interval_ms {
            return Err(ConfigError::SpawnIntervalRange {
                min: spawn.min_interval_ms,
                max: spawn.max_interval_ms,
            });
        }
        unit_factor("spawn.difficulty_factor", spawn.difficulty_factor)?;

        for kind in EnemyKind::ALL {
            let stats = self.enemies.get(kind);
            non_negative("enemies.speed", stats.speed as f64)?;
            non_negative("enemies.size", stats.size.x as f64)?;
            non_negative("enemies.size", stats.size.y as f64)?;
        }
        let total_weight = self
            .enemies
            .weights()
            .iter()
            .try_fold(0u32, |total, &(_, w)| total.checked_add(w));
        match total_weight {
            None => return Err(ConfigError::SpawnWeightOverflow),
            Some(0) => return Err(ConfigError::NoSpawnableEnemies),
            Some(_) => {}
        }

        non_negative("combo.step", self.combo.step)?;
        non_negative("combo.decay_after_ms", self.combo.decay_after_ms)?;
        unit_factor("combo.decay_factor", self.combo.decay_factor)?;

        non_negative("submit_delay_ms", self.submit_delay_ms)?;
        Ok(())
    }
}
