//! Game state and core simulation types
//!
//! [`GameState`] is the session controller: it owns the player, the entity
//! registry, spawn and score state, and the Running/GameOver phase. The
//! per-frame update lives in [`tick`](super::tick::tick); the discrete commands
//! (`shoot`, `restart`) live here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::events::{GameEvent, SessionObserver};
use super::registry::EntityRegistry;
use super::score::ScoreEngine;
use super::spawn::SpawnController;
use crate::error::ConfigError;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Run ended; waits for an explicit restart
    GameOver,
}

/// Playable area, supplied by the host from its viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: crate::consts::DEFAULT_WORLD_WIDTH,
            height: crate::consts::DEFAULT_WORLD_HEIGHT,
        }
    }
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// World must be finite and tall enough to fit the spawn band
    pub fn validate(&self, edge_margin: f32) -> Result<(), ConfigError> {
        let min_height = edge_margin * 2.0;
        let ok = self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height >= min_height
            && self.height > 0.0;
        if ok {
            Ok(())
        } else {
            Err(ConfigError::WorldBounds {
                width: self.width,
                height: self.height,
                min_height,
            })
        }
    }

    /// Clamp a box center so the whole box stays inside the world
    pub fn clamp(&self, center: Vec2, size: Vec2) -> Vec2 {
        let half = (size * 0.5).min(Vec2::new(self.width, self.height) * 0.5);
        center.clamp(half, Vec2::new(self.width, self.height) - half)
    }
}

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Green,
    Yellow,
    Blue,
    Purple,
    Red,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Green,
        EnemyKind::Yellow,
        EnemyKind::Blue,
        EnemyKind::Purple,
        EnemyKind::Red,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Green => "green",
            EnemyKind::Yellow => "yellow",
            EnemyKind::Blue => "blue",
            EnemyKind::Purple => "purple",
            EnemyKind::Red => "red",
        }
    }

    /// Explosion size requested from the renderer on a kill
    pub fn effect_size(&self) -> EffectSize {
        match self {
            EnemyKind::Yellow => EffectSize::Medium,
            _ => EffectSize::Small,
        }
    }
}

/// Hit visual size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectSize {
    Small,
    Medium,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Derived from input every tick
    pub vel: Vec2,
    pub alive: bool,
    pub size: Vec2,
}

impl Player {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            alive: true,
            size,
        }
    }

    /// Move back to the start position (the player is never destroyed)
    pub fn respawn(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.alive = true;
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// A player projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Frame clock time when fired (ms)
    pub fired_at: f64,
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Fixed at spawn; enemies do not re-aim
    pub vel: Vec2,
    pub points: u32,
    pub speed: f32,
    pub health: u8,
    pub size: Vec2,
}

impl Enemy {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// A score submission waiting for its delay to elapse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingSubmission {
    pub session: u32,
    pub final_score: u64,
    pub due_at: f64,
}

/// Read-only view for UI collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session: u32,
    pub phase: GamePhase,
    pub score: u64,
    pub combo_multiplier: f64,
    pub final_score: Option<u64>,
    pub player_pos: Vec2,
    pub player_alive: bool,
    pub enemies: usize,
    pub bullets: usize,
    pub spawn_delay_ms: f64,
    pub next_spawn_at: f64,
    pub wallet_address: Option<String>,
}

/// Complete session state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub world: WorldBounds,
    /// Current phase
    pub phase: GamePhase,
    /// Session counter, bumped by every restart
    pub session: u32,
    pub player: Player,
    pub registry: EntityRegistry,
    pub spawner: SpawnController,
    pub score: ScoreEngine,
    /// Captured once at the Running -> GameOver transition
    pub final_score: Option<u64>,
    /// Score submissions scheduled but not yet fired
    pub pending_submissions: Vec<PendingSubmission>,
    /// Frame clock time the current session started
    pub started_at: f64,
    /// Frame clock time of the previous tick
    pub(crate) last_tick_at: f64,
    /// Shots are refused until the clock passes this time
    fire_ready_at: Option<f64>,
    wallet_address: Option<String>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a running session starting at frame clock time `now`
    pub fn new(tuning: Tuning, world: WorldBounds, seed: u64, now: f64) -> Result<Self, ConfigError> {
        tuning.validate()?;
        world.validate(tuning.spawn.edge_margin)?;
        if !now.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "now",
                value: now,
            });
        }

        let player = Player::new(world.clamp(tuning.player.start, tuning.player.size), tuning.player.size);
        let registry = EntityRegistry::new(tuning.player.max_bullets);
        let spawner = SpawnController::new(seed, &tuning, world, now)?;
        let score = ScoreEngine::new(tuning.combo.clone(), now);

        log::info!(
            "Session 1 started: world {}x{}, seed {}",
            world.width,
            world.height,
            seed
        );

        Ok(Self {
            seed,
            tuning,
            world,
            phase: GamePhase::Running,
            session: 1,
            player,
            registry,
            spawner,
            score,
            final_score: None,
            pending_submissions: Vec::new(),
            started_at: now,
            last_tick_at: now,
            fire_ready_at: None,
            wallet_address: None,
            events: Vec::new(),
        })
    }

    /// Start a fresh session. Allowed from any phase.
    ///
    /// Submissions already scheduled by the previous session still fire, with
    /// the score frozen at their game over.
    pub fn restart(&mut self, now: f64) {
        if !now.is_finite() {
            log::warn!("Ignoring restart with non-finite clock {}", now);
            return;
        }

        self.phase = GamePhase::Running;
        self.session += 1;
        self.final_score = None;
        self.score.reset(now);
        self.spawner.reset(now);
        self.registry.clear();
        let start = self.world.clamp(self.tuning.player.start, self.player.size);
        self.player.respawn(start);
        self.started_at = now;
        self.last_tick_at = now;

        log::info!("Session {} started", self.session);
        self.emit(GameEvent::SessionRestarted {
            session: self.session,
        });
        self.emit(GameEvent::ScoreChanged {
            score: 0,
            combo: self.score.combo(),
        });
    }

    /// Fire a bullet if the cooldown has elapsed. No-op during game over.
    pub fn shoot(&mut self, now: f64) -> Option<u32> {
        if self.phase == GamePhase::GameOver || !now.is_finite() {
            return None;
        }
        if self.fire_ready_at.is_some_and(|ready_at| now <= ready_at) {
            return None;
        }

        let player = &self.tuning.player;
        let muzzle = self.player.pos + Vec2::new(player.muzzle_offset, 0.0);
        let vel = Vec2::new(player.bullet_speed, 0.0);
        let id = self.registry.add_bullet(muzzle, vel, now)?;
        self.fire_ready_at = Some(now + player.fire_rate_ms);

        self.emit(GameEvent::BulletFired { id, pos: muzzle });
        Some(id)
    }

    /// Set or clear the wallet used for score submissions.
    /// Read when a submission fires, not when it is scheduled.
    pub fn set_wallet_address(&mut self, address: Option<String>) {
        self.wallet_address = address;
    }

    pub fn wallet_address(&self) -> Option<&str> {
        self.wallet_address.as_deref()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Milliseconds since the current session started
    pub fn elapsed(&self) -> f64 {
        self.last_tick_at - self.started_at
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session: self.session,
            phase: self.phase,
            score: self.score.score(),
            combo_multiplier: self.score.combo(),
            final_score: self.final_score,
            player_pos: self.player.pos,
            player_alive: self.player.alive,
            enemies: self.registry.enemy_count(),
            bullets: self.registry.bullet_count(),
            spawn_delay_ms: self.spawner.current_delay(),
            next_spawn_at: self.spawner.next_spawn_at(),
            wallet_address: self.wallet_address.clone(),
        }
    }

    /// Queue an event for the next drain
    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand every queued event to `observer`, oldest first
    pub fn drain_events(&mut self, observer: &mut impl SessionObserver) {
        for event in self.events.drain(..) {
            observer.on_event(&event);
        }
    }

    /// Take every queued event
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
