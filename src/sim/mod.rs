//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes from the caller's frame clock only
//! - Seeded RNG only
//! - Stable iteration order (insertion order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod events;
pub mod registry;
pub mod score;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, HitEvent, resolve_bullet_enemy_overlaps, resolve_player_enemy_overlap};
pub use events::{EntityKind, GameEvent, SessionObserver};
pub use registry::EntityRegistry;
pub use score::ScoreEngine;
pub use spawn::{SpawnController, SpawnRequest};
pub use state::{
    Bullet, EffectSize, Enemy, EnemyKind, GamePhase, GameState, PendingSubmission, Player,
    SessionSnapshot, WorldBounds,
};
pub use tick::{TickInput, tick};
