//! Outbound simulation events
//!
//! The simulation never talks to renderers, audio, or backends directly.
//! Everything observable is queued as a [`GameEvent`] during a tick and handed
//! to a [`SessionObserver`] when the host drains the queue.

use glam::Vec2;
use serde::Serialize;

use super::collision::HitEvent;
use super::state::EnemyKind;

/// Which registry an entity lived in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Bullet,
    Enemy,
}

/// Something the outside world may want to react to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// Player fired (muzzle flash / shot sound)
    BulletFired { id: u32, pos: Vec2 },
    /// A new enemy entered from the right edge
    EnemySpawned { id: u32, kind: EnemyKind, pos: Vec2 },
    /// An enemy was killed by a bullet (hit visual)
    EnemyHit(HitEvent),
    /// An enemy survived a hit
    EnemyDamaged { id: u32, kind: EnemyKind, health: u8 },
    /// An entity left the simulation
    EntityDestroyed { kind: EntityKind, id: u32 },
    /// Score or combo multiplier changed
    ScoreChanged { score: u64, combo: f64 },
    /// Fatal collision; the run is over (game-over visual at `pos`)
    SessionEnded { session: u32, final_score: u64, pos: Vec2 },
    /// Deferred score submission for the backend collaborator
    ScoreSubmission {
        session: u32,
        final_score: u64,
        wallet_address: Option<String>,
    },
    /// A fresh session started
    SessionRestarted { session: u32 },
}

/// Narrow interface for UI/audio/backend collaborators
pub trait SessionObserver {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F> SessionObserver for F
where
    F: FnMut(&GameEvent),
{
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}
