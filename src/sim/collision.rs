//! Collision detection and response
//!
//! Everything is an axis-aligned box sized to its sprite's on-screen footprint.
//! Bullet/enemy overlaps destroy the bullet and damage the enemy; any
//! player/enemy overlap is fatal.

use glam::Vec2;
use serde::Serialize;

use super::registry::EntityRegistry;
use super::state::{EffectSize, EnemyKind, Player};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    /// Box centered at `center` with full width/height `size`
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
        }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// True if the interiors intersect (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let reach = self.half_extents + other.half_extents;
        d.x < reach.x && d.y < reach.y
    }
}

/// One bullet striking one enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HitEvent {
    pub bullet_id: u32,
    pub enemy_id: u32,
    pub kind: EnemyKind,
    pub points: u32,
    /// Enemy position at impact
    pub pos: Vec2,
    pub effect: EffectSize,
    /// Health left after the hit; 0 means the enemy was destroyed
    pub remaining_health: u8,
}

impl HitEvent {
    pub fn is_kill(&self) -> bool {
        self.remaining_health == 0
    }
}

/// Resolve every bullet/enemy overlap for this tick.
///
/// Bullets are visited in insertion order; each one strikes the earliest
/// inserted enemy it overlaps and is consumed. Killed enemies leave the
/// registry immediately, so no enemy is killed twice.
pub fn resolve_bullet_enemy_overlaps(registry: &mut EntityRegistry, bullet_size: Vec2) -> Vec<HitEvent> {
    let bullets: Vec<(u32, Aabb)> = registry
        .bullets()
        .iter()
        .map(|b| (b.id, Aabb::new(b.pos, bullet_size)))
        .collect();

    let mut hits = Vec::new();
    for (bullet_id, bullet_box) in bullets {
        let Some(enemy_id) = registry
            .enemies()
            .iter()
            .find(|e| e.aabb().overlaps(&bullet_box))
            .map(|e| e.id)
        else {
            continue;
        };

        registry.remove_bullet(bullet_id);
        let Some(enemy) = registry.enemy_mut(enemy_id) else {
            continue;
        };
        enemy.health = enemy.health.saturating_sub(1);
        let hit = HitEvent {
            bullet_id,
            enemy_id,
            kind: enemy.kind,
            points: enemy.points,
            pos: enemy.pos,
            effect: enemy.kind.effect_size(),
            remaining_health: enemy.health,
        };
        if hit.is_kill() {
            registry.remove_enemy(enemy_id);
        }
        hits.push(hit);
    }
    hits
}

/// True if the player touches any enemy
pub fn resolve_player_enemy_overlap(player: &Player, registry: &EntityRegistry) -> bool {
    let player_box = player.aabb();
    registry.enemies().iter().any(|e| e.aabb().overlaps(&player_box))
}
