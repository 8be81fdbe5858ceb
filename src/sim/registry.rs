//! Live bullets and enemies
//!
//! Both sets iterate in insertion order so replays are deterministic. Ids come
//! from a single counter that is never rewound, so an id is never reused, not
//! even across `clear()`.

use glam::Vec2;

use super::state::{Bullet, Enemy, EnemyKind};
use crate::consts::OFFSCREEN_MARGIN;
use crate::tuning::EnemyStats;

/// Owner of every bullet and enemy in a session
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    bullets: Vec<Bullet>,
    enemies: Vec<Enemy>,
    max_bullets: usize,
    next_id: u32,
}

impl EntityRegistry {
    pub fn new(max_bullets: usize) -> Self {
        Self {
            bullets: Vec::with_capacity(max_bullets),
            enemies: Vec::new(),
            max_bullets,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a bullet, unless the pool is full
    pub fn add_bullet(&mut self, pos: Vec2, vel: Vec2, now: f64) -> Option<u32> {
        if self.bullets.len() >= self.max_bullets {
            return None;
        }
        let id = self.next_entity_id();
        self.bullets.push(Bullet {
            id,
            pos,
            vel,
            fired_at: now,
        });
        Some(id)
    }

    pub fn add_enemy(&mut self, kind: EnemyKind, stats: &EnemyStats, pos: Vec2, vel: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.enemies.push(Enemy {
            id,
            kind,
            pos,
            vel,
            points: stats.points,
            speed: stats.speed,
            health: stats.health.max(1),
            size: stats.size,
        });
        id
    }

    pub fn remove_bullet(&mut self, id: u32) -> Option<Bullet> {
        let idx = self.bullets.iter().position(|b| b.id == id)?;
        Some(self.bullets.remove(idx))
    }

    pub fn remove_enemy(&mut self, id: u32) -> Option<Enemy> {
        let idx = self.enemies.iter().position(|e| e.id == id)?;
        Some(self.enemies.remove(idx))
    }

    pub fn bullet(&self, id: u32) -> Option<&Bullet> {
        self.bullets.iter().find(|b| b.id == id)
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub(crate) fn enemy_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn for_each_bullet(&self, f: impl FnMut(&Bullet)) {
        self.bullets.iter().for_each(f);
    }

    pub fn for_each_enemy(&self, f: impl FnMut(&Enemy)) {
        self.enemies.iter().for_each(f);
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn bullet_count(&self) -> usize {
        self.bullets.len()
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Integrate every entity's velocity over `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        for bullet in &mut self.bullets {
            bullet.pos += bullet.vel * dt;
        }
        for enemy in &mut self.enemies {
            enemy.pos += enemy.vel * dt;
        }
    }

    /// Freeze every enemy in place
    pub fn halt(&mut self) {
        for enemy in &mut self.enemies {
            enemy.vel = Vec2::ZERO;
        }
    }

    /// Drop bullets that left the world horizontally; returns their ids
    pub fn cull_offscreen_bullets(&mut self, world_width: f32) -> Vec<u32> {
        let mut culled = Vec::new();
        self.bullets.retain(|b| {
            let inside = b.pos.x <= world_width + OFFSCREEN_MARGIN && b.pos.x >= -OFFSCREEN_MARGIN;
            if !inside {
                culled.push(b.id);
            }
            inside
        });
        culled
    }

    /// Empty both sets (ids keep counting)
    pub fn clear(&mut self) {
        self.bullets.clear();
        self.enemies.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::EnemyTable;
    use proptest::prelude::*;

    fn green() -> EnemyStats {
        EnemyTable::default().green
    }

    #[test]
    fn test_add_and_remove() {
        let mut reg = EntityRegistry::new(50);
        let b = reg.add_bullet(Vec2::new(10.0, 10.0), Vec2::X, 0.0).unwrap();
        let e = reg.add_enemy(EnemyKind::Green, &green(), Vec2::new(850.0, 100.0), Vec2::NEG_X);
        assert_ne!(b, e);
        assert_eq!(reg.bullet_count(), 1);
        assert_eq!(reg.enemy_count(), 1);

        let enemy = reg.remove_enemy(e).unwrap();
        assert_eq!(enemy.points, 10);
        assert_eq!(enemy.health, 1);
        assert!(reg.remove_enemy(e).is_none());
        assert!(reg.remove_bullet(b).is_some());
        assert_eq!(reg.enemy_count(), 0);
        assert_eq!(reg.bullet_count(), 0);
    }

    #[test]
    fn test_bullet_pool_is_capped() {
        let mut reg = EntityRegistry::new(2);
        assert!(reg.add_bullet(Vec2::ZERO, Vec2::X, 0.0).is_some());
        assert!(reg.add_bullet(Vec2::ZERO, Vec2::X, 0.0).is_some());
        assert!(reg.add_bullet(Vec2::ZERO, Vec2::X, 0.0).is_none());
    }

    #[test]
    fn test_iteration_is_insertion_ordered() {
        let mut reg = EntityRegistry::new(50);
        let ids: Vec<u32> = (0..5)
            .map(|i| reg.add_enemy(EnemyKind::Green, &green(), Vec2::splat(i as f32), Vec2::ZERO))
            .collect();
        reg.remove_enemy(ids[2]);
        let mut seen = Vec::new();
        reg.for_each_enemy(|e| seen.push(e.id));
        assert_eq!(seen, vec![ids[0], ids[1], ids[3], ids[4]]);
    }

    #[test]
    fn test_cull_uses_margin_on_both_sides() {
        let mut reg = EntityRegistry::new(50);
        let keep_right = reg.add_bullet(Vec2::new(850.0, 0.0), Vec2::X, 0.0).unwrap();
        let drop_right = reg.add_bullet(Vec2::new(850.1, 0.0), Vec2::X, 0.0).unwrap();
        let keep_left = reg.add_bullet(Vec2::new(-50.0, 0.0), Vec2::X, 0.0).unwrap();
        let drop_left = reg.add_bullet(Vec2::new(-50.1, 0.0), Vec2::X, 0.0).unwrap();

        let culled = reg.cull_offscreen_bullets(800.0);
        assert_eq!(culled, vec![drop_right, drop_left]);
        let mut left = Vec::new();
        reg.for_each_bullet(|b| left.push(b.id));
        assert_eq!(left, vec![keep_right, keep_left]);
    }

    #[test]
    fn test_advance_and_halt() {
        let mut reg = EntityRegistry::new(50);
        let b = reg.add_bullet(Vec2::ZERO, Vec2::new(500.0, 0.0), 0.0).unwrap();
        let e = reg.add_enemy(EnemyKind::Yellow, &green(), Vec2::ZERO, Vec2::new(-100.0, 50.0));
        reg.advance(0.5);
        assert_eq!(reg.bullet(b).unwrap().pos, Vec2::new(250.0, 0.0));
        assert_eq!(reg.enemy(e).unwrap().pos, Vec2::new(-50.0, 25.0));

        reg.halt();
        reg.advance(1.0);
        assert_eq!(reg.enemy(e).unwrap().pos, Vec2::new(-50.0, 25.0));
    }

    #[test]
    fn test_clear_keeps_ids_unique() {
        let mut reg = EntityRegistry::new(50);
        let before = reg.add_bullet(Vec2::ZERO, Vec2::X, 0.0).unwrap();
        reg.clear();
        assert_eq!(reg.bullet_count(), 0);
        let after = reg.add_bullet(Vec2::ZERO, Vec2::X, 0.0).unwrap();
        assert!(after > before);
    }

    proptest! {
        #[test]
        fn prop_live_ids_are_unique(ops in proptest::collection::vec(0u8..4, 1..200)) {
            let mut reg = EntityRegistry::new(50);
            for op in ops {
                match op {
                    0 => { reg.add_bullet(Vec2::ZERO, Vec2::X, 0.0); }
                    1 => { reg.add_enemy(EnemyKind::Green, &green(), Vec2::ZERO, Vec2::ZERO); }
                    2 => {
                        if let Some(id) = reg.bullets().first().map(|b| b.id) {
                            reg.remove_bullet(id);
                        }
                    }
                    _ => {
                        if let Some(id) = reg.enemies().last().map(|e| e.id) {
                            reg.remove_enemy(id);
                        }
                    }
                }
            }
            let mut ids: Vec<u32> = reg.bullets().iter().map(|b| b.id)
                .chain(reg.enemies().iter().map(|e| e.id))
                .collect();
            let total = ids.len();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), total);
        }
    }
}
