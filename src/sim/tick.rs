//! Per-frame simulation tick
//!
//! Core game loop, driven by the host's frame clock. Each tick:
//! 1. applies player input (movement, fire)
//! 2. asks the spawn controller for a new enemy
//! 3. advances every entity
//! 4. resolves bullet/enemy and player/enemy overlaps
//! 5. culls bullets that left the world
//! 6. decays an idle combo
//!
//! During game over only deferred score submissions are processed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{resolve_bullet_enemy_overlaps, resolve_player_enemy_overlap};
use super::events::{EntityKind, GameEvent};
use super::spawn::SpawnRequest;
use super::state::{GamePhase, GameState, PendingSubmission};
use crate::consts::{DIAGONAL_FACTOR, MAX_FRAME_MS};

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Fire (rate limited)
    pub fire: bool,
}

impl TickInput {
    /// 8-way movement velocity. Left beats right and up beats down.
    pub fn velocity(&self, speed: f32) -> Vec2 {
        let mut vel = Vec2::ZERO;
        if self.left {
            vel.x = -speed;
        } else if self.right {
            vel.x = speed;
        }
        if self.up {
            vel.y = -speed;
        } else if self.down {
            vel.y = speed;
        }
        if vel.x != 0.0 && vel.y != 0.0 {
            vel *= DIAGONAL_FACTOR;
        }
        vel
    }
}

/// Advance the session to frame clock time `now` (ms)
pub fn tick(state: &mut GameState, input: &TickInput, now: f64) {
    if !now.is_finite() {
        log::warn!("Skipping tick with non-finite clock {}", now);
        return;
    }

    let dt_ms = (now - state.last_tick_at).clamp(0.0, MAX_FRAME_MS);
    state.last_tick_at = state.last_tick_at.max(now);

    fire_due_submissions(state, now);

    // Game over is frozen until restart
    if state.phase == GamePhase::GameOver {
        return;
    }

    let dt = (dt_ms / 1000.0) as f32;

    state.player.vel = input.velocity(state.tuning.player.speed);
    if input.fire {
        state.shoot(now);
    }

    if let Some(request) = state.spawner.tick(now, state.registry.enemy_count()) {
        spawn_enemy(state, request);
    }

    let moved = state.player.pos + state.player.vel * dt;
    state.player.pos = state.world.clamp(moved, state.player.size);
    state.registry.advance(dt);

    resolve_combat(state, now);
    if state.phase == GamePhase::GameOver {
        return;
    }

    for id in state.registry.cull_offscreen_bullets(state.world.width) {
        state.emit(GameEvent::EntityDestroyed {
            kind: EntityKind::Bullet,
            id,
        });
    }

    if state.score.decay_combo(now) {
        state.emit(GameEvent::ScoreChanged {
            score: state.score.score(),
            combo: state.score.combo(),
        });
    }
}

fn spawn_enemy(state: &mut GameState, request: SpawnRequest) {
    let stats = state.tuning.enemies.get(request.kind);
    // Aimed once, at the player's current position
    let vel = request.velocity_toward(state.player.pos, stats.speed);
    let id = state.registry.add_enemy(request.kind, stats, request.pos, vel);

    log::debug!(
        "Spawned {} enemy #{} at ({:.0}, {:.0}), next in {:.0} ms",
        request.kind.as_str(),
        id,
        request.pos.x,
        request.pos.y,
        state.spawner.current_delay()
    );
    state.emit(GameEvent::EnemySpawned {
        id,
        kind: request.kind,
        pos: request.pos,
    });
}

fn resolve_combat(state: &mut GameState, now: f64) {
    let hits = resolve_bullet_enemy_overlaps(&mut state.registry, state.tuning.player.bullet_size);
    for hit in hits {
        state.emit(GameEvent::EntityDestroyed {
            kind: EntityKind::Bullet,
            id: hit.bullet_id,
        });

        if !hit.is_kill() {
            state.emit(GameEvent::EnemyDamaged {
                id: hit.enemy_id,
                kind: hit.kind,
                health: hit.remaining_health,
            });
            continue;
        }

        let awarded = state.score.on_hit(hit.points, now);
        log::debug!(
            "Killed {} enemy #{} for {} points (combo now x{:.2})",
            hit.kind.as_str(),
            hit.enemy_id,
            awarded,
            state.score.combo()
        );
        state.emit(GameEvent::EnemyHit(hit));
        state.emit(GameEvent::EntityDestroyed {
            kind: EntityKind::Enemy,
            id: hit.enemy_id,
        });
        state.emit(GameEvent::ScoreChanged {
            score: state.score.score(),
            combo: state.score.combo(),
        });
    }

    if resolve_player_enemy_overlap(&state.player, &state.registry) {
        end_session(state, now);
    }
}

/// Running -> GameOver. Only reachable from Running, so it happens once.
fn end_session(state: &mut GameState, now: f64) {
    state.score.on_player_hit(now);
    let final_score = state.score.score();
    state.final_score = Some(final_score);
    state.phase = GamePhase::GameOver;

    state.player.alive = false;
    state.player.vel = Vec2::ZERO;
    state.registry.halt();

    state.pending_submissions.push(PendingSubmission {
        session: state.session,
        final_score,
        due_at: now + state.tuning.submit_delay_ms,
    });

    log::info!(
        "Session {} over at {:.0} ms: final score {}",
        state.session,
        state.elapsed(),
        final_score
    );
    state.emit(GameEvent::ScoreChanged {
        score: final_score,
        combo: state.score.combo(),
    });
    state.emit(GameEvent::SessionEnded {
        session: state.session,
        final_score,
        pos: state.player.pos,
    });
}

/// Emit every submission whose delay has elapsed. The wallet is read now.
fn fire_due_submissions(state: &mut GameState, now: f64) {
    if state.pending_submissions.is_empty() {
        return;
    }

    let (due, waiting): (Vec<_>, Vec<_>) = state
        .pending_submissions
        .drain(..)
        .partition(|p| p.due_at <= now);
    state.pending_submissions = waiting;

    let wallet_address = state.wallet_address().map(str::to_owned);
    for submission in due {
        log::info!(
            "Submitting score {} for session {} ({})",
            submission.final_score,
            submission.session,
            wallet_address.as_deref().unwrap_or("anonymous")
        );
        state.emit(GameEvent::ScoreSubmission {
            session: submission.session,
            final_score: submission.final_score,
            wallet_address: wallet_address.clone(),
        });
    }
}
