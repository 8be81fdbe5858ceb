//! Grid Shooter - a side-scrolling neon arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, combat, scoring, session)
//! - `tuning`: Data-driven game balance
//! - `error`: Configuration errors

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default world size when the host does not supply a viewport
    pub const DEFAULT_WORLD_WIDTH: f32 = 800.0;
    pub const DEFAULT_WORLD_HEIGHT: f32 = 600.0;

    /// Bullets are culled this far past the left/right world edges;
    /// enemies also spawn this far past the right edge
    pub const OFFSCREEN_MARGIN: f32 = 50.0;

    /// Per-axis scale for diagonal movement (approximates 1/sqrt(2), kept as-is)
    pub const DIAGONAL_FACTOR: f32 = 0.707;

    /// Longest frame (ms) a single tick will integrate
    pub const MAX_FRAME_MS: f64 = 100.0;
}

/// Angle (radians) of the vector pointing from `from` to `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Vector of length `speed` pointing along `angle`
#[inline]
pub fn heading_to_velocity(angle: f32, speed: f32) -> Vec2 {
    Vec2::new(angle.cos() * speed, angle.sin() * speed)
}
