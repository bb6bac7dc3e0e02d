//! Brick Volley - a single-screen brick volley arcade core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, collisions, round state)
//! - `game`: Frame-driven façade that feeds wall-clock time into fixed steps
//! - `config`: Data-driven board and balance tuning

pub mod config;
pub mod game;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use game::Game;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one frame of a 60 Hz display)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame; covers a full `MAX_FRAME_DT` frame
    pub const MAX_SUBSTEPS: u32 = 16;
    /// Longest frame delta accepted before clamping (seconds)
    pub const MAX_FRAME_DT: f32 = 0.25;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Angle of the ray from `from` toward `to` (screen coordinates, y down)
#[inline]
pub fn aim_angle(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}
