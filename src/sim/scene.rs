//! Render-ready snapshots of the simulation
//!
//! The presentation layer reads these every frame and never touches
//! `GameState` directly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::field::ObstacleKind;
use super::state::{GameState, RoundPhase};

/// An obstacle as drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: ObstacleKind,
    /// Hits left; `None` for bonus tiles (drawn as a pickup marker)
    pub durability: Option<u32>,
}

/// A projectile as drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    pub radius: f32,
}

/// Dashed aim line from the launcher to the pointer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimPreview {
    pub from: Vec2,
    pub to: Vec2,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub obstacles: Vec<ObstacleView>,
    pub projectiles: Vec<ProjectileView>,
    /// Resting projectile at the launcher (aiming only)
    pub launcher: Option<ProjectileView>,
    pub aim: Option<AimPreview>,
}

impl Scene {
    pub fn capture(state: &GameState) -> Self {
        let aiming = state.phase == RoundPhase::Aiming;

        let obstacles = state
            .field
            .obstacles()
            .iter()
            .map(|o| ObstacleView {
                pos: o.pos,
                size: o.size,
                kind: o.kind,
                durability: (!o.is_bonus()).then_some(o.durability),
            })
            .collect();

        let projectiles = state
            .projectiles
            .iter()
            .map(|p| ProjectileView {
                pos: p.pos,
                radius: p.radius,
            })
            .collect();

        Self {
            width: state.config.field_width,
            height: state.config.field_height,
            obstacles,
            projectiles,
            launcher: aiming.then_some(ProjectileView {
                pos: state.launcher,
                radius: state.config.projectile_radius,
            }),
            aim: aiming.then_some(AimPreview {
                from: state.launcher,
                to: state.pointer,
            }),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// HUD numbers and the game-over signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub level: u32,
    /// Volley size including pickups waiting for the next round
    pub shots: u32,
    /// Level reached, once the run is over
    pub game_over: Option<u32>,
}

impl Status {
    pub fn capture(state: &GameState) -> Self {
        Self {
            level: state.level,
            shots: state.displayed_shots(),
            game_over: state.is_game_over().then_some(state.level),
        }
    }

    pub fn level_text(&self) -> String {
        format!("Level: {}", self.level)
    }

    pub fn shots_text(&self) -> String {
        format!("Balls: {}", self.shots)
    }
}
