//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order, newest projectile first)
//! - No rendering or platform dependencies

pub mod field;
pub mod geometry;
pub mod projectile;
pub mod scene;
pub mod state;
pub mod tick;

pub use field::{Cell, Obstacle, ObstacleField, ObstacleKind};
pub use geometry::{Circle, Rect, circle_intersects_rect};
pub use projectile::{BonusPickup, FieldBounds, Projectile, StepReport, step_projectiles};
pub use scene::{AimPreview, ObstacleView, ProjectileView, Scene, Status};
pub use state::{GameState, RoundPhase};
pub use tick::{TickInput, tick};
