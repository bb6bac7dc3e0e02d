//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::state::{GameState, RoundPhase};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in board space (aim preview)
    pub pointer: Option<Vec2>,
    /// Fire the volley along this angle (radians, y down)
    pub fire: Option<f32>,
    /// Double the volley speed
    pub speed_up: bool,
    /// Start a fresh run
    pub restart: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.restart {
        state.restart();
    }
    if let Some(pointer) = input.pointer {
        state.pointer = pointer;
    }

    // Frozen until restart
    if state.phase == RoundPhase::GameOver {
        return;
    }

    // Fire before speed-up so a request in the same input boosts the new volley
    if let Some(angle) = input.fire {
        state.fire(angle);
    }
    if input.speed_up {
        state.request_speed_up();
    }

    state.time_ticks += 1;

    match state.phase {
        RoundPhase::Aiming | RoundPhase::GameOver => {}

        RoundPhase::Firing => {
            state.run_launch_gate();
            state.step_volley();
            if state.round_complete() {
                state.phase = RoundPhase::RoundResolved;
            }
        }

        RoundPhase::RoundResolved => {
            state.resolve_round();
        }
    }
}
