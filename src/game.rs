//! Frame-driven game façade
//!
//! Front ends call [`Game::update`] once per frame with the wall-clock delta.
//! Time is accumulated and spent in fixed simulation steps, so a slow frame
//! catches up on launches instead of dropping them.

use glam::Vec2;

use crate::aim_angle;
use crate::config::GameConfig;
use crate::consts::*;
use crate::sim::{GameState, RoundPhase, Scene, Status, TickInput, tick};

/// Game instance holding all state
#[derive(Debug, Clone)]
pub struct Game {
    state: GameState,
    accumulator: f32,
    input: TickInput,
}

impl Game {
    pub fn new(seed: u64, config: GameConfig) -> Self {
        Self {
            state: GameState::new(seed, config),
            accumulator: 0.0,
            input: TickInput::default(),
        }
    }

    /// Wrap an existing state (scripted boards, replays)
    pub fn from_state(state: GameState) -> Self {
        Self {
            state,
            accumulator: 0.0,
            input: TickInput::default(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }

    /// Queue a volley along `angle`
    pub fn fire(&mut self, angle: f32) {
        self.input.fire = Some(angle);
    }

    /// Queue a volley toward a board-space point
    pub fn fire_at(&mut self, target: Vec2) {
        self.fire(aim_angle(self.state.launcher, target));
    }

    pub fn request_speed_up(&mut self) {
        self.input.speed_up = true;
    }

    pub fn restart(&mut self) {
        self.input.restart = true;
    }

    pub fn set_pointer(&mut self, pointer: Vec2) {
        self.input.pointer = Some(pointer);
    }

    /// Run as many fixed steps as `dt` (seconds) covers. Returns steps taken.
    pub fn update(&mut self, dt: f32) -> u32 {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = std::mem::take(&mut self.input);
            tick(&mut self.state, &input);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Leftover time carries into the next frame
        substeps
    }

    pub fn scene(&self) -> Scene {
        Scene::capture(&self.state)
    }

    pub fn status(&self) -> Status {
        Status::capture(&self.state)
    }

    /// Level reached, once the run is over
    pub fn game_over_level(&self) -> Option<u32> {
        self.state.is_game_over().then_some(self.state.level)
    }
}
