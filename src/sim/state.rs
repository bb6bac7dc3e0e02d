//! Game state and the round controller
//!
//! One owned context holds the board, the volley and the round counters.
//! Nothing outside a tick mutates it, and a seeded RNG keeps runs replayable.

use glam::Vec2;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::field::ObstacleField;
use super::projectile::{FieldBounds, Projectile, StepReport, step_projectiles};
use crate::config::GameConfig;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Waiting for a fire command
    Aiming,
    /// Volley being released and resolved
    Firing,
    /// Every projectile has left; next step advances the board
    RoundResolved,
    /// Obstacles reached the loss boundary
    GameOver,
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Current level (1-based)
    pub level: u32,
    /// Projectiles per volley
    pub total_shots: u32,
    pub remaining_to_launch: u32,
    pub in_flight: u32,
    /// Bonus tiles collected this round, added to the next volley
    pub pending_bonus: u32,
    pub launch_angle: f32,
    pub launch_speed: f32,
    /// Speed-up already applied this round
    pub speed_up: bool,
    pub phase: RoundPhase,
    /// Firing-line point every projectile of a volley starts from
    pub launcher: Vec2,
    /// Where the first projectile left the bottom this round
    pub next_round_origin_x: Option<f32>,
    /// Fixed steps until the next release
    pub launch_cooldown_ticks: u32,
    /// Last known pointer position, for the aim preview
    pub pointer: Vec2,
    pub field: ObstacleField,
    /// Projectiles in insertion order
    pub projectiles: Vec<Projectile>,
    /// Simulation tick counter
    pub time_ticks: u64,
    next_projectile_id: u32,
}

impl GameState {
    /// Create a new game: level 1, one pre-generated row
    pub fn new(seed: u64, config: GameConfig) -> Self {
        let mut state = Self::empty(seed, config);
        state.field.advance_round(state.total_shots, &mut state.rng);
        state
    }

    /// Same as [`GameState::new`] but with an empty board
    pub fn empty(seed: u64, config: GameConfig) -> Self {
        let launcher = Vec2::new(
            config.field_width / 2.0,
            config.field_height - config.launcher_offset,
        );
        let pointer = Vec2::new(config.field_width / 2.0, config.field_height / 2.0);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: 1,
            total_shots: config.initial_shots,
            remaining_to_launch: config.initial_shots,
            in_flight: 0,
            pending_bonus: 0,
            launch_angle: 0.0,
            launch_speed: config.normal_speed,
            speed_up: false,
            phase: RoundPhase::Aiming,
            launcher,
            next_round_origin_x: None,
            launch_cooldown_ticks: 0,
            pointer,
            field: ObstacleField::new(&config),
            projectiles: Vec::new(),
            time_ticks: 0,
            next_projectile_id: 1,
            config,
        }
    }

    pub fn bounds(&self) -> FieldBounds {
        FieldBounds {
            width: self.config.field_width,
            height: self.config.field_height,
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == RoundPhase::Firing
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase == RoundPhase::GameOver
    }

    /// Shots shown to the player: this volley plus pickups waiting for the next
    pub fn displayed_shots(&self) -> u32 {
        self.total_shots + self.pending_bonus
    }

    /// Start a volley along `angle`. Ignored unless aiming with shots available.
    pub fn fire(&mut self, angle: f32) -> bool {
        if self.phase != RoundPhase::Aiming || self.remaining_to_launch == 0 {
            return false;
        }
        self.launch_angle = angle;
        self.phase = RoundPhase::Firing;
        self.in_flight = 0;
        self.pending_bonus = 0;
        self.next_round_origin_x = None;
        self.launch_cooldown_ticks = 0;
        self.speed_up = false;
        self.launch_speed = self.config.normal_speed;
        log::debug!(
            "Level {}: firing {} shots at {:.3} rad",
            self.level,
            self.remaining_to_launch,
            angle
        );
        true
    }

    /// Boost the current volley, in flight and pending alike. Once per round.
    pub fn request_speed_up(&mut self) -> bool {
        if self.phase != RoundPhase::Firing || self.speed_up {
            return false;
        }
        self.speed_up = true;
        self.launch_speed = self.config.boosted_speed();
        for projectile in &mut self.projectiles {
            projectile.set_speed(self.launch_speed);
        }
        log::debug!(
            "Speed-up: {} in flight now at {}",
            self.projectiles.len(),
            self.launch_speed
        );
        true
    }

    /// Throw the run away and start over, reseeded from the current stream
    pub fn restart(&mut self) {
        let seed = self.rng.next_u64();
        *self = Self::new(seed, self.config.clone());
        log::info!("Restarted with seed {}", seed);
    }

    /// Release one projectile from the launcher
    pub fn launch_projectile(&mut self) {
        let id = self.next_projectile_id;
        self.next_projectile_id += 1;
        self.projectiles.push(Projectile::launched(
            id,
            self.launcher,
            self.launch_angle,
            self.launch_speed,
            self.config.projectile_radius,
        ));
        self.remaining_to_launch = self.remaining_to_launch.saturating_sub(1);
        self.in_flight += 1;
    }

    /// Launch gate: one release per interval while shots remain
    pub(crate) fn run_launch_gate(&mut self) {
        if self.remaining_to_launch == 0 {
            return;
        }
        if self.launch_cooldown_ticks == 0 {
            self.launch_projectile();
            self.launch_cooldown_ticks = self.config.launch_interval_ticks();
        }
        self.launch_cooldown_ticks -= 1;
    }

    /// Advance every projectile one step and book the outcome
    pub(crate) fn step_volley(&mut self) -> StepReport {
        let bounds = self.bounds();
        let report = step_projectiles(&mut self.projectiles, &mut self.field, bounds);

        self.in_flight = self.in_flight.saturating_sub(report.exited.len() as u32);
        if self.next_round_origin_x.is_none() {
            self.next_round_origin_x = report.first_exit_x();
        }
        if !report.pickups.is_empty() {
            self.pending_bonus += report.pickups.len() as u32;
            log::debug!(
                "Collected {} bonus, {} pending",
                report.pickups.len(),
                self.pending_bonus
            );
        }
        report
    }

    /// Volley is done once everything is launched and nothing is in flight
    pub fn round_complete(&self) -> bool {
        self.phase == RoundPhase::Firing && self.remaining_to_launch == 0 && self.in_flight == 0
    }

    /// Score the round and bring the board down one row
    pub(crate) fn resolve_round(&mut self) {
        if self.phase != RoundPhase::RoundResolved {
            return;
        }
        self.level += 1;
        self.total_shots += self.pending_bonus;
        self.pending_bonus = 0;
        self.remaining_to_launch = self.total_shots;
        self.speed_up = false;
        self.launch_speed = self.config.normal_speed;
        if let Some(x) = self.next_round_origin_x.take() {
            self.launcher.x = x;
        }
        self.phase = RoundPhase::Aiming;

        let crossed = self.field.advance_round(self.total_shots, &mut self.rng);
        log::info!(
            "Level {}: {} shots, {} obstacles, launcher at x={:.1}",
            self.level,
            self.total_shots,
            self.field.len(),
            self.launcher.x
        );
        if crossed {
            self.trigger_game_over();
        }
    }

    /// Terminal. Repeat triggers are no-ops.
    pub fn trigger_game_over(&mut self) {
        if self.phase == RoundPhase::GameOver {
            return;
        }
        self.phase = RoundPhase::GameOver;
        log::info!("Game over at level {}", self.level);
    }
}
