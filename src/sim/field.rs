//! Obstacle grid: row generation, descent and the loss boundary
//!
//! Obstacles live in a flat `Vec` in insertion order. A fresh row is always
//! inserted at the front; bonus tiles are appended at the back. Collision
//! code walks the list back to front, so that order is part of the game feel.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::config::GameConfig;

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Bounces projectiles and loses one durability per hit
    #[default]
    Standard,
    /// Extra-shot pickup; consumed on first contact, never bounces
    Bonus,
}

/// A tile on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Unique handle, never reused within a run
    pub id: u32,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Hits left before removal
    pub durability: u32,
}

impl Obstacle {
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn is_bonus(&self) -> bool {
        self.kind == ObstacleKind::Bonus
    }
}

/// A logical grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub col: u32,
    pub row: u32,
}

impl Cell {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// The obstacle grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
    tile_size: Vec2,
    cols: u32,
    spawn_rows: u32,
    loss_boundary: f32,
    row_fill_chance: f64,
    durability_double_chance: f64,
    bonus_spawn_chance: f64,
    next_id: u32,
}

impl ObstacleField {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            obstacles: Vec::new(),
            tile_size: Vec2::new(config.tile_width, config.tile_height),
            cols: config.tile_cols(),
            spawn_rows: config.spawn_rows(),
            loss_boundary: config.loss_boundary(),
            row_fill_chance: config.row_fill_chance,
            durability_double_chance: config.durability_double_chance,
            bonus_spawn_chance: config.bonus_spawn_chance,
            next_id: 1,
        }
    }

    /// Obstacles in insertion order
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Obstacle> {
        self.obstacles.get(index)
    }

    pub fn find(&self, id: u32) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }

    pub fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    pub fn loss_boundary(&self) -> f32 {
        self.loss_boundary
    }

    fn next_obstacle_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn make_obstacle(&mut self, pos: Vec2, kind: ObstacleKind, durability: u32) -> Obstacle {
        let durability = match kind {
            ObstacleKind::Bonus => 1,
            ObstacleKind::Standard => durability.max(1),
        };
        Obstacle {
            id: self.next_obstacle_id(),
            kind,
            pos,
            size: self.tile_size,
            durability,
        }
    }

    /// Append an obstacle with its top-left corner at `pos`; returns its id
    pub fn place_at(&mut self, pos: Vec2, kind: ObstacleKind, durability: u32) -> u32 {
        let obstacle = self.make_obstacle(pos, kind, durability);
        let id = obstacle.id;
        self.obstacles.push(obstacle);
        id
    }

    /// Append an obstacle aligned to `cell`; returns its id
    pub fn place(&mut self, cell: Cell, kind: ObstacleKind, durability: u32) -> u32 {
        self.place_at(self.cell_origin(cell), kind, durability)
    }

    pub fn cell_origin(&self, cell: Cell) -> Vec2 {
        Vec2::new(
            cell.col as f32 * self.tile_size.x,
            cell.row as f32 * self.tile_size.y,
        )
    }

    /// Grid cell containing an obstacle's top-left corner
    pub fn cell_of(&self, obstacle: &Obstacle) -> Cell {
        let col = (obstacle.pos.x / self.tile_size.x).floor().max(0.0) as u32;
        let row = (obstacle.pos.y / self.tile_size.y).floor().max(0.0) as u32;
        Cell::new(col, row)
    }

    /// Whether an obstacle's bottom edge has reached the loss boundary
    pub fn crosses_loss_boundary(&self, obstacle: &Obstacle) -> bool {
        obstacle.bottom() >= self.loss_boundary
    }

    /// Pick a uniformly random unoccupied cell above the safe zone
    pub fn find_empty_spawn_cell<R: Rng>(&self, rng: &mut R) -> Option<Cell> {
        let occupied: Vec<Cell> = self.obstacles.iter().map(|o| self.cell_of(o)).collect();

        let candidates: Vec<Cell> = (0..self.spawn_rows)
            .flat_map(|row| (0..self.cols).map(move |col| Cell::new(col, row)))
            .filter(|cell| !occupied.contains(cell))
            .collect();

        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.random_range(0..candidates.len())])
    }

    /// Roll a new top row. Durability tracks the player's volley size.
    pub fn generate_row<R: Rng>(&mut self, total_shots: u32, rng: &mut R) -> Vec<Obstacle> {
        let mut row = Vec::new();
        for col in 0..self.cols {
            if rng.random_bool(self.row_fill_chance) {
                let mut durability = total_shots.saturating_add(1);
                if rng.random_bool(self.durability_double_chance) {
                    durability = durability.saturating_mul(2);
                }
                let pos = self.cell_origin(Cell::new(col, 0));
                row.push(self.make_obstacle(pos, ObstacleKind::Standard, durability));
            }
        }
        row
    }

    /// Move every obstacle down one row. Returns true if any crossed the loss boundary.
    pub fn shift_down(&mut self) -> bool {
        let step = self.tile_size.y;
        let mut crossed = false;
        for obstacle in &mut self.obstacles {
            obstacle.pos.y += step;
            if obstacle.bottom() >= self.loss_boundary {
                crossed = true;
            }
        }
        crossed
    }

    /// Drop obstacles that sit at or past the loss boundary. Returns how many were removed.
    pub fn prune_below_field(&mut self) -> usize {
        let before = self.obstacles.len();
        let boundary = self.loss_boundary;
        self.obstacles.retain(|o| o.pos.y < boundary);
        before - self.obstacles.len()
    }

    /// Maybe drop a bonus tile into a random free cell. Returns its id if placed.
    pub fn maybe_spawn_bonus<R: Rng>(&mut self, rng: &mut R) -> Option<u32> {
        if !rng.random_bool(self.bonus_spawn_chance) {
            return None;
        }
        let cell = self.find_empty_spawn_cell(rng)?;
        Some(self.place(cell, ObstacleKind::Bonus, 1))
    }

    /// Register one projectile contact. Returns true when the obstacle is spent;
    /// the caller removes it.
    pub fn apply_hit(&mut self, index: usize) -> bool {
        let Some(obstacle) = self.obstacles.get_mut(index) else {
            return false;
        };
        obstacle.durability = match obstacle.kind {
            ObstacleKind::Bonus => 0,
            ObstacleKind::Standard => obstacle.durability.saturating_sub(1),
        };
        obstacle.durability == 0
    }

    pub fn remove(&mut self, index: usize) -> Obstacle {
        self.obstacles.remove(index)
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    /// Start-of-round board update: roll the new row, push the old rows down,
    /// put the new row on top, prune, then maybe add a bonus.
    ///
    /// Returns true if the shift pushed anything across the loss boundary.
    pub fn advance_round<R: Rng>(&mut self, total_shots: u32, rng: &mut R) -> bool {
        let mut row = self.generate_row(total_shots, rng);
        let crossed = self.shift_down();

        row.append(&mut self.obstacles);
        self.obstacles = row;

        self.prune_below_field();
        self.maybe_spawn_bonus(rng);
        crossed
    }
}
