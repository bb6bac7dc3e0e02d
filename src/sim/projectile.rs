//! Projectile kinematics and collision response
//!
//! One call to [`step_projectiles`] advances every projectile by one fixed
//! step: move, reflect off the side and top walls, drop out through the
//! bottom, then resolve tile contacts.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::field::ObstacleField;
use super::geometry::{Circle, Rect, circle_intersects_rect};
use crate::polar_to_cartesian;

/// A projectile in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Displacement per fixed step
    pub vel: Vec2,
    pub radius: f32,
    /// Obstacle this projectile bounced off most recently (cleared by walls)
    pub last_hit: Option<u32>,
}

impl Projectile {
    /// Launch from `pos` along `angle` (radians, y down) at `speed`
    pub fn launched(id: u32, pos: Vec2, angle: f32, speed: f32, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel: polar_to_cartesian(speed, angle),
            radius,
            last_hit: None,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Rescale velocity to `speed`, keeping the heading
    pub fn set_speed(&mut self, speed: f32) {
        let current = self.speed();
        if current > 0.0 {
            self.vel *= speed / current;
        }
    }

    #[inline]
    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }
}

/// Play-field extents: walls at x = 0, x = width and y = 0; open bottom at y = height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub width: f32,
    pub height: f32,
}

/// A bonus tile collected during a step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusPickup {
    pub obstacle_id: u32,
    pub projectile_id: u32,
    pub pos: Vec2,
}

/// Everything that left the board during one step
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    /// Projectiles that dropped out of the bottom, in processing order
    pub exited: Vec<Projectile>,
    /// Bonus tiles collected
    pub pickups: Vec<BonusPickup>,
    /// Standard obstacles destroyed
    pub destroyed: Vec<u32>,
}

impl StepReport {
    /// X coordinate of the first projectile to leave this step
    pub fn first_exit_x(&self) -> Option<f32> {
        self.exited.first().map(|p| p.pos.x)
    }
}

/// Advance all projectiles by one fixed step.
///
/// Projectiles are processed newest first. Obstacle removals are visible to
/// every later check in the same step.
pub fn step_projectiles(
    projectiles: &mut Vec<Projectile>,
    field: &mut ObstacleField,
    bounds: FieldBounds,
) -> StepReport {
    let mut report = StepReport::default();
    let mut removed = Vec::new();

    for i in (0..projectiles.len()).rev() {
        move_projectile(&mut projectiles[i], bounds);

        if projectiles[i].pos.y > bounds.height {
            report.exited.push(projectiles.remove(i));
            continue;
        }

        removed.clear();
        collide_obstacles(&mut projectiles[i], field, &mut report, &mut removed);
        for &id in &removed {
            forget_obstacle(projectiles, id);
        }
    }

    report
}

/// Integrate one step and reflect off the side and top walls
fn move_projectile(p: &mut Projectile, bounds: FieldBounds) {
    let next = p.pos + p.vel;
    let r = p.radius;

    if next.x - r < 0.0 {
        p.vel.x = p.vel.x.abs();
        p.pos.x = r;
        p.last_hit = None;
    } else if next.x + r > bounds.width {
        p.vel.x = -p.vel.x.abs();
        p.pos.x = bounds.width - r;
        p.last_hit = None;
    } else {
        p.pos.x = next.x;
    }

    // No floor: falling past the bottom is an exit, not a bounce
    if next.y - r < 0.0 {
        p.vel.y = p.vel.y.abs();
        p.pos.y = r;
        p.last_hit = None;
    } else {
        p.pos.y = next.y;
    }
}

/// Resolve contacts against every obstacle, back to front
fn collide_obstacles(
    p: &mut Projectile,
    field: &mut ObstacleField,
    report: &mut StepReport,
    removed: &mut Vec<u32>,
) {
    let mut j = field.len();
    while j > 0 {
        j -= 1;
        let Some(obstacle) = field.get(j) else {
            continue;
        };
        if p.last_hit == Some(obstacle.id) || !circle_intersects_rect(&p.circle(), &obstacle.rect()) {
            continue;
        }

        let id = obstacle.id;
        let rect = obstacle.rect();

        if obstacle.is_bonus() {
            // Pure pickup: no bounce, no last_hit
            field.apply_hit(j);
            field.remove(j);
            report.pickups.push(BonusPickup {
                obstacle_id: id,
                projectile_id: p.id,
                pos: rect.center(),
            });
            removed.push(id);
            continue;
        }

        bounce_off(p, &rect);
        p.last_hit = Some(id);

        if field.apply_hit(j) {
            field.remove(j);
            report.destroyed.push(id);
            removed.push(id);
        }
    }
}

/// Reflect off whichever tile face the projectile is closest to.
///
/// Offsets are cross-scaled by the tile size so non-square tiles pick the
/// face by edge proximity rather than raw distance.
fn bounce_off(p: &mut Projectile, rect: &Rect) {
    let d = p.pos - rect.center();

    if d.x.abs() * rect.size.y > d.y.abs() * rect.size.x {
        if d.x > 0.0 {
            p.vel.x = p.vel.x.abs();
            p.pos.x = rect.max().x + p.radius;
        } else {
            p.vel.x = -p.vel.x.abs();
            p.pos.x = rect.min().x - p.radius;
        }
    } else if d.y > 0.0 {
        p.vel.y = p.vel.y.abs();
        p.pos.y = rect.max().y + p.radius;
    } else {
        p.vel.y = -p.vel.y.abs();
        p.pos.y = rect.min().y - p.radius;
    }
}

/// Drop every handle to an obstacle that has left the board
fn forget_obstacle(projectiles: &mut [Projectile], id: u32) {
    for p in projectiles.iter_mut().filter(|p| p.last_hit == Some(id)) {
        p.last_hit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::field::{Cell, ObstacleKind};
    use proptest::prelude::*;

    const BOUNDS: FieldBounds = FieldBounds {
        width: 400.0,
        height: 520.0,
    };

    fn empty_field() -> ObstacleField {
        ObstacleField::new(&GameConfig::default())
    }

    fn projectile(pos: Vec2, vel: Vec2) -> Projectile {
        Projectile {
            id: 1,
            pos,
            vel,
            radius: 6.0,
            last_hit: None,
        }
    }

    #[test]
    fn test_free_flight() {
        let mut field = empty_field();
        let mut balls = vec![projectile(Vec2::new(200.0, 300.0), Vec2::new(3.0, -4.0))];
        let report = step_projectiles(&mut balls, &mut field, BOUNDS);
        assert!(report.exited.is_empty());
        assert_eq!(balls[0].pos, Vec2::new(203.0, 296.0));
    }

    #[test]
    fn test_right_wall_reflects_and_clears_last_hit() {
        let mut field = empty_field();
        let mut ball = projectile(Vec2::new(390.0, 300.0), Vec2::new(5.0, -1.0));
        ball.last_hit = Some(42);
        let mut balls = vec![ball];
        step_projectiles(&mut balls, &mut field, BOUNDS);
        assert_eq!(balls[0].pos.x, 394.0);
        assert_eq!(balls[0].vel.x, -5.0);
        assert_eq!(balls[0].last_hit, None);
    }

    #[test]
    fn test_top_wall_reflects() {
        let mut field = empty_field();
        let mut balls = vec![projectile(Vec2::new(100.0, 8.0), Vec2::new(1.0, -5.0))];
        step_projectiles(&mut balls, &mut field, BOUNDS);
        assert_eq!(balls[0].pos.y, 6.0);
        assert_eq!(balls[0].vel.y, 5.0);
    }

    #[test]
    fn test_bottom_exit_removes_projectile() {
        let mut field = empty_field();
        let mut balls = vec![
            projectile(Vec2::new(100.0, 518.0), Vec2::new(0.0, 5.0)),
            Projectile {
                id: 2,
                ..projectile(Vec2::new(300.0, 519.0), Vec2::new(0.0, 5.0))
            },
        ];
        let report = step_projectiles(&mut balls, &mut field, BOUNDS);
        assert!(balls.is_empty());
        // Newest (last inserted) is processed first
        assert_eq!(report.exited.len(), 2);
        assert_eq!(report.exited[0].id, 2);
        assert_eq!(report.first_exit_x(), Some(300.0));
    }

    #[test]
    fn test_vertical_bounce_off_tile_underside() {
        let mut field = empty_field();
        let id = field.place(Cell::new(2, 5), ObstacleKind::Standard, 3); // x 100..150, y 150..180
        let mut balls = vec![projectile(Vec2::new(125.0, 190.0), Vec2::new(0.0, -7.0))];

        let report = step_projectiles(&mut balls, &mut field, BOUNDS);
        assert!(report.destroyed.is_empty());
        assert_eq!(balls[0].vel, Vec2::new(0.0, 7.0));
        assert_eq!(balls[0].pos.y, 186.0);
        assert_eq!(balls[0].last_hit, Some(id));
        assert_eq!(field.find(id).unwrap().durability, 2);
    }

    #[test]
    fn test_horizontal_bounce_off_tile_side() {
        let mut field = empty_field();
        field.place(Cell::new(2, 5), ObstacleKind::Standard, 3); // x 100..150
        let mut balls = vec![projectile(Vec2::new(90.0, 165.0), Vec2::new(7.0, 0.5))];

        step_projectiles(&mut balls, &mut field, BOUNDS);
        assert_eq!(balls[0].pos.x, 94.0);
        assert_eq!(balls[0].vel.x, -7.0);
        assert_eq!(balls[0].vel.y, 0.5);
    }

    #[test]
    fn test_last_hit_blocks_repeat_contact() {
        let mut field = empty_field();
        let id = field.place(Cell::new(2, 5), ObstacleKind::Standard, 3);
        // Overlapping the tile but flagged as just bounced off it
        let mut ball = projectile(Vec2::new(125.0, 183.0), Vec2::new(0.0, 0.0));
        ball.last_hit = Some(id);
        let mut balls = vec![ball];

        step_projectiles(&mut balls, &mut field, BOUNDS);
        assert_eq!(field.find(id).unwrap().durability, 3);
        assert_eq!(balls[0].pos.y, 183.0);
    }

    #[test]
    fn test_different_obstacle_clears_block() {
        let mut field = empty_field();
        let a = field.place(Cell::new(2, 5), ObstacleKind::Standard, 3);
        let b = field.place(Cell::new(3, 5), ObstacleKind::Standard, 3);
        // Straddling the shared edge at x = 150, last bounced off `a`
        let mut ball = projectile(Vec2::new(152.0, 183.0), Vec2::new(0.0, 0.0));
        ball.last_hit = Some(a);
        let mut balls = vec![ball];

        step_projectiles(&mut balls, &mut field, BOUNDS);
        assert_eq!(field.find(a).unwrap().durability, 3);
        assert_eq!(field.find(b).unwrap().durability, 2);
        assert_eq!(balls[0].last_hit, Some(b));
    }

    #[test]
    fn test_destroyed_obstacle_is_removed_and_forgotten() {
        let mut field = empty_field();
        let id = field.place(Cell::new(2, 5), ObstacleKind::Standard, 1);
        let mut balls = vec![projectile(Vec2::new(125.0, 190.0), Vec2::new(0.0, -7.0))];

        let report = step_projectiles(&mut balls, &mut field, BOUNDS);
        assert_eq!(report.destroyed, vec![id]);
        assert!(field.is_empty());
        assert_eq!(balls[0].last_hit, None);
        // Bounce still applied
        assert_eq!(balls[0].vel.y, 7.0);
    }

    #[test]
    fn test_destroyed_obstacle_forgotten_by_other_projectiles() {
        let mut field = empty_field();
        let id = field.place(Cell::new(2, 5), ObstacleKind::Standard, 1);
        // Older projectile bounced off the tile earlier and is now far away
        let mut older = projectile(Vec2::new(300.0, 300.0), Vec2::new(0.0, 1.0));
        older.last_hit = Some(id);
        let newer = Projectile {
            id: 2,
            ..projectile(Vec2::new(125.0, 190.0), Vec2::new(0.0, -7.0))
        };
        let mut balls = vec![older, newer];

        let report = step_projectiles(&mut balls, &mut field, BOUNDS);
        assert_eq!(report.destroyed, vec![id]);
        assert!(field.find(id).is_none());
        assert_eq!(balls[0].last_hit, None);
        assert_eq!(balls[1].last_hit, None);
    }

    #[test]
    fn test_bonus_pickups_do_not_bounce() {
        let mut field = empty_field();
        let first = field.place_at(Vec2::new(100.0, 150.0), ObstacleKind::Bonus, 1);
        let second = field.place_at(Vec2::new(100.0, 160.0), ObstacleKind::Bonus, 1);
        // Lands at y = 183, overlapping both
        let mut balls = vec![projectile(Vec2::new(125.0, 190.0), Vec2::new(0.0, -7.0))];

        let report = step_projectiles(&mut balls, &mut field, BOUNDS);
        assert_eq!(report.pickups.len(), 2);
        // Back to front
        assert_eq!(report.pickups[0].obstacle_id, second);
        assert_eq!(report.pickups[1].obstacle_id, first);
        assert!(field.is_empty());
        assert_eq!(balls[0].vel, Vec2::new(0.0, -7.0));
        assert_eq!(balls[0].last_hit, None);
    }

    #[test]
    fn test_no_double_hit_on_next_step() {
        let mut field = empty_field();
        let id = field.place(Cell::new(2, 5), ObstacleKind::Standard, 5);
        // Slow upward mover: after the bounce it is still close to the tile
        let mut balls = vec![projectile(Vec2::new(125.0, 186.5), Vec2::new(0.0, -1.0))];

        step_projectiles(&mut balls, &mut field, BOUNDS);
        assert_eq!(field.find(id).unwrap().durability, 4);
        for _ in 0..10 {
            step_projectiles(&mut balls, &mut field, BOUNDS);
        }
        assert_eq!(field.find(id).unwrap().durability, 4);
    }

    #[test]
    fn test_set_speed_keeps_heading() {
        let mut ball = Projectile::launched(1, Vec2::ZERO, -2.0, 7.0, 6.0);
        let heading = ball.vel.y.atan2(ball.vel.x);
        ball.set_speed(14.0);
        assert!((ball.speed() - 14.0).abs() < 1e-4);
        assert!((ball.vel.y.atan2(ball.vel.x) - heading).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_side_wall_reflection_preserves_speed(
            vx in 0.5f32..12.0,
            vy in prop_oneof![-12.0f32..-0.5, 0.5f32..12.0],
            t in 0.0f32..0.99,
            y in 100.0f32..400.0,
            left in any::<bool>(),
        ) {
            let mut field = empty_field();
            let (x, vx) = if left {
                (6.0 + t * vx, -vx)
            } else {
                (394.0 - t * vx, vx)
            };
            let mut balls = vec![projectile(Vec2::new(x, y), Vec2::new(vx, vy))];
            let before = balls[0].speed();

            let report = step_projectiles(&mut balls, &mut field, BOUNDS);
            prop_assert!(report.exited.is_empty());
            prop_assert!((balls[0].speed() - before).abs() < 1e-4);
            prop_assert_eq!(balls[0].vel.x, -vx);
            prop_assert_eq!(balls[0].vel.y, vy);
        }

        #[test]
        fn prop_no_repeat_hit_without_wall(
            x in 110.0f32..140.0,
            vx in -0.5f32..0.5,
        ) {
            let mut field = empty_field();
            let id = field.place(Cell::new(2, 5), ObstacleKind::Standard, 50);
            let mut balls = vec![projectile(Vec2::new(x, 190.0), Vec2::new(vx, -7.0))];

            step_projectiles(&mut balls, &mut field, BOUNDS);
            let after_first = field.find(id).unwrap().durability;
            prop_assert_eq!(after_first, 49);
            prop_assert_eq!(balls[0].last_hit, Some(id));

            step_projectiles(&mut balls, &mut field, BOUNDS);
            prop_assert_eq!(field.find(id).unwrap().durability, after_first);
        }
    }
}
