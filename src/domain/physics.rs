/// Mover: the collision-resolving kinematic body shared by player and guards.
///
/// ## Integration
///
/// Desired direction -> normalised -> scaled by `speed * dt` (x2 sprinting)
/// -> Y scaled by the tile aspect ratio -> velocity eased toward it with
/// `lerp(velocity, target, ACCELERATION_RATE * dt)`. Velocity is a per-tick
/// displacement, not a per-second rate.
///
/// ## Collision
///
/// Axis-separated. Move X, test the four body corners against solid tiles,
/// on overlap revert and snap flush against the obstruction; then the same
/// for Y. Resolving each axis on its own lets a body slide along a wall.
///
/// Only the post-move corners are sampled (no sweep), so a tick must move
/// less than one tile. The game loop discards oversized frames for this.
///
/// When both axes collide in one tick the Y result is reported.

use glam::Vec2;

use super::entity::Direction;
use super::grid::{self, TileGrid, TILE_HEIGHT, TILE_SIZE_RATIO, TILE_WIDTH};

pub const SPRINT_MULTIPLIER: f32 = 2.0;
pub const ACCELERATION_RATE: f32 = 10.0;
/// Gap kept between a snapped body and the wall it hit.
pub const COLLISION_PADDING: f32 = 0.01;

#[derive(Clone, Debug, PartialEq)]
pub struct Mover {
    position: Vec2,
    velocity: Vec2,
    speed: f32,
}

impl Mover {
    /// Half a tile on each axis.
    pub const BODY_SIZE: Vec2 = Vec2::new(TILE_WIDTH as f32 * 0.5, TILE_HEIGHT as f32 * 0.5);

    pub fn new(speed: f32) -> Self {
        Mover { position: Vec2::ZERO, velocity: Vec2::ZERO, speed }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Move instantly with no residual momentum.
    pub fn teleport_to(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
    }

    /// Advance one tick. Returns the side the body was blocked on, if any.
    pub fn update(
        &mut self,
        dt: f32,
        desired: Vec2,
        sprinting: bool,
        grid: &TileGrid,
    ) -> Option<Direction> {
        let mut target = desired.normalize_or_zero() * dt * self.speed;
        if sprinting {
            target *= SPRINT_MULTIPLIER;
        }
        target.y *= TILE_SIZE_RATIO;

        self.velocity = self.velocity.lerp(target, ACCELERATION_RATE * dt);

        let mut blocked = None;

        self.position.x += self.velocity.x;
        if self.overlaps_solid(grid) {
            self.position.x -= self.velocity.x;
            let tw = TILE_WIDTH as f32;
            if self.velocity.x > 0.0 {
                self.position.x =
                    (self.position.x / tw).ceil() * tw - Mover::BODY_SIZE.x - COLLISION_PADDING;
                blocked = Some(Direction::Right);
            } else {
                self.position.x = (self.position.x / tw).floor() * tw + COLLISION_PADDING;
                blocked = Some(Direction::Left);
            }
        }

        self.position.y += self.velocity.y;
        if self.overlaps_solid(grid) {
            self.position.y -= self.velocity.y;
            let th = TILE_HEIGHT as f32;
            if self.velocity.y > 0.0 {
                self.position.y =
                    (self.position.y / th).ceil() * th - Mover::BODY_SIZE.y - COLLISION_PADDING;
                blocked = Some(Direction::Down);
            } else {
                self.position.y = (self.position.y / th).floor() * th + COLLISION_PADDING;
                blocked = Some(Direction::Up);
            }
        }

        blocked
    }

    /// Does any corner of the body sit on a solid tile?
    pub fn overlaps_solid(&self, grid: &TileGrid) -> bool {
        body_corners(self.position).iter().any(|&corner| {
            let t = grid::tile_position(corner);
            grid.is_solid(t.x, t.y)
        })
    }
}

/// The four corners of a body whose top-left is at `position`.
pub fn body_corners(position: Vec2) -> [Vec2; 4] {
    let s = Mover::BODY_SIZE;
    [
        position,
        position + Vec2::new(s.x, 0.0),
        position + Vec2::new(0.0, s.y),
        position + s,
    ]
}
