/// Entities: Player, Guard, Door.
/// Each entity owns its own Mover; nothing here is shared between entities.

use glam::{IVec2, Vec2};
use rand::Rng;

use super::physics::Mover;

/// Cardinal direction. Screen space: Up is -y.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    /// Unit movement vector (never diagonal).
    pub fn unit(self) -> Vec2 {
        self.offset().as_vec2()
    }

    /// One tile to the side of this direction's axis.
    pub fn side_offset(self) -> IVec2 {
        match self {
            Direction::Up | Direction::Down => IVec2::new(1, 0),
            Direction::Left | Direction::Right => IVec2::new(0, 1),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
    }
}

/// How a guard picks a new heading after walking into something.
/// Fixed per guard at spawn.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TurnPolicy {
    /// Turn 90 degrees: Up -> Right -> Down -> Left -> Up.
    Circular,
    /// Turn around: Up <-> Down, Left <-> Right.
    Reversing,
}

/// A carved door: its cell and the origin of the room it belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Door {
    pub cell: IVec2,
    pub room: IVec2,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub mover: Mover,
    pub money: u32,
    pub loot_this_level: u32,
    pub was_spotted: bool,
    /// Tile the body stands over, refreshed every tick. Guards test their
    /// vision against this.
    pub tile_position: IVec2,
}

impl Player {
    pub const SPEED: f32 = 15.0;

    pub fn new() -> Self {
        Player {
            mover: Mover::new(Player::SPEED),
            money: 0,
            loot_this_level: 0,
            was_spotted: false,
            tile_position: IVec2::ZERO,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.mover.position()
    }

    /// Tile the body at `position` stands over: the top-left shifted by one
    /// body size, half a tile down and right.
    pub fn tile_under(position: Vec2) -> IVec2 {
        super::grid::tile_position(position + Mover::BODY_SIZE)
    }

    /// Place the player for a new level. Clears the per-level loot count;
    /// money and the spotted flag are kept.
    pub fn spawn_at(&mut self, position: Vec2) {
        self.mover.teleport_to(position);
        self.tile_position = Player::tile_under(position);
        self.loot_this_level = 0;
    }

    /// Start a fresh run.
    pub fn reset(&mut self) {
        self.money = 0;
        self.loot_this_level = 0;
        self.was_spotted = false;
    }

    pub fn can_exit(&self) -> bool {
        super::rules::can_exit(self.loot_this_level)
    }
}

impl Default for Player {
    fn default() -> Self {
        Player::new()
    }
}

#[derive(Clone, Debug)]
pub struct Guard {
    pub mover: Mover,
    pub direction: Direction,
    pub policy: TurnPolicy,
    /// Seconds the player has been continuously in view.
    pub reaction_timer: f32,
    pub can_see_player: bool,
}

impl Guard {
    pub const MIN_SPEED: f32 = 5.0;
    pub const MAX_SPEED: f32 = 10.0;

    pub fn new(position: Vec2, speed: f32, direction: Direction, policy: TurnPolicy) -> Self {
        let mut mover = Mover::new(speed);
        mover.teleport_to(position);
        Guard {
            mover,
            direction,
            policy,
            reaction_timer: 0.0,
            can_see_player: false,
        }
    }

    /// Spawn with a random speed, heading and turn policy.
    pub fn spawn<R: Rng + ?Sized>(position: Vec2, rng: &mut R) -> Self {
        let speed = rng.gen::<f32>() * (Guard::MAX_SPEED - Guard::MIN_SPEED) + Guard::MIN_SPEED;
        let policy = if rng.gen::<f32>() > 0.5 { TurnPolicy::Circular } else { TurnPolicy::Reversing };
        let direction = Direction::random(rng);
        Guard::new(position, speed, direction, policy)
    }

    pub fn position(&self) -> Vec2 {
        self.mover.position()
    }

    /// Is the guard reacting to something it saw? (question mark overlay)
    pub fn is_suspicious(&self) -> bool {
        self.reaction_timer > 0.0
    }
}
