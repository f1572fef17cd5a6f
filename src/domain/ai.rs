/// Guard AI: vision cone, detection timer, wall-bounce patrol.
///
/// ## Vision cone
///
/// Three parallel rays along the facing direction, cast over the tile grid:
///
/// ```text
///   facing Up, VISION_LENGTH = 4
///
///      F C F        C = centre ray (4 tiles, starts on the guard's tile)
///      F C F        F = flanking rays (3 tiles, start one tile ahead and
///      F C F            one tile to either side)
///        g          g = guard tile, first cell of the centre ray
/// ```
///
/// A ray stops before the first solid tile; nothing behind a wall is traced.
///
/// ## Detection
///
/// Seeing the player accumulates the reaction timer; the player is spotted
/// once it exceeds `REACTION_TIME`. Any tick without sight resets it to zero,
/// so only continuous exposure counts.
///
/// ## Patrol
///
/// Guards walk straight along their heading and turn (per `TurnPolicy`) when
/// their Mover reports a collision.

use glam::IVec2;
use tracing::trace;

use super::entity::{Direction, Guard, TurnPolicy};
use super::grid::{self, TileGrid};

pub const VISION_LENGTH: i32 = 4;
/// Seconds of continuous sight before the player counts as spotted.
pub const REACTION_TIME: f32 = 0.5;

/// New heading after walking into something on side `collision`.
pub fn turn_away(collision: Direction, policy: TurnPolicy) -> Direction {
    match policy {
        TurnPolicy::Circular => match collision {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        },
        TurnPolicy::Reversing => match collision {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        },
    }
}

/// Trace one ray, calling `on_tile` for each visible cell.
fn vision_line(
    grid: &TileGrid,
    start: IVec2,
    step: IVec2,
    length: i32,
    on_tile: &mut impl FnMut(IVec2),
) {
    for i in 0..length {
        let cell = start + step * i;
        if grid.get_at(cell).is_solid() {
            break;
        }
        on_tile(cell);
    }
}

/// Trace the full cone from `origin` facing `facing`.
pub fn vision_cone(grid: &TileGrid, origin: IVec2, facing: Direction, mut on_tile: impl FnMut(IVec2)) {
    let step = facing.offset();
    let side = facing.side_offset();

    vision_line(grid, origin, step, VISION_LENGTH, &mut on_tile);
    vision_line(grid, origin - side + step, step, VISION_LENGTH - 1, &mut on_tile);
    vision_line(grid, origin + side + step, step, VISION_LENGTH - 1, &mut on_tile);
}

/// All cells a guard can currently see, in trace order.
pub fn visible_cells(guard: &Guard, grid: &TileGrid) -> Vec<IVec2> {
    let mut cells = Vec::with_capacity((VISION_LENGTH * 3) as usize);
    vision_cone(grid, guard.tile_position(), guard.direction, |c| cells.push(c));
    cells
}

/// Does the cone from `origin` cover `target`?
pub fn can_see(grid: &TileGrid, origin: IVec2, facing: Direction, target: IVec2) -> bool {
    let mut seen = false;
    vision_cone(grid, origin, facing, |c| seen |= c == target);
    seen
}

impl Guard {
    /// Tile under the guard's top-left corner; the cone is cast from here.
    pub fn tile_position(&self) -> IVec2 {
        grid::tile_position(self.position())
    }

    /// Run the detection timer for one tick given whether the player was in
    /// view. Returns true once the reaction time has been exceeded.
    pub fn observe(&mut self, dt: f32, saw_player: bool) -> bool {
        self.can_see_player = saw_player;
        if saw_player {
            self.reaction_timer += dt;
            self.reaction_timer > REACTION_TIME
        } else {
            self.reaction_timer = 0.0;
            false
        }
    }

    /// One guard tick: look, react, walk, turn. Returns true once the player
    /// has been in view for longer than the reaction time.
    pub fn update(&mut self, dt: f32, grid: &TileGrid, player_tile: IVec2) -> bool {
        let saw_player = can_see(grid, self.tile_position(), self.direction, player_tile);
        let spotted_player = self.observe(dt, saw_player);

        if let Some(hit) = self.mover.update(dt, self.direction.unit(), false, grid) {
            let heading = turn_away(hit, self.policy);
            trace!(?hit, from = ?self.direction, to = ?heading, "guard turned");
            self.direction = heading;
        }

        spotted_player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tile_origin;
    use crate::domain::physics::Mover;

    const DT: f32 = 0.1;

    fn guard_on(tile: IVec2, direction: Direction, policy: TurnPolicy) -> Guard {
        Guard::new(tile_origin(tile), 7.5, direction, policy)
    }

    #[test]
    fn circular_turns_clockwise() {
        let mut d = Direction::Up;
        let mut seen = vec![];
        for _ in 0..4 {
            d = turn_away(d, TurnPolicy::Circular);
            seen.push(d);
        }
        assert_eq!(seen, vec![Direction::Right, Direction::Down, Direction::Left, Direction::Up]);
    }

    #[test]
    fn reversing_turns_around() {
        assert_eq!(turn_away(Direction::Up, TurnPolicy::Reversing), Direction::Down);
        assert_eq!(turn_away(Direction::Down, TurnPolicy::Reversing), Direction::Up);
        assert_eq!(turn_away(Direction::Left, TurnPolicy::Reversing), Direction::Right);
        assert_eq!(turn_away(Direction::Right, TurnPolicy::Reversing), Direction::Left);
    }

    #[test]
    fn cone_shape_facing_up() {
        let grid = TileGrid::new();
        let g = guard_on(IVec2::new(10, 10), Direction::Up, TurnPolicy::Circular);
        let cells = visible_cells(&g, &grid);
        assert_eq!(cells.len(), 4 + 3 + 3);
        for y in 7..=10 {
            assert!(cells.contains(&IVec2::new(10, y)));
        }
        for y in 7..=9 {
            assert!(cells.contains(&IVec2::new(9, y)));
            assert!(cells.contains(&IVec2::new(11, y)));
        }
        assert!(!cells.contains(&IVec2::new(10, 6)));
        assert!(!cells.contains(&IVec2::new(9, 10)));
    }

    #[test]
    fn cone_shape_facing_right() {
        let grid = TileGrid::new();
        let g = guard_on(IVec2::new(5, 5), Direction::Right, TurnPolicy::Circular);
        let cells = visible_cells(&g, &grid);
        assert!(cells.contains(&IVec2::new(8, 5)));
        assert!(cells.contains(&IVec2::new(6, 4)));
        assert!(cells.contains(&IVec2::new(8, 6)));
        assert!(!cells.contains(&IVec2::new(9, 5)));
    }

    #[test]
    fn sees_player_at_range_in_same_column() {
        let grid = TileGrid::new();
        let origin = IVec2::new(10, 10);
        let at_range = origin + IVec2::new(0, -(VISION_LENGTH - 1));
        assert!(can_see(&grid, origin, Direction::Up, at_range));
        assert!(!can_see(&grid, origin, Direction::Up, at_range + IVec2::new(0, -1)));
        assert!(!can_see(&grid, origin, Direction::Down, at_range));
    }

    #[test]
    fn wall_blocks_line_of_sight() {
        let mut grid = TileGrid::new();
        let origin = IVec2::new(10, 10);
        grid.set(10, 8, crate::domain::tile::Tile::OfficeWall);
        assert!(can_see(&grid, origin, Direction::Up, IVec2::new(10, 9)));
        assert!(!can_see(&grid, origin, Direction::Up, IVec2::new(10, 8)));
        assert!(!can_see(&grid, origin, Direction::Up, IVec2::new(10, 7)));
        // Flanks are separate rays
        assert!(can_see(&grid, origin, Direction::Up, IVec2::new(11, 7)));
    }

    #[test]
    fn closed_door_blocks_sight_open_door_does_not() {
        use crate::domain::tile::Tile;
        let mut grid = TileGrid::new();
        let origin = IVec2::new(4, 4);
        grid.set(6, 4, Tile::DoorOpenHorizontal);
        assert!(can_see(&grid, origin, Direction::Right, IVec2::new(7, 4)));
        grid.set(6, 4, Tile::DoorClosedHorizontal);
        assert!(!can_see(&grid, origin, Direction::Right, IVec2::new(7, 4)));
    }

    #[test]
    fn brief_sighting_does_not_spot() {
        let mut g = guard_on(IVec2::new(3, 3), Direction::Up, TurnPolicy::Circular);
        let mut spotted = false;
        for _ in 0..4 {
            spotted |= g.observe(DT, true);
        }
        assert!(g.is_suspicious());
        spotted |= g.observe(DT, false);
        assert!(!g.is_suspicious());
        for _ in 0..4 {
            spotted |= g.observe(DT, true);
        }
        assert!(!spotted);
    }

    #[test]
    fn continuous_sighting_spots() {
        let mut g = guard_on(IVec2::new(3, 3), Direction::Up, TurnPolicy::Circular);
        let results: Vec<bool> = (0..6).map(|_| g.observe(DT, true)).collect();
        assert!(!results[..4].iter().any(|&s| s));
        assert!(results[5]);
    }

    #[test]
    fn update_sees_player_and_walks() {
        let grid = TileGrid::new();
        let mut g = guard_on(IVec2::new(10, 10), Direction::Up, TurnPolicy::Circular);
        let start = g.position();
        let spotted = g.update(DT, &grid, IVec2::new(10, 8));
        assert!(g.can_see_player);
        assert!(g.is_suspicious());
        assert!(!spotted);
        assert!(g.position().y < start.y);
        assert_eq!(g.position().x, start.x);
    }

    #[test]
    fn guard_turns_on_wall() {
        let mut grid = TileGrid::new();
        grid.fill_rect(0, 2, 32, 1, crate::domain::tile::Tile::OfficeWall);
        let mut g = Guard::new(
            tile_origin(IVec2::new(4, 4)) + Mover::BODY_SIZE * 0.5,
            10.0,
            Direction::Up,
            TurnPolicy::Reversing,
        );
        for _ in 0..400 {
            g.update(1.0 / 60.0, &grid, IVec2::new(-10, -10));
            if g.direction != Direction::Up {
                break;
            }
        }
        assert_eq!(g.direction, Direction::Down);
        assert!(g.position().y > 3.0 * 5.0);
    }
}
