/// Level generator: a 3x3 grid of rooms separated by hallways.
///
/// ## Layout (tiles)
///
/// ```text
///   x:  0      8  12     20  24     31
///       ┌──────┬──┬──────┬──┬──────┐
///       │ room │##│ room │##│ room │   hallway bands are walls
///       ├──────┼──┼──────┼──┼──────┤   with a 2-wide corridor
///       │ room │##│SPAWN │##│ room │   carved through the middle
///       ├──────┼──┼──────┼──┼──────┤
///       │ room │##│ room │##│ room │
///       └──────┴──┴──────┴──┴──────┘
/// ```
///
/// Room (col, row) starts at tile (col * 12, row * 12) and is 8x8.
/// Every room gets one door punched through the adjacent hallway wall;
/// doors of non-spawn rooms are queued to close over time.
///
/// ## Random draws
///
/// Every draw comes from the world's RNG, in a fixed order, so one seed
/// always yields the same level. Ranges below are half-open.

use glam::{IVec2, Vec2};
use rand::Rng;
use tracing::debug;

use crate::domain::entity::{Direction, Door, Guard};
use crate::domain::grid::{
    room_origin, tile_origin, HALLWAY_SIZE, ROOMS_PER_SIDE, ROOM_SIZE, SIZE,
};
use crate::domain::tile::Tile;

use super::world::World;

/// Room holding the exit and the player spawn.
pub const SPAWN_ROOM: IVec2 = IVec2::new(1, 1);

/// Corridor carved through each hallway band.
const LUMEN_WIDTH: i32 = 2;
/// Attempts at finding an Air cell for one room guard.
const GUARD_PLACEMENT_RETRIES: usize = 3;
/// Pixel inset of a room guard from its tile's corner.
const GUARD_INSET: f32 = 2.0;

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Replace the world's level with a freshly generated one.
///
/// Clears grid, guards and doors, then builds hallways, rooms and doors,
/// and re-spawns the player next to the new exit.
pub fn generate(world: &mut World) {
    world.grid.clear();
    world.guards.clear();
    world.doors.clear();

    build_hallways(world);
    spawn_hallway_guard(world);

    for row in 0..ROOMS_PER_SIDE {
        for col in 0..ROOMS_PER_SIDE {
            let room = IVec2::new(col, row);
            let origin = room_origin(col, row);
            let is_spawn_room = room == SPAWN_ROOM;

            if is_spawn_room {
                build_spawn_room(world, origin);
            } else {
                build_room(world, origin);
            }
            build_door(world, room, origin, is_spawn_room);
        }
    }

    world.doors.pick_next(&mut world.rng);

    debug!(
        guards = world.guards.len(),
        pending_doors = world.doors.pending().len(),
        exit = ?world.exit_cell(),
        "level generated"
    );
}

/// Top-left tiles of the two corridors, one per hallway band.
pub fn lumens() -> [i32; 2] {
    let first_band = ROOM_SIZE;
    let second_band = ROOM_SIZE * 2 + HALLWAY_SIZE;
    [first_band + 1, second_band + 1]
}

// ══════════════════════════════════════════════════════════════
// Hallways
// ══════════════════════════════════════════════════════════════

fn build_hallways(world: &mut World) {
    let bands = [ROOM_SIZE, ROOM_SIZE * 2 + HALLWAY_SIZE];
    for band in bands {
        world.grid.fill_rect(band, 0, HALLWAY_SIZE, SIZE, Tile::OfficeWall);
        world.grid.fill_rect(0, band, SIZE, HALLWAY_SIZE, Tile::OfficeWall);
    }
    for lumen in lumens() {
        world.grid.fill_rect(lumen, 0, LUMEN_WIDTH, SIZE, Tile::Air);
        world.grid.fill_rect(0, lumen, SIZE, LUMEN_WIDTH, Tile::Air);
    }
}

/// One guard patrolling a vertical corridor.
fn spawn_hallway_guard(world: &mut World) {
    let [left, right] = lumens();
    let mut x = world.rng.gen_range(1..HALLWAY_SIZE - 2);
    x += if world.rng.gen::<f32>() > 0.5 { left } else { right };
    let y = world.rng.gen_range(1..SIZE - 1);

    let guard = Guard::spawn(tile_origin(IVec2::new(x, y)), &mut world.rng);
    world.guards.push(guard);
}

// ══════════════════════════════════════════════════════════════
// Rooms
// ══════════════════════════════════════════════════════════════

fn build_spawn_room(world: &mut World, origin: IVec2) {
    let exit = origin
        + IVec2::new(
            world.rng.gen_range(3..ROOM_SIZE - 3),
            world.rng.gen_range(1..ROOM_SIZE - 1),
        );
    world.grid.set_at(exit, Tile::Exit);
    world.player.spawn_at(tile_origin(exit - IVec2::X));
}

fn build_room(world: &mut World, origin: IVec2) {
    let pillars = world.rng.gen_range(0..5);
    for _ in 0..pillars {
        let cell = origin + random_cell(&mut world.rng, 1..ROOM_SIZE - 1);
        world.grid.set_at(cell, Tile::OfficeWall);
    }

    let loot = world.rng.gen_range(1..4);
    for _ in 0..loot {
        let cell = origin + random_cell(&mut world.rng, 0..ROOM_SIZE);
        let tile = if world.rng.gen_range(0..2) == 0 { Tile::GoldBars } else { Tile::SilverCoin };
        world.grid.set_at(cell, tile);
    }

    let guards = world.rng.gen_range(1..4);
    for _ in 0..guards {
        for _ in 0..GUARD_PLACEMENT_RETRIES {
            let cell = origin + random_cell(&mut world.rng, 0..ROOM_SIZE);
            if world.grid.get_at(cell) != Tile::Air {
                continue;
            }
            let position = tile_origin(cell) + Vec2::splat(GUARD_INSET);
            let guard = Guard::spawn(position, &mut world.rng);
            world.guards.push(guard);
            break;
        }
    }
}

fn random_cell<R: Rng + ?Sized>(rng: &mut R, range: std::ops::Range<i32>) -> IVec2 {
    let x = rng.gen_range(range.clone());
    let y = rng.gen_range(range);
    IVec2::new(x, y)
}

// ══════════════════════════════════════════════════════════════
// Doors
// ══════════════════════════════════════════════════════════════

/// Punch one door through a wall of the room that faces a hallway.
fn build_door(world: &mut World, room: IVec2, origin: IVec2, is_spawn_room: bool) {
    let offset = world.rng.gen_range(1..ROOM_SIZE - 1);

    let mut sides = Vec::with_capacity(4);
    if room.y > 0 { sides.push(Direction::Up); }
    if room.y < ROOMS_PER_SIDE - 1 { sides.push(Direction::Down); }
    if room.x > 0 { sides.push(Direction::Left); }
    if room.x < ROOMS_PER_SIDE - 1 { sides.push(Direction::Right); }
    let side = sides[world.rng.gen_range(0..sides.len())];

    let (cell, tile) = door_cell(origin, side, offset);
    world.grid.set_at(cell, tile);
    if !is_spawn_room {
        world.doors.queue(Door { cell, room: origin });
    }
}

/// Door cell and open tile for a door on `side` of the room at `origin`.
pub fn door_cell(origin: IVec2, side: Direction, offset: i32) -> (IVec2, Tile) {
    match side {
        Direction::Up => (origin + IVec2::new(offset, -1), Tile::DoorOpenVertical),
        Direction::Down => (origin + IVec2::new(offset, ROOM_SIZE), Tile::DoorOpenVertical),
        Direction::Left => (origin + IVec2::new(-1, offset), Tile::DoorOpenHorizontal),
        Direction::Right => (origin + IVec2::new(ROOM_SIZE, offset), Tile::DoorOpenHorizontal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tile_position;
    use crate::domain::physics::Mover;
    use proptest::prelude::*;

    fn in_room(cell: IVec2, origin: IVec2) -> bool {
        (origin.x..origin.x + ROOM_SIZE).contains(&cell.x)
            && (origin.y..origin.y + ROOM_SIZE).contains(&cell.y)
    }

    /// Door tiles on the ring around a room, with the side they sit on.
    fn doors_around(world: &World, origin: IVec2) -> Vec<(Direction, Tile)> {
        let mut found = vec![];
        for i in 0..ROOM_SIZE {
            let ring = [
                (Direction::Up, origin + IVec2::new(i, -1)),
                (Direction::Down, origin + IVec2::new(i, ROOM_SIZE)),
                (Direction::Left, origin + IVec2::new(-1, i)),
                (Direction::Right, origin + IVec2::new(ROOM_SIZE, i)),
            ];
            for (side, cell) in ring {
                let tile = world.grid.get_at(cell);
                if tile.is_door() {
                    found.push((side, tile));
                }
            }
        }
        found
    }

    #[test]
    fn hallways_have_walls_and_corridors() {
        let world = World::with_seed(3);
        // Band edges are walls away from doors; corridor cells are open.
        assert_eq!(world.grid.get(9, 0), Tile::Air);
        assert_eq!(world.grid.get(10, 31), Tile::Air);
        assert_eq!(world.grid.get(0, 21), Tile::Air);
        assert_eq!(world.grid.get(31, 22), Tile::Air);
        assert_eq!(world.grid.get(9, 8), Tile::Air);
        // Hallway crossings are open too
        assert_eq!(world.grid.get(21, 9), Tile::Air);
        for y in [0, 31] {
            assert_eq!(world.grid.get(8, y), Tile::OfficeWall);
            assert_eq!(world.grid.get(23, y), Tile::OfficeWall);
        }
    }

    #[test]
    fn lumens_sit_inside_bands() {
        assert_eq!(lumens(), [9, 21]);
    }

    #[test]
    fn door_cells_by_side() {
        let origin = room_origin(1, 1);
        assert_eq!(door_cell(origin, Direction::Up, 3), (IVec2::new(15, 11), Tile::DoorOpenVertical));
        assert_eq!(door_cell(origin, Direction::Down, 3), (IVec2::new(15, 20), Tile::DoorOpenVertical));
        assert_eq!(door_cell(origin, Direction::Left, 2), (IVec2::new(11, 14), Tile::DoorOpenHorizontal));
        assert_eq!(door_cell(origin, Direction::Right, 2), (IVec2::new(20, 14), Tile::DoorOpenHorizontal));
    }

    #[test]
    fn player_spawns_left_of_exit() {
        let world = World::with_seed(17);
        let exit = world.exit_cell().unwrap();
        assert_eq!(tile_position(world.player.position()), exit - IVec2::X);
        assert!(!world.player.mover.overlaps_solid(&world.grid));
        assert_eq!(world.player.mover.velocity(), Vec2::ZERO);
    }

    #[test]
    fn regeneration_replaces_everything() {
        let mut world = World::with_seed(21);
        world.grid.fill_rect(0, 0, SIZE, SIZE, Tile::GoldBars);
        world.doors.queue(Door { cell: IVec2::ZERO, room: IVec2::ZERO });
        world.guards.clear();
        generate(&mut world);
        assert_eq!(world.grid.count(Tile::Exit), 1);
        assert!(world.grid.count(Tile::GoldBars) < 30);
        assert!(world.doors.closed().is_empty());
        assert_eq!(world.doors.pending().len(), 8);
        assert!(!world.guards.is_empty());
    }

    #[test]
    fn guard_with_no_free_cell_is_skipped() {
        let mut world = World::with_seed(40);
        let origin = room_origin(0, 0);
        world.grid.fill_rect(origin.x, origin.y, ROOM_SIZE, ROOM_SIZE, Tile::OfficeWall);
        world.guards.clear();

        build_room(&mut world, origin);
        assert!(world.guards.is_empty());
        for y in 0..ROOM_SIZE {
            for x in 0..ROOM_SIZE {
                assert_ne!(world.grid.get_at(origin + IVec2::new(x, y)), Tile::Air);
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn exactly_one_exit_in_spawn_room(seed in any::<u64>()) {
            let world = World::with_seed(seed);
            let exits = world.grid.positions_of(Tile::Exit);
            prop_assert_eq!(exits.len(), 1);
            prop_assert!(in_room(exits[0], room_origin(SPAWN_ROOM.x, SPAWN_ROOM.y)));
        }

        #[test]
        fn every_room_has_one_oriented_door(seed in any::<u64>()) {
            let world = World::with_seed(seed);
            for row in 0..ROOMS_PER_SIDE {
                for col in 0..ROOMS_PER_SIDE {
                    let doors = doors_around(&world, room_origin(col, row));
                    prop_assert_eq!(doors.len(), 1, "room ({}, {})", col, row);
                    let (side, tile) = doors[0];
                    let expected = match side {
                        Direction::Up | Direction::Down => Tile::DoorOpenVertical,
                        Direction::Left | Direction::Right => Tile::DoorOpenHorizontal,
                    };
                    prop_assert_eq!(tile, expected);
                }
            }
        }

        #[test]
        fn spawn_door_is_never_queued(seed in any::<u64>()) {
            let world = World::with_seed(seed);
            let spawn_origin = room_origin(SPAWN_ROOM.x, SPAWN_ROOM.y);
            prop_assert_eq!(world.doors.pending().len(), 8);
            prop_assert!(world.doors.pending().iter().all(|d| d.room != spawn_origin));
            prop_assert!(world.doors.pending().iter().all(|d| world.grid.get_at(d.cell).is_door()));
            prop_assert!(world.doors.next_to_close().is_some());
        }

        #[test]
        fn guards_start_clear_of_walls(seed in any::<u64>()) {
            let world = World::with_seed(seed);
            prop_assert!(!world.guards.is_empty());
            prop_assert!(world.guards.len() <= 1 + 8 * 3);
            for guard in &world.guards {
                let corner = tile_position(guard.position());
                prop_assert!(!world.grid.is_solid(corner.x, corner.y));
            }
            let body = world.player.position() + Mover::BODY_SIZE;
            prop_assert_eq!(world.player.tile_position, tile_position(body));
        }
    }
}
