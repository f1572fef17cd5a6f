/// World: the complete state of a running heist.
///
/// ## Ownership
///
/// Fields are public and disjoint so the step function can borrow the grid
/// immutably while mutating guards or the player:
///   - `grid`:   the single tile layer; doors and loot pickup mutate it.
///   - `guards`: replaced wholesale on every regeneration.
///   - `doors`:  pending / closed door collections and the closing timer.
///   - `player`: survives regeneration (money, spotted flag).
///   - `rng`:    the one random source; generation and spawning draw from it.
///
/// A seeded world is fully reproducible: same seed, same levels.

use glam::IVec2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::domain::entity::{Guard, Player};
use crate::domain::grid::TileGrid;
use crate::domain::tile::Tile;

use super::doors::DoorSchedule;
use super::level;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    /// Spotted or gave up; waiting for the player to continue.
    Ended,
}

pub struct World {
    // ── Level ──
    pub grid: TileGrid,
    pub guards: Vec<Guard>,
    pub doors: DoorSchedule,

    // ── Player ──
    pub player: Player,

    // ── Meta ──
    pub phase: Phase,
    /// Levels escaped during this run.
    pub levels_cleared: u32,
    pub rng: Xoshiro256PlusPlus,
}

// ── Construction ──

impl World {
    /// Build a world around `rng` and generate the first level.
    pub fn new(rng: Xoshiro256PlusPlus) -> Self {
        let mut world = World {
            grid: TileGrid::new(),
            guards: vec![],
            doors: DoorSchedule::new(),
            player: Player::new(),
            phase: Phase::Playing,
            levels_cleared: 0,
            rng,
        };
        world.regenerate();
        world
    }

    pub fn with_seed(seed: u64) -> Self {
        World::new(Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        World::new(Xoshiro256PlusPlus::from_entropy())
    }
}

// ── Level lifecycle ──

impl World {
    /// Throw away the current level and generate a new one. The player keeps
    /// money and the spotted flag.
    pub fn regenerate(&mut self) {
        level::generate(self);
    }

    /// New run after the end screen: wipe the player's progress and start
    /// over on a fresh level.
    pub fn reset_run(&mut self) {
        self.player.reset();
        self.levels_cleared = 0;
        self.phase = Phase::Playing;
        self.regenerate();
    }

    /// Voluntarily end the run.
    pub fn give_up(&mut self) {
        self.phase = Phase::Ended;
    }
}

// ── Tile query / mutation API ──

impl World {
    #[inline]
    pub fn tile_at(&self, cell: IVec2) -> Tile {
        self.grid.get_at(cell)
    }

    #[inline]
    pub fn set_tile(&mut self, cell: IVec2, tile: Tile) {
        self.grid.set_at(cell, tile);
    }

    /// The single Exit cell, if the level has one.
    pub fn exit_cell(&self) -> Option<IVec2> {
        self.grid.positions_of(Tile::Exit).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_level() {
        let a = World::with_seed(99);
        let b = World::with_seed(99);
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.guards.len(), b.guards.len());
        assert_eq!(a.player.position(), b.player.position());
        assert_eq!(a.doors.pending(), b.doors.pending());
    }

    #[test]
    fn different_seeds_differ() {
        let a = World::with_seed(1);
        let b = World::with_seed(2);
        assert_ne!(a.grid, b.grid);
    }

    #[test]
    fn regenerate_keeps_money_and_spotted_flag() {
        let mut world = World::with_seed(5);
        world.player.money = 300;
        world.player.was_spotted = true;
        world.player.loot_this_level = 2;
        world.regenerate();
        assert_eq!(world.player.money, 300);
        assert!(world.player.was_spotted);
        assert_eq!(world.player.loot_this_level, 0);
        assert!(world.exit_cell().is_some());
    }

    #[test]
    fn reset_run_starts_over() {
        let mut world = World::with_seed(5);
        world.player.money = 300;
        world.player.was_spotted = true;
        world.levels_cleared = 3;
        world.give_up();
        assert_eq!(world.phase, Phase::Ended);

        world.reset_run();
        assert_eq!(world.phase, Phase::Playing);
        assert_eq!(world.player.money, 0);
        assert!(!world.player.was_spotted);
        assert_eq!(world.levels_cleared, 0);
        assert_eq!(world.grid.count(Tile::Exit), 1);
    }

    #[test]
    fn tile_api_delegates_to_grid() {
        let mut world = World::with_seed(8);
        world.set_tile(IVec2::new(0, 0), Tile::GoldBars);
        assert_eq!(world.tile_at(IVec2::new(0, 0)), Tile::GoldBars);
        assert_eq!(world.tile_at(IVec2::new(-1, 0)), Tile::OfficeWall);
    }
}
