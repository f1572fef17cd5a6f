/// Player rules: movement intent, loot pickup, exit.
///
/// Pure functions over the grid and input; the step function applies the
/// results.
///
/// ## Tile probes
///
/// Two different points of the player body are used:
///   - Vision / "where the player is": tile under the body centre.
///   - Pickup / exit: tile under the body's top-left corner.

use glam::{IVec2, Vec2};

use super::grid::TileGrid;
use super::input::{Action, InputSource};
use super::tile::Tile;

pub const LOOT_REQUIRED_TO_EXIT: u32 = 4;

pub fn can_exit(loot_this_level: u32) -> bool {
    loot_this_level >= LOOT_REQUIRED_TO_EXIT
}

/// Sum held directions into a (possibly diagonal, un-normalised) vector.
/// Opposite directions cancel.
pub fn movement_intent(input: &impl InputSource) -> Vec2 {
    let mut movement = Vec2::ZERO;
    if input.is_held(Action::MoveLeft) { movement.x -= 1.0; }
    if input.is_held(Action::MoveRight) { movement.x += 1.0; }
    if input.is_held(Action::MoveUp) { movement.y -= 1.0; }
    if input.is_held(Action::MoveDown) { movement.y += 1.0; }
    movement
}

/// What standing on a tile means for the player.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TileEffect {
    Nothing,
    Loot { value: u32 },
    /// On the exit with enough loot.
    Escape,
    /// On the exit without enough loot.
    ExitLocked,
}

pub fn tile_effect(tile: Tile, loot_this_level: u32) -> TileEffect {
    if tile.is_loot() {
        return TileEffect::Loot { value: tile.value() };
    }
    if tile == Tile::Exit {
        return if can_exit(loot_this_level) { TileEffect::Escape } else { TileEffect::ExitLocked };
    }
    TileEffect::Nothing
}

/// Effect of standing on `cell`.
pub fn effect_at(grid: &TileGrid, cell: IVec2, loot_this_level: u32) -> TileEffect {
    tile_effect(grid.get_at(cell), loot_this_level)
}
