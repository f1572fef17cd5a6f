/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Player: movement intent -> Mover -> loot pickup / exit
///   2. Guards, in insertion order: vision -> detection timer -> patrol
///   3. Door timer
///   4. End check (spotted or gave up)
///
/// Guards always see the player's tile as refreshed in (1) of the same tick.
/// An escape in (1) regenerates the level, so (2) and (3) already run on the
/// new one.

use tracing::info;

use crate::domain::entity::Player;
use crate::domain::grid::tile_position;
use crate::domain::input::{Action, InputSource};
use crate::domain::rules::{self, TileEffect};
use crate::domain::tile::Tile;
use super::event::GameEvent;
use super::world::{Phase, World};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut World, input: &impl InputSource, dt: f32) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();

    resolve_player(world, input, dt, &mut events);
    resolve_guards(world, dt, &mut events);
    resolve_doors(world, dt, &mut events);
    resolve_end(world, input);

    events
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(world: &mut World, input: &impl InputSource, dt: f32, events: &mut Vec<GameEvent>) {
    let intent = rules::movement_intent(input);
    let sprinting = input.is_held(Action::Sprint);

    let player = &mut world.player;
    player.mover.update(dt, intent, sprinting, &world.grid);
    player.tile_position = Player::tile_under(player.position());

    let cell = tile_position(player.position());
    match rules::effect_at(&world.grid, cell, player.loot_this_level) {
        TileEffect::Loot { value } => {
            player.money += value;
            player.loot_this_level += 1;
            world.set_tile(cell, Tile::Air);
            events.push(GameEvent::LootPicked { cell, value });
        }
        TileEffect::Escape => {
            world.levels_cleared += 1;
            info!(
                money = world.player.money, levels = world.levels_cleared,
                "escaped, generating next level"
            );
            world.regenerate();
            events.push(GameEvent::LevelRegenerated);
        }
        TileEffect::ExitLocked | TileEffect::Nothing => {}
    }
}

// ══════════════════════════════════════════════════════════════
// Guards
// ══════════════════════════════════════════════════════════════

fn resolve_guards(world: &mut World, dt: f32, events: &mut Vec<GameEvent>) {
    let target = world.player.tile_position;
    for guard in world.guards.iter_mut() {
        let spotted = guard.update(dt, &world.grid, target);
        if spotted && !world.player.was_spotted {
            world.player.was_spotted = true;
            info!(guard = ?guard.tile_position(), player = ?target, "player spotted");
            events.push(GameEvent::PlayerSpotted);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Doors
// ══════════════════════════════════════════════════════════════

fn resolve_doors(world: &mut World, dt: f32, events: &mut Vec<GameEvent>) {
    if let Some(door) = world.doors.advance(dt, &mut world.grid, &mut world.rng) {
        events.push(GameEvent::DoorClosed { cell: door.cell });
    }
}

// ══════════════════════════════════════════════════════════════
// End of run
// ══════════════════════════════════════════════════════════════

fn resolve_end(world: &mut World, input: &impl InputSource) {
    if world.player.was_spotted || input.was_pressed(Action::GiveUp) {
        world.give_up();
    }
}
