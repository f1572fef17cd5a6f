/// Frame emission: turns the world into a flat list of draw requests.
///
/// The core never touches a terminal. It hands `DrawRequest`s to a
/// `DrawSink`, which decides how to rasterise them.
///
/// ## Depth
///
/// `depth` is a layer hint in [0, 1]; higher is drawn on top. `None` means
/// the sink's default layer (between the vision markers and the overlays):
///
///   0.0   guard vision markers
///   None  tiles, player, guards, exit sign
///   0.98  darkness over rooms sealed by a closed door
///   1.0   question marks, the next-door exclamation point
///
/// Requests are emitted in a fixed order (tiles, darkness, overlays, guards,
/// player); sinks that ignore depth still get a sensible picture by drawing
/// in that order.

use glam::{IVec2, Vec2};

use crate::domain::ai::visible_cells;
use crate::domain::grid::{tile_origin, TILE_WIDTH, ROOM_SIZE, SIZE};
use crate::domain::tile::{SpriteId, Tile};
use super::world::World;

pub const VISION_DEPTH: f32 = 0.0;
pub const DARKNESS_DEPTH: f32 = 0.98;
pub const OVERLAY_DEPTH: f32 = 1.0;

/// Question mark position relative to its guard.
pub const QUESTION_MARK_OFFSET: Vec2 = Vec2::new(-2.0, -10.0);
/// Exclamation point height above the door it warns about.
pub const EXCLAMATION_RISE: f32 = 10.0;
/// Exit sign position relative to the exit tile.
pub const EXIT_SIGN_OFFSET: Vec2 = Vec2::new(TILE_WIDTH as f32 + 1.0, 2.0);

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DrawRequest {
    /// Top-left pixel position.
    pub position: Vec2,
    pub sprite: SpriteId,
    pub depth: Option<f32>,
}

impl DrawRequest {
    pub fn new(position: Vec2, sprite: SpriteId) -> Self {
        DrawRequest { position, sprite, depth: None }
    }

    pub fn at_depth(position: Vec2, sprite: SpriteId, depth: f32) -> Self {
        DrawRequest { position, sprite, depth: Some(depth) }
    }
}

pub trait DrawSink {
    fn draw(&mut self, request: DrawRequest);
}

impl DrawSink for Vec<DrawRequest> {
    fn draw(&mut self, request: DrawRequest) {
        self.push(request);
    }
}

/// Emit every request for one frame of `world` into `sink`.
///
/// Tiles go first, then overlays, guards and finally the player, so a sink
/// that keeps emission order within a layer draws bodies over the floor.
pub fn emit_frame(world: &World, sink: &mut impl DrawSink) {
    // One ring beyond the grid so the out-of-bounds walls frame the level.
    for y in -1..=SIZE {
        for x in -1..=SIZE {
            let cell = IVec2::new(x, y);
            let tile = world.tile_at(cell);
            let Some(sprite) = tile.sprite() else { continue };
            let position = tile_origin(cell);
            sink.draw(DrawRequest::new(position, sprite));

            if tile == Tile::Exit {
                let sign = if world.player.can_exit() { SpriteId::ExitSignOpen } else { SpriteId::ExitSign };
                sink.draw(DrawRequest::new(position + EXIT_SIGN_OFFSET, sign));
            }
        }
    }

    for door in world.doors.closed() {
        for y in door.room.y..door.room.y + ROOM_SIZE {
            for x in door.room.x..door.room.x + ROOM_SIZE {
                let position = tile_origin(IVec2::new(x, y));
                sink.draw(DrawRequest::at_depth(position, SpriteId::Darkness, DARKNESS_DEPTH));
            }
        }
    }

    if let Some(door) = world.doors.next_to_close() {
        let position = tile_origin(door.cell) - Vec2::new(0.0, EXCLAMATION_RISE);
        sink.draw(DrawRequest::at_depth(position, SpriteId::ExclamationPoint, OVERLAY_DEPTH));
    }

    for guard in &world.guards {
        for cell in visible_cells(guard, &world.grid) {
            sink.draw(DrawRequest::at_depth(tile_origin(cell), SpriteId::DangerMarker, VISION_DEPTH));
        }
        sink.draw(DrawRequest::new(guard.position(), SpriteId::Guard));
        if guard.is_suspicious() {
            sink.draw(DrawRequest::at_depth(
                guard.position() + QUESTION_MARK_OFFSET,
                SpriteId::QuestionMark,
                OVERLAY_DEPTH,
            ));
        }
    }

    sink.draw(DrawRequest::new(world.player.position(), SpriteId::Robber));
}
