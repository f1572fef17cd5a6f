/// Events emitted during a simulation step.
/// The presentation layer consumes these for the status line.

use glam::IVec2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    LootPicked { cell: IVec2, value: u32 },
    DoorClosed { cell: IVec2 },
    /// A guard's reaction timer ran out this tick.
    PlayerSpotted,
    /// The player escaped and a fresh level was generated.
    LevelRegenerated,
}
