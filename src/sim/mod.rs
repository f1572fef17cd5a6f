//! Simulation layer: world state, level generation, the door timer, the
//! per-tick step and frame emission.

pub mod doors;
pub mod draw;
pub mod event;
pub mod level;
pub mod step;
pub mod world;
