//! Domain layer: tiles, grid, entities, physics, AI, rules.
//! Pure simulation types with no knowledge of terminals or files.

pub mod ai;
pub mod entity;
pub mod grid;
pub mod input;
pub mod physics;
pub mod rules;
pub mod tile;
