//! Office Heist: simulation core.
//!
//! `domain` holds the pure game rules (tiles, movement, guard AI);
//! `sim` owns the world, level generation and the per-tick step.
//! The terminal front-end lives in the binary.

pub mod domain;
pub mod sim;
