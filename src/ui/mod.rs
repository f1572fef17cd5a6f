//! Terminal front-end: keyboard input and the diff renderer.

pub mod input;
pub mod renderer;
