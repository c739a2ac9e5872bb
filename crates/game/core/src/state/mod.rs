//! Spatial state of the arena.
//!
//! [`Grid`] is a plain rectangular store of [`Cell`]s. It has no interior
//! locking: the runtime wraps it (together with the player and the box
//! registry) in a single mutex so every multi-step mutation is atomic.
mod cell;
mod common;
mod grid;

pub use cell::{BoxKind, Cell, Tile};
pub use common::{BoxId, Position};
pub use grid::Grid;
