//! Arena data types shared across the workspace.
//!
//! `game-core` defines the spatial vocabulary of the arena (cells, grid,
//! positions), the static [`ArenaConfig`], and the pure rules that do not need
//! a clock or a lock: distance metrics and the guide's hint bands. The
//! concurrent entities that mutate this data live in the `runtime` crate.
pub mod config;
pub mod error;
pub mod hint;
pub mod state;

pub use config::ArenaConfig;
pub use error::GridError;
pub use hint::HintBand;
pub use state::{BoxId, BoxKind, Cell, Grid, Position, Tile};
