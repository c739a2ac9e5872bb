//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! the entity tasks and the world lock can stay internal.

pub mod errors;
pub mod game;
pub mod snapshot;

pub use errors::{EntityKind, RendezvousError, Result, RuntimeError};
pub use game::Game;
pub use snapshot::{ArenaSnapshot, BoxPhase, BoxView, LossCause, Outcome};
