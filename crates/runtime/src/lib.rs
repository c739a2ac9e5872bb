//! Concurrent arena runtime.
//!
//! This crate runs every long-lived entity of the arena as its own tokio task
//! and serialises their access to the shared [`game_core::Grid`] through a
//! single world lock. Consumers build a [`Runtime`], drive the player through
//! the cloneable [`Game`] handle, and poll [`Game::snapshot`] to render.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the builder, task spawning, and shutdown
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based bus for render refreshes and game events
//! - [`message`] and [`clock`] implement the leased status line
//! - `entities` keeps the box, monster, and guide tasks internal to the crate
pub mod api;
pub mod clock;
pub mod events;
pub mod message;
pub mod runtime;

mod entities;
mod shutdown;
mod world;

pub use api::{
    ArenaSnapshot, BoxPhase, BoxView, EntityKind, Game, LossCause, Outcome, RendezvousError,
    Result, RuntimeError,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{Event, EventBus, GameEvent, Topic};
pub use message::MessageBoard;
pub use runtime::{Runtime, RuntimeBuilder};
