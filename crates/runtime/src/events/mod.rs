//! Topic-based event bus for runtime events.
//!
//! Entity tasks publish render refresh requests and game events to specific
//! topics, and consumers subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::GameEvent;
