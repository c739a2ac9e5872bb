//! Unified error types surfaced by the runtime API.
//!
//! Build-time failures (bad map, no room for entities) are fatal and returned
//! from [`crate::RuntimeBuilder::build`]. Runtime failures never escape the
//! entity tasks: they degrade to a status message or a no-op.
use std::fmt;

use game_core::{BoxId, GridError, Position};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime requires a map to be configured before building")]
    MissingMap,

    #[error("player start {position} is outside the map or blocked")]
    InvalidStart { position: Position },

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("map has {available} empty cells, {required} are required")]
    Capacity { required: usize, available: usize },

    #[error("no free cell to place the {entity}")]
    Placement { entity: EntityKind },

    #[error("box placement {position} is not an empty cell")]
    BoxPlacement { position: Position },

    #[error("entity task join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

/// Why an interaction with a box did not go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RendezvousError {
    #[error("{id} is already handling another interaction")]
    Busy { id: BoxId },

    #[error("{id} is no longer listening")]
    Gone { id: BoxId },

    #[error("{id} refused the interaction")]
    Refused { id: BoxId },

    #[error("{id} did not answer in time")]
    Timeout { id: BoxId },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Monster,
    Guide,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Monster => "monster",
            EntityKind::Guide => "guide",
        };
        write!(f, "{}", label)
    }
}
