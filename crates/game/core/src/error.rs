//! Error types for grid construction and cell access.
//!
//! Entity-level failures (placement exhaustion, rendezvous problems) belong to
//! the runtime; this module only covers violations of the grid's own shape.

use crate::state::Position;

/// Errors raised by [`crate::Grid`] operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid must have at least one row and one column")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("position ({}, {}) is outside the grid", position.x, position.y)]
    OutOfBounds { position: Position },
}
