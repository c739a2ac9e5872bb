//! Read-only views handed to renderers and tests.

use game_core::{BoxId, BoxKind, Cell, Position};

/// Lifecycle of a box.
///
/// `Relocating` only exists inside the world lock, so outside observers see
/// `Idle`, `Triggered`, `Animating`, or `Removed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxPhase {
    Idle,
    Relocating,
    Triggered,
    Animating,
    Removed,
}

impl BoxPhase {
    pub fn is_removed(self) -> bool {
        self == BoxPhase::Removed
    }

    /// Boxes that have not been opened yet.
    pub fn is_closed(self) -> bool {
        matches!(self, BoxPhase::Idle | BoxPhase::Relocating)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossCause {
    Trap,
    Robbed,
}

/// How the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost(LossCause),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxView {
    pub id: BoxId,
    pub kind: BoxKind,
    pub position: Position,
    pub phase: BoxPhase,
}

/// Consistent picture of the arena taken under the world lock.
#[derive(Debug, Clone)]
pub struct ArenaSnapshot {
    pub rows: Vec<Vec<Cell>>,
    pub player: Position,
    /// The guide is drawn on top of the grid rather than stored in it.
    pub guide: Option<Position>,
    pub monster: Option<Position>,
    pub message: String,
    pub treasures: u32,
    pub outcome: Option<Outcome>,
}

impl ArenaSnapshot {
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, position: Position) -> Option<Cell> {
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        self.rows.get(y)?.get(x).copied()
    }
}
