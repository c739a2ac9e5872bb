//! Event types for different topics.

use game_core::{BoxId, BoxKind, Position};

use crate::api::Outcome;

/// Things that happened in the arena, for frontends and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    BoxOpened {
        id: BoxId,
        kind: BoxKind,
        position: Position,
    },

    BoxRelocated {
        id: BoxId,
        from: Position,
        to: Position,
    },

    /// The disappearance animation finished; the cell is free again.
    BoxRemoved { id: BoxId },

    MonsterSpawned { position: Position },

    TreasureStolen { remaining: u32, stolen_total: u32 },

    /// Published exactly once, by whoever ended the game.
    GameOver { outcome: Outcome },
}
