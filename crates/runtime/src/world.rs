//! Shared spatial state behind the world lock.
//!
//! [`World`] bundles the grid with everything that must change atomically
//! together with it: the player position and the cell under the player, the
//! treasure counter, the outcome, and the box registry. Every read-modify-write
//! over any of these happens while holding the single mutex in [`SharedWorld`].
//!
//! Lock order: an entity's own lock (monster, guide) may be held while taking
//! the world lock, never the other way round. The message board lock is a leaf.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use game_core::{ArenaConfig, BoxId, BoxKind, Cell, Grid, Position};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::api::{BoxPhase, BoxView, Outcome, RuntimeError};
use crate::events::{EventBus, GameEvent};
use crate::message::MessageBoard;

/// Registry entry for one box. Mutated only under the world lock.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BoxRecord {
    pub id: BoxId,
    pub kind: BoxKind,
    pub position: Position,
    pub phase: BoxPhase,
}

impl BoxRecord {
    pub fn view(&self) -> BoxView {
        BoxView {
            id: self.id,
            kind: self.kind,
            position: self.position,
            phase: self.phase,
        }
    }
}

/// Result of applying a box's effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BoxEffect {
    pub treasures: u32,
    /// Set when this effect ended the game.
    pub ended: Option<Outcome>,
}

#[derive(Debug)]
pub(crate) struct World {
    pub grid: Grid,
    pub player: Position,
    /// What the player is standing on; restored when the player moves away.
    pub trail: Cell,
    pub treasures: u32,
    pub outcome: Option<Outcome>,
    pub boxes: Vec<BoxRecord>,
}

impl World {
    pub fn new(mut grid: Grid, player: Position) -> Result<Self, RuntimeError> {
        if grid.is_blocking(player) {
            return Err(RuntimeError::InvalidStart { position: player });
        }
        let trail = grid.set(player, Cell::PLAYER)?;
        Ok(Self {
            grid,
            player,
            trail,
            treasures: 0,
            outcome: None,
            boxes: Vec::new(),
        })
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Sets the outcome if the game is still running. Returns true for the
    /// single caller that actually ended the game.
    pub fn record_outcome(&mut self, outcome: Outcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }

    pub fn add_box(&mut self, kind: BoxKind, position: Position) -> Result<BoxId, RuntimeError> {
        if !self.grid.is_empty_at(position) {
            return Err(RuntimeError::BoxPlacement { position });
        }
        self.grid.set(position, Cell::BOX)?;
        let id = BoxId(self.boxes.len() as u32);
        self.boxes.push(BoxRecord {
            id,
            kind,
            position,
            phase: BoxPhase::Idle,
        });
        Ok(id)
    }

    pub fn box_record(&self, id: BoxId) -> Option<&BoxRecord> {
        self.boxes.get(id.0 as usize)
    }

    pub fn box_record_mut(&mut self, id: BoxId) -> Option<&mut BoxRecord> {
        self.boxes.get_mut(id.0 as usize)
    }

    /// A box that still occupies its cell (anything but `Removed`).
    pub fn live_box_at(&self, position: Position) -> Option<&BoxRecord> {
        self.boxes
            .iter()
            .find(|record| record.position == position && !record.phase.is_removed())
    }

    /// First idle box within reach of the player, in registry order.
    pub fn interactable_box(&self) -> Option<BoxId> {
        self.boxes
            .iter()
            .find(|record| record.phase == BoxPhase::Idle && record.position.is_adjacent(self.player))
            .map(|record| record.id)
    }

    /// Manhattan distance from the player to the closest unopened treasure.
    pub fn nearest_treasure_distance(&self) -> Option<u32> {
        self.boxes
            .iter()
            .filter(|record| record.kind == BoxKind::Treasure && record.phase.is_closed())
            .map(|record| record.position.manhattan(self.player))
            .min()
    }

    /// Uniformly random empty cell, or `None` when the grid is saturated.
    pub fn random_empty_cell<R: Rng>(&self, rng: &mut R) -> Option<Position> {
        let empty: Vec<Position> = self.grid.empty_cells().collect();
        empty.choose(rng).copied()
    }

    /// Moves the player, restoring the trail cell behind them. The caller has
    /// already checked that `target` is free.
    pub fn move_player_to(&mut self, target: Position) -> Result<(), RuntimeError> {
        let arriving_on = self.grid.set(target, Cell::PLAYER)?;
        self.grid.set(self.player, self.trail)?;
        self.trail = arriving_on;
        self.player = target;
        Ok(())
    }

    pub fn apply_box_effect(&mut self, kind: BoxKind, treasures_to_win: u32) -> BoxEffect {
        let ended = match kind {
            BoxKind::Empty => None,
            BoxKind::Treasure => {
                self.treasures = self.treasures.saturating_add(1);
                (self.treasures >= treasures_to_win && self.record_outcome(Outcome::Won))
                    .then_some(Outcome::Won)
            }
            BoxKind::Trap => {
                let outcome = Outcome::Lost(crate::api::LossCause::Trap);
                self.record_outcome(outcome).then_some(outcome)
            }
        };
        BoxEffect {
            treasures: self.treasures,
            ended,
        }
    }

    pub fn box_views(&self) -> Vec<BoxView> {
        self.boxes.iter().map(BoxRecord::view).collect()
    }
}

/// Cloneable handle to the world lock.
#[derive(Debug, Clone)]
pub(crate) struct SharedWorld {
    inner: Arc<Mutex<World>>,
}

impl SharedWorld {
    pub fn new(world: World) -> Self {
        Self {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    /// Locks the world. A task that panicked while holding the lock leaves
    /// the last written state behind, which is still consistent cell by cell.
    pub fn lock(&self) -> MutexGuard<'_, World> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Everything an entity task needs besides its own state.
#[derive(Clone)]
pub(crate) struct ArenaContext {
    pub config: Arc<ArenaConfig>,
    pub world: SharedWorld,
    pub messages: Arc<MessageBoard>,
    pub events: EventBus,
}

impl ArenaContext {
    /// Announces the end of the game. Call only with an outcome returned by
    /// [`World::record_outcome`] so it happens once.
    pub fn announce_outcome(&self, outcome: Outcome, text: impl Into<String>) {
        tracing::info!(?outcome, "game over");
        self.messages
            .publish(text, self.config.final_message_duration());
        self.events.publish_game(GameEvent::GameOver { outcome });
        self.events.request_render();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::api::LossCause;

    fn open_world() -> World {
        World::new(Grid::new(5, 5).unwrap(), Position::new(2, 2)).unwrap()
    }

    #[test]
    fn player_start_is_written_to_grid() {
        let world = open_world();
        assert_eq!(world.grid.get(Position::new(2, 2)), Some(Cell::PLAYER));
        assert_eq!(world.trail, Cell::EMPTY);
    }

    #[test]
    fn blocked_start_is_rejected() {
        let grid = Grid::filled(3, 3, Cell::WALL).unwrap();
        let result = World::new(grid, Position::new(1, 1));
        assert!(matches!(result, Err(RuntimeError::InvalidStart { .. })));
    }

    #[test]
    fn moving_restores_trail() {
        let mut grid = Grid::new(3, 1).unwrap();
        grid.set(Position::new(1, 0), Cell::VEGETATION).unwrap();
        let mut world = World::new(grid, Position::new(0, 0)).unwrap();

        world.move_player_to(Position::new(1, 0)).unwrap();
        assert_eq!(world.trail, Cell::VEGETATION);
        world.move_player_to(Position::new(2, 0)).unwrap();

        assert_eq!(world.grid.get(Position::new(0, 0)), Some(Cell::EMPTY));
        assert_eq!(world.grid.get(Position::new(1, 0)), Some(Cell::VEGETATION));
        assert_eq!(world.grid.get(Position::new(2, 0)), Some(Cell::PLAYER));
    }

    #[test]
    fn outcome_is_recorded_once() {
        let mut world = open_world();
        assert!(world.record_outcome(Outcome::Lost(LossCause::Trap)));
        assert!(!world.record_outcome(Outcome::Won));
        assert_eq!(world.outcome, Some(Outcome::Lost(LossCause::Trap)));
    }

    #[test]
    fn treasure_effect_wins_at_threshold() {
        let mut world = open_world();
        let first = world.apply_box_effect(BoxKind::Treasure, 2);
        assert_eq!(first, BoxEffect { treasures: 1, ended: None });
        let second = world.apply_box_effect(BoxKind::Treasure, 2);
        assert_eq!(second.ended, Some(Outcome::Won));
        assert_eq!(world.apply_box_effect(BoxKind::Trap, 2).ended, None);
    }

    #[test]
    fn boxes_only_go_on_empty_cells() {
        let mut world = open_world();
        let id = world.add_box(BoxKind::Empty, Position::new(0, 0)).unwrap();
        assert_eq!(id, BoxId(0));
        assert!(world.add_box(BoxKind::Trap, Position::new(0, 0)).is_err());
        assert!(world.add_box(BoxKind::Trap, Position::new(2, 2)).is_err());
        assert!(world.live_box_at(Position::new(0, 0)).is_some());
    }

    #[test]
    fn interactable_box_requires_adjacency_and_idle() {
        let mut world = open_world();
        let far = world.add_box(BoxKind::Treasure, Position::new(0, 0)).unwrap();
        let near = world.add_box(BoxKind::Treasure, Position::new(3, 3)).unwrap();
        assert_eq!(world.interactable_box(), Some(near));
        assert_eq!(world.nearest_treasure_distance(), Some(2));

        world.box_record_mut(near).unwrap().phase = BoxPhase::Triggered;
        assert_eq!(world.interactable_box(), None);
        assert_eq!(world.nearest_treasure_distance(), Some(4));
        assert_eq!(world.box_record(far).unwrap().phase, BoxPhase::Idle);
    }

    #[test]
    fn random_empty_cell_is_none_when_saturated() {
        let mut rng = StdRng::seed_from_u64(1);
        let world = World::new(Grid::new(1, 1).unwrap(), Position::ORIGIN).unwrap();
        assert_eq!(world.random_empty_cell(&mut rng), None);

        let world = open_world();
        let cell = world.random_empty_cell(&mut rng).unwrap();
        assert!(world.grid.is_empty_at(cell));
    }
}
