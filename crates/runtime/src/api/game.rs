//! Cloneable façade for driving the player and observing the arena.
//!
//! [`Game`] is the aggregate the frontend talks to. Player moves mutate the
//! grid directly under the world lock; interactions are handed to the box
//! task through its rendezvous channel and only report success once the box
//! has applied its own effect.
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use game_core::{Position, Tile};

use super::snapshot::{ArenaSnapshot, BoxView, Outcome};
use crate::entities::{BoxHandle, Guide, Monster};
use crate::events::{Event, Topic};
use crate::world::ArenaContext;

/// Client-facing handle to a running arena
#[derive(Clone)]
pub struct Game {
    shared: Arc<GameShared>,
}

pub(crate) struct GameShared {
    pub ctx: ArenaContext,
    pub boxes: Vec<BoxHandle>,
    pub monster: Arc<Monster>,
    pub guide: Arc<Guide>,
}

impl Game {
    pub(crate) fn new(shared: GameShared) -> Self {
        Self {
            shared: Arc::new(shared),
        }
    }

    fn ctx(&self) -> &ArenaContext {
        &self.shared.ctx
    }

    /// Moves the player by one step.
    ///
    /// Returns false when the target is outside the map, blocked (walls,
    /// boxes, the monster), or the game is over. Bumping into a box also puts
    /// a short notice on the status line.
    pub fn move_player(&self, dx: i32, dy: i32) -> bool {
        let ctx = self.ctx();
        let mut world = ctx.world.lock();
        if world.is_over() {
            return false;
        }

        let target = world.player.offset(dx, dy);
        if target == world.player {
            return false;
        }
        if world.grid.is_blocking(target) {
            let bumped_box = world.live_box_at(target).is_some();
            drop(world);
            if bumped_box {
                ctx.messages
                    .publish("A box blocks the way!", ctx.config.message_duration());
                ctx.events.request_render();
            }
            return false;
        }

        if world.move_player_to(target).is_err() {
            return false;
        }
        drop(world);

        ctx.events.request_render();
        true
    }

    /// Opens the first idle box next to the player.
    ///
    /// Returns true only after the box task accepted the interaction and
    /// applied its effect. A box that has already been triggered, exited, or
    /// does not answer within the rendezvous timeout yields false.
    pub async fn interact(&self) -> bool {
        let candidate = {
            let world = self.ctx().world.lock();
            if world.is_over() {
                return false;
            }
            world.interactable_box()
        };
        let Some(id) = candidate else {
            return false;
        };
        let Some(handle) = self.shared.boxes.iter().find(|handle| handle.id() == id) else {
            return false;
        };

        match handle.trigger(self.ctx().config.rendezvous_timeout()).await {
            Ok(kind) => {
                debug!(%id, %kind, "interaction accepted");
                true
            }
            Err(err) => {
                debug!(error = %err, "interaction did not go through");
                false
            }
        }
    }

    /// Consistent picture of the whole arena.
    pub fn snapshot(&self) -> ArenaSnapshot {
        // Entity locks come before the world lock.
        let monster = self.shared.monster.position();
        let guide = self.shared.guide.position();

        let (rows, player, treasures, outcome) = {
            let world = self.ctx().world.lock();
            (
                world.grid.to_rows(),
                world.player,
                world.treasures,
                world.outcome,
            )
        };

        ArenaSnapshot {
            rows,
            player,
            guide,
            monster,
            message: self.ctx().messages.current(),
            treasures,
            outcome,
        }
    }

    pub fn player_position(&self) -> Position {
        self.ctx().world.lock().player
    }

    pub fn guide_position(&self) -> Option<Position> {
        self.shared.guide.position()
    }

    pub fn monster_position(&self) -> Option<Position> {
        self.shared.monster.position()
    }

    /// Treasures the monster has taken so far.
    pub fn monster_stolen(&self) -> u32 {
        self.shared.monster.stolen()
    }

    pub fn current_message(&self) -> String {
        self.ctx().messages.current()
    }

    pub fn treasures(&self) -> u32 {
        self.ctx().world.lock().treasures
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.ctx().world.lock().outcome
    }

    pub fn is_over(&self) -> bool {
        self.ctx().world.lock().is_over()
    }

    /// Every box ever placed, including removed ones.
    pub fn boxes(&self) -> Vec<BoxView> {
        self.ctx().world.lock().box_views()
    }

    /// Number of cells currently drawn as a closed box.
    pub fn closed_box_cells(&self) -> usize {
        self.ctx().world.lock().grid.count_tile(Tile::Box)
    }

    /// Subscribe to events from a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.ctx().events.subscribe(topic)
    }
}
