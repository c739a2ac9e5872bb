//! Box entity: periodic relocation plus a one-shot opening rendezvous.
//!
//! Each box runs as its own task. While idle it wakes on its relocation timer
//! and moves to a random empty cell. The player's interaction reaches it
//! through a private channel of capacity one; the task decides whether to
//! accept (it must still be idle and next to the player), applies its effect
//! under the world lock, acknowledges, and then plays its disappearance
//! animation before exiting for good. Closing the channel on acceptance
//! guarantees the effect is applied at most once.

use std::time::Duration;

use game_core::{BoxId, BoxKind, Cell, Position};
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::api::{BoxPhase, Outcome, RendezvousError};
use crate::events::GameEvent;
use crate::shutdown::Shutdown;
use crate::world::{ArenaContext, World};

/// Interaction request sent by the game aggregate.
#[derive(Debug)]
pub(crate) struct Trigger {
    reply: oneshot::Sender<TriggerReply>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TriggerReply {
    Opened(BoxKind),
    Refused,
}

/// Aggregate-side end of a box's rendezvous channel.
#[derive(Debug, Clone)]
pub(crate) struct BoxHandle {
    id: BoxId,
    triggers: mpsc::Sender<Trigger>,
}

impl BoxHandle {
    pub fn id(&self) -> BoxId {
        self.id
    }

    /// Hands an interaction to the box task and waits for its answer.
    ///
    /// Returns once the task has accepted and applied the effect, or with an
    /// error when the task is busy, gone, refuses, or does not answer in time.
    ///
    /// A request left behind by a timeout stays queued, but the task refuses
    /// it once it sees the reply channel closed. The only late acceptance
    /// possible is a timeout landing between that check and the reply.
    pub async fn trigger(&self, timeout: Duration) -> Result<BoxKind, RendezvousError> {
        let id = self.id;
        let (reply_tx, reply_rx) = oneshot::channel();

        self.triggers
            .try_send(Trigger { reply: reply_tx })
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => RendezvousError::Busy { id },
                mpsc::error::TrySendError::Closed(_) => RendezvousError::Gone { id },
            })?;

        match time::timeout(timeout, reply_rx).await {
            Ok(Ok(TriggerReply::Opened(kind))) => Ok(kind),
            Ok(Ok(TriggerReply::Refused)) => Err(RendezvousError::Refused { id }),
            Ok(Err(_)) => Err(RendezvousError::Gone { id }),
            Err(_) => Err(RendezvousError::Timeout { id }),
        }
    }
}

/// Background task owning one box's lifecycle.
pub(crate) struct BoxTask {
    id: BoxId,
    kind: BoxKind,
    ctx: ArenaContext,
    triggers: mpsc::Receiver<Trigger>,
    rng: StdRng,
    shutdown: Shutdown,
}

/// Creates the task and its handle for a box already registered in the world.
pub(crate) fn spawn_pair(
    id: BoxId,
    kind: BoxKind,
    ctx: ArenaContext,
    rng: StdRng,
    shutdown: Shutdown,
) -> (BoxHandle, BoxTask) {
    let (tx, rx) = mpsc::channel(1);
    (
        BoxHandle { id, triggers: tx },
        BoxTask {
            id,
            kind,
            ctx,
            triggers: rx,
            rng,
            shutdown,
        },
    )
}

impl BoxTask {
    pub async fn run(mut self) {
        let period = self.ctx.config.box_relocation_interval();
        let mut relocation = time::interval_at(time::Instant::now() + period, period);
        relocation.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let position = loop {
            tokio::select! {
                _ = relocation.tick() => self.relocate(),
                received = self.triggers.recv() => match received {
                    Some(trigger) => {
                        if let Some(position) = self.accept(trigger) {
                            break position;
                        }
                    }
                    // Every handle is gone: the game was dropped.
                    None => return,
                },
                _ = self.shutdown.wait() => return,
            }
        };

        self.refuse_pending();
        self.animate(position).await;
        self.finish(position);
    }

    fn relocate(&mut self) {
        let mut world = self.ctx.world.lock();
        if world.is_over() {
            return;
        }
        let Some(record) = world.box_record(self.id).copied() else {
            return;
        };
        if record.phase != BoxPhase::Idle {
            return;
        }
        set_phase(&mut world, self.id, BoxPhase::Relocating);

        // Clear and claim inside one critical section.
        let moved_to = world.random_empty_cell(&mut self.rng).filter(|&destination| {
            world
                .grid
                .set(record.position, Cell::EMPTY)
                .and_then(|_| world.grid.set(destination, Cell::BOX))
                .is_ok()
        });
        if let Some(current) = world.box_record_mut(self.id) {
            current.position = moved_to.unwrap_or(record.position);
            current.phase = BoxPhase::Idle;
        }
        drop(world);

        let Some(destination) = moved_to else {
            debug!(id = %self.id, "no empty cell to relocate to; staying put");
            return;
        };

        debug!(id = %self.id, from = %record.position, to = %destination, "box relocated");
        self.ctx.events.publish_game(GameEvent::BoxRelocated {
            id: self.id,
            from: record.position,
            to: destination,
        });
        self.ctx.events.request_render();
    }

    /// Validates and applies an interaction. Returns the box position when
    /// the box was opened.
    fn accept(&mut self, trigger: Trigger) -> Option<Position> {
        let mut world = self.ctx.world.lock();
        let player = world.player;
        let over = world.is_over();
        // A caller that already timed out gets no effect applied on its behalf.
        let abandoned = trigger.reply.is_closed();
        let record = world
            .box_record_mut(self.id)
            .filter(|record| !over && !abandoned && record.phase == BoxPhase::Idle)
            .filter(|record| record.position.is_adjacent(player));

        let Some(record) = record else {
            drop(world);
            debug!(id = %self.id, "interaction refused");
            let _ = trigger.reply.send(TriggerReply::Refused);
            return None;
        };

        record.phase = BoxPhase::Triggered;
        let position = record.position;
        let effect = world.apply_box_effect(self.kind, self.ctx.config.treasures_to_win);
        // Cannot fail: the box's own cell is in bounds.
        let _ = world.grid.set(position, Cell::opened_box(self.kind));
        drop(world);

        if trigger.reply.send(TriggerReply::Opened(self.kind)).is_err() {
            debug!(id = %self.id, "interaction caller gave up before the acknowledgement");
        }

        info!(id = %self.id, kind = %self.kind, %position, "box opened");
        self.announce(position, effect.treasures, effect.ended);
        Some(position)
    }

    fn announce(&self, position: Position, treasures: u32, ended: Option<Outcome>) {
        let ctx = &self.ctx;
        ctx.events.publish_game(GameEvent::BoxOpened {
            id: self.id,
            kind: self.kind,
            position,
        });

        match (self.kind, ended) {
            (BoxKind::Treasure, Some(outcome)) => ctx.announce_outcome(
                outcome,
                format!("Congratulations! You found all {treasures} treasures!"),
            ),
            // Accepted only while the game runs, so a trap always ends it.
            (BoxKind::Trap, ended) => {
                if let Some(outcome) = ended {
                    ctx.announce_outcome(outcome, "GAME OVER! The box was a trap!");
                }
            }
            (BoxKind::Treasure, _) => ctx.messages.publish(
                format!("TREASURE FOUND! Treasures: {treasures}"),
                ctx.config.message_duration(),
            ),
            (BoxKind::Empty, _) => ctx
                .messages
                .publish("...EMPTY BOX!", ctx.config.message_duration()),
        }
        ctx.events.request_render();
    }

    /// Stops further interactions and answers any that raced in.
    fn refuse_pending(&mut self) {
        self.triggers.close();
        while let Ok(stale) = self.triggers.try_recv() {
            let _ = stale.reply.send(TriggerReply::Refused);
        }
    }

    async fn animate(&mut self, position: Position) {
        if let Some(record) = self.ctx.world.lock().box_record_mut(self.id) {
            record.phase = BoxPhase::Animating;
        }

        let reveal = self.ctx.config.box_reveal_delay();
        let interval = self.ctx.config.blink_interval();
        let frames = blink_frames(self.kind, self.ctx.config.blink_cycles);

        tokio::select! {
            _ = time::sleep(reveal) => {}
            _ = self.shutdown.wait() => return,
        }

        for frame in frames {
            tokio::select! {
                _ = time::sleep(interval) => {}
                _ = self.shutdown.wait() => return,
            }
            // Lock only for the single-cell write; sleep outside it.
            let _ = self.ctx.world.lock().grid.set(position, frame);
            self.ctx.events.request_render();
        }
    }

    fn finish(&mut self, position: Position) {
        {
            let mut world = self.ctx.world.lock();
            let _ = world.grid.set(position, Cell::EMPTY);
            if let Some(record) = world.box_record_mut(self.id) {
                record.phase = BoxPhase::Removed;
            }
        }
        debug!(id = %self.id, "box removed");
        self.ctx.events.publish_game(GameEvent::BoxRemoved { id: self.id });
        self.ctx.events.request_render();
    }
}

fn set_phase(world: &mut World, id: BoxId, phase: BoxPhase) {
    if let Some(record) = world.box_record_mut(id) {
        record.phase = phase;
    }
}

/// Frames of the disappearance animation: blank and opened, alternating,
/// starting with blank.
pub(crate) fn blink_frames(kind: BoxKind, cycles: u32) -> Vec<Cell> {
    (0..cycles)
        .map(|i| {
            if i % 2 == 0 {
                Cell::FADING
            } else {
                Cell::opened_box(kind)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use game_core::{ArenaConfig, Grid};
    use rand::SeedableRng;

    use super::*;
    use crate::events::EventBus;
    use crate::message::MessageBoard;
    use crate::shutdown;
    use crate::world::SharedWorld;

    fn context(width: usize) -> ArenaContext {
        let world = World::new(Grid::new(width, 1).unwrap(), Position::ORIGIN).unwrap();
        ArenaContext {
            config: Arc::new(ArenaConfig::default()),
            world: SharedWorld::new(world),
            messages: Arc::new(MessageBoard::default()),
            events: EventBus::default(),
        }
    }

    fn box_at(ctx: &ArenaContext, position: Position, kind: BoxKind) -> (BoxHandle, BoxTask) {
        let id = ctx.world.lock().add_box(kind, position).unwrap();
        let (_trigger, shutdown) = shutdown::channel();
        spawn_pair(id, kind, ctx.clone(), StdRng::seed_from_u64(1), shutdown)
    }

    #[test]
    fn blink_frames_alternate_and_never_free_the_cell() {
        let frames = blink_frames(BoxKind::Treasure, 4);
        assert_eq!(
            frames,
            vec![
                Cell::FADING,
                Cell::opened_box(BoxKind::Treasure),
                Cell::FADING,
                Cell::opened_box(BoxKind::Treasure),
            ]
        );
        assert!(frames.iter().all(|cell| cell.blocking));
    }

    #[tokio::test]
    async fn trigger_on_closed_channel_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = BoxHandle {
            id: BoxId(0),
            triggers: tx,
        };
        let result = handle.trigger(Duration::from_millis(10)).await;
        assert_eq!(result, Err(RendezvousError::Gone { id: BoxId(0) }));
    }

    #[tokio::test]
    async fn trigger_without_answer_times_out() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = BoxHandle {
            id: BoxId(1),
            triggers: tx,
        };
        let result = handle.trigger(Duration::from_millis(10)).await;
        assert_eq!(result, Err(RendezvousError::Timeout { id: BoxId(1) }));

        // The unanswered request still fills the slot.
        let result = handle.trigger(Duration::from_millis(10)).await;
        assert_eq!(result, Err(RendezvousError::Busy { id: BoxId(1) }));
    }

    #[test]
    fn relocation_moves_into_the_last_free_cell() {
        let ctx = context(3);
        let (handle, mut task) = box_at(&ctx, Position::new(1, 0), BoxKind::Empty);

        task.relocate();

        let world = ctx.world.lock();
        let record = world.box_record(handle.id()).unwrap();
        assert_eq!(record.position, Position::new(2, 0));
        assert_eq!(record.phase, BoxPhase::Idle);
        assert_eq!(world.grid.get(Position::new(1, 0)), Some(Cell::EMPTY));
        assert_eq!(world.grid.get(Position::new(2, 0)), Some(Cell::BOX));
    }

    #[test]
    fn relocation_without_room_stays_put() {
        let ctx = context(2);
        let (handle, mut task) = box_at(&ctx, Position::new(1, 0), BoxKind::Empty);

        task.relocate();

        let world = ctx.world.lock();
        let record = world.box_record(handle.id()).unwrap();
        assert_eq!(record.position, Position::new(1, 0));
        assert_eq!(record.phase, BoxPhase::Idle);
        assert_eq!(world.grid.get(Position::new(1, 0)), Some(Cell::BOX));
    }

    #[tokio::test]
    async fn request_abandoned_by_timeout_is_not_applied() {
        let ctx = context(3);
        let (handle, mut task) = box_at(&ctx, Position::new(1, 0), BoxKind::Treasure);
        let id = handle.id();

        let result = handle.trigger(Duration::from_millis(10)).await;
        assert_eq!(result, Err(RendezvousError::Timeout { id }));

        // The box task only now gets around to the queued request.
        let stale = task.triggers.try_recv().unwrap();
        assert_eq!(task.accept(stale), None);

        let world = ctx.world.lock();
        assert_eq!(world.treasures, 0);
        assert_eq!(world.box_record(id).unwrap().phase, BoxPhase::Idle);
        assert_eq!(world.grid.get(Position::new(1, 0)), Some(Cell::BOX));
    }

    #[tokio::test]
    async fn answered_request_opens_the_box() {
        let ctx = context(3);
        let (handle, mut task) = box_at(&ctx, Position::new(1, 0), BoxKind::Treasure);
        let (reply, answer) = oneshot::channel();

        assert_eq!(task.accept(Trigger { reply }), Some(Position::new(1, 0)));
        assert_eq!(answer.await, Ok(TriggerReply::Opened(BoxKind::Treasure)));

        let world = ctx.world.lock();
        assert_eq!(world.treasures, 1);
        assert_eq!(world.box_record(handle.id()).unwrap().phase, BoxPhase::Triggered);
    }
}
