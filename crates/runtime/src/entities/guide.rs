//! Guide companion that follows the player and whispers treasure hints.
//!
//! The guide is drawn over the grid instead of being written into it, so it
//! never occupies a cell other entities could need.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use game_core::{HintBand, Position};
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::api::{EntityKind, RuntimeError};
use crate::shutdown::Shutdown;
use crate::world::{ArenaContext, World};

const NEIGHBOURS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const MAX_RING: i32 = 4;

#[derive(Debug)]
struct GuideState {
    position: Position,
    active: bool,
}

#[derive(Debug)]
pub(crate) struct Guide {
    state: Mutex<GuideState>,
}

impl Guide {
    /// Finds the guide's starting cell near the player.
    ///
    /// Checks the four orthogonal neighbours first, then square rings of
    /// growing radius up to four cells away.
    pub fn place(world: &World) -> Result<Self, RuntimeError> {
        let player = world.player;
        let ring = |radius: i32| {
            (-radius..=radius).flat_map(move |dy| {
                (-radius..=radius)
                    .filter(move |dx| dx.abs() == radius || dy.abs() == radius)
                    .map(move |dx| player.offset(dx, dy))
            })
        };

        let position = NEIGHBOURS
            .iter()
            .map(|&(dx, dy)| player.offset(dx, dy))
            .chain((2..=MAX_RING).flat_map(ring))
            .find(|&candidate| !world.grid.is_blocking(candidate))
            .ok_or(RuntimeError::Placement {
                entity: EntityKind::Guide,
            })?;

        debug!(%position, "guide placed");
        Ok(Self {
            state: Mutex::new(GuideState {
                position,
                active: true,
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, GuideState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn position(&self) -> Option<Position> {
        let state = self.state();
        state.active.then_some(state.position)
    }

    /// Moves one cell toward the player unless already adjacent.
    ///
    /// The axis with the larger gap goes first (vertical on ties); the other
    /// axis is tried when the first is blocked. Returns whether it moved.
    pub fn step(&self, ctx: &ArenaContext) -> bool {
        let mut state = self.state();
        if !state.active {
            return false;
        }

        let world = ctx.world.lock();
        let current = state.position;
        let player = world.player;
        if current.is_adjacent(player) {
            return false;
        }

        let (dx, dy) = current.direction_to(player);
        let horizontal = current.offset(dx, 0);
        let vertical = current.offset(0, dy);
        let candidates = if current.x.abs_diff(player.x) > current.y.abs_diff(player.y) {
            [horizontal, vertical]
        } else {
            [vertical, horizontal]
        };

        let next = candidates
            .into_iter()
            .find(|&candidate| candidate != current && !world.grid.is_blocking(candidate));
        drop(world);

        match next {
            Some(next) => {
                state.position = next;
                true
            }
            None => false,
        }
    }

    /// Publishes a proximity hint when the status line is free.
    pub fn hint(&self, ctx: &ArenaContext) {
        if !self.state().active {
            return;
        }
        let band = {
            let world = ctx.world.lock();
            if world.is_over() {
                return;
            }
            HintBand::classify(world.nearest_treasure_distance())
        };
        let published = ctx.messages.publish_if_idle(
            format!("Guide: {}", band.text()),
            ctx.config.guide_hint_duration(),
        );
        if published {
            ctx.events.request_render();
        }
    }

    pub fn deactivate(&self) {
        self.state().active = false;
    }
}

/// Follows the player and hints on every tick until the game ends.
pub(crate) async fn run(guide: Arc<Guide>, ctx: ArenaContext, shutdown: Shutdown) {
    let period = ctx.config.guide_step_interval();
    let mut ticks = time::interval_at(time::Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                if ctx.world.lock().is_over() {
                    break;
                }
                if guide.step(&ctx) {
                    ctx.events.request_render();
                }
                guide.hint(&ctx);
            }
            _ = shutdown.wait() => break,
        }
    }
    guide.deactivate();
    ctx.events.request_render();
}
