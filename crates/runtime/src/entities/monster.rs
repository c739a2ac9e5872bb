//! Treasure-stealing monster.
//!
//! Spawns after a delay at a random cell far enough from the player, then
//! wanders: on each step it either chases the player or moves randomly, and
//! when it ends up next to the player it steals one treasure.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use game_core::{Cell, Position};
use rand::Rng;
use rand::rngs::StdRng;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::api::{EntityKind, LossCause, Outcome, RuntimeError};
use crate::events::GameEvent;
use crate::shutdown::Shutdown;
use crate::world::{ArenaContext, World};

#[derive(Debug)]
struct MonsterState {
    position: Option<Position>,
    active: bool,
    stolen: u32,
    /// Cell the monster is standing on, put back when it moves away.
    under: Cell,
}

/// Monster state guarded by its own lock, taken before the world lock.
#[derive(Debug)]
pub(crate) struct Monster {
    state: Mutex<MonsterState>,
}

impl Default for Monster {
    fn default() -> Self {
        Self::new()
    }
}

impl Monster {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MonsterState {
                position: None,
                active: false,
                stolen: 0,
                under: Cell::EMPTY,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MonsterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn position(&self) -> Option<Position> {
        self.state().position
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.state().active
    }

    pub fn stolen(&self) -> u32 {
        self.state().stolen
    }

    /// Places the monster on the grid.
    ///
    /// Tries a bounded number of random cells farther than the minimum spawn
    /// distance from the player, then falls back to the first empty cell in
    /// row-major order.
    pub fn activate(&self, ctx: &ArenaContext, rng: &mut StdRng) -> Result<Position, RuntimeError> {
        let mut state = self.state();
        if let Some(position) = state.position {
            return Ok(position);
        }

        let mut world = ctx.world.lock();
        let position = spawn_position(
            &world,
            rng,
            ctx.config.monster_min_spawn_distance,
            ctx.config.monster_spawn_attempts,
        )
        .ok_or(RuntimeError::Placement {
            entity: EntityKind::Monster,
        })?;

        state.under = world.grid.set(position, Cell::MONSTER)?;
        state.position = Some(position);
        state.active = true;
        drop(world);
        drop(state);

        info!(%position, "monster spawned");
        ctx.messages
            .publish("A monster has appeared!", ctx.config.message_duration());
        ctx.events
            .publish_game(GameEvent::MonsterSpawned { position });
        ctx.events.request_render();
        Ok(position)
    }

    /// One movement step followed by a theft check.
    pub fn step(&self, ctx: &ArenaContext, rng: &mut StdRng) {
        let mut state = self.state();
        let Some(current) = state.position.filter(|_| state.active) else {
            return;
        };

        let mut world = ctx.world.lock();
        if world.is_over() {
            return;
        }

        let (dx, dy) = if rng.gen_bool(0.5) {
            current.direction_to(world.player)
        } else {
            (rng.gen_range(-1..=1), rng.gen_range(-1..=1))
        };
        let target = current.offset(dx, dy);

        let mut moved = false;
        if target != current && !world.grid.is_blocking(target) {
            if let Ok(arriving_on) = world.grid.set(target, Cell::MONSTER) {
                let _ = world.grid.set(current, state.under);
                state.under = arriving_on;
                state.position = Some(target);
                moved = true;
            }
        }

        let position = state.position.unwrap_or(current);
        let theft = if position.is_adjacent(world.player) {
            steal(&mut world, &mut state)
        } else {
            None
        };
        drop(world);
        drop(state);

        if moved {
            debug!(from = %current, to = %position, "monster moved");
            ctx.events.request_render();
        }
        if let Some(theft) = theft {
            theft.announce(ctx);
        }
    }
}

fn spawn_position(
    world: &World,
    rng: &mut StdRng,
    min_distance: u32,
    attempts: u32,
) -> Option<Position> {
    let (width, height) = (world.grid.width() as i32, world.grid.height() as i32);
    if width == 0 || height == 0 {
        return None;
    }

    for _ in 0..attempts {
        let candidate = Position::new(rng.gen_range(0..width), rng.gen_range(0..height));
        if world.grid.is_empty_at(candidate) && candidate.manhattan(world.player) > min_distance {
            return Some(candidate);
        }
    }

    world.grid.empty_cells().next()
}

#[derive(Debug, Clone, Copy)]
struct Theft {
    remaining: u32,
    stolen_total: u32,
    /// Set when this theft emptied the player's pockets and ended the game.
    ended: Option<Outcome>,
}

impl Theft {
    fn announce(self, ctx: &ArenaContext) {
        ctx.events.publish_game(GameEvent::TreasureStolen {
            remaining: self.remaining,
            stolen_total: self.stolen_total,
        });
        match self.ended {
            Some(outcome) => ctx.announce_outcome(
                outcome,
                "GAME OVER! The monster stole ALL your treasures!",
            ),
            None => {
                ctx.messages.publish(
                    format!("The monster stole a treasure! ({} left)", self.remaining),
                    ctx.config.theft_message_duration(),
                );
                ctx.events.request_render();
            }
        }
    }
}

/// Takes one treasure from the player. Nothing happens while the player has
/// none, so the counter never goes below zero.
fn steal(world: &mut World, state: &mut MonsterState) -> Option<Theft> {
    let remaining = world.treasures.checked_sub(1)?;
    world.treasures = remaining;
    state.stolen += 1;
    info!(remaining, stolen = state.stolen, "monster stole a treasure");

    let ended = if remaining == 0 && world.record_outcome(Outcome::Lost(LossCause::Robbed)) {
        Some(Outcome::Lost(LossCause::Robbed))
    } else {
        None
    };
    Some(Theft {
        remaining,
        stolen_total: state.stolen,
        ended,
    })
}

/// Sleeps the spawn delay, spawns, then steps until the game ends.
pub(crate) async fn run(
    monster: Arc<Monster>,
    ctx: ArenaContext,
    mut rng: StdRng,
    shutdown: Shutdown,
) {
    tokio::select! {
        _ = time::sleep(ctx.config.monster_spawn_delay()) => {}
        _ = shutdown.wait() => return,
    }
    if ctx.world.lock().is_over() {
        return;
    }

    if let Err(err) = monster.activate(&ctx, &mut rng) {
        warn!(error = %err, "monster could not spawn");
        ctx.messages.publish(
            "The monster found no room to appear.",
            ctx.config.message_duration(),
        );
        ctx.events.request_render();
        return;
    }

    let period = ctx.config.monster_step_interval();
    let mut steps = time::interval_at(time::Instant::now() + period, period);
    steps.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = steps.tick() => {
                monster.step(&ctx, &mut rng);
                if ctx.world.lock().is_over() {
                    break;
                }
            }
            _ = shutdown.wait() => break,
        }
    }
    debug!("monster task finished");
}
