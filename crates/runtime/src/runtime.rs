//! High-level runtime orchestrator.
//!
//! The runtime validates the map, scatters the boxes, spawns one task per
//! entity, and exposes a builder-based API for clients to start and stop the
//! arena.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use strum::IntoEnumIterator;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

use game_core::{ArenaConfig, BoxKind, Grid, Position};

use crate::api::game::GameShared;
use crate::api::{Game, Result, RuntimeError};
use crate::clock::{Clock, SystemClock};
use crate::entities::{Guide, Monster, boxes, guide, monster};
use crate::events::{Event, EventBus, Topic};
use crate::message::MessageBoard;
use crate::shutdown::{self, ShutdownTrigger};
use crate::world::{ArenaContext, SharedWorld, World};

/// Running arena.
///
/// Owns the entity tasks. [`Game`] provides a cloneable façade for clients.
pub struct Runtime {
    game: Game,
    seed: u64,
    shutdown: ShutdownTrigger,
    workers: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to the arena
    pub fn game(&self) -> Game {
        self.game.clone()
    }

    /// Seed actually used for this arena, whether configured or derived.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.game.subscribe(topic)
    }

    /// Stops every entity task and waits for them to exit.
    pub async fn shutdown(self) -> Result<()> {
        info!(tasks = self.workers.len(), "shutting down arena");
        self.shutdown.fire();

        for worker in self.workers {
            worker.await.map_err(RuntimeError::WorkerJoin)?;
        }

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: ArenaConfig,
    map: Option<(Grid, Position)>,
    placements: Vec<(Position, BoxKind)>,
    clock: Arc<dyn Clock>,
    event_buffer_size: usize,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: ArenaConfig::default(),
            map: None,
            placements: Vec::new(),
            clock: Arc::new(SystemClock),
            event_buffer_size: 100,
        }
    }

    /// Override arena configuration
    pub fn config(mut self, config: ArenaConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide the map and the player's starting cell (required)
    pub fn map(mut self, grid: Grid, player_start: Position) -> Self {
        self.map = Some((grid, player_start));
        self
    }

    /// Places a box of the given kind at a fixed cell.
    ///
    /// Once any box is placed explicitly, random scattering is skipped and
    /// `box_count` is ignored.
    pub fn place_box(mut self, position: Position, kind: BoxKind) -> Self {
        self.placements.push((position, kind));
        self
    }

    /// Time source for status message leases.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }

    /// Build the runtime and start every entity task
    pub async fn build(self) -> Result<Runtime> {
        let (grid, start) = self.map.ok_or(RuntimeError::MissingMap)?;
        let mut world = World::new(grid, start)?;

        let seed = self.config.seed.unwrap_or_else(seed_from_time);
        let mut rng = StdRng::seed_from_u64(seed);

        if self.placements.is_empty() {
            scatter_boxes(&mut world, self.config.box_count, &mut rng)?;
        } else {
            for (position, kind) in self.placements {
                world.add_box(kind, position)?;
            }
        }
        let guide = Arc::new(Guide::place(&world)?);
        let monster = Arc::new(Monster::new());
        let records = world.boxes.clone();

        info!(
            seed,
            boxes = records.len(),
            width = world.grid.width(),
            height = world.grid.height(),
            "arena ready"
        );

        let ctx = ArenaContext {
            config: Arc::new(self.config),
            world: SharedWorld::new(world),
            messages: Arc::new(MessageBoard::new(self.clock)),
            events: EventBus::with_capacity(self.event_buffer_size),
        };
        let (trigger, shutdown) = shutdown::channel();

        let mut workers = Vec::with_capacity(records.len() + 2);
        let mut handles = Vec::with_capacity(records.len());
        for record in &records {
            let (handle, task) = boxes::spawn_pair(
                record.id,
                record.kind,
                ctx.clone(),
                StdRng::seed_from_u64(rng.next_u64()),
                shutdown.clone(),
            );
            handles.push(handle);
            workers.push(tokio::spawn(task.run()));
        }

        workers.push(tokio::spawn(monster::run(
            Arc::clone(&monster),
            ctx.clone(),
            StdRng::seed_from_u64(rng.next_u64()),
            shutdown.clone(),
        )));
        workers.push(tokio::spawn(guide::run(
            Arc::clone(&guide),
            ctx.clone(),
            shutdown,
        )));

        let game = Game::new(GameShared {
            ctx,
            boxes: handles,
            monster,
            guide,
        });

        Ok(Runtime {
            game,
            seed,
            shutdown: trigger,
            workers,
        })
    }
}

/// Puts `count` boxes of uniformly random kinds on distinct empty cells.
///
/// One empty cell beyond the boxes is kept free so the monster has somewhere
/// to appear.
fn scatter_boxes(world: &mut World, count: usize, rng: &mut StdRng) -> Result<()> {
    let required = count + 1;
    let available = world.grid.count_empty();
    if available < required {
        return Err(RuntimeError::Capacity {
            required,
            available,
        });
    }

    let kinds: Vec<BoxKind> = BoxKind::iter().collect();
    for _ in 0..count {
        let position = world
            .random_empty_cell(rng)
            .ok_or(RuntimeError::Capacity {
                required,
                available,
            })?;
        let kind = kinds.choose(rng).copied().unwrap_or(BoxKind::Empty);
        world.add_box(kind, position)?;
    }
    Ok(())
}

fn seed_from_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
