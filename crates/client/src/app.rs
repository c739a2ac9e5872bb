//! Session loop: load, start the arena, feed commands, hold the last frame.

use anyhow::Result;
use game_content::{ConfigLoader, MapLoader};
use game_core::ArenaConfig;
use runtime::{Event, Game, GameEvent, Runtime, Topic};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::input::{self, Command};
use crate::render;

pub async fn run(config: ClientConfig) -> Result<()> {
    let map = MapLoader::load(&config.map_path)?;
    let mut arena = match &config.arena_config_path {
        Some(path) => ConfigLoader::load(path)?,
        None => ArenaConfig::default(),
    };
    if config.seed.is_some() {
        arena.seed = config.seed;
    }

    let runtime = Runtime::builder()
        .config(arena)
        .map(map.grid, map.player_start)
        .build()
        .await?;
    info!(
        "Arena started: map={}, seed={}",
        config.map_path.display(),
        runtime.seed()
    );

    let game = runtime.game();
    let (stop_tx, stop_rx) = watch::channel(false);
    let renderer = tokio::spawn(render::run(game.clone(), config.render_interval, stop_rx));

    play(&game).await;

    if game.is_over() {
        tokio::time::sleep(config.final_frame_hold).await;
    }

    let _ = stop_tx.send(true);
    renderer.await?;
    runtime.shutdown().await?;

    info!("Session finished: outcome={:?}", game.outcome());
    Ok(())
}

/// Applies player commands until they quit, input ends, or the game is over.
async fn play(game: &Game) {
    let mut lines = input::spawn_reader();
    let mut game_events = game.subscribe(Topic::Game);

    while !game.is_over() {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    debug!("Input closed");
                    return;
                };
                for command in input::parse_line(&line) {
                    match command {
                        Command::Move { dx, dy } => {
                            game.move_player(dx, dy);
                        }
                        Command::Interact => {
                            game.interact().await;
                        }
                        Command::Quit => {
                            info!("Player quit");
                            return;
                        }
                    }
                }
            }
            event = game_events.recv() => match event {
                Ok(Event::Game(GameEvent::GameOver { outcome })) => {
                    info!("Game over: {:?}", outcome);
                    return;
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return,
            },
        }
    }
}
