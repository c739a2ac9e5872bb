use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use game_content::MapLoader;
use game_core::{ArenaConfig, BoxKind, Cell, Position, Tile};
use runtime::{
    BoxPhase, Event, GameEvent, LossCause, ManualClock, Outcome, Runtime, RuntimeError, Topic,
};

/// Config with every background timer pushed far out, so a test only sees
/// the entities it explicitly speeds up.
fn quiet_config() -> ArenaConfig {
    ArenaConfig {
        box_relocation_interval_ms: 60_000,
        box_reveal_delay_ms: 20,
        blink_cycles: 4,
        blink_interval_ms: 10,
        monster_spawn_delay_ms: 60_000,
        guide_step_interval_ms: 60_000,
        rendezvous_timeout_ms: 500,
        ..ArenaConfig::default().with_seed(7)
    }
}

async fn start(map: &str, config: ArenaConfig, boxes: &[(Position, BoxKind)]) -> Runtime {
    let map = MapLoader::parse(map).expect("test map should parse");
    let mut builder = Runtime::builder()
        .config(config)
        .map(map.grid, map.player_start);
    for &(position, kind) in boxes {
        builder = builder.place_box(position, kind);
    }
    builder.build().await.expect("runtime should build")
}

async fn wait_until(mut condition: impl FnMut() -> bool, limit: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// Walks across vegetation to the only free cell, opens the treasure box
/// standing there and waits for it to vanish.
#[tokio::test(flavor = "multi_thread")]
async fn treasure_box_end_to_end() {
    let map = "\
#####
#@\"\"#
###\"#
###.#
#####";
    let box_cell = Position::new(3, 3);
    let runtime = start(map, quiet_config(), &[(box_cell, BoxKind::Treasure)]).await;
    let game = runtime.game();

    assert_eq!(game.snapshot().cell(box_cell), Some(Cell::BOX));
    assert!(!game.interact().await, "box is not within reach yet");

    assert!(game.move_player(1, 0));
    assert!(game.move_player(1, 0));
    assert!(game.move_player(0, 1));
    assert_eq!(game.player_position(), Position::new(3, 2));

    assert!(game.interact().await);
    assert_eq!(game.treasures(), 1);

    let window = quiet_config().disappearance_window() + Duration::from_millis(500);
    let removed = wait_until(
        || game.boxes()[0].phase == BoxPhase::Removed,
        window,
    )
    .await;
    assert!(removed, "box should be removed after its animation");

    let snapshot = game.snapshot();
    assert_eq!(snapshot.cell(box_cell), Some(Cell::EMPTY));
    // The path the player walked is vegetation again.
    assert_eq!(snapshot.cell(Position::new(2, 1)), Some(Cell::VEGETATION));
    assert_eq!(snapshot.cell(Position::new(3, 1)), Some(Cell::VEGETATION));
    assert_eq!(snapshot.message, "TREASURE FOUND! Treasures: 1");
    assert_eq!(snapshot.outcome, None);

    assert!(!game.interact().await, "a removed box cannot be opened again");
    assert_eq!(game.treasures(), 1);

    runtime.shutdown().await.expect("shutdown should succeed");
}

/// Many simultaneous interactions with the same box apply its effect once.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn duplicate_interactions_apply_once() {
    let runtime = start(
        "@....\n.....\n.....",
        quiet_config(),
        &[(Position::new(1, 0), BoxKind::Treasure)],
    )
    .await;
    let game = runtime.game();

    let attempts: Vec<_> = (0..16)
        .map(|_| {
            let game = game.clone();
            tokio::spawn(async move { game.interact().await })
        })
        .collect();

    let mut accepted = 0;
    for attempt in attempts {
        if attempt.await.expect("interaction task should not panic") {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(game.treasures(), 1);
    assert_ne!(game.boxes()[0].phase, BoxPhase::Idle);

    runtime.shutdown().await.expect("shutdown should succeed");
}

/// Boxes hopping around every few milliseconds never share or lose a cell.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn relocation_never_double_books_cells() {
    let config = ArenaConfig {
        box_count: 20,
        box_relocation_interval_ms: 3,
        ..quiet_config()
    };
    let map = "@.......\n........\n........\n........\n........\n........";
    let runtime = start(map, config, &[]).await;
    let game = runtime.game();

    for round in 0..100 {
        let boxes = game.boxes();
        let cells: HashSet<Position> = boxes.iter().map(|view| view.position).collect();
        assert_eq!(cells.len(), 20, "two boxes share a cell in round {round}");
        assert_eq!(game.closed_box_cells(), 20);
        assert!(!cells.contains(&game.player_position()));

        let (dx, dy) = if round % 2 == 0 { (1, 0) } else { (-1, 0) };
        game.move_player(dx, dy);
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    runtime.shutdown().await.expect("shutdown should succeed");
}

/// With exactly one spare cell every box competes for the same destination.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn relocation_with_one_spare_cell_keeps_cells_exclusive() {
    let config = ArenaConfig {
        box_count: 8,
        box_relocation_interval_ms: 1,
        ..quiet_config()
    };
    let runtime = start("@.........", config, &[]).await;
    let game = runtime.game();

    let mut previous: Vec<Position> = game.boxes().iter().map(|view| view.position).collect();
    let mut rounds_with_moves = 0;
    for round in 0..300 {
        let positions: Vec<Position> = game.boxes().iter().map(|view| view.position).collect();
        let distinct: HashSet<Position> = positions.iter().copied().collect();
        assert_eq!(distinct.len(), 8, "two boxes share a cell in round {round}");
        assert!(!distinct.contains(&Position::ORIGIN));
        assert_eq!(game.closed_box_cells(), 8);

        let snapshot = game.snapshot();
        let cells = snapshot.rows.iter().flatten();
        let empty = cells.clone().filter(|cell| **cell == Cell::EMPTY).count();
        let closed = cells.filter(|cell| cell.tile == Tile::Box).count();
        assert_eq!(empty, 1, "round {round} should leave exactly one free cell");
        assert_eq!(closed, 8);

        if positions != previous {
            rounds_with_moves += 1;
        }
        previous = positions;
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert!(rounds_with_moves > 0, "boxes never relocated");

    runtime.shutdown().await.expect("shutdown should succeed");
}

/// The monster drains the treasure counter to zero and ends the game once.
#[tokio::test(flavor = "multi_thread")]
async fn monster_robs_player_and_game_ends_once() {
    let config = ArenaConfig {
        monster_spawn_delay_ms: 150,
        monster_step_interval_ms: 10,
        ..quiet_config()
    };
    let runtime = start(
        "......\n@.....\n......",
        config,
        &[
            (Position::new(0, 0), BoxKind::Treasure),
            (Position::new(0, 2), BoxKind::Treasure),
        ],
    )
    .await;
    let game = runtime.game();
    let mut events = runtime.subscribe(Topic::Game);

    assert!(game.interact().await);
    assert!(game.interact().await);
    assert_eq!(game.treasures(), 2);

    let over = wait_until(|| game.is_over(), Duration::from_secs(5)).await;
    assert!(over, "monster should have stolen everything");

    assert_eq!(game.outcome(), Some(Outcome::Lost(LossCause::Robbed)));
    assert_eq!(game.treasures(), 0);
    assert_eq!(game.monster_stolen(), 2);
    let announced = wait_until(
        || game.current_message() == "GAME OVER! The monster stole ALL your treasures!",
        Duration::from_secs(1),
    )
    .await;
    assert!(announced);

    // Give any straggling step a chance to misbehave.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(game.treasures(), 0);
    assert!(!game.move_player(1, 0));
    assert!(!game.interact().await);

    let mut game_overs = 0;
    let mut thefts = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            Event::Game(GameEvent::GameOver { .. }) => game_overs += 1,
            Event::Game(GameEvent::TreasureStolen { .. }) => thefts += 1,
            _ => {}
        }
    }
    assert_eq!(game_overs, 1);
    assert_eq!(thefts, 2);

    runtime.shutdown().await.expect("shutdown should succeed");
}

/// Opening a trap ends the game at once.
#[tokio::test]
async fn trap_box_ends_game() {
    let runtime = start(
        "@.\n..",
        quiet_config(),
        &[(Position::new(1, 1), BoxKind::Trap)],
    )
    .await;
    let game = runtime.game();

    assert!(game.interact().await);
    assert_eq!(game.outcome(), Some(Outcome::Lost(LossCause::Trap)));

    let shows_message = wait_until(
        || game.current_message() == "GAME OVER! The box was a trap!",
        Duration::from_secs(1),
    )
    .await;
    assert!(shows_message);

    runtime.shutdown().await.expect("shutdown should succeed");
}

/// Collecting enough treasures wins.
#[tokio::test]
async fn collecting_enough_treasures_wins() {
    let config = ArenaConfig {
        treasures_to_win: 2,
        ..quiet_config()
    };
    let runtime = start(
        "...\n.@.\n...",
        config,
        &[
            (Position::new(0, 0), BoxKind::Treasure),
            (Position::new(2, 2), BoxKind::Treasure),
        ],
    )
    .await;
    let game = runtime.game();

    assert!(game.interact().await);
    assert_eq!(game.outcome(), None);
    assert!(game.interact().await);
    assert_eq!(game.outcome(), Some(Outcome::Won));

    runtime.shutdown().await.expect("shutdown should succeed");
}

#[tokio::test]
async fn moves_into_walls_boxes_and_edges_are_rejected() {
    let runtime = start(
        "@#.\n...",
        quiet_config(),
        &[(Position::new(0, 1), BoxKind::Empty)],
    )
    .await;
    let game = runtime.game();

    assert!(!game.move_player(-1, 0), "edge of the map");
    assert!(!game.move_player(1, 0), "wall");
    assert!(!game.move_player(0, 1), "box");
    assert_eq!(game.current_message(), "A box blocks the way!");
    assert_eq!(game.player_position(), Position::ORIGIN);

    assert!(game.move_player(1, 1));
    assert_eq!(game.player_position(), Position::new(1, 1));

    runtime.shutdown().await.expect("shutdown should succeed");
}

#[tokio::test]
async fn status_line_clears_when_lease_expires() {
    let clock = ManualClock::new();
    let map = MapLoader::parse("@.\n..").expect("test map should parse");
    let runtime = Runtime::builder()
        .config(quiet_config())
        .map(map.grid, map.player_start)
        .place_box(Position::new(1, 0), BoxKind::Empty)
        .clock(Arc::new(clock.clone()))
        .build()
        .await
        .expect("runtime should build");
    let game = runtime.game();

    assert!(!game.move_player(1, 0));
    assert_eq!(game.current_message(), "A box blocks the way!");

    clock.advance(quiet_config().message_duration());
    assert_eq!(game.current_message(), "");
    assert_eq!(game.snapshot().message, "");

    runtime.shutdown().await.expect("shutdown should succeed");
}

#[tokio::test]
async fn crowded_map_is_rejected_at_build_time() {
    let map = MapLoader::parse("@..\n###").expect("test map should parse");
    let result = Runtime::builder()
        .config(quiet_config().with_box_count(3))
        .map(map.grid, map.player_start)
        .build()
        .await;

    assert!(matches!(
        result,
        Err(RuntimeError::Capacity {
            required: 4,
            available: 2
        })
    ));
}

#[tokio::test]
async fn build_requires_a_map() {
    let result = Runtime::builder().build().await;
    assert!(matches!(result, Err(RuntimeError::MissingMap)));
}

#[tokio::test]
async fn configured_seed_is_reported() {
    let runtime = start("@....\n.....", quiet_config().with_box_count(2), &[]).await;
    assert_eq!(runtime.seed(), 7);
    assert!(runtime.game().guide_position().is_some());
    assert_eq!(runtime.game().monster_position(), None);
    runtime.shutdown().await.expect("shutdown should succeed");
}
