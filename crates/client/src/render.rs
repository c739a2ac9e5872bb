//! Plain-text renderer.
//!
//! Redraws on a fixed interval and whenever the runtime asks for a refresh.
//! Every frame is built from a single [`ArenaSnapshot`], so a frame never
//! mixes grid states from before and after a change.

use std::io::{self, Write};
use std::time::Duration;

use runtime::{ArenaSnapshot, Game, LossCause, Outcome, Topic};
use tokio::sync::{broadcast, watch};
use tokio::time::{self, MissedTickBehavior};

use crate::input::HELP;

pub const GUIDE_GLYPH: char = '&';

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Renders a snapshot as text: the map, then the status line, then a tally.
pub fn frame(snapshot: &ArenaSnapshot) -> String {
    let mut out = String::with_capacity(snapshot.width() * snapshot.height() * 4 + 128);

    for (y, row) in snapshot.rows.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            let guide_here = snapshot.guide.is_some_and(|guide| {
                guide != snapshot.player && guide.x as usize == x && guide.y as usize == y
            });
            out.push(if guide_here { GUIDE_GLYPH } else { cell.glyph() });
        }
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&snapshot.message);
    out.push('\n');

    let status = match snapshot.outcome {
        None => HELP,
        Some(Outcome::Won) => "You win!",
        Some(Outcome::Lost(LossCause::Trap)) => "You lose: trapped.",
        Some(Outcome::Lost(LossCause::Robbed)) => "You lose: robbed.",
    };
    out.push_str(&format!("Treasures: {}  |  {}\n", snapshot.treasures, status));
    out
}

fn draw(game: &Game) {
    let text = frame(&game.snapshot());
    let mut stdout = io::stdout().lock();
    let written = stdout
        .write_all(CLEAR_SCREEN.as_bytes())
        .and_then(|_| stdout.write_all(text.as_bytes()))
        .and_then(|_| stdout.flush());
    if let Err(err) = written {
        tracing::debug!("Failed to draw frame: {}", err);
    }
}

/// Draws until `stop` flips to true, then draws one last frame.
pub async fn run(game: Game, interval: Duration, mut stop: watch::Receiver<bool>) {
    let mut refresh = game.subscribe(Topic::Render);
    let mut ticks = time::interval(interval);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticks.tick() => draw(&game),
            received = refresh.recv() => match received {
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => draw(&game),
                Err(broadcast::error::RecvError::Closed) => break,
            },
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
        }
    }
    draw(&game);
}
