//! Line-based keyboard commands.
//!
//! Each character of an input line is one command, so `ddd` walks three
//! cells to the right. Unknown characters are ignored.

use std::io::BufRead;

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move { dx: i32, dy: i32 },
    Interact,
    Quit,
}

impl Command {
    pub fn from_key(key: char) -> Option<Self> {
        let command = match key.to_ascii_lowercase() {
            'w' => Command::Move { dx: 0, dy: -1 },
            'a' => Command::Move { dx: -1, dy: 0 },
            's' => Command::Move { dx: 0, dy: 1 },
            'd' => Command::Move { dx: 1, dy: 0 },
            'e' => Command::Interact,
            'q' => Command::Quit,
            _ => return None,
        };
        Some(command)
    }
}

pub fn parse_line(line: &str) -> Vec<Command> {
    line.chars().filter_map(Command::from_key).collect()
}

pub const HELP: &str = "w/a/s/d move, e open box, q quit (Enter to send)";

/// Reads stdin on a dedicated thread and forwards each line.
///
/// The channel closes on end of input. The thread is detached; it ends with
/// the process.
pub fn spawn_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_character_is_a_command() {
        assert_eq!(
            parse_line("dDe x q"),
            vec![
                Command::Move { dx: 1, dy: 0 },
                Command::Move { dx: 1, dy: 0 },
                Command::Interact,
                Command::Quit,
            ]
        );
        assert!(parse_line("").is_empty());
    }
}
