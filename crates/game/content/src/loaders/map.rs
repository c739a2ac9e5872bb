//! Map layout loader.
//!
//! Maps are plain text, one character per cell:
//!
//! | glyph        | cell                    |
//! |--------------|-------------------------|
//! | `▤` or `#`   | wall                    |
//! | `♣` or `"`   | vegetation              |
//! | `☺` or `@`   | player start (floor)    |
//! | anything else| floor                   |
//!
//! Short lines are padded with floor so the grid stays rectangular. Boxes,
//! the monster and the guide are placed by the runtime, never by the map.

use std::path::Path;

use game_core::{Cell, Grid, Position};

use crate::loaders::{LoadResult, read_file};

/// Terrain plus the player's starting position.
#[derive(Debug, Clone)]
pub struct LoadedMap {
    pub grid: Grid,
    pub player_start: Position,
}

/// Loader for text map files.
pub struct MapLoader;

impl MapLoader {
    /// Load a map from a text file.
    pub fn load(path: &Path) -> LoadResult<LoadedMap> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse map {}: {}", path.display(), e))
    }

    /// Parse a map from its text form.
    pub fn parse(content: &str) -> LoadResult<LoadedMap> {
        let mut rows: Vec<Vec<Cell>> = Vec::new();
        let mut player_start = None;

        for (y, line) in content.lines().enumerate() {
            let mut row = Vec::with_capacity(line.chars().count());
            for (x, ch) in line.chars().enumerate() {
                let cell = match ch {
                    '▤' | '#' => Cell::WALL,
                    '♣' | '"' => Cell::VEGETATION,
                    '☺' | '@' => {
                        if player_start.is_some() {
                            anyhow::bail!("more than one player start (second at line {})", y + 1);
                        }
                        player_start = Some(Position::new(x as i32, y as i32));
                        Cell::EMPTY
                    }
                    _ => Cell::EMPTY,
                };
                row.push(cell);
            }
            rows.push(row);
        }

        // Trailing blank lines carry no cells.
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::EMPTY);
        }

        let grid = Grid::from_rows(rows)?;
        let player_start =
            player_start.ok_or_else(|| anyhow::anyhow!("map has no player start"))?;

        Ok(LoadedMap { grid, player_start })
    }
}
