use super::{Cell, Position, Tile};
use crate::error::GridError;

/// Rectangular, row-major store of cells with fixed dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid of bare floor.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        Self::filled(width, height, Cell::EMPTY)
    }

    pub fn filled(width: usize, height: usize, cell: Cell) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        Ok(Self {
            width,
            height,
            cells: vec![cell; width * height],
        })
    }

    /// Builds a grid from rows that must all have the same length.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(GridError::Empty);
        }
        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        for (row, line) in rows.into_iter().enumerate() {
            if line.len() != width {
                return Err(GridError::Ragged {
                    row,
                    expected: width,
                    found: line.len(),
                });
            }
            cells.extend(line);
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    fn index(&self, position: Position) -> Option<usize> {
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    fn position_of(&self, index: usize) -> Position {
        Position::new((index % self.width) as i32, (index / self.width) as i32)
    }

    pub fn get(&self, position: Position) -> Option<Cell> {
        self.index(position).map(|i| self.cells[i])
    }

    /// Writes `cell` and returns what was there before.
    pub fn set(&mut self, position: Position, cell: Cell) -> Result<Cell, GridError> {
        let index = self
            .index(position)
            .ok_or(GridError::OutOfBounds { position })?;
        Ok(std::mem::replace(&mut self.cells[index], cell))
    }

    /// Out-of-bounds positions are treated as blocking.
    pub fn is_blocking(&self, position: Position) -> bool {
        self.get(position).is_none_or(|cell| cell.blocking)
    }

    pub fn is_empty_at(&self, position: Position) -> bool {
        self.get(position).is_some_and(Cell::is_empty)
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(index, _)| self.position_of(index))
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_empty()).count()
    }

    pub fn count_tile(&self, tile: Tile) -> usize {
        self.cells.iter().filter(|cell| cell.tile == tile).count()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.rows().map(<[Cell]>::to_vec).collect()
    }
}
