//! The factory floor: a fixed-size 2D array of optional buildings.
//!
//! Cells are stored flat in row-major order. Buildings never hold
//! references to each other; anything that needs a neighbor recomputes the
//! neighbor's position and asks the grid for it.

use crate::building::Building;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A cell coordinate. Row 0 is processed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The adjacent cell in `dir`, or `None` if it would fall below zero.
    /// The upper bound is checked by [`Grid::neighbor`].
    pub fn step(self, dir: Direction) -> Option<GridPosition> {
        let (dr, dc) = dir.offset();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Some(GridPosition { row, col })
    }
}

impl std::fmt::Display for GridPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Cardinal directions. East is increasing column, South increasing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Direction {
    North,
    #[default]
    East,
    South,
    West,
}

impl Direction {
    /// All four cardinal directions.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }

    /// (row, col) offset for this direction.
    pub fn offset(&self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Errors from cell-level grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("cell {0} is outside the grid")]
    OutOfBounds(GridPosition),
    #[error("cell {0} is occupied")]
    Occupied(GridPosition),
    #[error("cell {0} is empty")]
    Empty(GridPosition),
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Exclusive owner of every building in the simulation.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Building>>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: (0..rows * cols).map(|_| None).collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells (occupied or not).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, pos: GridPosition) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Row-major flat index of `pos`.
    pub fn index_of(&self, pos: GridPosition) -> Option<usize> {
        self.in_bounds(pos).then(|| pos.row * self.cols + pos.col)
    }

    /// The in-bounds neighbor of `pos` in `dir`.
    pub fn neighbor(&self, pos: GridPosition, dir: Direction) -> Option<GridPosition> {
        pos.step(dir).filter(|p| self.in_bounds(*p))
    }

    pub fn get(&self, pos: GridPosition) -> Option<&Building> {
        let idx = self.index_of(pos)?;
        self.cells[idx].as_ref()
    }

    pub fn get_mut(&mut self, pos: GridPosition) -> Option<&mut Building> {
        let idx = self.index_of(pos)?;
        self.cells[idx].as_mut()
    }

    pub fn is_occupied(&self, pos: GridPosition) -> bool {
        self.get(pos).is_some()
    }

    /// Put a building into an empty, in-bounds cell.
    pub fn insert(&mut self, building: Building) -> Result<(), GridError> {
        let pos = building.position();
        let idx = self.index_of(pos).ok_or(GridError::OutOfBounds(pos))?;
        if self.cells[idx].is_some() {
            return Err(GridError::Occupied(pos));
        }
        self.cells[idx] = Some(building);
        Ok(())
    }

    /// Take the building out of a cell, leaving it empty.
    pub fn remove(&mut self, pos: GridPosition) -> Result<Building, GridError> {
        let idx = self.index_of(pos).ok_or(GridError::OutOfBounds(pos))?;
        self.cells[idx].take().ok_or(GridError::Empty(pos))
    }

    /// Occupied cells in row-major order.
    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.cells.iter().flatten()
    }

    pub(crate) fn buildings_mut(&mut self) -> impl Iterator<Item = &mut Building> {
        self.cells.iter_mut().flatten()
    }

    /// Empty every cell, returning the evicted buildings in row-major order.
    pub(crate) fn clear(&mut self) -> Vec<Building> {
        self.cells.iter_mut().filter_map(Option::take).collect()
    }

    pub fn building_count(&self) -> usize {
        self.buildings().count()
    }

    /// Detach the building at a flat index so it can be ticked while the
    /// rest of the grid is borrowed mutably. Must be followed by
    /// [`Grid::restore`] at the same index.
    pub(crate) fn detach(&mut self, index: usize) -> Option<Building> {
        self.cells[index].take()
    }

    pub(crate) fn restore(&mut self, index: usize, building: Building) {
        debug_assert!(self.cells[index].is_none(), "restore into occupied cell {index}");
        self.cells[index] = Some(building);
    }
}
