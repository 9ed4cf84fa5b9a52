//! Flat cell storage over an N-dimensional geometry
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kinarow::rules::{RuleSet, RuleSetConfig};
//! use kinarow::board::{Board, Cell, Player};
//!
//! let rules = Arc::new(RuleSet::new(RuleSetConfig::square(3, 3)).unwrap());
//! let mut board = Board::new(rules);
//! board.place(&[1, 1], Player(0)).unwrap();
//! assert_eq!(board.cell_at(&[1, 1]).unwrap(), Cell::Occupied(Player(0)));
//! ```

use std::sync::Arc;

use crate::board::{Cell, Player};
use crate::error::MoveError;
use crate::rules::RuleSet;

/// Game board: one `Cell` per point of the rule set's geometry,
/// stored row-major (last dimension varies fastest).
#[derive(Debug, Clone)]
pub struct Board {
    rules: Arc<RuleSet>,
    cells: Vec<Cell>,
    empty_count: usize,
}

impl Board {
    /// Create an empty board with the rule set's obstacles already placed.
    #[must_use]
    pub fn new(rules: Arc<RuleSet>) -> Self {
        let mut cells = vec![Cell::Empty; rules.cell_count()];
        for &idx in rules.obstacles() {
            cells[idx] = Cell::Obstacle;
        }
        let empty_count = rules.cell_count() - rules.obstacles().len();
        Self {
            rules,
            cells,
            empty_count,
        }
    }

    #[must_use]
    #[inline]
    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    /// Cell contents by flat index.
    #[must_use]
    #[inline]
    pub fn cell(&self, idx: usize) -> Cell {
        self.cells[idx]
    }

    /// Cell contents by coordinate.
    pub fn cell_at(&self, coord: &[usize]) -> Result<Cell, MoveError> {
        let idx = self.rules.index_of(coord)?;
        Ok(self.cells[idx])
    }

    /// Cell contents at a coordinate already known to be in bounds.
    #[inline]
    pub(crate) fn cell_at_coord(&self, coord: &[usize]) -> Cell {
        self.cells[self.rules.flat_index(coord)]
    }

    /// All cells in flat row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of playable empty cells remaining.
    #[must_use]
    #[inline]
    pub fn empty_count(&self) -> usize {
        self.empty_count
    }

    /// Whether every playable cell is occupied.
    #[must_use]
    #[inline]
    pub fn is_full(&self) -> bool {
        self.empty_count == 0
    }

    /// Flat indices of playable cells, in row-major scan order.
    pub fn legal_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_playable())
            .map(|(i, _)| i)
    }

    /// Place a token, validating the target cell.
    ///
    /// The board is unchanged on error.
    pub fn place(&mut self, coord: &[usize], player: Player) -> Result<usize, MoveError> {
        let idx = self.rules.index_of(coord)?;
        self.place_idx(idx, player)?;
        Ok(idx)
    }

    /// Place a token by flat index, validating the target cell.
    pub fn place_idx(&mut self, idx: usize, player: Player) -> Result<(), MoveError> {
        match self.cells[idx] {
            Cell::Empty => {
                self.cells[idx] = Cell::Occupied(player);
                self.empty_count -= 1;
                Ok(())
            }
            Cell::Occupied(_) => Err(MoveError::CellOccupied),
            Cell::Obstacle => Err(MoveError::ObstacleCell),
        }
    }

    /// Place into a cell already known to be empty. Search-internal.
    #[inline]
    pub(crate) fn place_unchecked(&mut self, idx: usize, player: Player) {
        debug_assert!(self.cells[idx].is_playable());
        self.cells[idx] = Cell::Occupied(player);
        self.empty_count -= 1;
    }

    /// Remove a token, restoring the cell to empty. Search/undo-internal.
    #[inline]
    pub(crate) fn clear_cell(&mut self, idx: usize) {
        debug_assert!(matches!(self.cells[idx], Cell::Occupied(_)));
        self.cells[idx] = Cell::Empty;
        self.empty_count += 1;
    }

    /// Flat indices occupied by `player`.
    pub fn occupied_by(&self, player: Player) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.player() == Some(player))
            .map(|(i, _)| i)
    }
}

impl std::fmt::Display for Board {
    /// Renders 1-D and 2-D boards as grids; higher dimensions as
    /// 2-D slices labelled by their leading coordinates.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dims = self.rules.dims();
        let cols = *dims.last().unwrap_or(&1);
        let rows = if dims.len() >= 2 {
            dims[dims.len() - 2]
        } else {
            1
        };
        let slice_len = rows * cols;

        for (slice_no, slice) in self.cells.chunks(slice_len).enumerate() {
            if dims.len() > 2 {
                let prefix = self.rules.coord_of(slice_no * slice_len);
                writeln!(f, "slice {:?}", &prefix[..dims.len() - 2])?;
            }
            for row in slice.chunks(cols) {
                for (i, cell) in row.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    match cell {
                        Cell::Empty => write!(f, ".")?,
                        Cell::Obstacle => write!(f, "#")?,
                        Cell::Occupied(p) => write!(f, "{}", p.0 + 1)?,
                    }
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
