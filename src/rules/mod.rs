//! Rule set: validated game parameters and board geometry
//!
//! A [`RuleSet`] is built once from a [`RuleSetConfig`] and shared
//! immutably (via `Arc`) by the board, the win detector, and the
//! search. It owns everything derived from the configuration: strides
//! for row-major indexing, the canonical line directions, obstacle
//! placement, and per-cell centrality used for move ordering.
//!
//! # Example
//!
//! ```
//! use kinarow::rules::{RuleSet, RuleSetConfig};
//!
//! // Classic tic-tac-toe.
//! let rules = RuleSet::new(RuleSetConfig::square(3, 3)).unwrap();
//! assert_eq!(rules.cell_count(), 9);
//! assert_eq!(rules.directions().len(), 4);
//! ```

pub mod score;
pub mod win;

use serde::{Deserialize, Serialize};

use crate::board::Player;
use crate::error::{ConfigError, MoveError};

/// Largest supported board, so a cell index always fits in 16 bits.
pub const MAX_CELLS: usize = 1 << 16;

/// How the game is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringMode {
    /// First k-in-a-row wins; full board without one is a draw.
    #[default]
    WinOnly,
    /// Play until the board is full, then score adjacency runs;
    /// highest total wins, ties draw.
    Adjacency,
}

/// Serde-friendly game configuration, validated by [`RuleSet::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetConfig {
    /// Extent of each dimension, e.g. `[3, 3]` for tic-tac-toe.
    pub dimensions: Vec<usize>,
    /// Run length required to win (or scored, in adjacency mode).
    pub k: usize,
    /// Number of players, moving round-robin from `Player(0)`.
    pub players: u8,
    #[serde(default)]
    pub scoring: ScoringMode,
    /// Cells blocked before play starts.
    #[serde(default)]
    pub obstacles: Vec<Vec<usize>>,
}

impl RuleSetConfig {
    /// Two-player game on a `side`×`side` board, win by `k` in a row.
    #[must_use]
    pub fn square(side: usize, k: usize) -> Self {
        Self {
            dimensions: vec![side, side],
            k,
            players: 2,
            scoring: ScoringMode::WinOnly,
            obstacles: Vec::new(),
        }
    }
}

/// Validated, immutable rule set.
#[derive(Debug)]
pub struct RuleSet {
    dims: Vec<usize>,
    strides: Vec<usize>,
    k: usize,
    players: u8,
    scoring: ScoringMode,
    obstacles: Vec<usize>,
    cell_count: usize,
    directions: Vec<Vec<i8>>,
    center_dist: Vec<u32>,
}

impl RuleSet {
    /// Validate a configuration and derive the board geometry.
    pub fn new(config: RuleSetConfig) -> Result<Self, ConfigError> {
        let invalid = |msg: String| ConfigError::InvalidRuleSet(msg);

        let dims = config.dimensions;
        if dims.is_empty() {
            return Err(invalid("dimensions must not be empty".into()));
        }
        if let Some(pos) = dims.iter().position(|&d| d == 0) {
            return Err(invalid(format!("dimension {pos} has zero extent")));
        }

        let mut cell_count = 1usize;
        for &d in &dims {
            cell_count = cell_count
                .checked_mul(d)
                .filter(|&n| n <= MAX_CELLS)
                .ok_or_else(|| {
                    invalid(format!("board exceeds {MAX_CELLS} cells"))
                })?;
        }

        let longest = dims.iter().copied().max().unwrap_or(1);
        if config.k == 0 || config.k > longest {
            return Err(invalid(format!(
                "run length {} must be between 1 and the longest dimension {}",
                config.k, longest
            )));
        }

        if config.players < 2 {
            return Err(invalid(format!(
                "need at least 2 players, got {}",
                config.players
            )));
        }

        // Row-major: last dimension varies fastest.
        let mut strides = vec![1usize; dims.len()];
        for a in (0..dims.len().saturating_sub(1)).rev() {
            strides[a] = strides[a + 1] * dims[a + 1];
        }

        let mut rules = Self {
            dims,
            strides,
            k: config.k,
            players: config.players,
            scoring: config.scoring,
            obstacles: Vec::new(),
            cell_count,
            directions: Vec::new(),
            center_dist: Vec::new(),
        };
        rules.directions = rules.enumerate_directions();
        rules.center_dist = rules.compute_center_dist();

        let mut obstacles = Vec::with_capacity(config.obstacles.len());
        for coord in &config.obstacles {
            let idx = rules
                .index_of(coord)
                .map_err(|_| invalid(format!("obstacle {coord:?} is out of bounds")))?;
            obstacles.push(idx);
        }
        obstacles.sort_unstable();
        if obstacles.windows(2).any(|w| w[0] == w[1]) {
            return Err(invalid("duplicate obstacle coordinate".into()));
        }
        if obstacles.len() >= cell_count {
            return Err(invalid("obstacles leave no playable cell".into()));
        }
        rules.obstacles = obstacles;

        Ok(rules)
    }

    #[must_use]
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[must_use]
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    #[must_use]
    #[inline]
    pub fn players(&self) -> u8 {
        self.players
    }

    #[must_use]
    #[inline]
    pub fn scoring(&self) -> ScoringMode {
        self.scoring
    }

    #[must_use]
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Sorted flat indices of blocked cells.
    #[must_use]
    pub fn obstacles(&self) -> &[usize] {
        &self.obstacles
    }

    /// Canonical line directions: one vector per axis-parallel or
    /// diagonal line family, with the first nonzero component positive.
    #[must_use]
    pub fn directions(&self) -> &[Vec<i8>] {
        &self.directions
    }

    /// Next player in round-robin turn order.
    #[must_use]
    #[inline]
    pub fn player_after(&self, p: Player) -> Player {
        Player((p.0 + 1) % self.players)
    }

    /// Flat index of a coordinate, or `OutOfBounds`.
    pub fn index_of(&self, coord: &[usize]) -> Result<usize, MoveError> {
        if coord.len() != self.dims.len() {
            return Err(MoveError::OutOfBounds);
        }
        let mut idx = 0usize;
        for a in 0..coord.len() {
            if coord[a] >= self.dims[a] {
                return Err(MoveError::OutOfBounds);
            }
            idx += coord[a] * self.strides[a];
        }
        Ok(idx)
    }

    /// Flat index of a coordinate already known to be in bounds
    /// (e.g. produced by [`advance`](Self::advance)).
    #[inline]
    pub(crate) fn flat_index(&self, coord: &[usize]) -> usize {
        debug_assert_eq!(coord.len(), self.dims.len());
        coord.iter().zip(&self.strides).map(|(&c, &s)| c * s).sum()
    }

    /// Coordinate of a flat index.
    #[must_use]
    pub fn coord_of(&self, mut idx: usize) -> Vec<usize> {
        debug_assert!(idx < self.cell_count);
        let mut coord = vec![0usize; self.dims.len()];
        for a in 0..self.dims.len() {
            coord[a] = idx / self.strides[a];
            idx %= self.strides[a];
        }
        coord
    }

    /// Move `coord` one step along `dir` (scaled by `sign`).
    /// Returns false, leaving `coord` untouched, if that leaves the board.
    pub(crate) fn advance(&self, coord: &mut [usize], dir: &[i8], sign: i8) -> bool {
        for a in 0..coord.len() {
            let step = isize::from(dir[a]) * isize::from(sign);
            let v = coord[a] as isize + step;
            if v < 0 || v >= self.dims[a] as isize {
                return false;
            }
        }
        for a in 0..coord.len() {
            let step = isize::from(dir[a]) * isize::from(sign);
            coord[a] = (coord[a] as isize + step) as usize;
        }
        true
    }

    /// Doubled Manhattan distance from the board center. Lower is
    /// more central; doubling keeps it integral on even extents.
    #[must_use]
    #[inline]
    pub(crate) fn center_dist(&self, idx: usize) -> u32 {
        self.center_dist[idx]
    }

    fn enumerate_directions(&self) -> Vec<Vec<i8>> {
        let n = self.dims.len();
        let mut dirs = Vec::new();
        let total = 3usize.pow(n as u32);
        let mut dir = vec![0i8; n];
        for code in 0..total {
            let mut c = code;
            for d in dir.iter_mut() {
                *d = (c % 3) as i8 - 1;
                c /= 3;
            }
            // Keep one of each ± pair: first nonzero component positive.
            match dir.iter().find(|&&d| d != 0) {
                Some(&first) if first > 0 => dirs.push(dir.clone()),
                _ => {}
            }
        }
        dirs
    }

    fn compute_center_dist(&self) -> Vec<u32> {
        (0..self.cell_count)
            .map(|idx| {
                let coord = self.coord_of(idx);
                coord
                    .iter()
                    .zip(&self.dims)
                    .map(|(&c, &d)| (2 * c as i64 - (d as i64 - 1)).unsigned_abs() as u32)
                    .sum()
            })
            .collect()
    }
}
