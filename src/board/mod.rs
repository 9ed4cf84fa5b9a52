//! Board representation for N-dimensional play
//!
//! The board is a flat cell vector addressed through the rule set's
//! row-major geometry. Cloning is cheap enough for search rollouts.

mod grid;


pub use grid::Board;

use serde::{Deserialize, Serialize};

/// A player identifier, `0..players` in turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Player(pub u8);

impl Player {
    /// Index into per-player tables.
    #[must_use]
    #[inline]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

/// Contents of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Occupied(Player),
    Obstacle,
}

impl Cell {
    /// Whether a token may be placed here.
    #[must_use]
    #[inline]
    pub fn is_playable(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The occupying player, if any.
    #[must_use]
    #[inline]
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Occupied(p) => Some(p),
            _ => None,
        }
    }
}
