//! Move log with undo/redo cursor
//!
//! Moves are appended past a cursor; undo steps the cursor back
//! without discarding anything, so the forward tail stays redoable
//! until a new move truncates it.

use serde::{Deserialize, Serialize};

use crate::board::Player;
use crate::error::HistoryError;

/// An accepted move. Never mutated once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub player: Player,
    /// Flat cell index of the placement.
    pub cell: usize,
    /// Monotonic sequence number, unique across the whole game
    /// including moves later discarded by undo-truncation.
    pub seq: u32,
}

/// Append-only move log plus a cursor.
///
/// Moves at indices `0..cursor` are applied; `cursor..len` is the
/// redo tail.
#[derive(Debug, Clone, Default)]
pub struct MoveHistory {
    moves: Vec<Move>,
    cursor: usize,
}

impl MoveHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently applied moves.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.cursor
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Number of moves available to redo.
    #[must_use]
    #[inline]
    pub fn redo_len(&self) -> usize {
        self.moves.len() - self.cursor
    }

    /// Applied moves in order.
    #[must_use]
    pub fn applied(&self) -> &[Move] {
        &self.moves[..self.cursor]
    }

    /// Append a move, discarding any redo tail.
    pub fn record(&mut self, mv: Move) {
        self.moves.truncate(self.cursor);
        self.moves.push(mv);
        self.cursor += 1;
    }

    /// Step the cursor back, returning the move to revert.
    pub fn undo(&mut self) -> Result<Move, HistoryError> {
        if self.cursor == 0 {
            return Err(HistoryError::NothingToUndo);
        }
        self.cursor -= 1;
        Ok(self.moves[self.cursor])
    }

    /// Step the cursor forward, returning the move to reapply.
    pub fn redo(&mut self) -> Result<Move, HistoryError> {
        if self.cursor == self.moves.len() {
            return Err(HistoryError::NothingToRedo);
        }
        let mv = self.moves[self.cursor];
        self.cursor += 1;
        Ok(mv)
    }
}
