//! Zobrist hashing for transposition detection
//!
//! One random key per (cell, player) pair plus one side-to-move key
//! per player. Keys come from a fixed-seed LCG so hashes are
//! reproducible across runs, which keeps searches deterministic.
//!
//! Obstacles never change, so they carry no key: two positions with
//! the same tokens always hash alike.

use crate::board::{Board, Player};

/// Zobrist key tables sized for one rule set.
pub struct ZobristTable {
    /// `cell_count × players` keys, indexed `cell * players + player`.
    pieces: Vec<u64>,
    /// Side-to-move key per player.
    sides: Vec<u64>,
    players: usize,
}

impl ZobristTable {
    /// Build the key tables for a board of `cell_count` cells and
    /// `players` players.
    #[must_use]
    pub fn new(cell_count: usize, players: u8) -> Self {
        let players = usize::from(players);
        // Knuth MMIX LCG, fixed seed for reproducibility.
        let mut state = 0x1234_5678_9ABC_DEF0u64;
        let mut next = || {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            state
        };

        let pieces = (0..cell_count * players).map(|_| next()).collect();
        let sides = (0..players).map(|_| next()).collect();
        Self {
            pieces,
            sides,
            players,
        }
    }

    /// Key for `player`'s token on `cell`.
    #[must_use]
    #[inline]
    pub fn piece(&self, cell: usize, player: Player) -> u64 {
        self.pieces[cell * self.players + player.index()]
    }

    /// Side-to-move key for `player`.
    #[must_use]
    #[inline]
    pub fn side(&self, player: Player) -> u64 {
        self.sides[player.index()]
    }

    /// Full hash of a position with `to_move` to play.
    #[must_use]
    pub fn hash(&self, board: &Board, to_move: Player) -> u64 {
        let mut h = self.side(to_move);
        for (cell, contents) in board.cells().iter().enumerate() {
            if let Some(p) = contents.player() {
                h ^= self.piece(cell, p);
            }
        }
        h
    }

    /// Hash after `mover` places on `cell` and the turn passes to
    /// `next`. Its own inverse: applying it again removes the token
    /// and hands the turn back.
    #[must_use]
    #[inline]
    pub fn toggle(&self, hash: u64, cell: usize, mover: Player, next: Player) -> u64 {
        hash ^ self.piece(cell, mover) ^ self.side(mover) ^ self.side(next)
    }
}
