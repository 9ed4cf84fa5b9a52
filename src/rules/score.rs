//! Adjacency scoring
//!
//! In `ScoringMode::Adjacency` the game runs until the board is full,
//! then each player scores every maximal straight run of their tokens:
//! a run of length L ≥ 2 awards L − 1 points. A run is counted once,
//! at its start cell (the end with no same-player predecessor).

use crate::board::{Board, Cell, Player};

/// Per-player adjacency totals, indexed by player number.
#[must_use]
pub fn adjacency_scores(board: &Board) -> Vec<u32> {
    let rules = board.rules();
    let mut scores = vec![0u32; usize::from(rules.players())];

    for idx in 0..rules.cell_count() {
        let Cell::Occupied(player) = board.cell(idx) else {
            continue;
        };
        let origin = rules.coord_of(idx);
        for dir in rules.directions() {
            // Only score from the start of a run.
            let mut prev = origin.clone();
            if rules.advance(&mut prev, dir, -1)
                && board.cell_at_coord(&prev) == Cell::Occupied(player)
            {
                continue;
            }
            let mut len = 1u32;
            let mut coord = origin.clone();
            while rules.advance(&mut coord, dir, 1) {
                if board.cell_at_coord(&coord) == Cell::Occupied(player) {
                    len += 1;
                } else {
                    break;
                }
            }
            if len >= 2 {
                scores[player.index()] += len - 1;
            }
        }
    }
    scores
}

/// The unique highest scorer, or `None` on a tie for the lead.
#[must_use]
pub fn leader(scores: &[u32]) -> Option<Player> {
    let best = *scores.iter().max()?;
    let mut leaders = scores.iter().enumerate().filter(|(_, &s)| s == best);
    let (idx, _) = leaders.next()?;
    if leaders.next().is_some() {
        None
    } else {
        Some(Player(idx as u8))
    }
}

/// Score advantage of `player` over their best-placed rival.
/// Positive means `player` leads. Antisymmetric for two players.
#[must_use]
pub fn margin(scores: &[u32], player: Player) -> i32 {
    let own = scores[player.index()] as i32;
    let best_other = scores
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != player.index())
        .map(|(_, &s)| s as i32)
        .max()
        .unwrap_or(0);
    own - best_other
}
