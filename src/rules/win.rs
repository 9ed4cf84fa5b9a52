//! Win detection from the last move
//!
//! Only a line through the most recent placement can complete a run,
//! so checking every direction through that one cell is sufficient.
//! Cost is O(directions × k) per check.

use crate::board::{Board, Cell, Player};

/// Whether `player` has k-in-a-row through the cell at `idx`.
///
/// Counts the placed cell plus consecutive same-player cells in both
/// senses of each canonical direction; obstacles and opponents end a
/// run. With k = 1 any placement wins.
#[must_use]
pub fn wins_at(board: &Board, idx: usize, player: Player) -> bool {
    let rules = board.rules();
    let k = rules.k();
    if k == 1 {
        return true;
    }

    let origin = rules.coord_of(idx);
    for dir in rules.directions() {
        let mut count = 1;
        for sign in [1i8, -1] {
            let mut coord = origin.clone();
            while count < k && rules.advance(&mut coord, dir, sign) {
                if board.cell_at_coord(&coord) == Cell::Occupied(player) {
                    count += 1;
                } else {
                    break;
                }
            }
        }
        if count >= k {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::rules::{RuleSet, RuleSetConfig, ScoringMode};

    fn board_3x3() -> Board {
        let rules = Arc::new(RuleSet::new(RuleSetConfig::square(3, 3)).unwrap());
        Board::new(rules)
    }

    fn fill(board: &mut Board, player: Player, coords: &[[usize; 2]]) {
        for c in coords {
            board.place(c, player).unwrap();
        }
    }

    #[test]
    fn test_all_eight_lines_on_3x3() {
        let lines: [[[usize; 2]; 3]; 8] = [
            [[0, 0], [0, 1], [0, 2]],
            [[1, 0], [1, 1], [1, 2]],
            [[2, 0], [2, 1], [2, 2]],
            [[0, 0], [1, 0], [2, 0]],
            [[0, 1], [1, 1], [2, 1]],
            [[0, 2], [1, 2], [2, 2]],
            [[0, 0], [1, 1], [2, 2]],
            [[0, 2], [1, 1], [2, 0]],
        ];
        for line in &lines {
            let mut board = board_3x3();
            fill(&mut board, Player(0), line);
            let last = board.rules().index_of(&line[2]).unwrap();
            assert!(wins_at(&board, last, Player(0)), "line {line:?}");
        }
    }

    #[test]
    fn test_win_detected_from_middle_of_run() {
        let mut board = board_3x3();
        fill(&mut board, Player(0), &[[0, 0], [0, 2], [0, 1]]);
        let middle = board.rules().index_of(&[0, 1]).unwrap();
        assert!(wins_at(&board, middle, Player(0)));
    }

    #[test]
    fn test_broken_line_is_not_a_win() {
        let mut board = board_3x3();
        // Two in a row plus a bend; no straight three.
        fill(&mut board, Player(0), &[[0, 0], [0, 1], [1, 2]]);
        for c in [[0usize, 0], [0, 1], [1, 2]] {
            let idx = board.rules().index_of(&c).unwrap();
            assert!(!wins_at(&board, idx, Player(0)));
        }
    }

    #[test]
    fn test_opponent_stone_breaks_run() {
        let mut board = board_3x3();
        fill(&mut board, Player(0), &[[0, 0], [0, 2]]);
        fill(&mut board, Player(1), &[[0, 1]]);
        let idx = board.rules().index_of(&[0, 2]).unwrap();
        assert!(!wins_at(&board, idx, Player(0)));
    }

    #[test]
    fn test_obstacle_breaks_run() {
        let cfg = RuleSetConfig {
            obstacles: vec![vec![0, 1]],
            ..RuleSetConfig::square(3, 3)
        };
        let rules = Arc::new(RuleSet::new(cfg).unwrap());
        let mut board = Board::new(rules);
        fill(&mut board, Player(0), &[[0, 0], [0, 2]]);
        let idx = board.rules().index_of(&[0, 2]).unwrap();
        assert!(!wins_at(&board, idx, Player(0)));
    }

    #[test]
    fn test_k_exceeding_short_dimension() {
        // On 2x5 with k = 3 no vertical win exists; horizontal does.
        let cfg = RuleSetConfig {
            dimensions: vec![2, 5],
            k: 3,
            players: 2,
            scoring: ScoringMode::WinOnly,
            obstacles: vec![],
        };
        let rules = Arc::new(RuleSet::new(cfg).unwrap());
        let mut board = Board::new(Arc::clone(&rules));
        fill(&mut board, Player(0), &[[0, 0], [1, 0]]);
        let idx = rules.index_of(&[1, 0]).unwrap();
        assert!(!wins_at(&board, idx, Player(0)));

        fill(&mut board, Player(0), &[[0, 1], [0, 2]]);
        let idx = rules.index_of(&[0, 2]).unwrap();
        assert!(wins_at(&board, idx, Player(0)));
    }

    #[test]
    fn test_three_dimensional_diagonal() {
        let cfg = RuleSetConfig {
            dimensions: vec![3, 3, 3],
            k: 3,
            players: 2,
            scoring: ScoringMode::WinOnly,
            obstacles: vec![],
        };
        let rules = Arc::new(RuleSet::new(cfg).unwrap());
        let mut board = Board::new(Arc::clone(&rules));
        for i in 0..3 {
            board.place(&[i, i, i], Player(1)).unwrap();
        }
        let idx = rules.index_of(&[2, 2, 2]).unwrap();
        assert!(wins_at(&board, idx, Player(1)));
        assert!(!wins_at(&board, idx, Player(0)));
    }

    #[test]
    fn test_k_one_wins_immediately() {
        let cfg = RuleSetConfig::square(3, 1);
        let rules = Arc::new(RuleSet::new(cfg).unwrap());
        let mut board = Board::new(rules);
        let idx = board.place(&[2, 0], Player(0)).unwrap();
        assert!(wins_at(&board, idx, Player(0)));
    }

    #[test]
    fn test_run_longer_than_k_still_wins() {
        let cfg = RuleSetConfig {
            dimensions: vec![1, 6],
            k: 3,
            players: 2,
            scoring: ScoringMode::WinOnly,
            obstacles: vec![],
        };
        let rules = Arc::new(RuleSet::new(cfg).unwrap());
        let mut board = Board::new(Arc::clone(&rules));
        for c in [0usize, 1, 3, 4] {
            board.place(&[0, c], Player(0)).unwrap();
        }
        // Placing in the gap makes a run of five.
        let idx = board.place(&[0, 2], Player(0)).unwrap();
        assert!(wins_at(&board, idx, Player(0)));
    }
}
