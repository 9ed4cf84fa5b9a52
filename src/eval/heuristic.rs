//! Heuristic evaluation for search leaf nodes
//!
//! Positions are rated by live run potential (runs that still have
//! room to reach k) plus a small center-control bonus. The two-player
//! form is symmetric, as negamax requires:
//! `evaluate(board, a) == -evaluate(board, b)`.

use crate::board::{Board, Cell, Player};
use crate::rules::score::{adjacency_scores, margin};
use crate::rules::RuleSet;

use super::patterns::{run_weight, PatternScore};

/// Weight per doubled-Manhattan unit of centrality, per token.
const POSITION_WEIGHT: i32 = 3;

/// Two-player evaluation from `player`'s perspective.
///
/// Positive favors `player`. Symmetric between the two players, so it
/// can be negated across negamax levels.
#[must_use]
pub fn evaluate(board: &Board, player: Player) -> i32 {
    let rules = board.rules();
    debug_assert_eq!(rules.players(), 2);
    let opponent = rules.player_after(player);
    evaluate_single(board, player).saturating_sub(evaluate_single(board, opponent))
}

/// One-sided evaluation: `player`'s own run potential and centrality,
/// ignoring everyone else. Used per player by the multi-player search.
#[must_use]
pub fn evaluate_single(board: &Board, player: Player) -> i32 {
    pattern_total(board, player).saturating_add(position_total(board, player))
}

/// Adjacency-mode evaluation: current score margin over the best
/// rival, scaled to compete with positional noise and capped at
/// [`PatternScore::EVAL_CAP`] so margins never read as win scores.
/// Antisymmetric for two players.
#[must_use]
pub fn evaluate_adjacency(board: &Board, player: Player) -> i32 {
    let scores = adjacency_scores(board);
    margin(&scores, player)
        .saturating_mul(PatternScore::POINT)
        .clamp(-PatternScore::EVAL_CAP, PatternScore::EVAL_CAP)
}

/// Sum of run weights over all of `player`'s runs. Each run is
/// counted once per direction, at its start cell.
fn pattern_total(board: &Board, player: Player) -> i32 {
    let rules = board.rules();
    let mut total = 0i32;
    for idx in board.occupied_by(player) {
        let origin = rules.coord_of(idx);
        for dir in rules.directions() {
            total = total.saturating_add(line_weight(board, rules, &origin, dir, player));
        }
    }
    total
}

/// Rate the run starting at `origin` in direction `dir`, or 0 if
/// `origin` is not the start of a run, or the run is dead.
fn line_weight(
    board: &Board,
    rules: &RuleSet,
    origin: &[usize],
    dir: &[i8],
    player: Player,
) -> i32 {
    let k = rules.k();
    let own = Cell::Occupied(player);

    // Only rate from the start of a run.
    if cell_in(board, rules, origin, dir, -1) == Some(own) {
        return 0;
    }

    // Walk to the end of the run.
    let mut len = 1usize;
    let mut end = origin.to_vec();
    loop {
        let mut next = end.clone();
        if !rules.advance(&mut next, dir, 1) || board.cell_at_coord(&next) != own {
            break;
        }
        end = next;
        len += 1;
    }
    if len >= k {
        return PatternScore::WIN;
    }

    // Room: empty or own cells the run could grow into, either side.
    // A run that can never reach k is dead.
    let forward_space = count_space(board, rules, &end, dir, 1, k - len, player);
    let backward_space = count_space(board, rules, origin, dir, -1, k - len, player);
    if len + forward_space + backward_space < k {
        return 0;
    }

    let mut open_ends = 0usize;
    if cell_in(board, rules, origin, dir, -1) == Some(Cell::Empty) {
        open_ends += 1;
    }
    if cell_in(board, rules, &end, dir, 1) == Some(Cell::Empty) {
        open_ends += 1;
    }

    run_weight(len, open_ends, k)
}

/// Cell one step from `coord` along `dir` (scaled by `sign`), or
/// `None` off the board.
fn cell_in(
    board: &Board,
    rules: &RuleSet,
    coord: &[usize],
    dir: &[i8],
    sign: i8,
) -> Option<Cell> {
    let mut c = coord.to_vec();
    if !rules.advance(&mut c, dir, sign) {
        return None;
    }
    Some(board.cell_at_coord(&c))
}

/// Count cells the run could still grow through: empty or own, up to
/// `cap` steps from `from` along `dir`.
fn count_space(
    board: &Board,
    rules: &RuleSet,
    from: &[usize],
    dir: &[i8],
    sign: i8,
    cap: usize,
    player: Player,
) -> usize {
    let own = Cell::Occupied(player);
    let mut space = 0usize;
    let mut coord = from.to_vec();
    while space < cap && rules.advance(&mut coord, dir, sign) {
        let cell = board.cell_at_coord(&coord);
        if cell == Cell::Empty || cell == own {
            space += 1;
        } else {
            break;
        }
    }
    space
}

/// Center-control bonus: more central tokens are worth slightly more.
fn position_total(board: &Board, player: Player) -> i32 {
    let rules = board.rules();
    let max_dist: u32 = rules.dims().iter().map(|&d| (d as u32 - 1)).sum();
    board
        .occupied_by(player)
        .map(|idx| (max_dist - rules.center_dist(idx)) as i32 * POSITION_WEIGHT)
        .fold(0i32, i32::saturating_add)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::rules::{RuleSetConfig, ScoringMode};

    fn board(side: usize, k: usize) -> Board {
        let rules = Arc::new(RuleSet::new(RuleSetConfig::square(side, k)).unwrap());
        Board::new(rules)
    }

    #[test]
    fn test_empty_board_is_neutral() {
        let b = board(5, 4);
        assert_eq!(evaluate(&b, Player(0)), 0);
    }

    #[test]
    fn test_evaluate_symmetry() {
        let mut b = board(5, 4);
        b.place(&[2, 2], Player(0)).unwrap();
        b.place(&[1, 1], Player(1)).unwrap();
        b.place(&[2, 3], Player(0)).unwrap();
        assert_eq!(evaluate(&b, Player(0)), -evaluate(&b, Player(1)));
    }

    #[test]
    fn test_longer_run_scores_higher() {
        let mut two = board(7, 5);
        two.place(&[3, 2], Player(0)).unwrap();
        two.place(&[3, 3], Player(0)).unwrap();

        let mut three = board(7, 5);
        three.place(&[3, 2], Player(0)).unwrap();
        three.place(&[3, 3], Player(0)).unwrap();
        three.place(&[3, 4], Player(0)).unwrap();

        assert!(evaluate(&three, Player(0)) > evaluate(&two, Player(0)));
    }

    #[test]
    fn test_blocked_run_scores_lower_than_open() {
        let mut open = board(7, 5);
        open.place(&[3, 2], Player(0)).unwrap();
        open.place(&[3, 3], Player(0)).unwrap();
        open.place(&[3, 4], Player(0)).unwrap();

        let mut blocked = board(7, 5);
        blocked.place(&[3, 2], Player(0)).unwrap();
        blocked.place(&[3, 3], Player(0)).unwrap();
        blocked.place(&[3, 4], Player(0)).unwrap();
        blocked.place(&[3, 5], Player(1)).unwrap();

        assert!(evaluate(&open, Player(0)) > evaluate(&blocked, Player(0)));
    }

    #[test]
    fn test_dead_run_scores_nothing_for_patterns() {
        // Three in a corner row of 3 with k = 5: can never complete.
        let cfg = RuleSetConfig {
            dimensions: vec![3, 5],
            k: 5,
            players: 2,
            scoring: ScoringMode::WinOnly,
            obstacles: vec![],
        };
        let rules = Arc::new(RuleSet::new(cfg).unwrap());
        let mut b = Board::new(rules);
        // Vertical run of 3 in a dimension of extent 3.
        b.place(&[0, 0], Player(0)).unwrap();
        b.place(&[1, 0], Player(0)).unwrap();
        b.place(&[2, 0], Player(0)).unwrap();
        let vertical = b
            .rules()
            .directions()
            .iter()
            .find(|d| d.as_slice() == [1, 0])
            .unwrap()
            .clone();
        assert_eq!(
            line_weight(&b, b.rules(), &[0, 0], &vertical, Player(0)),
            0
        );
    }

    #[test]
    fn test_center_preferred() {
        let mut center = board(5, 4);
        center.place(&[2, 2], Player(0)).unwrap();
        let mut corner = board(5, 4);
        corner.place(&[0, 0], Player(0)).unwrap();
        assert!(evaluate(&center, Player(0)) > evaluate(&corner, Player(0)));
    }

    #[test]
    fn test_adjacency_margin_evaluation() {
        let cfg = RuleSetConfig {
            dimensions: vec![1, 6],
            k: 3,
            players: 2,
            scoring: ScoringMode::Adjacency,
            obstacles: vec![],
        };
        let rules = Arc::new(RuleSet::new(cfg).unwrap());
        let mut b = Board::new(rules);
        b.place(&[0, 0], Player(0)).unwrap();
        b.place(&[0, 1], Player(0)).unwrap();
        b.place(&[0, 2], Player(0)).unwrap();
        b.place(&[0, 4], Player(1)).unwrap();
        // P0 has a run of 3 (2 points), P1 nothing.
        assert_eq!(evaluate_adjacency(&b, Player(0)), 2 * PatternScore::POINT);
        assert_eq!(evaluate_adjacency(&b, Player(1)), -2 * PatternScore::POINT);
    }

    #[test]
    fn test_adjacency_evaluation_capped_below_win_range() {
        // A margin of 505 points would otherwise scale past the win
        // scores; the evaluation saturates at the cap instead.
        let cfg = RuleSetConfig {
            dimensions: vec![1, 520],
            k: 2,
            players: 2,
            scoring: ScoringMode::Adjacency,
            obstacles: vec![],
        };
        let rules = Arc::new(RuleSet::new(cfg).unwrap());
        let mut b = Board::new(rules);
        for c in 0..=505 {
            b.place(&[0, c], Player(0)).unwrap();
        }
        b.place(&[0, 510], Player(1)).unwrap();

        assert_eq!(evaluate_adjacency(&b, Player(0)), PatternScore::EVAL_CAP);
        assert_eq!(evaluate_adjacency(&b, Player(1)), -PatternScore::EVAL_CAP);
        assert!(PatternScore::EVAL_CAP < PatternScore::WIN);
    }
}
