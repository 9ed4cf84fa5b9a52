//! Pattern weights for position evaluation
//!
//! Weights are parametric in the rule set's run length k: a run is
//! rated by how far it is from completing (its deficit) and by how
//! many of its immediate ends are open.

/// Evaluation weight constants.
pub struct PatternScore;

impl PatternScore {
    /// A completed run of length k.
    pub const WIN: i32 = 1_000_000;

    /// One short of k, both ends open (unstoppable next move).
    pub const OPEN_NEAR: i32 = 100_000;
    /// One short of k, one end open.
    pub const CLOSED_NEAR: i32 = 50_000;

    /// Two short of k, both ends open (promotes to an open near-run).
    /// Must be well below CLOSED_NEAR: the opponent still has a clear
    /// blocking point.
    pub const OPEN_MID: i32 = 10_000;
    /// Two short of k, one end open.
    pub const CLOSED_MID: i32 = 1_500;

    /// Three short of k, both ends open.
    pub const OPEN_EARLY: i32 = 1_000;
    /// Three short of k, one end open.
    pub const CLOSED_EARLY: i32 = 200;

    /// Further than three from k.
    pub const OPEN_SEED: i32 = 250;
    pub const CLOSED_SEED: i32 = 50;

    /// Adjacency-mode value per point of score margin mid-game.
    pub const POINT: i32 = 1_000;
    /// Adjacency-mode value per point of margin on a full board.
    pub const POINT_FINAL: i32 = 10_000;

    /// Bound on every non-terminal evaluation. Win scores live
    /// strictly above this, so the two ranges never overlap.
    pub const EVAL_CAP: i32 = Self::WIN / 2;
}

/// Weight of a live run of `len` same-player tokens toward a target
/// of `k`, with `open_ends` immediately playable ends (0, 1 or 2).
///
/// The caller is responsible for dead-run detection (a run with no
/// room to ever reach k scores 0 regardless of this table).
#[must_use]
pub fn run_weight(len: usize, open_ends: usize, k: usize) -> i32 {
    if len >= k {
        return PatternScore::WIN;
    }
    if open_ends == 0 {
        return 0;
    }
    let open = open_ends >= 2;
    match k - len {
        1 => {
            if open {
                PatternScore::OPEN_NEAR
            } else {
                PatternScore::CLOSED_NEAR
            }
        }
        2 => {
            if open {
                PatternScore::OPEN_MID
            } else {
                PatternScore::CLOSED_MID
            }
        }
        3 => {
            if open {
                PatternScore::OPEN_EARLY
            } else {
                PatternScore::CLOSED_EARLY
            }
        }
        _ => {
            if open {
                PatternScore::OPEN_SEED
            } else {
                PatternScore::CLOSED_SEED
            }
        }
    }
}
