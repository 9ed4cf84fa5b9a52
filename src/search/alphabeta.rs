//! Iterative-deepening search for the best move
//!
//! Two-player games use negamax with alpha-beta pruning and the
//! shared transposition table. Games with three or more players use
//! a max-n vector search instead: each player maximizes their own
//! component, with no pruning (alpha-beta is unsound there) and no
//! table.
//!
//! Determinism: root moves are scanned in row-major order and only a
//! strictly better score replaces the incumbent, so ties break toward
//! the lowest cell index. Every root move gets a full window, table
//! hits are accepted only at their exact depth, and win scores are
//! rebased per node, so each root value is the fixed-depth minimax
//! value no matter which worker filled the table first. The rayon
//! parallel root therefore reduces in scan order to the same move and
//! score as the serial scan.
//!
//! Cancellation happens at depth boundaries: when the time budget
//! runs out mid-depth, that depth's partial result is discarded and
//! the best move from the last fully completed depth is returned.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kinarow::board::{Board, Player};
//! use kinarow::rules::{RuleSet, RuleSetConfig};
//! use kinarow::search::{SearchBudget, Searcher};
//!
//! let rules = Arc::new(RuleSet::new(RuleSetConfig::square(3, 3)).unwrap());
//! let board = Board::new(Arc::clone(&rules));
//! let searcher = Searcher::new(rules, 16); // 16 MB transposition table
//!
//! let result = searcher.search(&board, Player(0), &SearchBudget::depth(4)).unwrap();
//! assert_eq!(result.coord.len(), 2);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::board::{Board, Player};
use crate::error::SearchError;
use crate::eval::{evaluate, evaluate_adjacency, evaluate_single, PatternScore};
use crate::rules::score::{adjacency_scores, margin};
use crate::rules::win::wins_at;
use crate::rules::{RuleSet, ScoringMode};

use super::{AtomicTT, EntryType, TTStats, ZobristTable};

/// Infinity for alpha-beta bounds.
const INF: i32 = PatternScore::WIN + 1;

/// Depth cap; also bounds win-score normalization.
const MAX_PLY: u8 = 64;

/// Minimum depth worth fanning root moves out to rayon.
const PARALLEL_MIN_DEPTH: u8 = 4;

/// How hard the search may work. At least one bound must be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget {
    max_depth: Option<u8>,
    time_limit: Option<Duration>,
}

impl SearchBudget {
    /// Bound by depth only.
    #[must_use]
    pub fn depth(max_depth: u8) -> Self {
        Self {
            max_depth: Some(max_depth),
            time_limit: None,
        }
    }

    /// Bound by wall-clock time only.
    #[must_use]
    pub fn time(limit: Duration) -> Self {
        Self {
            max_depth: None,
            time_limit: Some(limit),
        }
    }

    /// Bound by both, either, or neither (the last is rejected by
    /// [`Searcher::search`]).
    #[must_use]
    pub fn new(max_depth: Option<u8>, time_limit: Option<Duration>) -> Self {
        Self {
            max_depth,
            time_limit,
        }
    }
}

/// Search diagnostics for tuning.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Total beta cutoffs (fail-high).
    pub beta_cutoffs: u64,
    /// Beta cutoffs on the first move tried (move ordering quality).
    pub first_move_cutoffs: u64,
    /// Total transposition table probes.
    pub tt_probes: u64,
    /// Probes that returned a usable score.
    pub tt_score_hits: u64,
}

impl SearchStats {
    /// First-move cutoff rate in percent.
    #[must_use]
    pub fn first_move_rate(&self) -> f64 {
        if self.beta_cutoffs == 0 {
            0.0
        } else {
            self.first_move_cutoffs as f64 / self.beta_cutoffs as f64 * 100.0
        }
    }

    fn merge(&mut self, other: &SearchStats) {
        self.beta_cutoffs += other.beta_cutoffs;
        self.first_move_cutoffs += other.first_move_cutoffs;
        self.tt_probes += other.tt_probes;
        self.tt_score_hits += other.tt_score_hits;
    }
}

/// Outcome of one search request.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Chosen move.
    pub coord: Vec<usize>,
    /// Flat index of the chosen move.
    pub(crate) cell: usize,
    /// Value of the position after the chosen move, from the
    /// searching player's perspective.
    pub score: i32,
    /// Deepest fully completed depth (0 for the heuristic fallback).
    pub depth: u8,
    /// Nodes visited.
    pub nodes: u64,
    pub stats: SearchStats,
}

/// State shared with parallel root workers.
struct SharedState {
    zobrist: ZobristTable,
    tt: AtomicTT,
    /// Set when the time budget runs out; workers poll it.
    stopped: AtomicBool,
}

/// Per-invocation counters.
struct Ctx {
    nodes: u64,
    stats: SearchStats,
    deadline: Option<Instant>,
}

impl Ctx {
    fn new(deadline: Option<Instant>) -> Self {
        Self {
            nodes: 0,
            stats: SearchStats::default(),
            deadline,
        }
    }
}

struct RootChoice {
    cell: usize,
    score: i32,
}

/// Rebase a score for storage: win scores are ply-relative, so they
/// are stored relative to the entry's own node and a transposition
/// reached at a different ply reads the right win distance. Both maps
/// are monotone, so window bounds can be converted the same way.
#[inline]
fn score_to_tt(score: i32, ply: u8) -> i32 {
    if score > PatternScore::EVAL_CAP {
        score + i32::from(ply)
    } else if score < -PatternScore::EVAL_CAP {
        score - i32::from(ply)
    } else {
        score
    }
}

/// Inverse of [`score_to_tt`] at the probing node's ply.
#[inline]
fn score_from_tt(score: i32, ply: u8) -> i32 {
    if score > PatternScore::EVAL_CAP {
        score - i32::from(ply)
    } else if score < -PatternScore::EVAL_CAP {
        score + i32::from(ply)
    } else {
        score
    }
}

/// Move searcher for one rule set. Keeps its transposition table
/// across calls; clear it with [`clear_tt`](Self::clear_tt) on reset.
pub struct Searcher {
    rules: Arc<RuleSet>,
    shared: Arc<SharedState>,
    parallel: bool,
}

impl Searcher {
    /// Create a searcher with a transposition table of `tt_size_mb`
    /// megabytes. Parallel root search is enabled by default.
    #[must_use]
    pub fn new(rules: Arc<RuleSet>, tt_size_mb: usize) -> Self {
        let shared = Arc::new(SharedState {
            zobrist: ZobristTable::new(rules.cell_count(), rules.players()),
            tt: AtomicTT::new(tt_size_mb),
            stopped: AtomicBool::new(false),
        });
        Self {
            rules,
            shared,
            parallel: true,
        }
    }

    /// Toggle rayon fan-out over root moves.
    #[must_use]
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn clear_tt(&self) {
        self.shared.tt.clear();
    }

    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.shared.tt.stats()
    }

    /// Find the best move for `to_move` within `budget`.
    ///
    /// Runs iterative deepening from depth 1, keeping the result of
    /// the deepest completed depth. A budget too small to finish
    /// depth 1 degrades to a one-ply heuristic pick, so a legal move
    /// is always returned when one exists.
    pub fn search(
        &self,
        board: &Board,
        to_move: Player,
        budget: &SearchBudget,
    ) -> Result<SearchResult, SearchError> {
        if budget.max_depth.is_none() && budget.time_limit.is_none() {
            return Err(SearchError::InvalidBudget);
        }
        let roots: Vec<usize> = board.legal_cells().collect();
        if roots.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }

        self.shared.stopped.store(false, Ordering::Relaxed);
        let deadline = budget.time_limit.map(|limit| Instant::now() + limit);
        let cap = board.empty_count().min(usize::from(MAX_PLY)) as u8;
        let max_depth = budget.max_depth.unwrap_or(MAX_PLY).min(cap);

        let mut ctx = Ctx::new(deadline);
        let mut best: Option<(RootChoice, u8)> = None;

        for depth in 1..=max_depth {
            self.check_time(&ctx);
            if self.stopped() {
                break;
            }
            let choice = if self.rules.players() == 2 {
                self.root_negamax(board, to_move, depth, &roots, &mut ctx)
            } else {
                self.root_maxn(board, to_move, depth, &roots, &mut ctx)
            };
            let Some(choice) = choice else {
                // Depth aborted mid-search; its partial result is unusable.
                break;
            };
            tracing::debug!(
                depth,
                score = choice.score,
                nodes = ctx.nodes,
                "completed search depth"
            );
            // Only WinOnly scores can prove a forced result; adjacency
            // margins stay below the win range and never decide early.
            let decided = self.rules.scoring() == ScoringMode::WinOnly
                && choice.score.abs() >= PatternScore::WIN - i32::from(MAX_PLY);
            best = Some((choice, depth));
            if decided {
                break;
            }
        }

        Ok(match best {
            Some((choice, depth)) => self.finish(choice, depth, ctx),
            None => self.heuristic_choice(board, to_move, &roots, ctx),
        })
    }

    fn finish(&self, choice: RootChoice, depth: u8, ctx: Ctx) -> SearchResult {
        SearchResult {
            coord: self.rules.coord_of(choice.cell),
            cell: choice.cell,
            score: choice.score,
            depth,
            nodes: ctx.nodes,
            stats: ctx.stats,
        }
    }

    #[inline]
    fn stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::Relaxed)
    }

    /// Raise the stop flag once the deadline passes.
    #[inline]
    fn check_time(&self, ctx: &Ctx) {
        if let Some(deadline) = ctx.deadline {
            if Instant::now() >= deadline {
                self.shared.stopped.store(true, Ordering::Relaxed);
            }
        }
    }

    #[inline]
    fn early_win(&self) -> bool {
        // Adjacency games run to exhaustion; only WinOnly ends on a run.
        self.rules.scoring() == ScoringMode::WinOnly
    }

    /// Win found when entering `ply`; nearer wins score higher.
    #[inline]
    fn win_score(ply: u8) -> i32 {
        PatternScore::WIN - i32::from(ply)
    }

    /// Static value of a position from `player`'s perspective, capped
    /// at [`PatternScore::EVAL_CAP`] so it stays below the win range.
    fn static_value(&self, board: &Board, player: Player) -> i32 {
        let value = match self.rules.scoring() {
            ScoringMode::Adjacency => evaluate_adjacency(board, player),
            ScoringMode::WinOnly => {
                if self.rules.players() == 2 {
                    evaluate(board, player)
                } else {
                    evaluate_single(board, player)
                }
            }
        };
        value.clamp(-PatternScore::EVAL_CAP, PatternScore::EVAL_CAP)
    }

    /// Value of a just-filled board from `player`'s perspective.
    fn full_board_score(&self, board: &Board, player: Player) -> i32 {
        match self.rules.scoring() {
            ScoringMode::WinOnly => 0,
            ScoringMode::Adjacency => {
                let scores = adjacency_scores(board);
                margin(&scores, player)
                    .saturating_mul(PatternScore::POINT_FINAL)
                    .clamp(-PatternScore::EVAL_CAP, PatternScore::EVAL_CAP)
            }
        }
    }

    // ------------------------------------------------------------------
    // Two-player negamax
    // ------------------------------------------------------------------

    fn root_negamax(
        &self,
        board: &Board,
        player: Player,
        depth: u8,
        roots: &[usize],
        ctx: &mut Ctx,
    ) -> Option<RootChoice> {
        if self.parallel && depth >= PARALLEL_MIN_DEPTH && roots.len() > 1 {
            return self.root_negamax_parallel(board, player, depth, roots, ctx);
        }

        let mut work = board.clone();
        let hash = self.shared.zobrist.hash(&work, player);
        let mut best: Option<RootChoice> = None;
        for &cell in roots {
            let score = self.root_move_score(&mut work, cell, player, depth, hash, ctx)?;
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(RootChoice { cell, score });
            }
        }
        best
    }

    /// Every root move gets the full window so that subtree values
    /// are independent of evaluation order; that is what lets the
    /// parallel reduction agree with the serial scan.
    fn root_move_score(
        &self,
        board: &mut Board,
        cell: usize,
        player: Player,
        depth: u8,
        hash: u64,
        ctx: &mut Ctx,
    ) -> Option<i32> {
        board.place_unchecked(cell, player);
        let score = if self.early_win() && wins_at(board, cell, player) {
            Self::win_score(1)
        } else if board.is_full() {
            self.full_board_score(board, player)
        } else {
            let next = self.rules.player_after(player);
            let child = self.shared.zobrist.toggle(hash, cell, player, next);
            -self.negamax(board, next, depth - 1, 1, -INF, INF, child, ctx)
        };
        board.clear_cell(cell);
        if self.stopped() {
            None
        } else {
            Some(score)
        }
    }

    fn root_negamax_parallel(
        &self,
        board: &Board,
        player: Player,
        depth: u8,
        roots: &[usize],
        ctx: &mut Ctx,
    ) -> Option<RootChoice> {
        let hash = self.shared.zobrist.hash(board, player);
        let evals: Vec<(Option<i32>, u64, SearchStats)> = roots
            .par_iter()
            .map(|&cell| {
                let mut work = board.clone();
                let mut worker = Ctx::new(ctx.deadline);
                let score = self.root_move_score(&mut work, cell, player, depth, hash, &mut worker);
                (score, worker.nodes, worker.stats)
            })
            .collect();

        // Reduce in scan order with strict improvement, matching the
        // serial loop's tie-break.
        let mut best: Option<RootChoice> = None;
        let mut aborted = false;
        for (i, (score, nodes, stats)) in evals.into_iter().enumerate() {
            ctx.nodes += nodes;
            ctx.stats.merge(&stats);
            match score {
                None => aborted = true,
                Some(score) => {
                    if best.as_ref().map_or(true, |b| score > b.score) {
                        best = Some(RootChoice {
                            cell: roots[i],
                            score,
                        });
                    }
                }
            }
        }
        if aborted {
            return None;
        }
        best
    }

    #[allow(clippy::too_many_arguments)]
    fn negamax(
        &self,
        board: &mut Board,
        to_move: Player,
        depth: u8,
        ply: u8,
        mut alpha: i32,
        beta: i32,
        hash: u64,
        ctx: &mut Ctx,
    ) -> i32 {
        ctx.nodes += 1;
        if ctx.nodes & 1023 == 0 {
            self.check_time(ctx);
        }
        if self.stopped() {
            return 0;
        }

        ctx.stats.tt_probes += 1;
        if let Some(score) =
            self.shared
                .tt
                .probe(hash, depth, score_to_tt(alpha, ply), score_to_tt(beta, ply))
        {
            ctx.stats.tt_score_hits += 1;
            return score_from_tt(score, ply);
        }

        if depth == 0 {
            return self.static_value(board, to_move);
        }

        // Try the TT move first, then center-out, then scan order.
        let tt_move = self.shared.tt.get_best_move(hash);
        let mut moves: Vec<usize> = board.legal_cells().collect();
        moves.sort_by_key(|&c| (Some(c) != tt_move, self.rules.center_dist(c), c));

        let next = self.rules.player_after(to_move);
        let mut best_score = -INF;
        let mut best_move = None;
        let mut entry_type = EntryType::UpperBound;
        let mut first = true;

        for cell in moves {
            board.place_unchecked(cell, to_move);
            let score = if self.early_win() && wins_at(board, cell, to_move) {
                Self::win_score(ply + 1)
            } else if board.is_full() {
                self.full_board_score(board, to_move)
            } else {
                let child = self.shared.zobrist.toggle(hash, cell, to_move, next);
                -self.negamax(board, next, depth - 1, ply + 1, -beta, -alpha, child, ctx)
            };
            board.clear_cell(cell);
            if self.stopped() {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(cell);
            }
            if best_score >= beta {
                ctx.stats.beta_cutoffs += 1;
                if first {
                    ctx.stats.first_move_cutoffs += 1;
                }
                entry_type = EntryType::LowerBound;
                break;
            }
            if best_score > alpha {
                alpha = best_score;
                entry_type = EntryType::Exact;
            }
            first = false;
        }

        self.shared
            .tt
            .store(hash, depth, score_to_tt(best_score, ply), entry_type, best_move);
        best_score
    }

    // ------------------------------------------------------------------
    // Max-n for three or more players
    // ------------------------------------------------------------------

    fn root_maxn(
        &self,
        board: &Board,
        player: Player,
        depth: u8,
        roots: &[usize],
        ctx: &mut Ctx,
    ) -> Option<RootChoice> {
        let mut work = board.clone();
        let mut best: Option<RootChoice> = None;
        for &cell in roots {
            let score = self.maxn_move_value(&mut work, cell, player, depth, 0, ctx)[player.index()];
            if self.stopped() {
                return None;
            }
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(RootChoice { cell, score });
            }
        }
        best
    }

    /// Value vector after `to_move` plays `cell`, one component per
    /// player.
    fn maxn_move_value(
        &self,
        board: &mut Board,
        cell: usize,
        to_move: Player,
        depth: u8,
        ply: u8,
        ctx: &mut Ctx,
    ) -> Vec<i32> {
        board.place_unchecked(cell, to_move);
        let vector = if self.early_win() && wins_at(board, cell, to_move) {
            self.win_vector(to_move, ply + 1)
        } else if board.is_full() {
            self.final_vector(board)
        } else {
            self.maxn(board, self.rules.player_after(to_move), depth - 1, ply + 1, ctx)
        };
        board.clear_cell(cell);
        vector
    }

    fn maxn(
        &self,
        board: &mut Board,
        to_move: Player,
        depth: u8,
        ply: u8,
        ctx: &mut Ctx,
    ) -> Vec<i32> {
        ctx.nodes += 1;
        if ctx.nodes & 1023 == 0 {
            self.check_time(ctx);
        }
        if self.stopped() {
            return vec![0; usize::from(self.rules.players())];
        }

        if depth == 0 {
            return self.leaf_vector(board);
        }

        let mut moves: Vec<usize> = board.legal_cells().collect();
        moves.sort_by_key(|&c| (self.rules.center_dist(c), c));

        // Each player maximizes their own component; ties keep the
        // earliest candidate.
        let mut best: Option<Vec<i32>> = None;
        for cell in moves {
            let vector = self.maxn_move_value(board, cell, to_move, depth, ply, ctx);
            if self.stopped() {
                return vec![0; usize::from(self.rules.players())];
            }
            if best
                .as_ref()
                .map_or(true, |b| vector[to_move.index()] > b[to_move.index()])
            {
                best = Some(vector);
            }
        }
        match best {
            Some(v) => v,
            None => self.leaf_vector(board),
        }
    }

    fn win_vector(&self, winner: Player, ply: u8) -> Vec<i32> {
        let win = Self::win_score(ply);
        (0..self.rules.players())
            .map(|p| if Player(p) == winner { win } else { -win })
            .collect()
    }

    fn final_vector(&self, board: &Board) -> Vec<i32> {
        match self.rules.scoring() {
            ScoringMode::WinOnly => vec![0; usize::from(self.rules.players())],
            ScoringMode::Adjacency => {
                let scores = adjacency_scores(board);
                (0..self.rules.players())
                    .map(|p| {
                        margin(&scores, Player(p))
                            .saturating_mul(PatternScore::POINT_FINAL)
                            .clamp(-PatternScore::EVAL_CAP, PatternScore::EVAL_CAP)
                    })
                    .collect()
            }
        }
    }

    fn leaf_vector(&self, board: &Board) -> Vec<i32> {
        (0..self.rules.players())
            .map(|p| self.static_value(board, Player(p)))
            .collect()
    }

    // ------------------------------------------------------------------
    // Zero-budget fallback
    // ------------------------------------------------------------------

    /// One-ply static pick, used when the budget does not allow even
    /// a complete depth-1 search.
    fn heuristic_choice(
        &self,
        board: &Board,
        player: Player,
        roots: &[usize],
        mut ctx: Ctx,
    ) -> SearchResult {
        let mut work = board.clone();
        let mut best: Option<RootChoice> = None;
        for &cell in roots {
            ctx.nodes += 1;
            work.place_unchecked(cell, player);
            let score = if self.early_win() && wins_at(&work, cell, player) {
                Self::win_score(1)
            } else if work.is_full() {
                self.full_board_score(&work, player)
            } else {
                self.static_value(&work, player)
            };
            work.clear_cell(cell);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(RootChoice { cell, score });
            }
        }
        // roots is non-empty, so best is always set by the first pass.
        let choice = best.unwrap_or(RootChoice {
            cell: roots[0],
            score: 0,
        });
        self.finish(choice, 0, ctx)
    }
}
