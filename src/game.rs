//! Game controller
//!
//! Owns the live board, the move history and the searcher, and is the
//! only component that mutates game state. Every move goes through
//! validate-then-apply: a rejected move leaves board, history and
//! turn order untouched.
//!
//! # Example
//!
//! ```
//! use kinarow::{GameController, GameStatus, Player, RuleSetConfig};
//!
//! let mut game = GameController::new(RuleSetConfig::square(3, 3)).unwrap();
//! let outcome = game.apply_move(Player(0), &[1, 1]).unwrap();
//! assert_eq!(outcome.status, GameStatus::InProgress);
//! assert_eq!(game.to_move(), Player(1));
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::board::{Board, Cell, Player};
use crate::error::{ConfigError, HistoryError, MoveError, SearchError};
use crate::history::{Move, MoveHistory};
use crate::rules::score::{adjacency_scores, leader};
use crate::rules::win::wins_at;
use crate::rules::{RuleSet, RuleSetConfig, ScoringMode};
use crate::search::{SearchBudget, Searcher};

/// Default transposition table size in megabytes.
const DEFAULT_TT_MB: usize = 16;

/// Terminal status of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameStatus {
    InProgress,
    Won(Player),
    Draw,
}

/// What one accepted move did to the game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    pub mov: Move,
    /// The move's coordinate, for callers that track positions.
    pub coord: Vec<usize>,
    pub status: GameStatus,
    /// Final adjacency totals, present only when an adjacency game
    /// just ended.
    pub scores: Option<Vec<u32>>,
}

/// Read-only snapshot for front-ends and session trackers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStateView {
    pub dimensions: Vec<usize>,
    /// Cells in row-major order.
    pub cells: Vec<Cell>,
    pub to_move: Player,
    pub status: GameStatus,
    /// Number of applied moves.
    pub move_number: u32,
}

/// Orchestrates one game: turn order, move validation, terminal
/// evaluation, history and the computer opponent.
pub struct GameController {
    rules: Arc<RuleSet>,
    board: Board,
    history: MoveHistory,
    searcher: Searcher,
    to_move: Player,
    status: GameStatus,
    next_seq: u32,
}

impl GameController {
    /// Start a new game. Fails if the configuration violates any
    /// rule set invariant.
    pub fn new(config: RuleSetConfig) -> Result<Self, ConfigError> {
        let rules = Arc::new(RuleSet::new(config)?);
        let board = Board::new(Arc::clone(&rules));
        let searcher = Searcher::new(Arc::clone(&rules), DEFAULT_TT_MB);
        Ok(Self {
            rules,
            board,
            history: MoveHistory::new(),
            searcher,
            to_move: Player(0),
            status: GameStatus::InProgress,
            next_seq: 0,
        })
    }

    #[must_use]
    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    #[must_use]
    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Playable coordinates in row-major scan order.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<Vec<usize>> {
        self.board
            .legal_cells()
            .map(|c| self.rules.coord_of(c))
            .collect()
    }

    /// Snapshot of the visible game state.
    #[must_use]
    pub fn current_state(&self) -> GameStateView {
        GameStateView {
            dimensions: self.rules.dims().to_vec(),
            cells: self.board.cells().to_vec(),
            to_move: self.to_move,
            status: self.status,
            move_number: self.history.len() as u32,
        }
    }

    /// Apply a move for `player` at `coord`.
    ///
    /// Validation order: game over, turn, bounds, then cell state.
    /// Nothing changes when any check fails.
    #[instrument(skip(self), fields(player = player.0, seq = self.next_seq))]
    pub fn apply_move(
        &mut self,
        player: Player,
        coord: &[usize],
    ) -> Result<TurnOutcome, MoveError> {
        if self.status != GameStatus::InProgress {
            return Err(MoveError::GameAlreadyOver);
        }
        if player != self.to_move {
            return Err(MoveError::NotYourTurn);
        }
        let cell = self.rules.index_of(coord)?;
        self.board.place_idx(cell, player)?;
        Ok(self.commit(cell))
    }

    /// Let the searcher pick and apply a move for the player to move.
    ///
    /// A finished game has no legal moves left to request.
    #[instrument(skip(self, budget), fields(player = self.to_move.0))]
    pub fn request_ai_move(&mut self, budget: &SearchBudget) -> Result<TurnOutcome, SearchError> {
        if self.status != GameStatus::InProgress {
            return Err(SearchError::NoLegalMoves);
        }
        let result = self
            .searcher
            .search(&self.board, self.to_move, budget)?;
        tracing::debug!(
            coord = ?result.coord,
            score = result.score,
            depth = result.depth,
            nodes = result.nodes,
            "search chose move"
        );
        self.board.place_unchecked(result.cell, self.to_move);
        Ok(self.commit(result.cell))
    }

    /// Revert the latest move. Allowed from a terminal state; doing
    /// so reopens the game for the player whose move is reverted.
    #[instrument(skip(self))]
    pub fn undo(&mut self) -> Result<(), HistoryError> {
        let mv = self.history.undo()?;
        self.board.clear_cell(mv.cell);
        self.status = GameStatus::InProgress;
        self.to_move = mv.player;
        Ok(())
    }

    /// Reapply the most recently undone move, re-evaluating terminal
    /// status exactly as the original application did.
    #[instrument(skip(self))]
    pub fn redo(&mut self) -> Result<(), HistoryError> {
        let mv = self.history.redo()?;
        self.board.place_unchecked(mv.cell, mv.player);
        let status = self.evaluate_after(mv.cell, mv.player);
        self.status = status;
        if status == GameStatus::InProgress {
            self.to_move = self.rules.player_after(mv.player);
        } else {
            self.to_move = mv.player;
        }
        Ok(())
    }

    /// Clear the searcher's transposition table.
    pub fn reset_search_cache(&self) {
        self.searcher.clear_tt();
    }

    /// Record an already-placed move, evaluate terminal status and
    /// advance the turn. Shared by human and AI paths.
    fn commit(&mut self, cell: usize) -> TurnOutcome {
        let player = self.to_move;
        let seq = self.next_seq;
        self.next_seq += 1;

        let mv = Move { player, cell, seq };
        self.history.record(mv);

        let status = self.evaluate_after(cell, player);
        self.status = status;
        let scores = match (self.rules.scoring(), status) {
            (ScoringMode::Adjacency, GameStatus::Won(_) | GameStatus::Draw) => {
                Some(adjacency_scores(&self.board))
            }
            _ => None,
        };
        if status == GameStatus::InProgress {
            self.to_move = self.rules.player_after(player);
        }

        TurnOutcome {
            mov: mv,
            coord: self.rules.coord_of(cell),
            status,
            scores,
        }
    }

    /// Terminal evaluation after `player` played `cell`.
    fn evaluate_after(&self, cell: usize, player: Player) -> GameStatus {
        match self.rules.scoring() {
            ScoringMode::WinOnly => {
                if wins_at(&self.board, cell, player) {
                    GameStatus::Won(player)
                } else if self.board.is_full() {
                    GameStatus::Draw
                } else {
                    GameStatus::InProgress
                }
            }
            ScoringMode::Adjacency => {
                if self.board.is_full() {
                    match leader(&adjacency_scores(&self.board)) {
                        Some(winner) => GameStatus::Won(winner),
                        None => GameStatus::Draw,
                    }
                } else {
                    GameStatus::InProgress
                }
            }
        }
    }
}
