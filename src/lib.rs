//! Generalized k-in-a-row rules engine with a search-based opponent.
//!
//! One crate covers the whole game core: an N-dimensional board with
//! obstacles, win detection and adjacency scoring, undo/redo history,
//! and an iterative-deepening alpha-beta searcher with a lock-free
//! transposition table. The [`GameController`] ties it together
//! behind a small API (`apply_move`, `request_ai_move`, `undo`,
//! `redo`, `legal_moves`, `current_state`) that any front-end or
//! session tracker can drive.
//!
//! The crate emits `tracing` events but never installs a subscriber;
//! embedders choose their own.
//!
//! # Example
//!
//! ```
//! use kinarow::{GameController, GameStatus, Player, RuleSetConfig, SearchBudget};
//!
//! let mut game = GameController::new(RuleSetConfig::square(3, 3)).unwrap();
//! game.apply_move(Player(0), &[0, 0]).unwrap();
//!
//! // Let the engine answer.
//! let reply = game.request_ai_move(&SearchBudget::depth(9)).unwrap();
//! assert_eq!(reply.status, GameStatus::InProgress);
//! ```

pub mod board;
pub mod error;
pub mod eval;
pub mod game;
pub mod history;
pub mod rules;
pub mod search;

pub use board::{Board, Cell, Player};
pub use error::{ConfigError, HistoryError, MoveError, SearchError};
pub use game::{GameController, GameStateView, GameStatus, TurnOutcome};
pub use history::{Move, MoveHistory};
pub use rules::{RuleSet, RuleSetConfig, ScoringMode};
pub use search::{SearchBudget, SearchResult, SearchStats, Searcher};
