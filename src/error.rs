//! Error types
//!
//! One enum per operation family. Every error is recoverable and a
//! rejected operation leaves game state untouched.

/// Errors from attempting a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("coordinate out of bounds")]
    OutOfBounds,

    #[error("cell already occupied")]
    CellOccupied,

    #[error("cell is an obstacle")]
    ObstacleCell,

    #[error("not this player's turn")]
    NotYourTurn,

    #[error("game is already over")]
    GameAlreadyOver,
}

/// Errors from undo/redo.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("no move to undo")]
    NothingToUndo,

    #[error("no move to redo")]
    NothingToRedo,
}

/// Errors from a search request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("no legal moves available")]
    NoLegalMoves,

    #[error("search budget has neither a depth nor a time limit")]
    InvalidBudget,
}

/// Errors from building a rule set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid rule set: {0}")]
    InvalidRuleSet(String),
}
