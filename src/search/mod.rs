//! Adversarial search
//!
//! Negamax with alpha-beta pruning, iterative deepening and a shared
//! lock-free transposition table for two-player games; a
//! max-own-score vector search for three or more players.

mod alphabeta;
mod tt;
mod zobrist;

pub use alphabeta::{SearchBudget, SearchResult, SearchStats, Searcher};
pub use tt::{AtomicTT, EntryType, TTStats};
pub use zobrist::ZobristTable;
