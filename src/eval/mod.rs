//! Static evaluation of board positions

mod heuristic;
mod patterns;

pub use heuristic::{evaluate, evaluate_adjacency, evaluate_single};
pub use patterns::{run_weight, PatternScore};
