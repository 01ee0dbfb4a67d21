//! Position evaluation
//!
//! `patterns` scores individual runs; `heuristic` aggregates them into an
//! incrementally cached full-board evaluation plus the capture and locality
//! components used by search.

pub mod heuristic;
pub mod patterns;

pub use heuristic::{capture_heuristic, heuristic, past_heuristic, ScoreCache};
pub use patterns::FIVE_SCORE;
