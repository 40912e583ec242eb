//! Evaluation module for Renju positions
//!
//! This module provides pattern recognition and scoring for board positions.
//! The evaluation considers:
//! - Line patterns (twos, threes, fours, fives and their jump forms)
//! - Connectivity and four-three opportunities
//! - Defensive weighting for move ordering
//! - Positional bonuses (center control)

pub mod heuristic;
pub mod patterns;

pub use heuristic::{evaluate_board, evaluate_position, evaluate_stone_patterns, has_four_three, is_four_three};
pub use patterns::{EvalOptions, PatternKind, PatternScores};
