//! Game rules for Renju
//!
//! This module implements the rule set:
//! - Win conditions (exact five for black, five or more for white)
//! - Forbidden moves for black (overline, double-four, double-three)
//! - Line-shape primitives and board-level threat scans

pub mod forbidden;
pub mod shape;
pub mod threats;
pub mod win;

// Re-exports for convenient access
pub use forbidden::{
    check_forbidden_move, count_open_threes, forbidden_kind, is_double_four, is_double_three,
    is_valid_move, ForbiddenKind, ForbiddenMoveResult,
};
pub use shape::{makes_five, run_length, DIRECTIONS};
pub use threats::{
    creates_four, creates_open_three, find_five_moves, find_four_moves,
    find_straight_four_moves, has_open_three, is_legal_for, open_three_breaks, threat_defenses,
};
pub use win::{check_win, check_winner, find_five_positions, has_five_in_row};
