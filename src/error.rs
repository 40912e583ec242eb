//! Typed errors at the crate boundary.
//!
//! Only the board-mutation boundary and configuration loading can fail.
//! Search budget exhaustion is reported through
//! [`SearchOutput::interrupted`](crate::engine::SearchOutput) and is not an error.

use thiserror::Error;

use crate::board::{Pos, Stone};
use crate::rules::ForbiddenKind;

/// Rejection of a move at the game-record boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("coordinates ({row}, {col}) are outside the 15x15 board")]
    OutOfBounds { row: i32, col: i32 },

    #[error("cell {0} is already occupied")]
    Occupied(Pos),

    #[error("it is {expected:?}'s turn, got a {got:?} move")]
    WrongTurn { expected: Stone, got: Stone },

    #[error("cannot place an empty stone")]
    EmptyStone,

    #[error("{kind} is forbidden for black at {pos}")]
    Forbidden { pos: Pos, kind: ForbiddenKind },

    #[error("the game is already over")]
    GameOver,
}

/// Failure to load engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}
