//! Validated move list (game record)
//!
//! [`GameRecord`] is the mutation boundary for real game moves: every move is
//! checked for range, occupancy, turn order and Renju legality before it reaches
//! the board. Search code never goes through here; it only plays moves produced
//! by the move generator, which are legal by construction.

use crate::error::MoveError;
use crate::rules::{check_forbidden_move, check_win};

use super::{Board, Pos, Stone};

/// Ordered sequence of moves plus the board they produce.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameRecord {
    moves: Vec<(Pos, Stone)>,
    board: Board,
    winner: Option<Stone>,
}

impl GameRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay a move list through the same checks as [`push`](Self::push).
    pub fn from_moves(moves: &[(Pos, Stone)]) -> Result<Self, MoveError> {
        let mut record = Self::new();
        for &(pos, stone) in moves {
            record.push(i32::from(pos.row), i32::from(pos.col), stone)?;
        }
        Ok(record)
    }

    /// Color expected to move next (black moves first).
    pub fn side_to_move(&self) -> Stone {
        if self.moves.len() % 2 == 0 {
            Stone::Black
        } else {
            Stone::White
        }
    }

    /// Validate and apply one move. The record is unchanged on error.
    pub fn push(&mut self, row: i32, col: i32, stone: Stone) -> Result<Pos, MoveError> {
        if self.winner.is_some() {
            return Err(MoveError::GameOver);
        }
        if stone == Stone::Empty {
            return Err(MoveError::EmptyStone);
        }
        let pos = Pos::try_new(row, col).ok_or(MoveError::OutOfBounds { row, col })?;
        if !self.board.is_empty(pos) {
            return Err(MoveError::Occupied(pos));
        }
        let expected = self.side_to_move();
        if stone != expected {
            return Err(MoveError::WrongTurn { expected, got: stone });
        }
        if stone == Stone::Black {
            let forbidden = check_forbidden_move(&self.board, row, col);
            if let Some(kind) = forbidden.kind {
                return Err(MoveError::Forbidden { pos, kind });
            }
        }

        self.board.place_stone(pos, stone);
        self.moves.push((pos, stone));
        if check_win(&self.board, pos, stone) {
            self.winner = Some(stone);
        }
        Ok(pos)
    }

    /// Take back the last move.
    pub fn pop(&mut self) -> Option<(Pos, Stone)> {
        let last = self.moves.pop()?;
        self.board.remove_stone(last.0);
        self.winner = None;
        Some(last)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn moves(&self) -> &[(Pos, Stone)] {
        &self.moves
    }

    pub fn last_move(&self) -> Option<(Pos, Stone)> {
        self.moves.last().copied()
    }

    /// Winner, once a move has completed five.
    pub fn winner(&self) -> Option<Stone> {
        self.winner
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}
