//! Board structure with in-place apply/undo

use super::bitboard::{Bitboard, BitboardIter};
use super::{Pos, Stone, BOARD_SIZE, TOTAL_CELLS};

/// Game board as a pair of stone sets.
///
/// The board is small enough (64 bytes) to copy by value, which is how the
/// rule probes obtain a scratch board. The search itself mutates one board in
/// place with `place_stone` / `remove_stone` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    /// Black stones bitboard
    pub black: Bitboard,
    /// White stones bitboard
    pub white: Bitboard,
}

impl Board {
    pub fn new() -> Self {
        Self {
            black: Bitboard::new(),
            white: Bitboard::new(),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        BOARD_SIZE
    }

    /// Get stone at position
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        if self.black.get(pos) {
            Stone::Black
        } else if self.white.get(pos) {
            Stone::White
        } else {
            Stone::Empty
        }
    }

    /// Check if position is empty
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        !self.black.get(pos) && !self.white.get(pos)
    }

    /// Place a stone without any legality check.
    /// Use [`GameRecord::push`](super::GameRecord::push) for validated game moves.
    #[inline]
    pub fn place_stone(&mut self, pos: Pos, stone: Stone) {
        match stone {
            Stone::Black => self.black.set(pos),
            Stone::White => self.white.set(pos),
            Stone::Empty => {}
        }
    }

    /// Remove a stone
    #[inline]
    pub fn remove_stone(&mut self, pos: Pos) {
        self.black.clear(pos);
        self.white.clear(pos);
    }

    /// Copy of this board with one extra stone, used by rule probes.
    #[inline]
    pub fn with_stone(&self, pos: Pos, stone: Stone) -> Board {
        let mut next = *self;
        next.place_stone(pos, stone);
        next
    }

    /// Get bitboard for a color (returns None for Empty)
    #[inline]
    pub fn stones(&self, stone: Stone) -> Option<&Bitboard> {
        match stone {
            Stone::Black => Some(&self.black),
            Stone::White => Some(&self.white),
            Stone::Empty => None,
        }
    }

    /// Iterate over the stones of one color in index order.
    pub fn stones_of(&self, stone: Stone) -> BitboardIter {
        let bits = self.stones(stone).copied().unwrap_or_default();
        bits.iter_ones()
    }

    /// Occupied cells of either color.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.black.union(&self.white)
    }

    /// Total stones on board
    #[inline]
    pub fn stone_count(&self) -> u32 {
        self.black.count() + self.white.count()
    }

    /// Check if board is empty
    #[inline]
    pub fn is_board_empty(&self) -> bool {
        self.black.is_empty() && self.white.is_empty()
    }

    /// Check if every cell is occupied
    #[inline]
    pub fn is_full(&self) -> bool {
        self.stone_count() as usize == TOTAL_CELLS
    }

    /// Build a board from a text diagram: `X` black, `O` white, anything else empty.
    ///
    /// Rows are separated by newlines; leading whitespace is ignored. Missing rows
    /// and columns are empty. Intended for tests and fixtures.
    pub fn from_diagram(diagram: &str) -> Board {
        let mut board = Board::new();
        for (r, line) in diagram.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
            for (c, ch) in line.chars().filter(|ch| !ch.is_whitespace()).enumerate() {
                if let Some(pos) = Pos::try_new(r as i32, c as i32) {
                    match ch {
                        'X' | 'x' | 'B' => board.place_stone(pos, Stone::Black),
                        'O' | 'o' | 'W' => board.place_stone(pos, Stone::White),
                        _ => {}
                    }
                }
            }
        }
        board
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let ch = match self.get(Pos::new(row as u8, col as u8)) {
                    Stone::Black => 'X',
                    Stone::White => 'O',
                    Stone::Empty => '.',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
