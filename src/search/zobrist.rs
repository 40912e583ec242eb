//! Zobrist hashing for position identification
//!
//! Zobrist hashing allows O(1) incremental hash updates when placing/removing stones.
//! This is essential for efficient transposition table lookups during search.
//!
//! The key table is built once per process from a fixed seed, so hashes are
//! stable across runs.
//!
//! # Example
//!
//! ```
//! use renju::board::{Board, Stone, Pos};
//! use renju::search::zobrist::{compute_board_hash, update_hash};
//!
//! let mut board = Board::new();
//! let hash1 = compute_board_hash(&board);
//!
//! // Place a stone and recompute
//! board.place_stone(Pos::new(7, 7), Stone::Black);
//! let hash2 = compute_board_hash(&board);
//!
//! // Incremental update is equivalent to full recomputation
//! assert_eq!(update_hash(hash1, 7, 7, Stone::Black), hash2);
//! ```

use once_cell::sync::Lazy;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::board::{Board, Pos, Stone, TOTAL_CELLS};

const ZOBRIST_SEED: u64 = 0x1234_5678_9ABC_DEF0;

static ZOBRIST: Lazy<ZobristTable> = Lazy::new(ZobristTable::new);

/// Zobrist hash table for position hashing.
///
/// Holds one random key per (cell, color) plus one key per side to move.
pub struct ZobristTable {
    /// Keys indexed by `[color index][cell index]`
    stones: [[u64; TOTAL_CELLS]; 2],
    side: [u64; 2],
}

impl ZobristTable {
    fn new() -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(ZOBRIST_SEED);
        let mut stones = [[0u64; TOTAL_CELLS]; 2];
        for i in 0..TOTAL_CELLS {
            stones[0][i] = rng.next_u64();
            stones[1][i] = rng.next_u64();
        }
        let side = [rng.next_u64(), rng.next_u64()];
        Self { stones, side }
    }

    /// The process-wide table.
    #[inline]
    pub fn global() -> &'static ZobristTable {
        &ZOBRIST
    }

    /// Key of a `stone` at `pos`; 0 for `Stone::Empty`.
    #[inline]
    #[must_use]
    pub fn key(&self, pos: Pos, stone: Stone) -> u64 {
        match stone {
            Stone::Empty => 0,
            s => self.stones[s.index()][pos.to_index()],
        }
    }

    /// Side-to-move key. The search XORs it into its table key so that the
    /// board hash stays a function of the stones alone.
    #[inline]
    #[must_use]
    pub fn side_key(&self, color: Stone) -> u64 {
        match color {
            Stone::Empty => 0,
            s => self.side[s.index()],
        }
    }

    /// Full hash of a board: XOR of the keys of every stone.
    #[must_use]
    pub fn hash(&self, board: &Board) -> u64 {
        let mut h = 0u64;
        for pos in board.black.iter_ones() {
            h ^= self.stones[0][pos.to_index()];
        }
        for pos in board.white.iter_ones() {
            h ^= self.stones[1][pos.to_index()];
        }
        h
    }
}

/// Hash of the stone set on `board`. The empty board hashes to 0.
#[inline]
pub fn compute_board_hash(board: &Board) -> u64 {
    ZOBRIST.hash(board)
}

/// Toggle a `color` stone at `(row, col)` in `hash`.
///
/// XOR is its own inverse, so the same call both places and removes.
/// Off-board coordinates and `Stone::Empty` leave the hash unchanged.
#[inline]
pub fn update_hash(hash: u64, row: i32, col: i32, color: Stone) -> u64 {
    match Pos::try_new(row, col) {
        Some(pos) => hash ^ ZOBRIST.key(pos, color),
        None => hash,
    }
}

/// [`update_hash`] for a known-valid position.
#[inline]
pub fn toggle_stone(hash: u64, pos: Pos, color: Stone) -> u64 {
    hash ^ ZOBRIST.key(pos, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zobrist_empty_board() {
        assert_eq!(compute_board_hash(&Board::new()), 0);
    }

    #[test]
    fn test_zobrist_deterministic() {
        let a = ZobristTable::new();
        let b = ZobristTable::new();
        let pos = Pos::new(3, 11);
        assert_eq!(a.key(pos, Stone::Black), b.key(pos, Stone::Black));
        assert_eq!(a.key(pos, Stone::Black), ZobristTable::global().key(pos, Stone::Black));
    }

    #[test]
    fn test_zobrist_incremental() {
        let mut board = Board::new();
        let h0 = compute_board_hash(&board);
        board.place_stone(Pos::new(7, 7), Stone::Black);
        board.place_stone(Pos::new(7, 8), Stone::White);
        let h = update_hash(update_hash(h0, 7, 7, Stone::Black), 7, 8, Stone::White);
        assert_eq!(h, compute_board_hash(&board));
    }

    #[test]
    fn test_zobrist_colors_differ() {
        let pos = Pos::new(7, 7);
        let zt = ZobristTable::global();
        assert_ne!(zt.key(pos, Stone::Black), zt.key(pos, Stone::White));
        assert_ne!(zt.side_key(Stone::Black), zt.side_key(Stone::White));
        assert_eq!(zt.key(pos, Stone::Empty), 0);
    }

    #[test]
    fn test_zobrist_off_board_is_noop() {
        assert_eq!(update_hash(42, -1, 3, Stone::Black), 42);
        assert_eq!(update_hash(42, 3, 15, Stone::White), 42);
    }

    #[test]
    fn test_zobrist_nearby_positions_differ() {
        let mut a = Board::new();
        let mut b = Board::new();
        a.place_stone(Pos::new(9, 9), Stone::Black);
        b.place_stone(Pos::new(9, 10), Stone::Black);
        assert_ne!(compute_board_hash(&a), compute_board_hash(&b));
    }

    fn placements() -> impl Strategy<Value = Vec<(u8, bool)>> {
        proptest::collection::btree_map(0u8..225, any::<bool>(), 0..40)
            .prop_map(|m| m.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_hash_order_independent(cells in placements(), seed in any::<u64>()) {
            let color = |black: bool| if black { Stone::Black } else { Stone::White };

            let mut forward = Board::new();
            for &(i, black) in &cells {
                forward.place_stone(Pos::from_index(i as usize), color(black));
            }

            // Deterministic shuffle driven by the seed
            let mut shuffled = cells.clone();
            let mut s = seed;
            for i in (1..shuffled.len()).rev() {
                s = s.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                let j = (s >> 33) as usize % (i + 1);
                shuffled.swap(i, j);
            }
            let mut hash = 0u64;
            for &(i, black) in &shuffled {
                let pos = Pos::from_index(i as usize);
                hash = update_hash(hash, i32::from(pos.row), i32::from(pos.col), color(black));
            }
            prop_assert_eq!(hash, compute_board_hash(&forward));
        }

        #[test]
        fn prop_update_is_self_inverse(h in any::<u64>(), row in 0i32..15, col in 0i32..15, black in any::<bool>()) {
            let stone = if black { Stone::Black } else { Stone::White };
            prop_assert_eq!(update_hash(update_hash(h, row, col, stone), row, col, stone), h);
        }
    }
}
