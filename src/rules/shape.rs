//! Line-shape primitives shared by the rule engine, the evaluator and the solvers
//!
//! Every function here looks along one axis through a single cell. Functions
//! named `*_in_dir` expect `board` to already hold `color` at `pos`; callers
//! probe hypothetical moves on a by-value copy (`Board::with_stone`).
//!
//! Terminology used throughout the crate:
//! - **five point**: empty cell that completes five through `pos`
//!   (exactly five for black, five or more for white)
//! - **four**: a line with at least one five point
//! - **straight four**: run of exactly four with a five point at both ends
//! - **three point**: empty cell that turns the line into a straight four

use crate::board::{Board, Pos, Stone};

/// Direction vectors for line checking (4 axes)
pub const DIRECTIONS: [(i32, i32); 4] = [
    (0, 1),  // Horizontal
    (1, 0),  // Vertical
    (1, 1),  // Diagonal SE
    (1, -1), // Diagonal SW
];

/// Same-colored stones strictly beyond `pos` in one direction.
#[inline]
fn count_side(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> u32 {
    let mut n = 0;
    let mut k = 1;
    while let Some(p) = pos.offset(dr, dc, k) {
        if board.get(p) != color {
            break;
        }
        n += 1;
        k += 1;
    }
    n
}

/// Length of the contiguous `color` run through `pos` along one axis,
/// counting `pos` itself whatever it currently holds.
#[inline]
pub fn run_length(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> u32 {
    1 + count_side(board, pos, color, dr, dc) + count_side(board, pos, color, -dr, -dc)
}

/// Whether a run of `len` stones is a winning five for `color`.
#[inline]
pub fn is_five_length(len: u32, color: Stone) -> bool {
    match color {
        Stone::Black => len == 5,
        _ => len >= 5,
    }
}

/// Whether `color` at `pos` completes five along any axis.
#[inline]
pub fn makes_five(board: &Board, pos: Pos, color: Stone) -> bool {
    DIRECTIONS
        .iter()
        .any(|&(dr, dc)| is_five_length(run_length(board, pos, color, dr, dc), color))
}

/// Whether `color` at `pos` produces a run of six or more.
#[inline]
pub fn makes_overline(board: &Board, pos: Pos, color: Stone) -> bool {
    DIRECTIONS
        .iter()
        .any(|&(dr, dc)| run_length(board, pos, color, dr, dc) >= 6)
}

/// The first non-`color` cell past the run on one side, if on the board.
#[inline]
fn run_end(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> Option<Pos> {
    let mut k = 1;
    loop {
        let p = pos.offset(dr, dc, k)?;
        if board.get(p) != color {
            return Some(p);
        }
        k += 1;
    }
}

/// Five points through `pos` along one axis, one slot per side.
///
/// A five point must touch the run through `pos`, so there are at most two.
pub fn five_points_in_dir(
    board: &Board,
    pos: Pos,
    color: Stone,
    dr: i32,
    dc: i32,
) -> [Option<Pos>; 2] {
    let mut points = [None, None];
    for (slot, sign) in [1, -1].into_iter().enumerate() {
        if let Some(end) = run_end(board, pos, color, dr * sign, dc * sign) {
            if board.is_empty(end)
                && is_five_length(run_length(board, end, color, dr, dc), color)
            {
                points[slot] = Some(end);
            }
        }
    }
    points
}

/// Number of distinct fours through `pos` along one axis (0, 1 or 2).
///
/// Two five points around a run of four are one straight four. Two five
/// points around a shorter run (`X_XXX_X`) are two fours in the same line.
pub fn four_count_in_dir(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> u32 {
    match five_points_in_dir(board, pos, color, dr, dc) {
        [Some(_), Some(_)] => {
            if run_length(board, pos, color, dr, dc) == 4 {
                1
            } else {
                2
            }
        }
        [Some(_), None] | [None, Some(_)] => 1,
        [None, None] => 0,
    }
}

/// Whether the line through `pos` is a straight (open) four.
pub fn is_straight_four_in_dir(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> bool {
    matches!(five_points_in_dir(board, pos, color, dr, dc), [Some(_), Some(_)])
        && run_length(board, pos, color, dr, dc) == 4
}

/// Three points through `pos` along one axis.
///
/// Each returned cell extends the run through `pos` into a straight four.
/// The cells are not checked for forbidden status; the caller decides.
pub fn three_points_in_dir(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> Vec<Pos> {
    let base = run_length(board, pos, color, dr, dc);
    let mut points = Vec::new();
    for sign in [1, -1] {
        for k in 1..=4 {
            let Some(c) = pos.offset(dr * sign, dc * sign, k) else {
                break;
            };
            match board.get(c) {
                Stone::Empty => {
                    let probe = board.with_stone(c, color);
                    if run_length(&probe, pos, color, dr, dc) > base
                        && is_straight_four_in_dir(&probe, pos, color, dr, dc)
                    {
                        points.push(c);
                    }
                }
                s if s == color => {}
                _ => break,
            }
        }
    }
    points
}

/// Same-colored stones within four cells of `pos` along one axis, stopping
/// at opponent stones and the edge. Cheap pre-filter for three/four probes.
pub fn stones_in_window(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> u32 {
    let mut n = 0;
    for sign in [1, -1] {
        for k in 1..=4 {
            let Some(c) = pos.offset(dr * sign, dc * sign, k) else {
                break;
            };
            match board.get(c) {
                s if s == color => n += 1,
                Stone::Empty => {}
                _ => break,
            }
        }
    }
    n
}
