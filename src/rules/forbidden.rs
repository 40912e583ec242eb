//! Renju forbidden moves for black
//!
//! Black may not play a move that creates:
//! - an **overline**: six or more stones in a row
//! - a **double-four**: two or more fours at once
//! - a **double-three**: two or more real open threes at once
//!
//! A move that completes exactly five is never forbidden, whatever else it
//! creates. When several shapes apply, the reported kind follows the order
//! overline > double-four > double-three. White is never restricted.
//!
//! An open three only counts if it can really become a straight four: the cell
//! that would make the straight four must itself be legal for black. That check
//! recurses one ply per candidate three, down to [`MAX_THREE_RECURSION`].

use serde::{Deserialize, Serialize};

use crate::board::{Board, Pos, Stone};

use super::shape::{
    four_count_in_dir, run_length, stones_in_window, three_points_in_dir, DIRECTIONS,
};

/// Nesting limit for the "is the three's completion cell legal" recursion.
/// Beyond it, open threes are taken at face value.
pub const MAX_THREE_RECURSION: u8 = 4;

/// Shape that makes a black move illegal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForbiddenKind {
    DoubleThree,
    DoubleFour,
    Overline,
}

impl ForbiddenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ForbiddenKind::DoubleThree => "double-three",
            ForbiddenKind::DoubleFour => "double-four",
            ForbiddenKind::Overline => "overline",
        }
    }
}

impl std::fmt::Display for ForbiddenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`check_forbidden_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForbiddenMoveResult {
    pub is_forbidden: bool,
    pub kind: Option<ForbiddenKind>,
}

impl ForbiddenMoveResult {
    pub const ALLOWED: ForbiddenMoveResult = ForbiddenMoveResult {
        is_forbidden: false,
        kind: None,
    };
}

impl From<Option<ForbiddenKind>> for ForbiddenMoveResult {
    fn from(kind: Option<ForbiddenKind>) -> Self {
        Self {
            is_forbidden: kind.is_some(),
            kind,
        }
    }
}

/// Classify a black move at `(row, col)`.
///
/// Off-board and occupied cells are reported as not forbidden; rejecting them
/// is the job of the move boundary. The caller's board is never modified.
pub fn check_forbidden_move(board: &Board, row: i32, col: i32) -> ForbiddenMoveResult {
    match Pos::try_new(row, col) {
        Some(pos) if board.is_empty(pos) => forbidden_kind(board, pos).into(),
        _ => ForbiddenMoveResult::ALLOWED,
    }
}

/// Forbidden shape a black stone at the empty cell `pos` would create.
#[inline]
pub fn forbidden_kind(board: &Board, pos: Pos) -> Option<ForbiddenKind> {
    classify(board, pos, 0)
}

fn classify(board: &Board, pos: Pos, depth: u8) -> Option<ForbiddenKind> {
    let probe = board.with_stone(pos, Stone::Black);

    // Five overrides everything, so scan all axes before reporting an overline
    let mut overline = false;
    for &(dr, dc) in &DIRECTIONS {
        match run_length(&probe, pos, Stone::Black, dr, dc) {
            5 => return None,
            n if n >= 6 => overline = true,
            _ => {}
        }
    }
    if overline {
        return Some(ForbiddenKind::Overline);
    }

    let mut fours = 0;
    let mut has_four = [false; 4];
    for (i, &(dr, dc)) in DIRECTIONS.iter().enumerate() {
        if stones_in_window(&probe, pos, Stone::Black, dr, dc) < 3 {
            continue;
        }
        let n = four_count_in_dir(&probe, pos, Stone::Black, dr, dc);
        has_four[i] = n > 0;
        fours += n;
    }
    if fours >= 2 {
        return Some(ForbiddenKind::DoubleFour);
    }

    // A double-three needs two axes with at least two other black stones nearby
    let candidates: Vec<usize> = (0..4)
        .filter(|&i| {
            let (dr, dc) = DIRECTIONS[i];
            !has_four[i] && stones_in_window(&probe, pos, Stone::Black, dr, dc) >= 2
        })
        .collect();
    if candidates.len() < 2 {
        return None;
    }

    let mut threes = 0;
    for i in candidates {
        let (dr, dc) = DIRECTIONS[i];
        let points = three_points_in_dir(&probe, pos, Stone::Black, dr, dc);
        let real = points
            .iter()
            .any(|&c| depth >= MAX_THREE_RECURSION || classify(&probe, c, depth + 1).is_none());
        if real {
            threes += 1;
            if threes >= 2 {
                return Some(ForbiddenKind::DoubleThree);
            }
        }
    }
    None
}

/// Number of real open threes a black stone at `pos` would create.
pub fn count_open_threes(board: &Board, pos: Pos) -> usize {
    let probe = board.with_stone(pos, Stone::Black);
    DIRECTIONS
        .iter()
        .filter(|&&(dr, dc)| {
            four_count_in_dir(&probe, pos, Stone::Black, dr, dc) == 0
                && three_points_in_dir(&probe, pos, Stone::Black, dr, dc)
                    .iter()
                    .any(|&c| classify(&probe, c, 1).is_none())
        })
        .count()
}

/// Check if a black move at `pos` is a double-three
pub fn is_double_three(board: &Board, pos: Pos) -> bool {
    forbidden_kind(board, pos) == Some(ForbiddenKind::DoubleThree)
}

/// Check if a black move at `pos` is a double-four
pub fn is_double_four(board: &Board, pos: Pos) -> bool {
    forbidden_kind(board, pos) == Some(ForbiddenKind::DoubleFour)
}

/// A move is valid if the cell is empty and, for black, not forbidden.
#[inline]
pub fn is_valid_move(board: &Board, pos: Pos, color: Stone) -> bool {
    if !board.is_empty(pos) || color == Stone::Empty {
        return false;
    }
    color != Stone::Black || forbidden_kind(board, pos).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black(board: &mut Board, cells: &[(u8, u8)]) {
        for &(r, c) in cells {
            board.place_stone(Pos::new(r, c), Stone::Black);
        }
    }

    #[test]
    fn test_double_three_cross_pattern() {
        // Scenario: two open threes through (7,7)
        //     col: 4 5 6 7 8
        // row 5:   . . . X .
        // row 6:   . . . X .
        // row 7:   . X X * .
        let mut board = Board::new();
        black(&mut board, &[(7, 5), (7, 6), (5, 7), (6, 7)]);

        let result = check_forbidden_move(&board, 7, 7);
        assert_eq!(
            result,
            ForbiddenMoveResult { is_forbidden: true, kind: Some(ForbiddenKind::DoubleThree) }
        );
        assert_eq!(count_open_threes(&board, Pos::new(7, 7)), 2);
        assert!(!is_valid_move(&board, Pos::new(7, 7), Stone::Black));
        assert!(is_valid_move(&board, Pos::new(7, 7), Stone::White));
    }

    #[test]
    fn test_double_three_diagonal_cross() {
        // X . X on both diagonals around (7,7)
        let mut board = Board::new();
        black(&mut board, &[(6, 6), (8, 8), (6, 8), (8, 6)]);
        assert!(is_double_three(&board, Pos::new(7, 7)));
    }

    #[test]
    fn test_single_three_allowed() {
        let mut board = Board::new();
        black(&mut board, &[(7, 5), (7, 6)]);
        assert_eq!(check_forbidden_move(&board, 7, 7), ForbiddenMoveResult::ALLOWED);
        assert_eq!(count_open_threes(&board, Pos::new(7, 7)), 1);
    }

    #[test]
    fn test_blocked_three_does_not_count() {
        // Horizontal three is capped by white: O X X * . -> not open
        let mut board = Board::new();
        black(&mut board, &[(7, 5), (7, 6), (5, 7), (6, 7)]);
        board.place_stone(Pos::new(7, 4), Stone::White);
        assert!(!check_forbidden_move(&board, 7, 7).is_forbidden);
    }

    #[test]
    fn test_three_whose_completion_is_forbidden_is_fake() {
        // Vertical open three through (7,7) is real. The horizontal one can only
        // become a straight four at (7,4) or (7,8), and both are double-fours
        // thanks to the diagonal fours prepared through them.
        let mut board = Board::new();
        black(&mut board, &[(5, 7), (6, 7), (7, 5), (7, 6)]);
        // Through (7,4): vertical X X X above it -> (7,4) would also make a four
        black(&mut board, &[(4, 4), (5, 4), (6, 4)]);
        board.place_stone(Pos::new(3, 4), Stone::White);
        // Through (7,8): diagonal X X X -> (7,8) would also make a four
        black(&mut board, &[(4, 11), (5, 10), (6, 9)]);
        board.place_stone(Pos::new(3, 12), Stone::White);

        let probe = board.with_stone(Pos::new(7, 7), Stone::Black);
        assert_eq!(forbidden_kind(&probe, Pos::new(7, 4)), Some(ForbiddenKind::DoubleFour));
        assert_eq!(forbidden_kind(&probe, Pos::new(7, 8)), Some(ForbiddenKind::DoubleFour));

        assert_eq!(check_forbidden_move(&board, 7, 7), ForbiddenMoveResult::ALLOWED);
    }

    #[test]
    fn test_double_four_two_lines() {
        // Horizontal X X X * and vertical X X X *
        let mut board = Board::new();
        black(&mut board, &[(7, 4), (7, 5), (7, 6), (4, 7), (5, 7), (6, 7)]);
        assert_eq!(
            check_forbidden_move(&board, 7, 7).kind,
            Some(ForbiddenKind::DoubleFour)
        );
        assert!(is_double_four(&board, Pos::new(7, 7)));
    }

    #[test]
    fn test_double_four_same_line() {
        // X . X * X . X  -> two fours on one line
        let mut board = Board::new();
        black(&mut board, &[(7, 3), (7, 5), (7, 7), (7, 9)]);
        assert_eq!(
            check_forbidden_move(&board, 7, 6).kind,
            Some(ForbiddenKind::DoubleFour)
        );
    }

    #[test]
    fn test_overline() {
        // X X X * X X
        let mut board = Board::new();
        black(&mut board, &[(7, 2), (7, 3), (7, 4), (7, 6), (7, 7)]);
        assert_eq!(
            check_forbidden_move(&board, 7, 5).kind,
            Some(ForbiddenKind::Overline)
        );
    }

    #[test]
    fn test_overline_precedes_double_four() {
        // Overline on the row, double-four shape on the column and diagonal
        let mut board = Board::new();
        black(&mut board, &[(7, 2), (7, 3), (7, 4), (7, 6), (7, 7)]);
        black(&mut board, &[(4, 5), (5, 5), (6, 5)]);
        black(&mut board, &[(4, 2), (5, 3), (6, 4)]);
        assert_eq!(
            check_forbidden_move(&board, 7, 5).kind,
            Some(ForbiddenKind::Overline)
        );
    }

    #[test]
    fn test_five_overrides_overline_and_double_four() {
        // Row: X X X X * -> exact five
        // Column: overline shape X X X * X X
        // Diagonal: X X X * (a four)
        let mut board = Board::new();
        black(&mut board, &[(7, 3), (7, 4), (7, 5), (7, 6)]);
        black(&mut board, &[(4, 7), (5, 7), (6, 7), (8, 7), (9, 7)]);
        black(&mut board, &[(4, 4), (5, 5), (6, 6)]);
        assert_eq!(check_forbidden_move(&board, 7, 7), ForbiddenMoveResult::ALLOWED);
    }

    #[test]
    fn test_edge_four_extension_not_forbidden() {
        // Scenario: |X X X X .  -> (7,4) makes five
        let mut board = Board::new();
        black(&mut board, &[(7, 0), (7, 1), (7, 2), (7, 3)]);
        assert_eq!(check_forbidden_move(&board, 7, 4), ForbiddenMoveResult::ALLOWED);
    }

    #[test]
    fn test_four_three_is_legal() {
        // Horizontal X X X * (four), vertical . X X * . (open three)
        let mut board = Board::new();
        black(&mut board, &[(7, 4), (7, 5), (7, 6), (5, 7), (6, 7)]);
        assert_eq!(check_forbidden_move(&board, 7, 7), ForbiddenMoveResult::ALLOWED);
    }

    #[test]
    fn test_check_is_pure_and_rejects_nothing_for_occupied() {
        let mut board = Board::new();
        black(&mut board, &[(7, 5), (7, 6), (5, 7), (6, 7)]);
        let snapshot = board;
        let _ = check_forbidden_move(&board, 7, 7);
        assert_eq!(board, snapshot);
        assert!(!check_forbidden_move(&board, 7, 5).is_forbidden);
        assert!(!check_forbidden_move(&board, -1, 20).is_forbidden);
    }
}
