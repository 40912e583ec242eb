//! Win condition checking for Renju
//!
//! White wins with five or more stones in a row. Black wins only with
//! exactly five; a black run of six or more is an overline, which is a
//! forbidden move rather than a win.

use crate::board::{Board, Pos, Stone};

use super::shape::{is_five_length, run_length, DIRECTIONS};

/// Whether `color` at `last_move` completes a winning five.
///
/// Counts contiguous same-colored stones through `last_move` along each of the
/// four axes. The cell itself is counted as `color` whether or not the stone
/// has been placed yet, so this doubles as a "would this move win" probe.
#[inline]
pub fn check_win(board: &Board, last_move: Pos, color: Stone) -> bool {
    if color == Stone::Empty {
        return false;
    }
    DIRECTIONS
        .iter()
        .any(|&(dr, dc)| is_five_length(run_length(board, last_move, color, dr, dc), color))
}

/// Find the stones of a winning line for `color`, if one exists on the board.
pub fn find_five_positions(board: &Board, stone: Stone) -> Option<Vec<Pos>> {
    let stones = board.stones(stone)?;

    for pos in stones.iter_ones() {
        for &(dr, dc) in &DIRECTIONS {
            // Only start from the first stone of a run
            if pos.offset(-dr, -dc, 1).map(|p| board.get(p)) == Some(stone) {
                continue;
            }
            let mut line = vec![pos];
            let mut k = 1;
            while let Some(next) = pos.offset(dr, dc, k) {
                if board.get(next) != stone {
                    break;
                }
                line.push(next);
                k += 1;
            }
            if is_five_length(line.len() as u32, stone) {
                return Some(line);
            }
        }
    }
    None
}

/// Check if `stone` has a winning line anywhere on the board
pub fn has_five_in_row(board: &Board, stone: Stone) -> bool {
    find_five_positions(board, stone).is_some()
}

/// Winner of the position, if any.
pub fn check_winner(board: &Board) -> Option<Stone> {
    [Stone::Black, Stone::White]
        .into_iter()
        .find(|&s| has_five_in_row(board, s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_five() {
        let mut board = Board::new();
        for i in 0..5 {
            board.place_stone(Pos::new(7, i), Stone::Black);
        }
        assert!(check_win(&board, Pos::new(7, 2), Stone::Black));
        assert_eq!(check_winner(&board), Some(Stone::Black));
        assert_eq!(find_five_positions(&board, Stone::Black).map(|l| l.len()), Some(5));
    }

    #[test]
    fn test_diagonal_five_white() {
        let mut board = Board::new();
        for i in 0..5 {
            board.place_stone(Pos::new(10 - i, 2 + i), Stone::White);
        }
        assert!(check_win(&board, Pos::new(8, 4), Stone::White));
        assert!(!check_win(&board, Pos::new(8, 4), Stone::Black));
    }

    #[test]
    fn test_four_is_not_win() {
        let mut board = Board::new();
        for i in 0..4 {
            board.place_stone(Pos::new(3, i), Stone::White);
        }
        assert!(!check_win(&board, Pos::new(3, 3), Stone::White));
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_probe_before_placing() {
        // X X X X .  -> (7,4) would win
        let mut board = Board::new();
        for i in 0..4 {
            board.place_stone(Pos::new(7, i), Stone::Black);
        }
        assert!(check_win(&board, Pos::new(7, 4), Stone::Black));
        assert!(board.is_empty(Pos::new(7, 4)));
    }

    #[test]
    fn test_overline_wins_only_for_white() {
        let mut black = Board::new();
        let mut white = Board::new();
        for i in 0..6 {
            black.place_stone(Pos::new(5, i), Stone::Black);
            white.place_stone(Pos::new(5, i), Stone::White);
        }
        assert!(!check_win(&black, Pos::new(5, 0), Stone::Black));
        assert!(!has_five_in_row(&black, Stone::Black));
        assert!(check_win(&white, Pos::new(5, 0), Stone::White));
        assert!(has_five_in_row(&white, Stone::White));
    }
}
