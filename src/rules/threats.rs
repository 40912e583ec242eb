//! Board-level threat scans
//!
//! These build on the per-line primitives in [`shape`](super::shape) to answer
//! whole-board questions: where can a side make five, a four, a straight four,
//! and which cells break an open three. They are shared by the root
//! short-circuits, the forcing-sequence solvers and the search.

use crate::board::{Bitboard, Board, Pos, Stone};

use super::forbidden::forbidden_kind;
use super::shape::{
    four_count_in_dir, is_straight_four_in_dir, makes_five, stones_in_window,
    three_points_in_dir, DIRECTIONS,
};

/// Empty cells within `reach` steps of a `color` stone along one of the four
/// axes, in board index order.
pub fn line_neighbors(board: &Board, color: Stone, reach: i32) -> Vec<Pos> {
    let mut seen = Bitboard::new();
    for stone in board.stones_of(color) {
        for &(dr, dc) in &DIRECTIONS {
            for sign in [1, -1] {
                for k in 1..=reach {
                    let Some(p) = stone.offset(dr * sign, dc * sign, k) else {
                        break;
                    };
                    if board.is_empty(p) {
                        seen.set(p);
                    }
                }
            }
        }
    }
    seen.iter_ones().collect()
}

/// Empty cell that `color` may legally play (black must avoid forbidden cells).
#[inline]
pub fn is_legal_for(board: &Board, pos: Pos, color: Stone) -> bool {
    board.is_empty(pos) && (color != Stone::Black || forbidden_kind(board, pos).is_none())
}

/// Cells where `color` completes five right now.
pub fn find_five_moves(board: &Board, color: Stone) -> Vec<Pos> {
    line_neighbors(board, color, 1)
        .into_iter()
        .filter(|&p| makes_five(board, p, color))
        .collect()
}

/// Whether `color` at the empty cell `pos` makes at least one four.
pub fn creates_four(board: &Board, pos: Pos, color: Stone) -> bool {
    let probe = board.with_stone(pos, color);
    DIRECTIONS.iter().any(|&(dr, dc)| {
        stones_in_window(&probe, pos, color, dr, dc) >= 3
            && four_count_in_dir(&probe, pos, color, dr, dc) > 0
    })
}

/// Five points `color` would hold after playing `pos` (through `pos` only).
pub fn five_points_after(board: &Board, pos: Pos, color: Stone) -> Vec<Pos> {
    let probe = board.with_stone(pos, color);
    let mut points = Vec::with_capacity(2);
    for &(dr, dc) in &DIRECTIONS {
        for p in super::shape::five_points_in_dir(&probe, pos, color, dr, dc)
            .into_iter()
            .flatten()
        {
            if !points.contains(&p) {
                points.push(p);
            }
        }
    }
    points
}

/// Legal non-winning moves that make a four (contiguous or jump).
pub fn find_four_moves(board: &Board, color: Stone) -> Vec<Pos> {
    line_neighbors(board, color, 4)
        .into_iter()
        .filter(|&p| {
            !makes_five(board, p, color)
                && creates_four(board, p, color)
                && is_legal_for(board, p, color)
        })
        .collect()
}

/// Legal moves that make a straight four. A side "has an open three" exactly
/// when this is non-empty.
pub fn find_straight_four_moves(board: &Board, color: Stone) -> Vec<Pos> {
    line_neighbors(board, color, 3)
        .into_iter()
        .filter(|&p| {
            if makes_five(board, p, color) {
                return false;
            }
            let probe = board.with_stone(p, color);
            DIRECTIONS
                .iter()
                .any(|&(dr, dc)| is_straight_four_in_dir(&probe, p, color, dr, dc))
                && is_legal_for(board, p, color)
        })
        .collect()
}

/// Whether `color` has an open three on the board.
pub fn has_open_three(board: &Board, color: Stone) -> bool {
    !find_straight_four_moves(board, color).is_empty()
}

/// Axes along which `color` at the empty cell `pos` makes an open three
/// (and no four on the same axis).
pub fn open_three_dirs(board: &Board, pos: Pos, color: Stone) -> Vec<(i32, i32)> {
    let probe = board.with_stone(pos, color);
    DIRECTIONS
        .iter()
        .copied()
        .filter(|&(dr, dc)| {
            stones_in_window(&probe, pos, color, dr, dc) >= 2
                && four_count_in_dir(&probe, pos, color, dr, dc) == 0
                && three_points_in_dir(&probe, pos, color, dr, dc)
                    .iter()
                    .any(|&c| is_legal_for(&probe, c, color))
        })
        .collect()
}

/// Whether `color` at `pos` makes at least one open three.
pub fn creates_open_three(board: &Board, pos: Pos, color: Stone) -> bool {
    !open_three_dirs(board, pos, color).is_empty()
}

/// Cells where the opponent of `color` breaks the open three that runs
/// through `pos` along `(dr, dc)`. `board` must already hold the three.
pub fn three_defense_cells(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> Vec<Pos> {
    let defender = color.opponent();
    let mut cells = Vec::new();
    for sign in [1, -1] {
        for k in 1..=5 {
            let Some(c) = pos.offset(dr * sign, dc * sign, k) else {
                break;
            };
            match board.get(c) {
                Stone::Empty => {
                    let probe = board.with_stone(c, defender);
                    let still_open = three_points_in_dir(&probe, pos, color, dr, dc)
                        .iter()
                        .any(|&t| is_legal_for(&probe, t, color));
                    if !still_open {
                        cells.push(c);
                    }
                }
                s if s == color => {}
                _ => break,
            }
        }
    }
    cells.sort();
    cells
}

/// All defender replies to `color` having just played `pos` as a threat:
/// the five points of any four it made, otherwise the cells that break
/// each open three it made. Sorted and deduplicated.
pub fn threat_defenses(board: &Board, pos: Pos, color: Stone) -> Vec<Pos> {
    let mut before = *board;
    before.remove_stone(pos);
    let fives = five_points_after(&before, pos, color);
    if !fives.is_empty() {
        return fives;
    }
    let mut cells = Vec::new();
    for (dr, dc) in open_three_dirs(&before, pos, color) {
        cells.extend(three_defense_cells(board, pos, color, dr, dc));
    }
    cells.sort();
    cells.dedup();
    cells
}

/// Cells where `defender` removes every open three of `attacker` at once.
///
/// Tests every legal defender move near the attacker's stones; empty when
/// no single move suffices (e.g. two separate open threes).
pub fn open_three_breaks(board: &Board, attacker: Stone) -> Vec<Pos> {
    let defender = attacker.opponent();
    let threats = find_straight_four_moves(board, attacker);
    if threats.is_empty() {
        return Vec::new();
    }
    line_neighbors(board, attacker, 5)
        .into_iter()
        .filter(|&d| threats.iter().any(|t| t.distance(d) <= 5))
        .filter(|&d| {
            is_legal_for(board, d, defender)
                && find_straight_four_moves(&board.with_stone(d, defender), attacker).is_empty()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(board: &mut Board, stone: Stone, cells: &[(u8, u8)]) {
        for &(r, c) in cells {
            board.place_stone(Pos::new(r, c), stone);
        }
    }

    #[test]
    fn test_find_five_moves_open_four() {
        let mut board = Board::new();
        place(&mut board, Stone::White, &[(7, 4), (7, 5), (7, 6), (7, 7)]);
        assert_eq!(find_five_moves(&board, Stone::White), vec![Pos::new(7, 3), Pos::new(7, 8)]);
        assert!(find_five_moves(&board, Stone::Black).is_empty());
    }

    #[test]
    fn test_find_four_moves_includes_jump_fours() {
        // X X . X . -> (7,6) contiguous-ish four, (7,8) jump four
        let mut board = Board::new();
        place(&mut board, Stone::Black, &[(7, 4), (7, 5), (7, 7)]);
        let fours = find_four_moves(&board, Stone::Black);
        assert!(fours.contains(&Pos::new(7, 6)));
        assert!(fours.contains(&Pos::new(7, 8)));
        assert!(fours.contains(&Pos::new(7, 3)));
        assert!(!fours.contains(&Pos::new(6, 6)));
    }

    #[test]
    fn test_open_three_detection() {
        let mut board = Board::new();
        place(&mut board, Stone::Black, &[(7, 5), (7, 6), (7, 7)]);
        assert!(has_open_three(&board, Stone::Black));
        let moves = find_straight_four_moves(&board, Stone::Black);
        assert_eq!(moves, vec![Pos::new(7, 4), Pos::new(7, 8)]);

        board.place_stone(Pos::new(7, 8), Stone::White);
        assert!(!has_open_three(&board, Stone::Black));
    }

    #[test]
    fn test_open_three_breaks() {
        // . . X X X . .  -> only the adjacent cells break it
        let mut board = Board::new();
        place(&mut board, Stone::Black, &[(7, 5), (7, 6), (7, 7)]);
        let breaks = open_three_breaks(&board, Stone::Black);
        assert!(breaks.contains(&Pos::new(7, 4)));
        assert!(breaks.contains(&Pos::new(7, 8)));
        assert!(!breaks.contains(&Pos::new(6, 6)));
    }

    #[test]
    fn test_threat_defenses_for_three_and_four() {
        let mut board = Board::new();
        place(&mut board, Stone::White, &[(7, 5), (7, 6), (7, 7)]);
        let defenses = threat_defenses(&board, Pos::new(7, 7), Stone::White);
        assert!(defenses.contains(&Pos::new(7, 4)));
        assert!(defenses.contains(&Pos::new(7, 8)));

        // Four blocked on the left: the only defense is the five point
        let mut four = Board::new();
        four.place_stone(Pos::new(7, 3), Stone::Black);
        place(&mut four, Stone::White, &[(7, 4), (7, 5), (7, 6), (7, 7)]);
        assert_eq!(
            threat_defenses(&four, Pos::new(7, 7), Stone::White),
            vec![Pos::new(7, 8)]
        );
    }

    #[test]
    fn test_scans_do_not_mutate() {
        let mut board = Board::new();
        place(&mut board, Stone::Black, &[(7, 5), (7, 6), (7, 7), (8, 8)]);
        place(&mut board, Stone::White, &[(6, 6), (9, 9)]);
        let snapshot = board;
        let _ = find_four_moves(&board, Stone::Black);
        let _ = find_straight_four_moves(&board, Stone::Black);
        let _ = open_three_breaks(&board, Stone::Black);
        assert_eq!(board, snapshot);
    }
}
