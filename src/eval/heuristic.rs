//! Heuristic evaluation function for Renju board positions
//!
//! This module provides the static evaluation used at the leaves of the
//! alpha-beta search and for move ordering. It scores:
//! - Line patterns (fives, fours, threes, twos, and single-gap jump shapes)
//! - Connectivity: stones that take part in patterns on several axes
//! - Four-three opportunities (a move making a four and an open three at once)
//! - Positional bonuses (center control)
//!
//! None of these functions modify the board they are given.

use crate::board::{Board, Pos, Stone, BOARD_SIZE};
use crate::rules::shape::{run_length, stones_in_window, DIRECTIONS};
use crate::rules::threats::{creates_four, is_legal_for, line_neighbors, open_three_dirs};

use super::patterns::{EvalOptions, PatternKind, PatternScores};

/// Maximum Manhattan distance from center on a 15x15 board
const MAX_CENTER_DIST: i32 = 14;

/// Evaluate the board from the perspective of the given color.
///
/// Positive values favor `perspective`. The score is the difference of two
/// independent per-side scores, so it is exactly antisymmetric:
/// `evaluate_board(b, Black, o) == -evaluate_board(b, White, o)`.
#[must_use]
pub fn evaluate_board(board: &Board, perspective: Stone, options: &EvalOptions) -> i32 {
    let opponent = perspective.opponent();
    side_score(board, perspective, options) - side_score(board, opponent, options)
}

/// Value of playing `color` at the empty cell `pos`, for move ordering.
///
/// Combines the patterns the stone would build (attack), the opponent
/// patterns it would block (defense, weighted 9/10 so that making five ranks
/// above blocking five) and a small center bonus. Occupied cells score 0.
#[must_use]
pub fn evaluate_position(board: &Board, pos: Pos, color: Stone, options: &EvalOptions) -> i32 {
    if !board.is_empty(pos) || color == Stone::Empty {
        return 0;
    }
    let scores = &options.scores;

    let (attack_patterns, attack_dirs) = stone_patterns(board, pos, color, scores);
    let mut attack = attack_patterns;
    if options.connectivity && attack_dirs >= 2 {
        attack += scores.connectivity_bonus * (attack_dirs - 1);
    }
    if options.four_three && is_four_three(board, pos, color) {
        attack += scores.four_three_bonus;
    }

    let (defense, _) = stone_patterns(board, pos, color.opponent(), scores);

    attack + defense * 9 / 10 + center_bonus(pos, scores)
}

/// Raw pattern score of a `color` stone at `pos` (placed or hypothetical),
/// summed over the four axes, without any bonus.
#[must_use]
pub fn evaluate_stone_patterns(board: &Board, pos: Pos, color: Stone, scores: &PatternScores) -> i32 {
    stone_patterns(board, pos, color, scores).0
}

/// Pattern score and number of axes with a scoring pattern through `pos`.
fn stone_patterns(board: &Board, pos: Pos, color: Stone, scores: &PatternScores) -> (i32, i32) {
    let mut total = 0;
    let mut dirs = 0;
    for &(dr, dc) in &DIRECTIONS {
        let (kind, _) = classify_line(board, pos, color, dr, dc);
        if kind != PatternKind::None {
            total += scores.value(kind);
            dirs += 1;
        }
    }
    (total, dirs)
}

/// Score of one side: each line segment once, connectivity, center, four-three.
fn side_score(board: &Board, color: Stone, options: &EvalOptions) -> i32 {
    let scores = &options.scores;
    let mut score = 0;

    for pos in board.stones_of(color) {
        let mut active = 0;
        for &(dr, dc) in &DIRECTIONS {
            let (kind, start) = classify_line(board, pos, color, dr, dc);
            if kind == PatternKind::None {
                continue;
            }
            active += 1;
            // Each segment is counted once, at its first stone
            if start == pos {
                score += scores.value(kind);
            }
        }
        if options.connectivity && active >= 2 {
            score += scores.connectivity_bonus * (active - 1);
        }
        score += center_bonus(pos, scores);
    }

    if options.four_three && has_four_three(board, color) {
        score += scores.four_three_bonus;
    }

    score
}

#[inline]
fn center_bonus(pos: Pos, scores: &PatternScores) -> i32 {
    let center = (BOARD_SIZE / 2) as i32;
    let dist = (i32::from(pos.row) - center).abs() + (i32::from(pos.col) - center).abs();
    (MAX_CENTER_DIST - dist) * scores.center_weight
}

/// Same-colored stones strictly beyond `from` in one direction.
fn count_from(board: &Board, from: Pos, color: Stone, dr: i32, dc: i32) -> i32 {
    let mut n = 0;
    while let Some(p) = from.offset(dr, dc, n + 1) {
        if board.get(p) != color {
            break;
        }
        n += 1;
    }
    n
}

#[inline]
fn is_open(board: &Board, cell: Option<Pos>) -> bool {
    cell.is_some_and(|p| board.is_empty(p))
}

/// Classify the segment through `pos` along one axis.
///
/// Returns the pattern and the first stone of the segment (lowest index along
/// the axis), so that whole-board scoring can count each segment once. A
/// single empty cell followed by more stones joins the segment as a jump,
/// preferring the positive side.
fn classify_line(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> (PatternKind, Pos) {
    let back = count_from(board, pos, color, -dr, -dc);
    let fwd = count_from(board, pos, color, dr, dc);
    let run = 1 + back + fwd;
    let start = pos.offset(-dr, -dc, back).unwrap_or(pos);
    let left_end = pos.offset(-dr, -dc, back + 1);
    let right_end = pos.offset(dr, dc, fwd + 1);

    if run >= 5 {
        return (PatternKind::Five, start);
    }

    // Jump on the positive side: run _ more
    if is_open(board, right_end) {
        if let Some(gap) = right_end {
            let extra = count_from(board, gap, color, dr, dc);
            if extra > 0 {
                let outer = gap.offset(dr, dc, extra + 1);
                let open = i32::from(is_open(board, left_end)) + i32::from(is_open(board, outer));
                return (jump_kind(run + extra, open), start);
            }
        }
    }
    // Jump on the negative side: more _ run
    if is_open(board, left_end) {
        if let Some(gap) = left_end {
            let extra = count_from(board, gap, color, -dr, -dc);
            if extra > 0 {
                let outer = gap.offset(-dr, -dc, extra + 1);
                let open = i32::from(is_open(board, outer)) + i32::from(is_open(board, right_end));
                let jump_start = gap.offset(-dr, -dc, extra).unwrap_or(gap);
                return (jump_kind(run + extra, open), jump_start);
            }
        }
    }

    let open = i32::from(is_open(board, left_end)) + i32::from(is_open(board, right_end));
    let kind = match (run, open) {
        (4, 2) => PatternKind::OpenFour,
        (4, 1) => PatternKind::Four,
        (3, 2) => PatternKind::OpenThree,
        (3, 1) => PatternKind::Three,
        (2, 2) => PatternKind::OpenTwo,
        (2, 1) => PatternKind::Two,
        _ => PatternKind::None,
    };
    (kind, start)
}

fn jump_kind(stones: i32, open: i32) -> PatternKind {
    match (stones, open) {
        (4.., _) => PatternKind::JumpFour,
        (3, 2) => PatternKind::JumpThree,
        (3, 1) => PatternKind::ClosedJumpThree,
        (2, 2) => PatternKind::Two,
        _ => PatternKind::None,
    }
}

/// Whether `color` at the empty cell `pos` makes a four and an open three on
/// another axis at once.
pub fn is_four_three(board: &Board, pos: Pos, color: Stone) -> bool {
    // Needs three stones near one axis and two near another
    let mut counts = [0u32; 4];
    for (i, &(dr, dc)) in DIRECTIONS.iter().enumerate() {
        counts[i] = stones_in_window(board, pos, color, dr, dc);
    }
    let has_four_axis = counts.iter().any(|&n| n >= 3);
    let axes_with_two = counts.iter().filter(|&&n| n >= 2).count();
    if !has_four_axis || axes_with_two < 2 {
        return false;
    }
    // A move that already makes five is scored as a five elsewhere
    if DIRECTIONS
        .iter()
        .any(|&(dr, dc)| run_length(board, pos, color, dr, dc) >= 5)
    {
        return false;
    }
    creates_four(board, pos, color)
        && !open_three_dirs(board, pos, color).is_empty()
        && is_legal_for(board, pos, color)
}

/// Whether `color` has any four-three move available.
pub fn has_four_three(board: &Board, color: Stone) -> bool {
    line_neighbors(board, color, 4)
        .into_iter()
        .any(|p| is_four_three(board, p, color))
}
