//! Candidate generation and move ordering
//!
//! Candidates are the empty cells within two steps (Chebyshev distance) of any
//! stone. Black's candidates never include forbidden cells. Ordering puts the
//! transposition-table move first, then the killer moves of the current ply,
//! then the rest by static move value, history score and finally board index,
//! so equal inputs always give the same order.

use std::cmp::Reverse;

use crate::board::{Bitboard, Board, Pos, Stone, CENTER, TOTAL_CELLS};
use crate::eval::{evaluate_position, EvalOptions};
use crate::rules::is_legal_for;

/// Neighborhood radius for candidate generation
const CANDIDATE_RADIUS: i32 = 2;

/// Deepest ply tracked by the killer table
pub const MAX_PLY: usize = 64;

/// A candidate with its ordering value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub pos: Pos,
    /// `evaluate_position` of the move for the side to move
    pub score: i32,
}

/// Search-time ordering aids for one node.
#[derive(Debug, Clone, Copy)]
pub struct OrderingHints<'a> {
    pub tt_move: Option<Pos>,
    pub killers: [Option<Pos>; 2],
    pub history: Option<&'a HistoryTable>,
    pub eval: &'a EvalOptions,
}

impl<'a> OrderingHints<'a> {
    /// Hints with no search state, ordering by static value alone.
    pub fn plain(eval: &'a EvalOptions) -> Self {
        Self {
            tt_move: None,
            killers: [None; 2],
            history: None,
            eval,
        }
    }
}

/// Legal candidate moves for `color`, in board index order.
///
/// An empty board yields only the center.
pub fn generate_moves(board: &Board, color: Stone) -> Vec<Pos> {
    if board.is_board_empty() {
        return vec![CENTER];
    }

    let mut seen = Bitboard::new();
    for stone in board.occupied().iter_ones() {
        for dr in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
            for dc in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
                let Some(p) = Pos::try_new(i32::from(stone.row) + dr, i32::from(stone.col) + dc) else {
                    continue;
                };
                if board.is_empty(p) {
                    seen.set(p);
                }
            }
        }
    }

    seen.iter_ones()
        .filter(|&p| is_legal_for(board, p, color))
        .collect()
}

/// Candidates with their ordering values, best first.
pub fn generate_scored_moves(board: &Board, color: Stone, hints: &OrderingHints<'_>) -> Vec<ScoredMove> {
    let moves = generate_moves(board, color);
    order_moves(board, color, moves, hints)
}

/// Candidates best first.
pub fn generate_sorted_moves(board: &Board, color: Stone, hints: &OrderingHints<'_>) -> Vec<Pos> {
    generate_scored_moves(board, color, hints)
        .into_iter()
        .map(|m| m.pos)
        .collect()
}

/// Order an arbitrary move list with the same key as [`generate_scored_moves`].
pub fn order_moves(
    board: &Board,
    color: Stone,
    moves: Vec<Pos>,
    hints: &OrderingHints<'_>,
) -> Vec<ScoredMove> {
    let mut keyed: Vec<(u8, i32, i32, ScoredMove)> = moves
        .into_iter()
        .map(|pos| {
            let tier = if hints.tt_move == Some(pos) {
                3
            } else if hints.killers[0] == Some(pos) {
                2
            } else if hints.killers[1] == Some(pos) {
                1
            } else {
                0
            };
            let score = evaluate_position(board, pos, color, hints.eval);
            let hist = hints.history.map_or(0, |h| h.get(color, pos));
            (tier, score, hist, ScoredMove { pos, score })
        })
        .collect();

    keyed.sort_by_key(|&(tier, score, hist, m)| (Reverse(tier), Reverse(score), Reverse(hist), m.pos));
    keyed.into_iter().map(|(_, _, _, m)| m).collect()
}

/// Two killer slots per ply: quiet moves that caused a beta cutoff.
#[derive(Debug, Clone)]
pub struct KillerTable {
    slots: [[Option<Pos>; 2]; MAX_PLY],
}

impl KillerTable {
    pub fn new() -> Self {
        Self {
            slots: [[None; 2]; MAX_PLY],
        }
    }

    #[inline]
    pub fn get(&self, ply: usize) -> [Option<Pos>; 2] {
        self.slots.get(ply).copied().unwrap_or([None; 2])
    }

    /// Record a cutoff move; the previous first killer moves to slot two.
    pub fn update(&mut self, ply: usize, pos: Pos) {
        if let Some(slot) = self.slots.get_mut(ply) {
            if slot[0] != Some(pos) {
                slot[1] = slot[0];
                slot[0] = Some(pos);
            }
        }
    }

    pub fn clear(&mut self) {
        self.slots = [[None; 2]; MAX_PLY];
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Per color, per cell history scores, increased by depth² on each cutoff.
#[derive(Debug, Clone)]
pub struct HistoryTable {
    scores: [[i32; TOTAL_CELLS]; 2],
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            scores: [[0; TOTAL_CELLS]; 2],
        }
    }

    #[inline]
    pub fn get(&self, color: Stone, pos: Pos) -> i32 {
        match color {
            Stone::Empty => 0,
            c => self.scores[c.index()][pos.to_index()],
        }
    }

    pub fn update(&mut self, color: Stone, pos: Pos, depth: i32) {
        if color == Stone::Empty {
            return;
        }
        let cell = &mut self.scores[color.index()][pos.to_index()];
        *cell = cell.saturating_add(depth * depth);
    }

    pub fn clear(&mut self) {
        self.scores = [[0; TOTAL_CELLS]; 2];
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}
