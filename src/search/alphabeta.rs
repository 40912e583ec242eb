//! Alpha-Beta search with iterative deepening and transposition table
//!
//! This module implements the core search algorithm of the engine: negamax
//! with alpha-beta pruning, principal variation search and late move
//! reductions, driven by iterative deepening with aspiration windows.
//!
//! # Features
//!
//! - Iterative deepening; the last fully completed depth is always the answer
//! - Transposition table keyed by stones and side to move
//! - Forced replies: an available five is taken, an opponent five is blocked
//! - Killer and history tables for quiet-move ordering
//! - Time and node budgets checked every 1024 nodes
//!
//! # Example
//!
//! ```
//! use renju::board::{Board, Pos, Stone};
//! use renju::search::Searcher;
//!
//! let mut searcher = Searcher::new(4); // 4 MB transposition table
//! let mut board = Board::new();
//! for col in 0..4 {
//!     board.place_stone(Pos::new(7, col), Stone::Black);
//! }
//!
//! let result = searcher.search(&board, Stone::Black, 2);
//! assert_eq!(result.best_move, Some(Pos::new(7, 4)));
//! ```

use std::time::Instant;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::board::{Board, Pos, Stone};
use crate::eval::{evaluate_board, EvalOptions};
use crate::rules::{check_win, find_five_moves, is_legal_for};

use super::movegen::{generate_moves, order_moves, HistoryTable, KillerTable, OrderingHints};
use super::tt::{score_from_tt, score_to_tt, EntryType, TTEntry, TTStats, TranspositionTable};
use super::zobrist::{compute_board_hash, toggle_stone, ZobristTable};
use super::{ASPIRATION_WINDOW, INF, WIN_SCORE, WIN_THRESHOLD};

/// Late move reductions apply from this move index on.
const LMR_MIN_INDEX: usize = 3;

/// Remaining depth needed before a move can be reduced.
const LMR_MIN_DEPTH: i8 = 3;

/// Search statistics for diagnostics and tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Total beta cutoffs (fail-high)
    pub beta_cutoffs: u64,
    /// Beta cutoffs on the first move tried (measures move ordering quality)
    pub first_move_cutoffs: u64,
    /// Total TT probes
    pub tt_probes: u64,
    /// TT probes that returned a usable score
    pub tt_score_hits: u64,
    /// TT probes that provided a best move for ordering
    pub tt_move_hits: u64,
}

impl SearchStats {
    /// First-move cutoff rate in percent
    pub fn first_move_rate(&self) -> f64 {
        if self.beta_cutoffs == 0 {
            0.0
        } else {
            self.first_move_cutoffs as f64 / self.beta_cutoffs as f64 * 100.0
        }
    }

    /// TT score hit rate in percent
    pub fn tt_score_rate(&self) -> f64 {
        if self.tt_probes == 0 {
            0.0
        } else {
            self.tt_score_hits as f64 / self.tt_probes as f64 * 100.0
        }
    }
}

/// Score of one root move at the last completed depth.
///
/// Only the best move carries an exact score; the others are upper bounds
/// from the null-window search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub position: Pos,
    pub score: i32,
}

/// Summary of one completed iterative-deepening depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthRecord {
    pub depth: i8,
    pub score: i32,
    pub best_move: Option<Pos>,
    /// Nodes searched so far, cumulative over depths
    pub nodes: u64,
}

/// Depth, time and node budget of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_depth: i8,
    pub deadline: Option<Instant>,
    pub node_limit: Option<u64>,
}

impl SearchLimits {
    /// Depth limit only.
    pub fn depth(max_depth: i8) -> Self {
        Self {
            max_depth,
            deadline: None,
            node_limit: None,
        }
    }
}

/// Search result containing the best move found and associated statistics.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Best move found, if any
    pub best_move: Option<Pos>,
    /// Evaluation score of the best move
    pub score: i32,
    /// Last fully completed depth, 0 if none
    pub depth: i8,
    /// A budget ran out before `max_depth` was completed
    pub interrupted: bool,
    /// Total nodes searched
    pub nodes: u64,
    /// Search diagnostics
    pub stats: SearchStats,
    /// Root moves of the last completed depth, best first
    pub root_scores: Vec<CandidateScore>,
    /// One record per completed depth
    pub depth_history: Vec<DepthRecord>,
}

/// Outcome of one root iteration.
struct RootIteration {
    best_move: Pos,
    score: i32,
    scores: Vec<CandidateScore>,
}

/// State of one search call: table handles, budgets, statistics and the
/// stop flag. It borrows the tables mutably, so exactly one search uses
/// them at a time.
pub struct SearchContext<'a> {
    tt: &'a mut TranspositionTable,
    killers: &'a mut KillerTable,
    history: &'a mut HistoryTable,
    eval: &'a EvalOptions,
    limits: SearchLimits,
    nodes: u64,
    stopped: bool,
    stats: SearchStats,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        tt: &'a mut TranspositionTable,
        killers: &'a mut KillerTable,
        history: &'a mut HistoryTable,
        eval: &'a EvalOptions,
        limits: SearchLimits,
    ) -> Self {
        Self {
            tt,
            killers,
            history,
            eval,
            limits,
            nodes: 0,
            stopped: false,
            stats: SearchStats::default(),
        }
    }

    /// Nodes visited so far
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Whether a budget has run out.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Check the time and node budgets every 1024 nodes.
    #[inline]
    fn check_limits(&mut self) -> bool {
        if !self.stopped && self.nodes & 1023 == 0 {
            let out_of_time = self.limits.deadline.is_some_and(|d| Instant::now() >= d);
            let out_of_nodes = self.limits.node_limit.is_some_and(|n| self.nodes >= n);
            if out_of_time || out_of_nodes {
                debug!("search stopped after {} nodes", self.nodes);
                self.stopped = true;
            }
        }
        self.stopped
    }

    /// Iterative deepening over `root_moves` for `color` to move.
    ///
    /// Returns the result of the last fully completed depth. If no depth
    /// completes, the best statically ordered root move is returned with
    /// depth 0.
    pub fn iterate(&mut self, board: &Board, color: Stone, root_moves: &[Pos]) -> SearchResult {
        let mut result = SearchResult::default();
        if root_moves.is_empty() {
            return result;
        }

        let mut work = *board;
        let hash = compute_board_hash(board) ^ ZobristTable::global().side_key(color);
        let mut prev_score: i32 = 0;

        for depth in 1..=self.limits.max_depth.max(1) {
            let (mut alpha, mut beta) = if depth >= 2 && prev_score.abs() < WIN_THRESHOLD {
                (prev_score - ASPIRATION_WINDOW, prev_score + ASPIRATION_WINDOW)
            } else {
                (-INF, INF)
            };

            let iteration = loop {
                let Some(it) = self.search_root(&mut work, color, root_moves, depth, alpha, beta, hash)
                else {
                    break None;
                };
                if it.score <= alpha {
                    trace!("depth {}: fail low at {}, re-searching", depth, it.score);
                    alpha = -INF;
                } else if it.score >= beta {
                    trace!("depth {}: fail high at {}, re-searching", depth, it.score);
                    beta = INF;
                } else {
                    break Some(it);
                }
            };
            debug_assert_eq!(work, *board, "search did not restore the board");

            let Some(it) = iteration else {
                result.interrupted = true;
                break;
            };

            debug!(
                "depth {}: best {} score {} nodes {}",
                depth, it.best_move, it.score, self.nodes
            );
            prev_score = it.score;
            result.best_move = Some(it.best_move);
            result.score = it.score;
            result.depth = depth;
            result.root_scores = it.scores;
            result.depth_history.push(DepthRecord {
                depth,
                score: it.score,
                best_move: Some(it.best_move),
                nodes: self.nodes,
            });

            if it.score.abs() >= WIN_THRESHOLD {
                break;
            }
        }

        if result.best_move.is_none() {
            let hints = OrderingHints::plain(self.eval);
            result.best_move = order_moves(board, color, root_moves.to_vec(), &hints)
                .first()
                .map(|m| m.pos);
        }

        result.nodes = self.nodes;
        result.stats = self.stats.clone();
        result
    }

    /// Root-level search; `None` when a budget ran out mid-iteration.
    #[allow(clippy::too_many_arguments)]
    fn search_root(
        &mut self,
        board: &mut Board,
        color: Stone,
        root_moves: &[Pos],
        depth: i8,
        mut alpha: i32,
        beta: i32,
        hash: u64,
    ) -> Option<RootIteration> {
        debug_assert_eq!(
            hash,
            compute_board_hash(board) ^ ZobristTable::global().side_key(color)
        );

        let hints = OrderingHints {
            tt_move: self.tt.get_best_move(hash),
            killers: self.killers.get(0),
            history: Some(&*self.history),
            eval: self.eval,
        };
        let moves = order_moves(board, color, root_moves.to_vec(), &hints);

        let alpha_orig = alpha;
        let mut best: Option<(Pos, i32)> = None;
        let mut scores = Vec::with_capacity(moves.len());

        for (i, m) in moves.iter().enumerate() {
            let child_hash = child_key(hash, m.pos, color);
            board.place_stone(m.pos, color);
            let score = if i == 0 {
                -self.alpha_beta(board, color.opponent(), depth - 1, -beta, -alpha, 1, child_hash, m.pos)
            } else {
                let s = -self.alpha_beta(
                    board,
                    color.opponent(),
                    depth - 1,
                    -(alpha + 1),
                    -alpha,
                    1,
                    child_hash,
                    m.pos,
                );
                if !self.stopped && s > alpha && s < beta {
                    -self.alpha_beta(board, color.opponent(), depth - 1, -beta, -alpha, 1, child_hash, m.pos)
                } else {
                    s
                }
            };
            board.remove_stone(m.pos);

            if self.stopped {
                return None;
            }

            scores.push(CandidateScore { position: m.pos, score });
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((m.pos, score));
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                self.stats.beta_cutoffs += 1;
                if i == 0 {
                    self.stats.first_move_cutoffs += 1;
                }
                break;
            }
        }

        let (best_move, best_score) = best?;
        let entry_type = bound_type(best_score, alpha_orig, beta);
        self.tt.store(hash, score_to_tt(best_score, 0), depth, entry_type, Some(best_move));

        scores.sort_by(|a, b| b.score.cmp(&a.score).then(a.position.cmp(&b.position)));
        Some(RootIteration {
            best_move,
            score: best_score,
            scores,
        })
    }

    /// Negamax alpha-beta. `last_move` is the opponent's move into this node.
    #[allow(clippy::too_many_arguments)]
    fn alpha_beta(
        &mut self,
        board: &mut Board,
        color: Stone,
        depth: i8,
        mut alpha: i32,
        beta: i32,
        ply: usize,
        hash: u64,
        last_move: Pos,
    ) -> i32 {
        self.nodes += 1;
        if self.check_limits() {
            return 0;
        }

        let ply_score = ply as i32;
        let opponent = color.opponent();

        if check_win(board, last_move, opponent) {
            return -(WIN_SCORE - ply_score);
        }
        if board.is_full() {
            return 0;
        }
        // An available five wins on the next ply.
        if !find_five_moves(board, color).is_empty() {
            return WIN_SCORE - ply_score - 1;
        }

        if depth <= 0 {
            return evaluate_board(board, color, self.eval).clamp(-(WIN_THRESHOLD - 1), WIN_THRESHOLD - 1);
        }

        self.stats.tt_probes += 1;
        let entry = self.tt.probe(hash);
        if let Some(e) = entry {
            let rebased = TTEntry {
                score: score_from_tt(e.score, ply_score),
                ..e
            };
            if let Some(score) = rebased.cutoff(depth, alpha, beta) {
                self.stats.tt_score_hits += 1;
                return score;
            }
        }
        let tt_move = entry.and_then(|e| e.best_move);
        if tt_move.is_some() {
            self.stats.tt_move_hits += 1;
        }

        let threats = find_five_moves(board, opponent);
        let candidates = if threats.is_empty() {
            generate_moves(board, color)
        } else {
            let blocks: Vec<Pos> = threats
                .into_iter()
                .filter(|&p| is_legal_for(board, p, color))
                .collect();
            if blocks.is_empty() {
                // Nothing stops the five next ply.
                return -(WIN_SCORE - ply_score - 2);
            }
            blocks
        };
        if candidates.is_empty() {
            return 0;
        }

        let hints = OrderingHints {
            tt_move,
            killers: self.killers.get(ply),
            history: Some(&*self.history),
            eval: self.eval,
        };
        let moves = order_moves(board, color, candidates, &hints);

        let alpha_orig = alpha;
        let mut best_score = -INF;
        let mut best_move = None;

        for (i, m) in moves.iter().enumerate() {
            let child_hash = child_key(hash, m.pos, color);
            board.place_stone(m.pos, color);

            // PVS + LMR
            let score = if i == 0 {
                -self.alpha_beta(board, opponent, depth - 1, -beta, -alpha, ply + 1, child_hash, m.pos)
            } else {
                let reduction = if i >= LMR_MIN_INDEX
                    && depth >= LMR_MIN_DEPTH
                    && alpha > -WIN_THRESHOLD
                    && m.score < self.eval.scores.open_three
                {
                    lmr_reduction(depth, i)
                } else {
                    0
                };

                let mut s = -self.alpha_beta(
                    board,
                    opponent,
                    (depth - 1 - reduction).max(0),
                    -(alpha + 1),
                    -alpha,
                    ply + 1,
                    child_hash,
                    m.pos,
                );
                if !self.stopped && reduction > 0 && s > alpha {
                    s = -self.alpha_beta(
                        board,
                        opponent,
                        depth - 1,
                        -(alpha + 1),
                        -alpha,
                        ply + 1,
                        child_hash,
                        m.pos,
                    );
                }
                if !self.stopped && s > alpha && s < beta {
                    s = -self.alpha_beta(board, opponent, depth - 1, -beta, -alpha, ply + 1, child_hash, m.pos);
                }
                s
            };

            board.remove_stone(m.pos);

            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(m.pos);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                self.stats.beta_cutoffs += 1;
                if i == 0 {
                    self.stats.first_move_cutoffs += 1;
                }
                self.killers.update(ply, m.pos);
                self.history.update(color, m.pos, i32::from(depth));
                break;
            }
        }

        let entry_type = bound_type(best_score, alpha_orig, beta);
        self.tt
            .store(hash, score_to_tt(best_score, ply_score), depth, entry_type, best_move);

        best_score
    }
}

/// Table key of the child after `color` plays `pos`.
#[inline]
fn child_key(hash: u64, pos: Pos, color: Stone) -> u64 {
    let z = ZobristTable::global();
    toggle_stone(hash, pos, color) ^ z.side_key(color) ^ z.side_key(color.opponent())
}

#[inline]
fn bound_type(score: i32, alpha: i32, beta: i32) -> EntryType {
    if score >= beta {
        EntryType::LowerBound
    } else if score > alpha {
        EntryType::Exact
    } else {
        EntryType::UpperBound
    }
}

/// `max(1, floor(sqrt(depth) * sqrt(index) / 2))`
#[inline]
fn lmr_reduction(depth: i8, index: usize) -> i8 {
    let r = (f64::from(depth).sqrt() * (index as f64).sqrt() / 2.0) as i8;
    r.max(1)
}

/// Alpha-beta searcher owning its transposition table and ordering tables.
pub struct Searcher {
    tt: TranspositionTable,
    killers: KillerTable,
    history: HistoryTable,
}

impl Searcher {
    /// Create a new searcher with the specified transposition table size.
    ///
    /// # Arguments
    ///
    /// * `tt_size_mb` - Size of transposition table in megabytes
    #[must_use]
    pub fn new(tt_size_mb: usize) -> Self {
        Self {
            tt: TranspositionTable::new(tt_size_mb),
            killers: KillerTable::new(),
            history: HistoryTable::new(),
        }
    }

    /// Search every candidate to `max_depth` with the default evaluator and
    /// no time or node budget.
    #[must_use]
    pub fn search(&mut self, board: &Board, color: Stone, max_depth: i8) -> SearchResult {
        let moves = generate_moves(board, color);
        self.search_moves(
            board,
            color,
            &moves,
            SearchLimits::depth(max_depth),
            &EvalOptions::default(),
        )
    }

    /// Search only `root_moves`, under `limits`.
    ///
    /// Starts a new table generation and clears killers and history first,
    /// so the result does not depend on earlier searches.
    pub fn search_moves(
        &mut self,
        board: &Board,
        color: Stone,
        root_moves: &[Pos],
        limits: SearchLimits,
        eval: &EvalOptions,
    ) -> SearchResult {
        self.tt.new_generation();
        self.killers.clear();
        self.history.clear();

        let mut ctx = SearchContext::new(&mut self.tt, &mut self.killers, &mut self.history, eval, limits);
        ctx.iterate(board, color, root_moves)
    }

    /// Get statistics about the transposition table.
    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.tt.stats()
    }

    /// Clear the transposition table.
    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }
}
