//! Main AI Engine integrating all search components
//!
//! This module provides the engine entry point that orchestrates the solvers
//! and the alpha-beta search. Before any heuristic search, the root goes
//! through a fixed sequence of checks:
//!
//! 1. **No candidates**: the board is full, the game is a draw
//! 2. **VCF (Victory by Continuous Fours)**: play the first move of the line
//! 3. **Opponent fours**: two or more five points is a forced loss; a single
//!    one restricts the search to the block, or loses if the block is forbidden
//! 4. **Opponent open three**: restrict to the cells that break it, plus our
//!    own fours
//! 5. **Mise-VCF / VCT** for the side to move, when enabled
//! 6. **Alpha-Beta**: iterative deepening over what remains
//!
//! # Example
//!
//! ```
//! use renju::{AIEngine, Board, Pos, SearchOptions, SearchType, Stone};
//!
//! let mut engine = AIEngine::new();
//! let options = SearchOptions { max_depth: 1, ..SearchOptions::default() };
//!
//! let output = engine.find_best_move_iterative(&Board::new(), Stone::Black, &options);
//! assert_eq!(output.position, Some(Pos::new(7, 7)));
//! assert_eq!(output.search_type, SearchType::AlphaBeta);
//! ```

use std::time::{Duration, Instant};

use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Pos, Stone};
use crate::error::ConfigError;
use crate::eval::EvalOptions;
use crate::rules::{find_five_moves, find_four_moves, has_open_three, is_legal_for, open_three_breaks};
use crate::search::movegen::MAX_PLY;
use crate::search::{
    generate_moves, CandidateScore, DepthRecord, SearchLimits, SearchResult, SearchStats, Searcher,
    TTStats, ThreatSearcher, WIN_SCORE, WIN_THRESHOLD,
};

/// Deepest iterative-deepening depth accepted in options.
const MAX_SEARCH_DEPTH: i8 = (MAX_PLY - 4) as i8;

/// Type of search that produced the result.
///
/// This indicates which phase of the search hierarchy found the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// No legal move left; the game is drawn
    Draw,
    /// Forced win via Victory by Continuous Fours
    Vcf,
    /// Forced win via a quiet move followed by VCF
    MiseVcf,
    /// Forced win via Victory by Continuous Threats
    Vct,
    /// The opponent's four cannot be stopped
    ForcedLoss,
    /// Alpha-beta restricted to the single cell blocking a four
    ForcedBlock,
    /// Regular alpha-beta search result
    AlphaBeta,
}

/// Per-call search configuration.
///
/// Every field has a default, so JSON overrides may name only what they
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Deepest iterative-deepening depth
    pub max_depth: i8,
    /// Base time budget in milliseconds, before dynamic allocation. `0` means
    /// no time budget.
    pub time_limit_ms: u64,
    /// Alpha-beta node budget
    pub node_limit: Option<u64>,
    /// Root jitter strength in `[0, 1]`; `0` is fully deterministic
    pub random_factor: f64,
    /// Seed for the root jitter
    pub random_seed: Option<u64>,
    pub evaluation: EvalOptions,
    /// Report per-move root scores
    pub collect_candidates: bool,
    /// Report one record per completed depth
    pub collect_depth_history: bool,
    pub use_vct: bool,
    pub use_mise_vcf: bool,
    /// Below this many stones VCT falls back to VCF only
    pub vct_min_stones: u32,
    /// Transposition table size in megabytes
    pub tt_size_mb: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            time_limit_ms: 5_000,
            node_limit: None,
            random_factor: 0.0,
            random_seed: None,
            evaluation: EvalOptions::default(),
            collect_candidates: false,
            collect_depth_history: false,
            use_vct: true,
            use_mise_vcf: true,
            vct_min_stones: 20,
            tt_size_mb: 16,
        }
    }
}

impl SearchOptions {
    /// Load options from JSON. Missing fields keep their default; values out
    /// of range are clamped.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: SearchOptions = serde_json::from_str(json)?;
        Ok(options.sanitized())
    }

    /// Copy with every out-of-range value clamped into range.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let mut out = *self;
        if !(1..=MAX_SEARCH_DEPTH).contains(&out.max_depth) {
            let clamped = out.max_depth.clamp(1, MAX_SEARCH_DEPTH);
            warn!("max_depth {} out of range, using {}", out.max_depth, clamped);
            out.max_depth = clamped;
        }
        if out.random_factor.is_nan() {
            warn!("random_factor is NaN, using 0");
            out.random_factor = 0.0;
        } else if !(0.0..=1.0).contains(&out.random_factor) {
            let clamped = out.random_factor.clamp(0.0, 1.0);
            warn!("random_factor {} out of range, using {}", out.random_factor, clamped);
            out.random_factor = clamped;
        }
        if out.tt_size_mb == 0 {
            warn!("tt_size_mb must be positive, using 1");
            out.tt_size_mb = 1;
        }
        out
    }
}

/// Result of a move search with detailed statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutput {
    /// Move to play; `None` only when the board is full
    pub position: Option<Pos>,
    pub score: i32,
    /// Last fully completed alpha-beta depth, 0 for solver results
    pub completed_depth: i8,
    /// A time or node budget ran out before `max_depth`
    pub interrupted: bool,
    pub elapsed_ms: u64,
    pub search_type: SearchType,
    /// Alpha-beta and solver nodes together
    pub nodes: u64,
    /// Winning line when a solver decided the move, otherwise empty
    pub forced_sequence: Vec<Pos>,
    /// Root moves of the last completed depth, best first. Only the first
    /// score is exact; the others are upper bounds from null-window probes,
    /// so they rank moves no better than the best one but do not measure
    /// how much worse they are.
    pub candidates: Option<Vec<CandidateScore>>,
    pub depth_history: Option<Vec<DepthRecord>>,
    pub stats: SearchStats,
}

impl SearchOutput {
    /// Result decided before the alpha-beta search.
    fn decided(
        search_type: SearchType,
        position: Option<Pos>,
        score: i32,
        forced_sequence: Vec<Pos>,
        nodes: u64,
        options: &SearchOptions,
        start: Instant,
    ) -> Self {
        Self {
            position,
            score,
            completed_depth: 0,
            interrupted: false,
            elapsed_ms: elapsed_ms(start),
            search_type,
            nodes,
            forced_sequence,
            candidates: options
                .collect_candidates
                .then(|| position.map(|p| CandidateScore { position: p, score }).into_iter().collect()),
            depth_history: options.collect_depth_history.then(Vec::new),
            stats: SearchStats::default(),
        }
    }

    /// Result of the alpha-beta search.
    fn from_alphabeta(
        result: SearchResult,
        search_type: SearchType,
        solver_nodes: u64,
        options: &SearchOptions,
        start: Instant,
    ) -> Self {
        let (position, score) = pick_move(&result, options);
        Self {
            position,
            score,
            completed_depth: result.depth,
            interrupted: result.interrupted,
            elapsed_ms: elapsed_ms(start),
            search_type,
            nodes: result.nodes + solver_nodes,
            forced_sequence: Vec::new(),
            candidates: options.collect_candidates.then_some(result.root_scores),
            depth_history: options.collect_depth_history.then_some(result.depth_history),
            stats: result.stats,
        }
    }
}

#[inline]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Best move after optional root jitter.
///
/// With a positive `random_factor`, every non-winning root move gets a
/// uniform bonus of up to `random_factor * 100` and the highest total is
/// played. Proven wins and losses are never jittered.
fn pick_move(result: &SearchResult, options: &SearchOptions) -> (Option<Pos>, i32) {
    if options.random_factor <= 0.0 || result.score.abs() >= WIN_THRESHOLD || result.root_scores.len() < 2 {
        return (result.best_move, result.score);
    }

    let seed = options.random_seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let amplitude = options.random_factor * 100.0;

    result
        .root_scores
        .iter()
        .filter(|c| c.score.abs() < WIN_THRESHOLD)
        .map(|c| (f64::from(c.score) + rng.random::<f64>() * amplitude, c))
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map_or((result.best_move, result.score), |(_, c)| (Some(c.position), c.score))
}

/// Time budget in milliseconds for one move.
///
/// The base budget shrinks to 30% with at most 4 stones on the board and to
/// 60% with at most 10. Near-forced roots shrink it further: half with 2 or
/// 3 candidates, a quarter with a single one.
pub fn allocate_time(base_ms: u64, stone_count: u32, candidate_count: usize) -> u64 {
    let mut budget = base_ms;
    if stone_count <= 4 {
        budget = budget.saturating_mul(3) / 10;
    } else if stone_count <= 10 {
        budget = budget.saturating_mul(6) / 10;
    }
    match candidate_count {
        1 => budget / 4,
        2 | 3 => budget / 2,
        _ => budget,
    }
}

/// Main AI Engine for Renju.
///
/// Owns the transposition table, killer and history tables, and the threat
/// searcher. One engine serves one search at a time; run independent
/// searches in parallel by giving each its own engine.
///
/// # Example
///
/// ```
/// use renju::{AIEngine, Board, Pos, Stone};
///
/// let mut engine = AIEngine::new();
/// let mut board = Board::new();
/// for col in 3..7 {
///     board.place_stone(Pos::new(7, col), Stone::White);
/// }
/// board.place_stone(Pos::new(7, 2), Stone::Black);
///
/// // Black must block the four
/// assert_eq!(engine.get_move(&board, Stone::Black), Some(Pos::new(7, 7)));
/// ```
pub struct AIEngine {
    /// Alpha-beta searcher with transposition table
    searcher: Searcher,
    /// VCF/VCT threat searcher
    threat_searcher: ThreatSearcher,
    tt_size_mb: usize,
}

impl AIEngine {
    /// Create a new engine with a table sized for the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tt_size(SearchOptions::default().tt_size_mb)
    }

    /// Create an engine with a `tt_size_mb` megabyte transposition table.
    #[must_use]
    pub fn with_tt_size(tt_size_mb: usize) -> Self {
        let tt_size_mb = tt_size_mb.max(1);
        Self {
            searcher: Searcher::new(tt_size_mb),
            threat_searcher: ThreatSearcher::new(),
            tt_size_mb,
        }
    }

    /// Best move for `color` with default options.
    #[must_use]
    pub fn get_move(&mut self, board: &Board, color: Stone) -> Option<Pos> {
        self.find_best_move_iterative(board, color, &SearchOptions::default())
            .position
    }

    /// Find the best move for `color` to play on `board`.
    ///
    /// Never fails: a full board is reported as a draw, and running out of
    /// time or nodes returns the last completed depth with
    /// `interrupted = true`.
    pub fn find_best_move_iterative(&mut self, board: &Board, color: Stone, options: &SearchOptions) -> SearchOutput {
        let start = Instant::now();
        let options = options.sanitized();
        if options.tt_size_mb != self.tt_size_mb {
            self.searcher = Searcher::new(options.tt_size_mb);
            self.tt_size_mb = options.tt_size_mb;
        }
        self.threat_searcher.eval = options.evaluation;
        self.threat_searcher.vct_min_stones = options.vct_min_stones;

        let opponent = color.opponent();
        let candidates = generate_moves(board, color);
        if candidates.is_empty() {
            debug!("no candidates for {:?}: draw", color);
            return SearchOutput::decided(SearchType::Draw, None, 0, Vec::new(), 0, &options, start);
        }

        // Solvers and alpha-beta share one budget, counted from `start`
        let budget_for = |moves: usize| {
            (options.time_limit_ms > 0).then(|| {
                let budget = allocate_time(options.time_limit_ms, board.stone_count(), moves);
                start + Duration::from_millis(budget)
            })
        };
        let solver_deadline = budget_for(candidates.len());
        self.threat_searcher.deadline = solver_deadline;

        let mut solver_nodes = 0;

        let vcf = self.threat_searcher.search_vcf(board, color);
        solver_nodes += self.threat_searcher.nodes();
        if let Some(&first) = vcf.winning_sequence.first() {
            debug!("vcf for {:?}: {} moves, playing {}", color, vcf.winning_sequence.len(), first);
            let score = WIN_SCORE - vcf.winning_sequence.len() as i32;
            return SearchOutput::decided(
                SearchType::Vcf,
                Some(first),
                score,
                vcf.winning_sequence,
                solver_nodes,
                &options,
                start,
            );
        }

        let threats = find_five_moves(board, opponent);
        let mut search_type = SearchType::AlphaBeta;
        let mut root_moves = candidates;

        match threats.as_slice() {
            [] => {}
            [block] => {
                if !is_legal_for(board, *block, color) {
                    debug!("block {} is forbidden for {:?}: forced loss", block, color);
                    let position = root_moves.first().copied();
                    return SearchOutput::decided(
                        SearchType::ForcedLoss,
                        position,
                        -WIN_SCORE,
                        Vec::new(),
                        solver_nodes,
                        &options,
                        start,
                    );
                }
                debug!("opponent four: restricted to {}", block);
                root_moves = vec![*block];
                search_type = SearchType::ForcedBlock;
            }
            _ => {
                let position = threats
                    .iter()
                    .copied()
                    .find(|&p| is_legal_for(board, p, color))
                    .or_else(|| root_moves.first().copied());
                debug!("opponent has {} five points: forced loss", threats.len());
                return SearchOutput::decided(
                    SearchType::ForcedLoss,
                    position,
                    -WIN_SCORE,
                    Vec::new(),
                    solver_nodes,
                    &options,
                    start,
                );
            }
        }

        if threats.is_empty() {
            if has_open_three(board, opponent) {
                let mut replies: Vec<Pos> = open_three_breaks(board, opponent)
                    .into_iter()
                    .filter(|&p| is_legal_for(board, p, color))
                    .collect();
                replies.extend(find_four_moves(board, color));
                replies.sort();
                replies.dedup();
                if replies.is_empty() {
                    debug!("no legal answer to the open three, searching all candidates");
                } else {
                    debug!("opponent open three: {} replies", replies.len());
                    root_moves = replies;
                }
            }

            let out_of_time = || solver_deadline.is_some_and(|d| Instant::now() >= d);
            if out_of_time() {
                debug!("time budget spent before the solvers, skipping them");
            }

            if options.use_mise_vcf && !out_of_time() {
                let mise = self.threat_searcher.find_mise_vcf_sequence(board, color);
                solver_nodes += self.threat_searcher.nodes();
                if let Some(&first) = mise.winning_sequence.first() {
                    debug!("mise-vcf for {:?}: playing {}", color, first);
                    let score = WIN_SCORE - mise.winning_sequence.len() as i32;
                    return SearchOutput::decided(
                        SearchType::MiseVcf,
                        Some(first),
                        score,
                        mise.winning_sequence,
                        solver_nodes,
                        &options,
                        start,
                    );
                }
            }

            if options.use_vct && !out_of_time() {
                let vct = self.threat_searcher.search_vct(board, color);
                solver_nodes += self.threat_searcher.nodes();
                if let Some(&first) = vct.winning_sequence.first() {
                    debug!("vct for {:?}: playing {}", color, first);
                    let score = WIN_SCORE - vct.winning_sequence.len() as i32;
                    return SearchOutput::decided(
                        SearchType::Vct,
                        Some(first),
                        score,
                        vct.winning_sequence,
                        solver_nodes,
                        &options,
                        start,
                    );
                }
            }
        }

        let deadline = budget_for(root_moves.len());
        if let Some(d) = deadline {
            debug!(
                "{}ms left for {} root moves",
                d.saturating_duration_since(Instant::now()).as_millis(),
                root_moves.len()
            );
        }
        let limits = SearchLimits {
            max_depth: options.max_depth,
            deadline,
            node_limit: options.node_limit,
        };

        let result = self
            .searcher
            .search_moves(board, color, &root_moves, limits, &options.evaluation);
        SearchOutput::from_alphabeta(result, search_type, solver_nodes, &options, start)
    }

    /// Clear the transposition table cache.
    pub fn clear_cache(&mut self) {
        self.searcher.clear_tt();
    }

    /// Get transposition table statistics.
    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.searcher.tt_stats()
    }
}

impl Default for AIEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_board(stones: &[(u8, u8, Stone)]) -> Board {
        let mut board = Board::new();
        for &(r, c, s) in stones {
            board.place_stone(Pos::new(r, c), s);
        }
        board
    }

    fn quick(max_depth: i8) -> SearchOptions {
        SearchOptions {
            max_depth,
            time_limit_ms: 0,
            ..SearchOptions::default()
        }
    }

    #[test]
    fn test_empty_board_plays_center() {
        let mut engine = AIEngine::new();
        let output = engine.find_best_move_iterative(&Board::new(), Stone::Black, &quick(1));
        assert_eq!(output.position, Some(Pos::new(7, 7)));
        assert_eq!(output.completed_depth, 1);
        assert!(!output.interrupted);
    }

    #[test]
    fn test_full_board_is_draw() {
        let mut board = Board::new();
        for idx in 0..crate::board::TOTAL_CELLS {
            let s = if idx % 2 == 0 { Stone::Black } else { Stone::White };
            board.place_stone(Pos::from_index(idx), s);
        }
        let mut engine = AIEngine::new();
        let output = engine.find_best_move_iterative(&board, Stone::White, &quick(2));
        assert_eq!(output.position, None);
        assert_eq!(output.score, 0);
        assert_eq!(output.search_type, SearchType::Draw);
    }

    #[test]
    fn test_vcf_short_circuit() {
        let _ = env_logger::builder().is_test(true).try_init();
        // . X X X X . on row 7
        let board = setup_board(&[
            (7, 4, Stone::Black),
            (7, 5, Stone::Black),
            (7, 6, Stone::Black),
            (7, 7, Stone::Black),
            (9, 9, Stone::White),
        ]);
        let mut engine = AIEngine::new();
        let output = engine.find_best_move_iterative(&board, Stone::Black, &quick(4));
        assert_eq!(output.search_type, SearchType::Vcf);
        assert_eq!(output.position, Some(Pos::new(7, 3)));
        assert_eq!(output.score, WIN_SCORE - 1);
        assert_eq!(output.forced_sequence, vec![Pos::new(7, 3)]);
    }

    #[test]
    fn test_single_four_forces_block() {
        // O O O O . on row 9
        let mut board = setup_board(&[(5, 5, Stone::Black), (5, 6, Stone::Black)]);
        for i in 0..4 {
            board.place_stone(Pos::new(9, i), Stone::White);
        }
        let mut engine = AIEngine::new();
        let output = engine.find_best_move_iterative(&board, Stone::Black, &quick(2));
        assert_eq!(output.search_type, SearchType::ForcedBlock);
        assert_eq!(output.position, Some(Pos::new(9, 4)));
    }

    #[test]
    fn test_open_four_is_forced_loss() {
        // . O O O O . on row 9
        let mut board = setup_board(&[(5, 5, Stone::Black)]);
        for i in 1..5 {
            board.place_stone(Pos::new(9, i), Stone::White);
        }
        let mut engine = AIEngine::new();
        let output = engine.find_best_move_iterative(&board, Stone::Black, &quick(2));
        assert_eq!(output.search_type, SearchType::ForcedLoss);
        assert_eq!(output.score, -WIN_SCORE);
        assert_eq!(output.position, Some(Pos::new(9, 0)));
    }

    #[test]
    fn test_forbidden_block_is_forced_loss() {
        // White four on row 7 capped by X(7,12); its five point (7,7) is a
        // double three for black:
        //   row 5:  X . X
        //   row 6:  . X X
        //   row 7:  X . O O O O X   (cols 6..12)
        let board = setup_board(&[
            (5, 5, Stone::Black),
            (6, 6, Stone::Black),
            (5, 7, Stone::Black),
            (6, 7, Stone::Black),
            (7, 6, Stone::Black),
            (7, 12, Stone::Black),
            (7, 8, Stone::White),
            (7, 9, Stone::White),
            (7, 10, Stone::White),
            (7, 11, Stone::White),
        ]);
        let mut engine = AIEngine::new();
        let output = engine.find_best_move_iterative(&board, Stone::Black, &quick(2));
        assert_eq!(output.search_type, SearchType::ForcedLoss);
        assert_eq!(output.score, -WIN_SCORE);
        assert!(output.position.is_some());
        assert_ne!(output.position, Some(Pos::new(7, 7)));
    }

    #[test]
    fn test_open_three_restricts_replies() {
        // . O O O . on row 7
        let board = setup_board(&[
            (7, 6, Stone::White),
            (7, 7, Stone::White),
            (7, 8, Stone::White),
            (3, 3, Stone::Black),
            (11, 11, Stone::Black),
        ]);
        let mut engine = AIEngine::new();
        let output = engine.find_best_move_iterative(&board, Stone::Black, &quick(2));
        let breaks = open_three_breaks(&board, Stone::White);
        assert_eq!(output.search_type, SearchType::AlphaBeta);
        assert!(output.position.is_some_and(|p| breaks.contains(&p)));
    }

    #[test]
    fn test_deterministic_output() {
        let board = setup_board(&[
            (7, 7, Stone::Black),
            (7, 8, Stone::White),
            (8, 8, Stone::Black),
        ]);
        let options = SearchOptions {
            collect_candidates: true,
            collect_depth_history: true,
            ..quick(2)
        };

        let mut engine = AIEngine::new();
        let mut first = engine.find_best_move_iterative(&board, Stone::White, &options);
        let mut second = engine.find_best_move_iterative(&board, Stone::White, &options);
        first.elapsed_ms = 0;
        second.elapsed_ms = 0;
        assert_eq!(first, second);
    }

    #[test]
    fn test_warmed_table_selects_same_move() {
        let warmup = setup_board(&[(7, 7, Stone::Black), (6, 6, Stone::White)]);
        let board = setup_board(&[
            (7, 7, Stone::Black),
            (7, 8, Stone::White),
            (8, 8, Stone::Black),
        ]);

        let mut warmed = AIEngine::new();
        let _ = warmed.find_best_move_iterative(&warmup, Stone::Black, &quick(2));
        let a = warmed.find_best_move_iterative(&board, Stone::White, &quick(2));

        let mut fresh = AIEngine::new();
        let b = fresh.find_best_move_iterative(&board, Stone::White, &quick(2));

        assert_eq!(a.position, b.position);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn test_diagnostics_collected_on_request() {
        let board = setup_board(&[(7, 7, Stone::Black), (7, 8, Stone::White)]);
        let mut engine = AIEngine::new();

        let plain = engine.find_best_move_iterative(&board, Stone::Black, &quick(2));
        assert!(plain.candidates.is_none());
        assert!(plain.depth_history.is_none());

        let options = SearchOptions {
            collect_candidates: true,
            collect_depth_history: true,
            ..quick(2)
        };
        let output = engine.find_best_move_iterative(&board, Stone::Black, &options);
        let candidates = output.candidates.unwrap();
        assert!(!candidates.is_empty());
        assert_eq!(candidates[0].score, output.score);
        assert!(candidates.iter().all(|c| c.score <= output.score));
        assert_eq!(
            output.depth_history.map(|h| h.len()),
            Some(output.completed_depth as usize)
        );
    }

    /// Ten stones of each color on rows and columns 4..=10, no two of a color
    /// within five cells on any line, so neither side has a threat.
    fn quiet_board() -> Board {
        let mut board = Board::new();
        for r in 4..=10u8 {
            for c in 4..=10u8 {
                match (r + 2 * c) % 5 {
                    0 => board.place_stone(Pos::new(r, c), Stone::Black),
                    2 => board.place_stone(Pos::new(r, c), Stone::White),
                    _ => {}
                }
            }
        }
        board
    }

    #[test]
    fn test_time_limit_interrupts() {
        let board = quiet_board();
        assert_eq!(board.stone_count(), 20);

        let options = SearchOptions {
            max_depth: 20,
            time_limit_ms: 100,
            ..SearchOptions::default()
        };
        let mut engine = AIEngine::new();
        let output = engine.find_best_move_iterative(&board, Stone::Black, &options);

        assert_eq!(output.search_type, SearchType::AlphaBeta);
        assert!(output.interrupted);
        assert!(output.position.is_some_and(|p| board.is_empty(p)));
        assert!(output.completed_depth < 20);
        assert!(output.elapsed_ms < 2_000, "took {}ms", output.elapsed_ms);
    }

    #[test]
    fn test_clear_cache_empties_table() {
        let board = setup_board(&[(7, 7, Stone::Black), (7, 8, Stone::White)]);
        let mut engine = AIEngine::new();
        let _ = engine.find_best_move_iterative(&board, Stone::Black, &quick(2));
        assert!(engine.tt_stats().used > 0);

        engine.clear_cache();
        assert_eq!(engine.tt_stats().used, 0);
    }

    #[test]
    fn test_node_limit_interrupts() {
        let board = setup_board(&[
            (7, 7, Stone::Black),
            (7, 8, Stone::White),
            (8, 8, Stone::Black),
        ]);
        let options = SearchOptions {
            node_limit: Some(1),
            ..quick(10)
        };
        let mut engine = AIEngine::new();
        let output = engine.find_best_move_iterative(&board, Stone::White, &options);
        assert!(output.interrupted);
        assert!(output.position.is_some());
        assert!(output.completed_depth < 10);
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let board = setup_board(&[(7, 7, Stone::Black), (7, 8, Stone::White)]);
        let options = SearchOptions {
            random_factor: 1.0,
            random_seed: Some(42),
            ..quick(2)
        };
        let mut engine = AIEngine::new();
        let a = engine.find_best_move_iterative(&board, Stone::Black, &options);
        let b = engine.find_best_move_iterative(&board, Stone::Black, &options);
        assert_eq!(a.position, b.position);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn test_allocate_time() {
        assert_eq!(allocate_time(1000, 2, 30), 300);
        assert_eq!(allocate_time(1000, 8, 30), 600);
        assert_eq!(allocate_time(1000, 20, 30), 1000);
        assert_eq!(allocate_time(1000, 20, 2), 500);
        assert_eq!(allocate_time(1000, 20, 1), 250);
        assert_eq!(allocate_time(1000, 3, 1), 75);
    }

    #[test]
    fn test_options_from_json_clamps() {
        let options = SearchOptions::from_json(r#"{ "max_depth": 0, "random_factor": 2.5, "use_vct": false }"#).unwrap();
        assert_eq!(options.max_depth, 1);
        assert_eq!(options.random_factor, 1.0);
        assert!(!options.use_vct);
        assert_eq!(options.time_limit_ms, SearchOptions::default().time_limit_ms);
    }

    #[test]
    fn test_options_bad_json() {
        let err = SearchOptions::from_json(r#"{ "max_depth": "deep" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_output_serializes() {
        let mut engine = AIEngine::new();
        let output = engine.find_best_move_iterative(&Board::new(), Stone::Black, &quick(1));
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"search_type\":\"alpha_beta\""));
        let back: SearchOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, output);
    }
}
