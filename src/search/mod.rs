//! Search module for the Renju engine
//!
//! Contains:
//! - Zobrist hashing for position identification
//! - Transposition table for caching search results
//! - Candidate generation, move ordering, killer and history tables
//! - Alpha-Beta search with iterative deepening
//! - VCF/VCT threat search for forced wins

pub mod alphabeta;
pub mod movegen;
pub mod threat;
pub mod tt;
pub mod zobrist;

/// Score of a won position at the root. Wins found `n` plies away score
/// `WIN_SCORE - n`, so shorter wins are preferred.
pub const WIN_SCORE: i32 = 10_000_000;

/// Window bound strictly outside every reachable score.
pub const INF: i32 = WIN_SCORE + 1;

/// Scores at or beyond this magnitude are proven wins or losses.
pub const WIN_THRESHOLD: i32 = WIN_SCORE - 1_000;

/// Half-width of the aspiration window around the previous iteration's score.
pub const ASPIRATION_WINDOW: i32 = 1_000;

pub use alphabeta::{
    CandidateScore, DepthRecord, SearchContext, SearchLimits, SearchResult, SearchStats, Searcher,
};
pub use movegen::{
    generate_moves, generate_scored_moves, generate_sorted_moves, order_moves, HistoryTable,
    KillerTable, OrderingHints, ScoredMove,
};
pub use threat::{ThreatResult, ThreatSearcher};
pub use tt::{EntryType, TTEntry, TTStats, TranspositionTable};
pub use zobrist::{compute_board_hash, update_hash, ZobristTable};
