//! Renju AI Engine
//!
//! A search engine for Renju, the professional variant of five-in-a-row:
//! - Standard 15x15 board, black moves first
//! - Black wins only with exactly five; white wins with five or more
//! - Black may not play an overline, a double-four or a double-three
//!
//! # Architecture
//!
//! The engine is organized into several modules:
//! - [`board`]: Board representation with bitboards and a checked game record
//! - [`rules`]: Game rules (win detection, forbidden moves, threat scans)
//! - [`eval`]: Pattern scores and position evaluation
//! - [`search`]: Search algorithms (alpha-beta, VCF/Mise-VCF/VCT)
//! - [`engine`]: Main AI engine integrating all components
//! - [`error`]: Typed errors for moves and configuration
//!
//! # Quick Start
//!
//! ```
//! use renju::{AIEngine, Board, Pos, SearchOptions, Stone};
//!
//! let mut board = Board::new();
//! board.place_stone(Pos::new(7, 7), Stone::Black);
//!
//! // AI responds as White with a shallow search
//! let mut engine = AIEngine::new();
//! let options = SearchOptions { max_depth: 2, ..SearchOptions::default() };
//! let output = engine.find_best_move_iterative(&board, Stone::White, &options);
//! if let Some(pos) = output.position {
//!     board.place_stone(pos, Stone::White);
//! }
//! assert_eq!(board.stone_count(), 2);
//! ```
//!
//! # Search Priority
//!
//! The AI engine follows this search priority:
//! 1. VCF - Victory by Continuous Fours (covers an immediate five)
//! 2. Defense against the opponent's fours and open threes
//! 3. Mise-VCF and VCT, when enabled
//! 4. Alpha-Beta search with transposition table
//!
//! The library logs through the `log` facade and never installs a logger.

pub mod board;
pub mod engine;
pub mod error;
pub mod eval;
pub mod rules;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{Board, GameRecord, Pos, Stone, BOARD_SIZE, CENTER};
pub use engine::{allocate_time, AIEngine, SearchOptions, SearchOutput, SearchType};
pub use error::{ConfigError, MoveError};
pub use eval::{EvalOptions, PatternScores};
pub use rules::{ForbiddenKind, ForbiddenMoveResult};
pub use search::{CandidateScore, DepthRecord, SearchStats};
