//! Transposition Table for caching search results
//!
//! The transposition table stores search results indexed by position hash,
//! enabling reuse of previous search results for positions we've seen before.
//!
//! Every entry carries the generation it was written in. Starting a new search
//! bumps the generation, after which older entries are invisible to probes and
//! free to overwrite, so a table reused across searches selects the same moves
//! as a fresh one.
//!
//! The table takes `&mut self` for writes and is meant to be owned by a single
//! search. Sharing one across threads needs outside synchronization.
//!
//! # Example
//!
//! ```
//! use renju::board::Pos;
//! use renju::search::{TranspositionTable, EntryType};
//!
//! let mut tt = TranspositionTable::new(1); // 1 MB
//!
//! // Store a search result
//! let hash = 0x123456789ABCDEF0;
//! tt.store(hash, 100, 5, EntryType::Exact, Some(Pos::new(7, 7)));
//!
//! // Probe for the result
//! if let Some(entry) = tt.probe(hash) {
//!     assert_eq!(entry.cutoff(5, -1000, 1000), Some(100));
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::board::Pos;

use super::WIN_THRESHOLD;

/// Entry type for score interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    /// Exact score - the search completed normally
    Exact,
    /// Lower bound - score >= stored value (beta cutoff)
    LowerBound,
    /// Upper bound - score <= stored value (alpha fail-low)
    UpperBound,
}

/// Transposition table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    /// Hash of the position (board hash XOR side-to-move key)
    pub hash: u64,
    /// Remaining search depth for this entry
    pub depth: i8,
    /// Score, with win scores stored relative to this node
    pub score: i32,
    /// Type of score (exact, lower bound, upper bound)
    pub entry_type: EntryType,
    /// Best move found for this position
    pub best_move: Option<Pos>,
    /// Search generation that wrote the entry
    pub generation: u8,
}

impl TTEntry {
    /// Score usable at `depth` within `(alpha, beta)`, if the stored bound
    /// settles the node.
    ///
    /// An exact score settles it outright. A lower bound raises alpha and an
    /// upper bound lowers beta; the node is settled when the window closes.
    #[inline]
    #[must_use]
    pub fn cutoff(&self, depth: i8, alpha: i32, beta: i32) -> Option<i32> {
        if self.depth < depth {
            return None;
        }
        let (lo, hi) = match self.entry_type {
            EntryType::Exact => return Some(self.score),
            EntryType::LowerBound => (alpha.max(self.score), beta),
            EntryType::UpperBound => (alpha, beta.min(self.score)),
        };
        (lo >= hi).then_some(self.score)
    }
}

/// Convert a score at `ply` from the root into a node-relative score for storage.
#[inline]
#[must_use]
pub fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score >= WIN_THRESHOLD {
        score + ply
    } else if score <= -WIN_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// Inverse of [`score_to_tt`]: rebase a stored score to distance from the root.
#[inline]
#[must_use]
pub fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score >= WIN_THRESHOLD {
        score - ply
    } else if score <= -WIN_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// Transposition table for caching search results.
///
/// Uses a simple direct-mapped approach where each hash maps to exactly
/// one slot. Collisions are handled by replacement policies based on
/// generation and search depth.
pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    size: usize,
    generation: u8,
}

impl TranspositionTable {
    /// Create a new transposition table with the given size in megabytes.
    ///
    /// # Example
    ///
    /// ```
    /// use renju::search::TranspositionTable;
    ///
    /// let tt = TranspositionTable::new(16); // 16 MB table
    /// ```
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let entry_size = std::mem::size_of::<Option<TTEntry>>();
        let size = (size_mb * 1024 * 1024) / entry_size;

        // Ensure at least some entries
        let size = size.max(1024);

        Self {
            entries: vec![None; size],
            size,
            generation: 1,
        }
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash % self.size as u64) as usize
    }

    /// Current search generation.
    #[inline]
    pub fn generation(&self) -> u8 {
        self.generation
    }

    /// Start a new search. Entries from earlier generations are ignored from
    /// now on. When the counter would wrap the table is cleared instead.
    pub fn new_generation(&mut self) {
        if self.generation == u8::MAX {
            self.clear();
            self.generation = 1;
        } else {
            self.generation += 1;
        }
    }

    /// Probe the table for a position written in the current generation.
    #[inline]
    #[must_use]
    pub fn probe(&self, hash: u64) -> Option<TTEntry> {
        self.entries[self.index(hash)]
            .filter(|e| e.hash == hash && e.generation == self.generation)
    }

    /// Get best move from the table for move ordering.
    #[must_use]
    pub fn get_best_move(&self, hash: u64) -> Option<Pos> {
        self.probe(hash).and_then(|e| e.best_move)
    }

    /// Store a position in the table.
    ///
    /// An empty or stale slot is always written. A slot from the current
    /// generation is replaced only by a result at least as deep.
    pub fn store(
        &mut self,
        hash: u64,
        score: i32,
        depth: i8,
        entry_type: EntryType,
        best_move: Option<Pos>,
    ) {
        let idx = self.index(hash);
        let generation = self.generation;

        let should_replace = match &self.entries[idx] {
            None => true,
            Some(e) => e.generation != generation || depth >= e.depth,
        };

        if should_replace {
            self.entries[idx] = Some(TTEntry {
                hash,
                depth,
                score,
                entry_type,
                best_move,
                generation,
            });
        }
    }

    /// Clear all entries in the table.
    pub fn clear(&mut self) {
        self.entries.fill(None);
    }

    /// Usage of the table by the current generation.
    #[must_use]
    pub fn stats(&self) -> TTStats {
        let used = self
            .entries
            .iter()
            .filter(|e| e.is_some_and(|e| e.generation == self.generation))
            .count();
        TTStats {
            size: self.size,
            used,
            usage_percent: (used as f64 / self.size as f64 * 100.0) as u8,
        }
    }
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TTStats {
    /// Total number of slots in the table
    pub size: usize,
    /// Number of slots holding current-generation entries
    pub used: usize,
    /// Percentage of table in use (0-100)
    pub usage_percent: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::WIN_SCORE;

    #[test]
    fn test_tt_store_probe_exact() {
        let mut tt = TranspositionTable::new(1);
        let hash = 0x123456789ABCDEF0;

        tt.store(hash, 100, 5, EntryType::Exact, Some(Pos::new(7, 7)));

        let entry = tt.probe(hash).unwrap();
        assert_eq!(entry.cutoff(5, -1000, 1000), Some(100));
        assert_eq!(entry.best_move, Some(Pos::new(7, 7)));
    }

    #[test]
    fn test_tt_depth_requirement() {
        let mut tt = TranspositionTable::new(1);
        let hash = 0x123456789ABCDEF0;

        tt.store(hash, 100, 3, EntryType::Exact, Some(Pos::new(5, 5)));

        // Deeper search cannot use the shallow score, but still gets the move
        let entry = tt.probe(hash).unwrap();
        assert_eq!(entry.cutoff(5, -1000, 1000), None);
        assert_eq!(tt.get_best_move(hash), Some(Pos::new(5, 5)));
    }

    #[test]
    fn test_tt_lower_bound_cutoff() {
        let mut tt = TranspositionTable::new(1);
        let hash = 0x123456789ABCDEF0;

        tt.store(hash, 200, 5, EntryType::LowerBound, None);
        let entry = tt.probe(hash).unwrap();

        // Score (200) >= beta (150)
        assert_eq!(entry.cutoff(5, -1000, 150), Some(200));
        // Score (200) < beta (300)
        assert_eq!(entry.cutoff(5, -1000, 300), None);
    }

    #[test]
    fn test_tt_upper_bound_cutoff() {
        let mut tt = TranspositionTable::new(1);
        let hash = 0x123456789ABCDEF0;

        tt.store(hash, 50, 5, EntryType::UpperBound, None);
        let entry = tt.probe(hash).unwrap();

        // Score (50) <= alpha (100)
        assert_eq!(entry.cutoff(5, 100, 1000), Some(50));
        // Score (50) > alpha (30)
        assert_eq!(entry.cutoff(5, 30, 1000), None);
    }

    #[test]
    fn test_tt_hash_mismatch() {
        let mut tt = TranspositionTable::new(1);
        let size = tt.size as u64;
        let hash1 = 0x1234_5678;
        // Same slot, different position
        let hash2 = hash1 + size;

        tt.store(hash1, 100, 5, EntryType::Exact, Some(Pos::new(7, 7)));
        assert!(tt.probe(hash2).is_none());
        assert_eq!(tt.get_best_move(hash2), None);
    }

    #[test]
    fn test_tt_replacement_by_depth() {
        let mut tt = TranspositionTable::new(1);
        let hash = 0x123456789ABCDEF0;

        tt.store(hash, 100, 3, EntryType::Exact, Some(Pos::new(5, 5)));
        tt.store(hash, 200, 5, EntryType::Exact, Some(Pos::new(7, 7)));
        assert_eq!(tt.probe(hash).unwrap().score, 200);

        // Same depth replaces
        tt.store(hash, 300, 5, EntryType::Exact, Some(Pos::new(8, 8)));
        assert_eq!(tt.probe(hash).unwrap().score, 300);

        // Shallower does not
        tt.store(hash, 400, 2, EntryType::Exact, None);
        let entry = tt.probe(hash).unwrap();
        assert_eq!(entry.score, 300);
        assert_eq!(entry.depth, 5);
    }

    #[test]
    fn test_tt_generation_hides_stale_entries() {
        let mut tt = TranspositionTable::new(1);
        let hash = 0xABCD;

        tt.store(hash, 100, 9, EntryType::Exact, Some(Pos::new(7, 7)));
        tt.new_generation();
        assert!(tt.probe(hash).is_none());
        assert_eq!(tt.stats().used, 0);

        // A stale deep entry is overwritten by a shallow current one
        tt.store(hash, 7, 1, EntryType::UpperBound, None);
        let entry = tt.probe(hash).unwrap();
        assert_eq!(entry.depth, 1);
        assert_eq!(entry.generation, tt.generation());
    }

    #[test]
    fn test_tt_generation_wraps_by_clearing() {
        let mut tt = TranspositionTable::new(0);
        for _ in 1..u8::MAX {
            tt.new_generation();
        }
        assert_eq!(tt.generation(), u8::MAX);
        tt.store(0x77, 1, 1, EntryType::Exact, None);
        tt.new_generation();
        assert_eq!(tt.generation(), 1);
        assert_eq!(tt.stats().used, 0);
    }

    #[test]
    fn test_tt_clear() {
        let mut tt = TranspositionTable::new(1);
        let hash = 0x123456789ABCDEF0;

        tt.store(hash, 100, 5, EntryType::Exact, None);
        tt.clear();

        assert!(tt.probe(hash).is_none());
    }

    #[test]
    fn test_tt_stats() {
        let mut tt = TranspositionTable::new(1);

        let stats = tt.stats();
        assert_eq!(stats.used, 0);
        assert_eq!(stats.usage_percent, 0);

        tt.store(0x111, 100, 5, EntryType::Exact, None);
        tt.store(0x222, 100, 5, EntryType::Exact, None);

        let stats = tt.stats();
        assert_eq!(stats.used, 2);
        assert!(stats.size > 0);
    }

    #[test]
    fn test_tt_minimum_size() {
        // Even with 0 MB, should have minimum entries
        let tt = TranspositionTable::new(0);
        assert!(tt.size >= 1024);
    }

    #[test]
    fn test_win_score_rebasing() {
        // Win found 7 plies below the root, stored at a node 3 plies deep
        let root_relative = WIN_SCORE - 7;
        let stored = score_to_tt(root_relative, 3);
        assert_eq!(stored, WIN_SCORE - 4);
        // Reached again at ply 5 it is 9 plies away from the root
        assert_eq!(score_from_tt(stored, 5), WIN_SCORE - 9);

        assert_eq!(score_from_tt(score_to_tt(-(WIN_SCORE - 6), 2), 2), -(WIN_SCORE - 6));
        assert_eq!(score_to_tt(1234, 9), 1234);
        assert_eq!(score_from_tt(-1234, 9), -1234);
    }
}
