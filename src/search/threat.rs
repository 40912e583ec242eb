//! VCF/VCT threat search for forced wins
//!
//! This module implements specialized threat-space search algorithms:
//! - VCF (Victory by Continuous Fours): every attacking move makes a four, so
//!   each defender reply is forced
//! - Mise-VCF: one quiet "bait" move after which a VCF exists that no defender
//!   reply can stop
//! - VCT (Victory by Continuous Threats): also allows open threes, and must
//!   refute every defence (an AND/OR search)
//!
//! Forbidden moves matter on both sides. A forbidden cell is never an attacking
//! move for black, and when black is defending, a forced reply that is forbidden
//! cannot be played. A win that relies on that is flagged as a forbidden trap.
//!
//! Sequences alternate attacker moves and defender replies, starting with the
//! attacker and ending with the attacker's five or with a four that cannot be
//! blocked.

use std::time::Instant;

use log::trace;

use crate::board::{Board, Pos, Stone};
use crate::eval::{evaluate_position, EvalOptions};
use crate::rules::forbidden::forbidden_kind;
use crate::rules::threats::{
    creates_four, creates_open_three, find_five_moves, find_four_moves, five_points_after,
    has_open_three, is_legal_for, line_neighbors, threat_defenses,
};
use crate::rules::makes_five;

use super::movegen::generate_moves;

/// Bait moves tried by the Mise-VCF search
const MAX_MISE_BAITS: usize = 12;

/// Result of a VCF/VCT search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreatResult {
    /// Whether a forced win was found
    pub found: bool,
    /// The winning line, attacker and defender moves alternating
    pub winning_sequence: Vec<Pos>,
    /// The win relies on a forced reply that is forbidden for black
    pub forbidden_trap: bool,
    /// Nothing was found but the depth or node limit cut the search short
    pub depth_limited: bool,
}

impl ThreatResult {
    /// Create a result indicating no forced win was found
    #[inline]
    fn not_found(depth_limited: bool) -> Self {
        Self {
            depth_limited,
            ..Self::default()
        }
    }

    #[inline]
    fn from_win(win: Win) -> Self {
        Self {
            found: true,
            winning_sequence: win.line,
            forbidden_trap: win.trap,
            depth_limited: false,
        }
    }
}

/// A proven line, built from the leaf upward.
struct Win {
    line: Vec<Pos>,
    trap: bool,
}

impl Win {
    fn at(pos: Pos) -> Self {
        Self {
            line: vec![pos],
            trap: false,
        }
    }

    fn trap(pos: Pos) -> Self {
        Self {
            line: vec![pos],
            trap: true,
        }
    }

    fn prepend(mut self, moves: &[Pos]) -> Self {
        self.line.splice(0..0, moves.iter().copied());
        self
    }
}

/// Threat searcher for VCF/VCT algorithms
pub struct ThreatSearcher {
    /// Maximum number of attacker fours in a VCF line
    pub max_vcf_depth: u32,
    /// Maximum number of attacker threats in a VCT line
    pub max_vct_depth: u32,
    /// Below this many stones VCT only runs the VCF check
    pub vct_min_stones: u32,
    /// Node budget per public search call
    pub node_limit: u64,
    /// Searches stop once this instant has passed, checked every 1024 nodes
    pub deadline: Option<Instant>,
    /// Options used to order bait and threat candidates
    pub eval: EvalOptions,
    nodes: u64,
    limited: bool,
    stopped: bool,
}

impl ThreatSearcher {
    /// Create a new threat searcher with default limits
    pub fn new() -> Self {
        Self {
            max_vcf_depth: 30,
            max_vct_depth: 12,
            vct_min_stones: 20,
            node_limit: 200_000,
            deadline: None,
            eval: EvalOptions::default(),
            nodes: 0,
            limited: false,
            stopped: false,
        }
    }

    /// Create a threat searcher with custom depth limits
    pub fn with_depths(vcf_depth: u32, vct_depth: u32) -> Self {
        Self {
            max_vcf_depth: vcf_depth,
            max_vct_depth: vct_depth,
            ..Self::new()
        }
    }

    /// Nodes visited by the last search call
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Reset node counter
    pub fn reset_nodes(&mut self) {
        self.nodes = 0;
        self.limited = false;
        self.stopped = false;
    }

    /// Reset the counters for a new public call. An expired deadline stops
    /// the call before its first node.
    fn begin(&mut self) {
        self.reset_nodes();
        if self.out_of_time() {
            self.stop();
        }
    }

    #[inline]
    fn out_of_time(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    #[inline]
    fn stop(&mut self) {
        self.stopped = true;
        self.limited = true;
    }

    #[inline]
    fn exhausted(&self) -> bool {
        self.stopped
    }

    #[inline]
    fn tick(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        self.nodes += 1;
        if self.nodes > self.node_limit || (self.nodes & 1023 == 0 && self.out_of_time()) {
            trace!("threat search stopped after {} nodes", self.nodes);
            self.stop();
            return false;
        }
        true
    }

    // =========================================================================
    // VCF
    // =========================================================================

    /// Search for VCF (Victory by Continuous Fours)
    ///
    /// The attacker only plays moves that make a four; the defender's reply is
    /// the single completion cell. A four with two completion cells wins, as
    /// does a completion cell that black is not allowed to play.
    pub fn search_vcf(&mut self, board: &Board, attacker: Stone) -> ThreatResult {
        self.begin();
        let mut work = *board;
        let result = match self.vcf(&mut work, attacker, 0) {
            Some(win) => ThreatResult::from_win(win),
            None => ThreatResult::not_found(self.limited),
        };
        trace!(
            "vcf {:?}: found={} nodes={} limited={}",
            attacker,
            result.found,
            self.nodes,
            self.limited
        );
        result
    }

    /// Winning VCF line for `attacker`, if one exists within the limits.
    pub fn find_vcf_sequence(&mut self, board: &Board, attacker: Stone) -> Option<Vec<Pos>> {
        let result = self.search_vcf(board, attacker);
        result.found.then_some(result.winning_sequence)
    }

    /// Whether `attacker` has a VCF.
    pub fn has_vcf(&mut self, board: &Board, attacker: Stone) -> bool {
        self.search_vcf(board, attacker).found
    }

    fn vcf(&mut self, board: &mut Board, attacker: Stone, depth: u32) -> Option<Win> {
        if !self.tick() {
            return None;
        }
        if let Some(&five) = find_five_moves(board, attacker).first() {
            return Some(Win::at(five));
        }
        if depth >= self.max_vcf_depth {
            self.limited = true;
            return None;
        }

        let defender = attacker.opponent();
        let defender_fives = find_five_moves(board, defender);
        if defender_fives.len() >= 2 {
            return None;
        }

        let mut fours = find_four_moves(board, attacker);
        // A defender four must be answered, so only a four on its five point keeps the initiative
        if let Some(&block) = defender_fives.first() {
            fours.retain(|&m| m == block);
        }

        for m in fours {
            let completions = five_points_after(board, m, attacker);
            board.place_stone(m, attacker);

            let outcome = match completions.as_slice() {
                [] => None,
                [reply] => {
                    let reply = *reply;
                    if defender == Stone::Black && forbidden_kind(board, reply).is_some() {
                        Some(Win::trap(m))
                    } else {
                        board.place_stone(reply, defender);
                        let sub = self.vcf(board, attacker, depth + 1);
                        board.remove_stone(reply);
                        sub.map(|w| w.prepend(&[m, reply]))
                    }
                }
                _ => Some(Win::at(m)),
            };

            board.remove_stone(m);
            if outcome.is_some() {
                return outcome;
            }
        }
        None
    }

    // =========================================================================
    // Mise-VCF
    // =========================================================================

    /// Search for a bait move followed by an unstoppable VCF.
    ///
    /// Skipped when the defender has an open three or a four, since the
    /// defender could then ignore the bait. A bait is accepted when, after it,
    /// the attacker has a VCF and still has one after every legal defender
    /// reply near the stones.
    pub fn find_mise_vcf_sequence(&mut self, board: &Board, attacker: Stone) -> ThreatResult {
        self.begin();
        let defender = attacker.opponent();
        if has_open_three(board, defender) || !find_five_moves(board, defender).is_empty() {
            return ThreatResult::not_found(self.limited);
        }

        let mut work = *board;
        for bait in self.bait_moves(board, attacker) {
            work.place_stone(bait, attacker);
            let found = self.mise_holds(&mut work, attacker);
            work.remove_stone(bait);

            if let Some(win) = found {
                trace!("mise-vcf {:?}: bait {} nodes={}", attacker, bait, self.nodes);
                return ThreatResult::from_win(win.prepend(&[bait]));
            }
            if self.exhausted() {
                break;
            }
        }
        ThreatResult::not_found(self.limited)
    }

    /// Quiet candidate moves near the attacker's stones, best first.
    fn bait_moves(&self, board: &Board, attacker: Stone) -> Vec<Pos> {
        let mut baits: Vec<(i32, Pos)> = line_neighbors(board, attacker, 2)
            .into_iter()
            .filter(|&p| {
                is_legal_for(board, p, attacker)
                    && !makes_five(board, p, attacker)
                    && !creates_four(board, p, attacker)
            })
            .map(|p| (evaluate_position(board, p, attacker, &self.eval), p))
            .collect();
        baits.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        baits.into_iter().take(MAX_MISE_BAITS).map(|(_, p)| p).collect()
    }

    /// After the bait: the VCF line if it survives every defender reply.
    ///
    /// Replies on the line and defender fours go first, as they refute most
    /// baits. A search cut short by the budget counts as refuted.
    fn mise_holds(&mut self, board: &mut Board, attacker: Stone) -> Option<Win> {
        let defender = attacker.opponent();
        let win = self.vcf(board, attacker, 0)?;

        let mut first: Vec<Pos> = win.line.clone();
        first.extend(find_four_moves(board, defender));
        first.sort();
        first.dedup();
        first.retain(|&r| is_legal_for(board, r, defender));

        let rest = generate_moves(board, defender)
            .into_iter()
            .filter(|r| first.binary_search(r).is_err());
        let replies: Vec<Pos> = first.iter().copied().chain(rest).collect();

        for r in replies {
            board.place_stone(r, defender);
            let holds = self.vcf(board, attacker, 0).is_some();
            board.remove_stone(r);
            if !holds {
                return None;
            }
        }
        Some(win)
    }

    // =========================================================================
    // VCT
    // =========================================================================

    /// Search for VCT (Victory by Continuous Threats) up to `max_vct_depth`.
    pub fn search_vct(&mut self, board: &Board, attacker: Stone) -> ThreatResult {
        let depth = self.max_vct_depth;
        match self.find_vct_sequence(board, attacker, depth) {
            Some((line, trap)) => ThreatResult {
                found: true,
                winning_sequence: line,
                forbidden_trap: trap,
                depth_limited: false,
            },
            None => ThreatResult::not_found(false),
        }
    }

    /// Winning VCT line and its forbidden-trap flag, searching at most
    /// `max_depth` attacker threats.
    ///
    /// VCF is tried first. Below `vct_min_stones` stones only VCF runs.
    /// Running out of depth or nodes counts as "not found".
    pub fn find_vct_sequence(
        &mut self,
        board: &Board,
        attacker: Stone,
        max_depth: u32,
    ) -> Option<(Vec<Pos>, bool)> {
        let vcf = self.search_vcf(board, attacker);
        if vcf.found {
            return Some((vcf.winning_sequence, vcf.forbidden_trap));
        }
        if board.stone_count() < self.vct_min_stones {
            return None;
        }

        self.begin();
        let mut work = *board;
        let win = self.vct_attack(&mut work, attacker, 0, max_depth);
        trace!(
            "vct {:?}: found={} nodes={}",
            attacker,
            win.is_some(),
            self.nodes
        );
        win.map(|w| (w.line, w.trap))
    }

    /// Whether `attacker` has a VCT.
    pub fn has_vct(&mut self, board: &Board, attacker: Stone) -> bool {
        let depth = self.max_vct_depth;
        self.find_vct_sequence(board, attacker, depth).is_some()
    }

    /// OR node: any threat that beats every defence wins.
    fn vct_attack(&mut self, board: &mut Board, attacker: Stone, depth: u32, max_depth: u32) -> Option<Win> {
        if !self.tick() {
            return None;
        }
        if let Some(&five) = find_five_moves(board, attacker).first() {
            return Some(Win::at(five));
        }

        let defender = attacker.opponent();
        let defender_fives = find_five_moves(board, defender);
        if defender_fives.len() >= 2 {
            return None;
        }

        if let Some(win) = self.vcf(board, attacker, 0) {
            return Some(win);
        }
        if depth >= max_depth || self.exhausted() {
            return None;
        }

        for m in self.threat_moves(board, attacker, defender_fives.first().copied()) {
            board.place_stone(m, attacker);
            let outcome = self.vct_defend(board, m, attacker, depth, max_depth);
            board.remove_stone(m);

            if let Some(win) = outcome {
                return Some(win.prepend(&[m]));
            }
            if self.exhausted() {
                return None;
            }
        }
        None
    }

    /// AND node: the attacker just played `threat`; every reply must lose.
    fn vct_defend(
        &mut self,
        board: &mut Board,
        threat: Pos,
        attacker: Stone,
        depth: u32,
        max_depth: u32,
    ) -> Option<Win> {
        let defender = attacker.opponent();
        if !find_five_moves(board, defender).is_empty() {
            return None;
        }

        // Against a four the only reply is its five point; against a three,
        // any breaking cell or a counter-four
        let attacker_fives = find_five_moves(board, attacker);
        let candidates = match attacker_fives.len() {
            0 => {
                let mut cells = threat_defenses(board, threat, attacker);
                cells.extend(find_four_moves(board, defender));
                cells.sort();
                cells.dedup();
                cells
            }
            1 => attacker_fives,
            _ => return Some(Win { line: Vec::new(), trap: false }),
        };

        let (legal, forbidden): (Vec<Pos>, Vec<Pos>) =
            candidates.into_iter().partition(|&r| is_legal_for(board, r, defender));

        let mut trap = false;
        let mut principal: Option<Win> = None;
        for r in legal {
            board.place_stone(r, defender);
            let sub = self.vct_attack(board, attacker, depth + 1, max_depth);
            board.remove_stone(r);

            let sub = sub?;
            trap |= sub.trap;
            if principal.is_none() {
                principal = Some(sub.prepend(&[r]));
            }
        }

        if !trap {
            trap = self.forbidden_reply_holds(board, &forbidden, attacker, depth, max_depth);
        }

        let mut win = principal.unwrap_or(Win { line: Vec::new(), trap: false });
        win.trap = trap;
        Some(win)
    }

    /// Whether any of the defender's forbidden `replies`, if it could be
    /// played, would stop the attack. Only then does the win rely on the
    /// forbidden rule.
    fn forbidden_reply_holds(
        &mut self,
        board: &mut Board,
        replies: &[Pos],
        attacker: Stone,
        depth: u32,
        max_depth: u32,
    ) -> bool {
        let defender = attacker.opponent();
        for &r in replies {
            board.place_stone(r, defender);
            let holds = self.vct_attack(board, attacker, depth + 1, max_depth).is_none();
            board.remove_stone(r);
            if holds {
                return true;
            }
        }
        false
    }

    /// Fours and open-three moves for `attacker`, best first. With a defender
    /// four on the board only its five point qualifies.
    fn threat_moves(&self, board: &Board, attacker: Stone, forced: Option<Pos>) -> Vec<Pos> {
        let cells = match forced {
            Some(block) => vec![block],
            None => line_neighbors(board, attacker, 3),
        };
        let mut moves: Vec<(i32, Pos)> = cells
            .into_iter()
            .filter(|&p| {
                is_legal_for(board, p, attacker)
                    && (creates_four(board, p, attacker) || creates_open_three(board, p, attacker))
            })
            .map(|p| (evaluate_position(board, p, attacker, &self.eval), p))
            .collect();
        moves.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        moves.into_iter().map(|(_, p)| p).collect()
    }
}

impl Default for ThreatSearcher {
    fn default() -> Self {
        Self::new()
    }
}
