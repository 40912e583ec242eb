//! Pattern scores for Renju evaluation
//!
//! The score table is an ordinary value, not global state: build one with
//! `PatternScores::default()` (the tuned table) or load overrides from JSON,
//! then pass it by reference through [`EvalOptions`]. Two searches with
//! different tables can run side by side.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Shape of one line segment, as recognized by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Five,
    /// `_XXXX_`
    OpenFour,
    /// `OXXXX_`
    Four,
    /// `XX_XX`, `X_XXX`: filling the gap makes five
    JumpFour,
    /// `_XXX_`
    OpenThree,
    /// `_X_XX_`
    JumpThree,
    /// `OXXX_`
    Three,
    /// `OX_XX_`
    ClosedJumpThree,
    /// `_XX_`
    OpenTwo,
    /// `OXX_` or `_X_X_`
    Two,
    None,
}

/// Scoring weights for line patterns and tactical bonuses.
///
/// Ordering invariants: `open_two < jump_three < open_three`,
/// `jump_four < four < open_four < five`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternScores {
    /// Five in a row - immediate win
    pub five: i32,
    /// Open four: _OOOO_ (unstoppable)
    pub open_four: i32,
    /// Closed four: XOOOO_ (one way to extend)
    pub four: i32,
    /// Four across a single gap
    pub jump_four: i32,
    /// Open three: _OOO_ (becomes open four if not blocked)
    pub open_three: i32,
    /// Open three across a single gap
    pub jump_three: i32,
    /// Closed three: XOOO_
    pub three: i32,
    /// Closed three across a single gap
    pub closed_jump_three: i32,
    /// Open two: _OO_
    pub open_two: i32,
    /// Closed two: XOO_ (also the split two _O_O_)
    pub two: i32,
    /// Per extra axis when a stone takes part in patterns on 2+ axes
    pub connectivity_bonus: i32,
    /// Side holding a four-three move
    pub four_three_bonus: i32,
    /// Per step of Manhattan distance closer to the center
    pub center_weight: i32,
}

impl Default for PatternScores {
    fn default() -> Self {
        Self {
            five: 1_000_000,
            open_four: 100_000,
            four: 50_000,
            jump_four: 40_000,
            open_three: 10_000,
            jump_three: 6_000,
            three: 1_500,
            closed_jump_three: 1_200,
            open_two: 1_000,
            two: 200,
            connectivity_bonus: 500,
            four_three_bonus: 80_000,
            center_weight: 3,
        }
    }
}

impl PatternScores {
    /// Score for a recognized pattern
    #[inline]
    pub fn value(&self, kind: PatternKind) -> i32 {
        match kind {
            PatternKind::Five => self.five,
            PatternKind::OpenFour => self.open_four,
            PatternKind::Four => self.four,
            PatternKind::JumpFour => self.jump_four,
            PatternKind::OpenThree => self.open_three,
            PatternKind::JumpThree => self.jump_three,
            PatternKind::Three => self.three,
            PatternKind::ClosedJumpThree => self.closed_jump_three,
            PatternKind::OpenTwo => self.open_two,
            PatternKind::Two => self.two,
            PatternKind::None => 0,
        }
    }

    /// Load a table from JSON. Missing fields keep their default value.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Evaluator configuration threaded through every evaluation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalOptions {
    pub scores: PatternScores,
    /// Add the connectivity bonus for multi-axis stones
    pub connectivity: bool,
    /// Scan for four-three moves and add the bonus
    pub four_three: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            scores: PatternScores::default(),
            connectivity: true,
            four_three: true,
        }
    }
}
