//! Weighted random selection policy
//!
//! Recommendations are split at a score of 10. Most draws go to the popular
//! side so well-liked songs come up often, while the remaining draws surface
//! new or unproven songs.

use crate::models::ScoreFilter;

/// Score above which a recommendation counts as popular
pub const POPULAR_SCORE: i32 = 10;

/// Share of draws that prefer the popular partition
pub const POPULAR_WEIGHT: f64 = 0.7;

/// Which side of the score split a draw prefers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// `score > POPULAR_SCORE`
    Popular,
    /// `score <= POPULAR_SCORE`
    Fresh,
}

impl Partition {
    /// Store filter selecting the records in this partition
    pub fn score_filter(self) -> ScoreFilter {
        match self {
            Partition::Popular => ScoreFilter::Above(POPULAR_SCORE),
            Partition::Fresh => ScoreFilter::AtMost(POPULAR_SCORE),
        }
    }
}

/// Maps a uniform roll in `[0, 1)` to the preferred partition
pub fn choose_partition(roll: f64) -> Partition {
    if roll < POPULAR_WEIGHT {
        Partition::Popular
    } else {
        Partition::Fresh
    }
}

/// Maps a uniform roll in `[0, 1)` to an index in `0..len`
///
/// Rolls outside the unit interval are clamped. `len` must be non-zero.
pub fn pick_index(len: usize, roll: f64) -> usize {
    debug_assert!(len > 0);
    let index = (roll.clamp(0.0, 1.0) * len as f64).floor() as usize;
    index.min(len - 1)
}
