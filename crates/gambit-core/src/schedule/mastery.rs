//! Mastery evaluation
//!
//! Mastery is never stored; it is recomputed from the performance record on
//! every read. First-try solves climb the ladder one rung per attempt (up to
//! level 3); positions that were failed before being solved climb one rung per
//! two attempts (up to level 2), so they come back sooner.

use serde::{Deserialize, Serialize};

use super::interval::{interval_days, MAX_LEVEL};
use crate::storage::PerformanceRecord;

/// Cap for positions solved on the first try
pub const FIRST_TRY_LEVEL_CAP: u32 = 3;

/// Cap for positions solved only after failures
pub const RECOVERED_LEVEL_CAP: u32 = 2;

/// Discrete mastery level in `0..=8`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MasteryLevel(u8);

impl MasteryLevel {
    /// Never mastered
    pub const ZERO: MasteryLevel = MasteryLevel(0);

    /// Construct a level, clamping to the ladder
    pub fn new(level: u32) -> Self {
        Self(level.min(MAX_LEVEL as u32) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Minimum days before a position at this level is due again
    pub fn interval_days(self) -> u32 {
        interval_days(self.0 as i64)
    }
}

impl std::fmt::Display for MasteryLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mastery level for a record, or level 0 when there is no record
pub fn mastery_level(record: Option<&PerformanceRecord>) -> MasteryLevel {
    let Some(record) = record else {
        return MasteryLevel::ZERO;
    };

    if !record.solved {
        return MasteryLevel::ZERO;
    }

    if record.first_try_solved {
        MasteryLevel::new(record.attempts.min(FIRST_TRY_LEVEL_CAP))
    } else {
        MasteryLevel::new((record.attempts / 2).min(RECOVERED_LEVEL_CAP))
    }
}
