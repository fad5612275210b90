//! Scheduling engine
//!
//! Decides which positions a session presents, in what order, and how an
//! exposure progresses:
//!
//! 1. [`interval`]: fixed mastery ladder, level → minimum days until due
//! 2. [`mastery`]: performance record → mastery level
//! 3. [`classify`]: active corpus → New / Due / Not-Due
//! 4. [`priority`]: orders the Due bucket
//! 5. [`queue`]: caps, merges and shuffles into the session queue
//! 6. [`attempt`]: per-exposure state machine with auto-reveal

pub mod attempt;
pub mod classify;
pub mod interval;
pub mod mastery;
pub mod priority;
pub mod queue;

pub use attempt::{
    AttemptOutcome, AttemptState, CompletionEvent, Exposure, ExposureError, OverrideKind,
    DEFAULT_MAX_ATTEMPTS,
};
pub use classify::{bucket_for, classify, classify_position, Bucket, Classification, DaysSinceSeen};
pub use interval::{interval_days, max_interval_days, INTERVAL_DAYS, MAX_LEVEL};
pub use mastery::{mastery_level, MasteryLevel};
pub use priority::{priority_score, rank, BASE_PRIORITY};
pub use queue::{
    QueueBuilder, QueueItem, QueueMetrics, QueueMode, SessionQueue, DEFAULT_MAX_NEW,
    DEFAULT_MAX_REVIEW,
};
