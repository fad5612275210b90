//! Session Module
//!
//! Ties the scheduling engine to a store and a clock:
//! - [`Scheduler`]: builds queues from a store snapshot, degrading when the
//!   store is unreadable
//! - [`TrainingSession`]: drives exposures through a queue and records results
//! - [`SchedulerConfig`]: per-session caps

mod config;
mod scheduler;
mod training;

pub use config::{SchedulerConfig, DEFAULT_FALLBACK_SIZE};
pub use scheduler::Scheduler;
pub use training::{SessionStats, TrainingSession};

use crate::schedule::ExposureError;
use crate::storage::StorageError;

/// Session error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// A queue build is already running
    #[error("Queue rebuild already in progress")]
    RebuildInProgress,
    /// Input arrived with no live exposure
    #[error("No active position")]
    NoActivePosition,
    #[error(transparent)]
    Exposure(#[from] ExposureError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
