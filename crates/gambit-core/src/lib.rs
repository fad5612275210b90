//! # Gambit Core
//!
//! Spaced-repetition scheduling engine for drilling chess mistakes taken from
//! your own games.
//!
//! - **Mastery ladder**: nine fixed levels, 0 to 365 days between reviews
//! - **Due-ness classification**: every position is New, Due or Not-Due
//! - **Priority ranking**: overdue, unsolved and often-missed positions first
//! - **Session queues**: capped review and new counts, shuffled with an
//!   injectable random source
//! - **Attempt state machine**: three tries per exposure, then auto-reveal
//! - **Performance store**: SQLite with aggregate training statistics, or
//!   in-memory
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gambit_core::{Corpus, CorpusFilter, Scheduler, SchedulerConfig, Storage, SystemClock, TrainingSession};
//! use rand::thread_rng;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let corpus = Corpus::load("analysis_results.json")?;
//! let store = Storage::new(None)?;
//! let scheduler = Scheduler::new(store, SystemClock, SchedulerConfig::from_env());
//!
//! let active = corpus.filtered(&CorpusFilter::all());
//! let mut session = TrainingSession::start(&scheduler, active, &mut thread_rng())?;
//!
//! if let Some(exposure) = session.current() {
//!     println!("Find the best move: {}", exposure.position().fen);
//! }
//! session.submit_move("e2e4")?;
//!
//! let summary = session.finish();
//! scheduler.store().save_session(&summary)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): bundled SQLite build
//! - `encryption`: SQLCipher, keyed from `GAMBIT_ENCRYPTION_KEY`

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod clock;
pub mod position;
pub mod schedule;
pub mod session;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Time
pub use clock::{Clock, FixedClock, SystemClock};

// Positions
pub use position::{
    Corpus, CorpusError, CorpusFilter, CorpusSummary, ErrorType, PlayerColor, Position, ProblemId,
};

// Scheduling engine
pub use schedule::{
    classify, interval_days, mastery_level, priority_score, rank, AttemptOutcome, AttemptState,
    Bucket, Classification, CompletionEvent, DaysSinceSeen, Exposure, ExposureError, MasteryLevel,
    OverrideKind, QueueBuilder, QueueItem, QueueMetrics, QueueMode, SessionQueue, INTERVAL_DAYS, MAX_LEVEL,
};

// Storage layer
pub use storage::{
    AttemptRecord, CategoryStats, DailyStats, ExportBundle, MemoryStore, PerformanceRecord,
    PerformanceStore, ProblemResult, RecordSnapshot, Result, SessionRecord, Storage, StorageError,
    TrainingStats,
};

// Sessions
pub use session::{Scheduler, SchedulerConfig, SchedulerError, SessionStats, TrainingSession};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        AttemptOutcome, Clock, Corpus, CorpusFilter, ErrorType, MemoryStore, OverrideKind, PerformanceStore,
        PlayerColor, Position, ProblemId, Result, Scheduler, SchedulerConfig, SchedulerError,
        SessionQueue, Storage, StorageError, SystemClock, TrainingSession,
    };
}
