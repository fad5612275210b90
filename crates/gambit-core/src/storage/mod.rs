//! Storage Module
//!
//! The performance store contract and its implementations:
//! - [`PerformanceStore`]: the narrow read/update contract the scheduler uses
//! - [`Storage`]: SQLite-backed store with aggregate training statistics
//! - [`MemoryStore`]: in-process store for tests and throwaway sessions

mod memory;
mod migrations;
mod record;
mod sqlite;
mod stats;

pub use memory::MemoryStore;
pub use migrations::{Migration, MIGRATIONS};
pub use record::{AttemptRecord, PerformanceRecord, PerformanceStore, RecordSnapshot};
pub use sqlite::{Storage, DB_FILE_NAME};
pub use stats::{
    CategoryStats, DailyStats, ExportBundle, ProblemResult, SessionRecord, TrainingStats,
};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Store cannot serve requests right now
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;
