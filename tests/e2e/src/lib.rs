//! Gambit end-to-end test support
//!
//! - [`harness`]: isolated databases and scheduler wiring
//! - [`mocks`]: corpus fixtures and fault-injecting stores

pub mod mocks;

pub use harness::TestDatabaseManager;
pub use mocks::{FlakyStore, TestDataFactory};
