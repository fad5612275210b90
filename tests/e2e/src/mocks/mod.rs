//! Fixtures and mock stores

mod fixtures;
mod flaky_store;

pub use fixtures::TestDataFactory;
pub use flaky_store::FlakyStore;
