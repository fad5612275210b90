//! Fault-injecting store
//!
//! Wraps any store and fails reads and/or writes on demand, to exercise
//! degraded queues and retried writes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use gambit_core::{
    AttemptRecord, PerformanceRecord, PerformanceStore, ProblemId, RecordSnapshot, Result,
    StorageError,
};

pub struct FlakyStore<S> {
    inner: S,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    rejected_writes: AtomicUsize,
}

impl<S: PerformanceStore> FlakyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            rejected_writes: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Writes refused so far
    pub fn rejected_writes(&self) -> usize {
        self.rejected_writes.load(Ordering::SeqCst)
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".into()));
        }
        Ok(())
    }
}

impl<S: PerformanceStore> PerformanceStore for FlakyStore<S> {
    fn get(&self, id: &ProblemId) -> Result<Option<PerformanceRecord>> {
        self.check_read()?;
        self.inner.get(id)
    }

    fn snapshot(&self) -> Result<RecordSnapshot> {
        self.check_read()?;
        self.inner.snapshot()
    }

    fn record_attempt(&self, attempt: &AttemptRecord) -> Result<PerformanceRecord> {
        if self.fail_writes.load(Ordering::SeqCst) {
            self.rejected_writes.fetch_add(1, Ordering::SeqCst);
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        self.inner.record_attempt(attempt)
    }

    fn reset(&self) -> Result<()> {
        self.inner.reset()
    }
}
