//! Write-ahead-log integration point for the buffer pool.
//!
//! The buffer pool does not write WAL records itself, but it must honor the
//! write-ahead contract: before a dirty page's bytes reach disk, the log up
//! through that page's LSN has to be on stable storage. [`LogManager`] is
//! the hook the pool calls at every such write boundary.

use std::sync::atomic::{AtomicU64, Ordering};

use keystone_common::Lsn;

/// Flush-ordering contract between the buffer pool and the log.
pub trait LogManager: Send + Sync {
    /// Ensures every log record with an LSN up to and including `lsn` is on
    /// stable storage. Called before a dirty page is written back.
    fn flush_up_to(&self, lsn: Lsn);

    /// The highest LSN known to be durable.
    fn flushed_lsn(&self) -> Lsn;
}

/// Log manager that performs no I/O.
///
/// It still records the high-water mark it was asked to flush, so tests can
/// assert the pool crosses the write boundary correctly.
#[derive(Debug, Default)]
pub struct NoopLogManager {
    flushed: AtomicU64,
}

impl NoopLogManager {
    /// Creates a no-op log manager.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogManager for NoopLogManager {
    fn flush_up_to(&self, lsn: Lsn) {
        self.flushed.fetch_max(lsn.as_u64(), Ordering::AcqRel);
    }

    fn flushed_lsn(&self) -> Lsn {
        Lsn::new(self.flushed.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_water_mark() {
        let log = NoopLogManager::new();
        assert_eq!(log.flushed_lsn(), Lsn::INVALID);

        log.flush_up_to(Lsn::new(10));
        log.flush_up_to(Lsn::new(5));
        assert_eq!(log.flushed_lsn(), Lsn::new(10));
    }
}
