//! Buffer pool errors.

use keystone_common::PageId;
use thiserror::Error;

use crate::disk::DiskError;

/// Result type for buffer pool operations.
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer pool operations.
#[derive(Debug, Error)]
pub enum BufferError {
    /// Every frame is pinned and the replacer has no victim.
    ///
    /// Caller-recoverable: unpin something and retry.
    #[error("no free frames available, all pages are pinned")]
    NoFreeFrames,

    /// Operation named a page that is not in the page table.
    #[error("page {page_id} is not resident in the buffer pool")]
    PageNotResident {
        /// The page that was requested.
        page_id: PageId,
    },

    /// Operation named the invalid page sentinel.
    #[error("invalid page ID: {page_id}")]
    InvalidPageId {
        /// The offending id.
        page_id: PageId,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// What was wrong.
        message: String,
    },

    /// Disk manager error, not retried by the pool.
    #[error("disk I/O error: {source}")]
    Disk {
        /// The underlying error.
        #[from]
        source: DiskError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert!(BufferError::NoFreeFrames.to_string().contains("pinned"));
        let err = BufferError::PageNotResident {
            page_id: PageId::new(7),
        };
        assert!(err.to_string().contains('7'));
    }
}
