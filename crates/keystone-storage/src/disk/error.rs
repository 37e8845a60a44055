//! Disk manager errors.

use std::io;

use keystone_common::PageId;
use thiserror::Error;

/// Result type for disk manager operations.
pub type DiskResult<T> = Result<T, DiskError>;

/// Errors that can occur during disk manager operations.
#[derive(Debug, Error)]
pub enum DiskError {
    /// Operation named the invalid sentinel or an id outside the allocated range.
    #[error("invalid page ID: {page_id}")]
    InvalidPageId {
        /// The offending id.
        page_id: PageId,
    },

    /// I/O error during page read/write.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying error.
        #[from]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = DiskError::InvalidPageId {
            page_id: PageId::INVALID,
        };
        assert!(err.to_string().contains("invalid page ID"));
    }
}
