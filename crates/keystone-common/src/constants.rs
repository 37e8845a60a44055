//! System-wide constants for KeystoneDB.

// =============================================================================
// Page Constants
// =============================================================================

/// Page size in bytes (4 KB).
///
/// The unit of disk I/O and of buffer-pool residency. Every on-disk
/// structure is laid out in multiples of this size.
pub const PAGE_SIZE: usize = 4 * 1024;

// =============================================================================
// Buffer Pool Constants
// =============================================================================

/// Default number of frames in the buffer pool.
pub const DEFAULT_POOL_FRAMES: usize = 128;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size() {
        assert!(PAGE_SIZE.is_power_of_two());
        assert_eq!(PAGE_SIZE, 4096);
    }

    #[test]
    fn test_pool_defaults() {
        assert!(DEFAULT_POOL_FRAMES > 0);
    }
}
