//! In-memory disk manager.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use keystone_common::{PageId, PAGE_SIZE};
use parking_lot::Mutex;

use super::error::{DiskError, DiskResult};
use super::DiskManager;

/// Disk manager that keeps every page on the heap.
///
/// Behaves exactly like [`FileDiskManager`](super::FileDiskManager) from the
/// buffer pool's point of view, minus durability. Used by tests and as the
/// teaching default.
#[derive(Default)]
pub struct MemoryDiskManager {
    pages: Mutex<HashMap<PageId, Box<[u8]>>>,
    next_page_id: AtomicU64,
    free_pages: Mutex<Vec<PageId>>,
}

impl MemoryDiskManager {
    /// Creates an empty in-memory disk manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages that have ever been written.
    pub fn page_count(&self) -> usize {
        self.pages.lock().len()
    }

    fn check_page_id(&self, page_id: PageId) -> DiskResult<()> {
        if !page_id.is_valid() || page_id.as_u64() >= self.next_page_id.load(Ordering::Acquire) {
            return Err(DiskError::InvalidPageId { page_id });
        }
        Ok(())
    }
}

impl DiskManager for MemoryDiskManager {
    fn allocate_page(&self) -> DiskResult<PageId> {
        if let Some(page_id) = self.free_pages.lock().pop() {
            return Ok(page_id);
        }
        Ok(PageId::new(self.next_page_id.fetch_add(1, Ordering::AcqRel)))
    }

    fn deallocate_page(&self, page_id: PageId) -> DiskResult<()> {
        self.check_page_id(page_id)?;
        self.pages.lock().remove(&page_id);
        let mut free_pages = self.free_pages.lock();
        // Deallocating twice is a no-op.
        if !free_pages.contains(&page_id) {
            free_pages.push(page_id);
        }
        Ok(())
    }

    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> DiskResult<()> {
        debug_assert_eq!(buf.len(), PAGE_SIZE);
        self.check_page_id(page_id)?;

        match self.pages.lock().get(&page_id) {
            Some(data) => buf.copy_from_slice(data),
            None => buf.fill(0),
        }
        Ok(())
    }

    fn write_page(&self, page_id: PageId, buf: &[u8]) -> DiskResult<()> {
        debug_assert_eq!(buf.len(), PAGE_SIZE);
        self.check_page_id(page_id)?;

        self.pages.lock().insert(page_id, buf.into());
        Ok(())
    }
}

impl std::fmt::Debug for MemoryDiskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDiskManager")
            .field("pages", &self.page_count())
            .field("next_page_id", &self.next_page_id.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dm = MemoryDiskManager::new();
        let page_id = dm.allocate_page().unwrap();

        let mut page = vec![0u8; PAGE_SIZE];
        page[10] = 0xab;
        dm.write_page(page_id, &page).unwrap();

        let mut out = vec![0u8; PAGE_SIZE];
        dm.read_page(page_id, &mut out).unwrap();
        assert_eq!(out, page);
    }

    #[test]
    fn test_unwritten_reads_zeroed() {
        let dm = MemoryDiskManager::new();
        let page_id = dm.allocate_page().unwrap();

        let mut out = vec![0xffu8; PAGE_SIZE];
        dm.read_page(page_id, &mut out).unwrap();
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_deallocate_clears_contents() {
        let dm = MemoryDiskManager::new();
        let page_id = dm.allocate_page().unwrap();
        dm.write_page(page_id, &vec![1u8; PAGE_SIZE]).unwrap();

        dm.deallocate_page(page_id).unwrap();
        let reused = dm.allocate_page().unwrap();
        assert_eq!(reused, page_id);

        let mut out = vec![0xffu8; PAGE_SIZE];
        dm.read_page(reused, &mut out).unwrap();
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_invalid_page_id_rejected() {
        let dm = MemoryDiskManager::new();
        let mut buf = vec![0u8; PAGE_SIZE];
        assert!(dm.read_page(PageId::INVALID, &mut buf).is_err());
        assert!(dm.write_page(PageId::new(3), &buf).is_err());
    }
}
