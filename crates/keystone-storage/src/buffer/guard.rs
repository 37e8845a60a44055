//! Scoped page guards.
//!
//! Every page handed out by the buffer pool is wrapped in a guard that
//! unpins it exactly once when dropped, on every exit path. The guard also
//! mediates access to the page latch: `data()` / `data_mut()` acquire the
//! frame's reader-writer lock and hold it for as long as the returned
//! reference lives.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use keystone_common::{Lsn, PageId};

use super::frame::Frame;
use super::pool::BufferPoolManager;

/// Read guard for a page in the buffer pool.
///
/// Keeps the page pinned while held and unpins it (clean) on drop.
pub struct PageReadGuard<'a> {
    pool: &'a BufferPoolManager,
    frame: Arc<Frame>,
    page_id: PageId,
}

impl<'a> PageReadGuard<'a> {
    pub(crate) fn new(pool: &'a BufferPoolManager, frame: Arc<Frame>, page_id: PageId) -> Self {
        Self {
            pool,
            frame,
            page_id,
        }
    }

    /// Returns the page ID.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Read-latches the page and returns its bytes.
    #[inline]
    pub fn data(&self) -> impl Deref<Target = [u8]> + '_ {
        PageDataRef {
            guard: self.frame.read_data(),
        }
    }
}

impl Drop for PageReadGuard<'_> {
    fn drop(&mut self) {
        let unpinned = self.pool.unpin_page(self.page_id, false);
        debug_assert!(unpinned, "read guard dropped for a page that is not pinned");
    }
}

impl std::fmt::Debug for PageReadGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageReadGuard")
            .field("page_id", &self.page_id)
            .field("frame_id", &self.frame.frame_id())
            .finish()
    }
}

/// Write guard for a page in the buffer pool.
///
/// Keeps the page pinned while held. If the bytes were borrowed mutably (or
/// [`mark_dirty`](Self::mark_dirty) was called), the drop-time unpin carries
/// `is_dirty = true`.
pub struct PageWriteGuard<'a> {
    pool: &'a BufferPoolManager,
    frame: Arc<Frame>,
    page_id: PageId,
    modified: bool,
}

impl<'a> PageWriteGuard<'a> {
    pub(crate) fn new(pool: &'a BufferPoolManager, frame: Arc<Frame>, page_id: PageId) -> Self {
        Self {
            pool,
            frame,
            page_id,
            modified: false,
        }
    }

    /// Returns the page ID.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Read-latches the page and returns its bytes.
    #[inline]
    pub fn data(&self) -> impl Deref<Target = [u8]> + '_ {
        PageDataRef {
            guard: self.frame.read_data(),
        }
    }

    /// Write-latches the page and returns its bytes mutably.
    #[inline]
    pub fn data_mut(&mut self) -> impl DerefMut<Target = [u8]> + '_ {
        self.modified = true;
        PageDataMut {
            guard: self.frame.write_data(),
        }
    }

    /// Marks the page dirty without touching the bytes.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.modified = true;
    }

    /// Records the LSN of the modification this guard covers.
    #[inline]
    pub fn set_lsn(&self, lsn: Lsn) {
        self.frame.set_lsn(lsn);
    }

    /// Returns true if the bytes were modified through this guard.
    #[inline]
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

impl Drop for PageWriteGuard<'_> {
    fn drop(&mut self) {
        let unpinned = self.pool.unpin_page(self.page_id, self.modified);
        debug_assert!(unpinned, "write guard dropped for a page that is not pinned");
    }
}

impl std::fmt::Debug for PageWriteGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageWriteGuard")
            .field("page_id", &self.page_id)
            .field("frame_id", &self.frame.frame_id())
            .field("modified", &self.modified)
            .finish()
    }
}

struct PageDataRef<'a> {
    guard: parking_lot::RwLockReadGuard<'a, Box<[u8]>>,
}

impl Deref for PageDataRef<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

struct PageDataMut<'a> {
    guard: parking_lot::RwLockWriteGuard<'a, Box<[u8]>>,
}

impl Deref for PageDataMut<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl DerefMut for PageDataMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}
