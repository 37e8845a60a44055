//! File-backed disk manager.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use keystone_common::{PageId, PAGE_SIZE};
use parking_lot::Mutex;

use super::error::{DiskError, DiskResult};
use super::DiskManager;

/// Disk manager backed by a single data file.
///
/// Page `n` lives at byte offset `n * PAGE_SIZE`. The file handle is
/// serialized by a mutex; each read and write seeks before transferring.
/// Reads past the current end of the file return zeroed bytes, so a page
/// that has been allocated but never written reads back as all zeroes.
pub struct FileDiskManager {
    /// The data file, serialized for seek-then-transfer access.
    file: Mutex<File>,
    /// Path of the data file.
    path: PathBuf,
    /// Next page id to hand out when the free set is empty.
    next_page_id: AtomicU64,
    /// Deallocated page ids available for reuse.
    free_pages: Mutex<Vec<PageId>>,
}

impl FileDiskManager {
    /// Opens (or creates) the data file at `path`.
    ///
    /// The allocation cursor resumes after the last page the file already
    /// holds, so reopening a database does not hand out ids in use.
    pub fn open(path: impl AsRef<Path>) -> DiskResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let len = file.metadata()?.len();
        let next_page_id = len.div_ceil(PAGE_SIZE as u64);

        Ok(Self {
            file: Mutex::new(file),
            path,
            next_page_id: AtomicU64::new(next_page_id),
            free_pages: Mutex::new(Vec::new()),
        })
    }

    /// Returns the path of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Syncs the data file to stable storage.
    pub fn sync(&self) -> DiskResult<()> {
        self.file.lock().sync_all()?;
        Ok(())
    }

    fn check_page_id(&self, page_id: PageId) -> DiskResult<()> {
        if !page_id.is_valid() || page_id.as_u64() >= self.next_page_id.load(Ordering::Acquire) {
            return Err(DiskError::InvalidPageId { page_id });
        }
        Ok(())
    }
}

impl DiskManager for FileDiskManager {
    fn allocate_page(&self) -> DiskResult<PageId> {
        if let Some(page_id) = self.free_pages.lock().pop() {
            return Ok(page_id);
        }
        Ok(PageId::new(self.next_page_id.fetch_add(1, Ordering::AcqRel)))
    }

    fn deallocate_page(&self, page_id: PageId) -> DiskResult<()> {
        self.check_page_id(page_id)?;
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

        let offset = page_id.as_u64() * PAGE_SIZE as u64;
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;

        // A short read means the page lies past the data written so far;
        // the tail reads back as zeroes.
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..])? {
                0 => break,
                n => filled += n,
            }
        }
        buf[filled..].fill(0);
        Ok(())
    }

    fn write_page(&self, page_id: PageId, buf: &[u8]) -> DiskResult<()> {
        debug_assert_eq!(buf.len(), PAGE_SIZE);
        self.check_page_id(page_id)?;

        let offset = page_id.as_u64() * PAGE_SIZE as u64;
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;
        Ok(())
    }
}

impl std::fmt::Debug for FileDiskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDiskManager")
            .field("path", &self.path)
            .field("next_page_id", &self.next_page_id.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_manager(dir: &tempfile::TempDir) -> FileDiskManager {
        FileDiskManager::open(dir.path().join("test.db")).unwrap()
    }

    #[test]
    fn test_allocate_monotonic() {
        let dir = tempdir().unwrap();
        let dm = open_manager(&dir);

        let p0 = dm.allocate_page().unwrap();
        let p1 = dm.allocate_page().unwrap();
        assert_ne!(p0, p1);
        assert_eq!(p1.as_u64(), p0.as_u64() + 1);
    }

    #[test]
    fn test_deallocate_reuses() {
        let dir = tempdir().unwrap();
        let dm = open_manager(&dir);

        let p0 = dm.allocate_page().unwrap();
        let _p1 = dm.allocate_page().unwrap();
        dm.deallocate_page(p0).unwrap();
        assert_eq!(dm.allocate_page().unwrap(), p0);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let dm = open_manager(&dir);

        let page_id = dm.allocate_page().unwrap();
        let mut page = vec![0u8; PAGE_SIZE];
        page[0..4].copy_from_slice(&[1, 2, 3, 4]);
        dm.write_page(page_id, &page).unwrap();

        let mut out = vec![0xffu8; PAGE_SIZE];
        dm.read_page(page_id, &mut out).unwrap();
        assert_eq!(out, page);
    }

    #[test]
    fn test_read_unwritten_is_zeroed() {
        let dir = tempdir().unwrap();
        let dm = open_manager(&dir);

        let page_id = dm.allocate_page().unwrap();
        let mut out = vec![0xffu8; PAGE_SIZE];
        dm.read_page(page_id, &mut out).unwrap();
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_invalid_page_id_rejected() {
        let dir = tempdir().unwrap();
        let dm = open_manager(&dir);

        let mut buf = vec![0u8; PAGE_SIZE];
        assert!(dm.read_page(PageId::INVALID, &mut buf).is_err());
        assert!(dm.write_page(PageId::new(99), &buf).is_err());
        assert!(dm.deallocate_page(PageId::new(99)).is_err());
    }

    #[test]
    fn test_reopen_resumes_allocation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let last = {
            let dm = FileDiskManager::open(&path).unwrap();
            let page = vec![7u8; PAGE_SIZE];
            let mut last = PageId::INVALID;
            for _ in 0..3 {
                last = dm.allocate_page().unwrap();
                dm.write_page(last, &page).unwrap();
            }
            dm.sync().unwrap();
            last
        };

        let dm = FileDiskManager::open(&path).unwrap();
        let fresh = dm.allocate_page().unwrap();
        assert!(fresh > last);
    }
}
