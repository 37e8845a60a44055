//! Hash table header page.
//!
//! The header is the table's entry point: one page holding the table's own
//! page id, an LSN, the logical bucket count, and the list of attached
//! block pages.
//!
//! # Page layout
//!
//! ```text
//! ┌───────────────┬──────────┬───────────┬───────────────┬──────────────────┐
//! │ page_id (8)   │ lsn (8)  │ size (8)  │ next_ind (8)  │ block_page_ids…  │
//! └───────────────┴──────────┴───────────┴───────────────┴──────────────────┘
//! ```
//!
//! `next_ind` counts the block page ids currently attached; the array runs
//! from byte 32 to the end of the page, 8 bytes per id.

use keystone_common::{Lsn, PageId, PAGE_SIZE};

const PAGE_ID_OFFSET: usize = 0;
const LSN_OFFSET: usize = 8;
const SIZE_OFFSET: usize = 16;
const NEXT_IND_OFFSET: usize = 24;
const BLOCK_IDS_OFFSET: usize = 32;

/// Maximum number of block page ids a header can hold.
pub const fn max_block_ids() -> usize {
    (PAGE_SIZE - BLOCK_IDS_OFFSET) / 8
}

#[inline]
fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    u64::from_be_bytes(bytes)
}

#[inline]
fn write_u64(data: &mut [u8], offset: usize, value: u64) {
    data[offset..offset + 8].copy_from_slice(&value.to_be_bytes());
}

/// Read-only view of a header page's bytes.
pub struct HeaderPage<'a> {
    data: &'a [u8],
}

impl<'a> HeaderPage<'a> {
    /// Wraps a page's bytes.
    pub fn new(data: &'a [u8]) -> Self {
        debug_assert_eq!(data.len(), PAGE_SIZE);
        Self { data }
    }

    /// The id of the header page itself.
    pub fn page_id(&self) -> PageId {
        PageId::new(read_u64(self.data, PAGE_ID_OFFSET))
    }

    /// The page's LSN.
    pub fn lsn(&self) -> Lsn {
        Lsn::new(read_u64(self.data, LSN_OFFSET))
    }

    /// The logical number of buckets.
    pub fn size(&self) -> u64 {
        read_u64(self.data, SIZE_OFFSET)
    }

    /// The number of block pages currently attached.
    pub fn num_blocks(&self) -> usize {
        read_u64(self.data, NEXT_IND_OFFSET) as usize
    }

    /// The page id of the block at `index`.
    pub fn block_page_id(&self, index: usize) -> PageId {
        debug_assert!(index < self.num_blocks());
        PageId::new(read_u64(self.data, BLOCK_IDS_OFFSET + index * 8))
    }
}

/// Mutable view of a header page's bytes.
pub struct HeaderPageMut<'a> {
    data: &'a mut [u8],
}

impl<'a> HeaderPageMut<'a> {
    /// Wraps a page's bytes.
    pub fn new(data: &'a mut [u8]) -> Self {
        debug_assert_eq!(data.len(), PAGE_SIZE);
        Self { data }
    }

    /// Sets the header's own page id.
    pub fn set_page_id(&mut self, page_id: PageId) {
        write_u64(self.data, PAGE_ID_OFFSET, page_id.as_u64());
    }

    /// Sets the page's LSN.
    pub fn set_lsn(&mut self, lsn: Lsn) {
        write_u64(self.data, LSN_OFFSET, lsn.as_u64());
    }

    /// Sets the logical bucket count.
    pub fn set_size(&mut self, size: u64) {
        write_u64(self.data, SIZE_OFFSET, size);
    }

    /// Appends a block page id to the array.
    pub fn add_block_page_id(&mut self, page_id: PageId) {
        let next_ind = read_u64(self.data, NEXT_IND_OFFSET) as usize;
        assert!(next_ind < max_block_ids(), "header block-id array is full");
        write_u64(self.data, BLOCK_IDS_OFFSET + next_ind * 8, page_id.as_u64());
        write_u64(self.data, NEXT_IND_OFFSET, (next_ind + 1) as u64);
    }

    /// The number of block pages currently attached.
    pub fn num_blocks(&self) -> usize {
        read_u64(self.data, NEXT_IND_OFFSET) as usize
    }
}
