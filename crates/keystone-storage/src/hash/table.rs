//! Disk-resident linear-probing hash table.

use std::marker::PhantomData;
use std::sync::Arc;

use keystone_common::PageId;
use parking_lot::RwLock;
use tracing::debug;

use crate::buffer::{BufferError, BufferPoolManager, BufferResult};

use super::block_page::{block_capacity, BlockPage, BlockPageMut};
use super::codec::FixedCodec;
use super::hasher::KeyHasher;
use super::header_page::{max_block_ids, HeaderPage, HeaderPageMut};

/// Identity of the current table: swapped wholesale by `resize`.
struct TableState {
    header_page_id: PageId,
    num_buckets: usize,
}

/// Result of one probe pass in `insert`.
enum InsertOutcome {
    Inserted,
    Duplicate,
    /// Full probe cycle without a home; carries the size that was probed.
    TableFull(usize),
}

/// A disk-resident open-addressing hash index.
///
/// The table is one header page plus a sequence of block pages, all owned
/// by the buffer pool; every operation works through pinned page guards.
/// Duplicate keys with distinct values are allowed; duplicate `(key,
/// value)` pairs are rejected.
///
/// A table-level reader-writer latch serializes `resize` (writer) against
/// all other operations (readers). Within an operation, pages are latched
/// in probe order and released as each page is consumed, so no two threads
/// ever hold more than one block latch at a time.
pub struct LinearProbeHashTable<K, V> {
    pool: Arc<BufferPoolManager>,
    hasher: Box<dyn KeyHasher<K>>,
    state: RwLock<TableState>,
    /// Slots per block page, fixed by the key/value encoding.
    block_capacity: usize,
    _marker: PhantomData<fn(K, V)>,
}

impl<K, V> LinearProbeHashTable<K, V>
where
    K: FixedCodec + PartialEq,
    V: FixedCodec + PartialEq,
{
    /// Creates a new table with `num_buckets` buckets.
    ///
    /// Allocates the header page and `ceil(num_buckets / B)` zeroed block
    /// pages, where `B` is the per-block slot count for `(K, V)`.
    pub fn new(
        pool: Arc<BufferPoolManager>,
        hasher: Box<dyn KeyHasher<K>>,
        num_buckets: usize,
    ) -> BufferResult<Self> {
        let block_cap = block_capacity(K::ENCODED_LEN + V::ENCODED_LEN);
        if block_cap == 0 {
            return Err(BufferError::Config {
                message: "key/value pair does not fit in a block page".to_string(),
            });
        }
        let num_blocks = num_buckets.div_ceil(block_cap);
        if num_buckets == 0 || num_blocks > max_block_ids() {
            return Err(BufferError::Config {
                message: format!("unsupported bucket count: {num_buckets}"),
            });
        }

        let mut header_guard = pool.new_page()?;
        let header_page_id = header_guard.page_id();
        {
            let mut data = header_guard.data_mut();
            let mut header = HeaderPageMut::new(&mut data);
            header.set_page_id(header_page_id);
            header.set_size(num_buckets as u64);
            for _ in 0..num_blocks {
                // A fresh page is zeroed: every slot unoccupied.
                let block_guard = pool.new_page()?;
                header.add_block_page_id(block_guard.page_id());
            }
        }
        drop(header_guard);

        Ok(Self {
            pool,
            hasher,
            state: RwLock::new(TableState {
                header_page_id,
                num_buckets,
            }),
            block_capacity: block_cap,
            _marker: PhantomData,
        })
    }

    /// Collects every value stored under `key`.
    pub fn get_value(&self, key: &K) -> BufferResult<Vec<V>> {
        let state = self.state.read();

        let header_guard = self.pool.fetch_page(state.header_page_id)?;
        let header_data = header_guard.data();
        let header = HeaderPage::new(&header_data);

        let num_buckets = header.size() as usize;
        let num_blocks = header.num_blocks();
        let (start_block, start_bucket) = self.locate(key, num_buckets);

        let mut result = Vec::new();
        let mut cur_block = start_block;
        let mut cur_bucket = start_bucket;
        let mut first = true;

        'scan: loop {
            let block_guard = self.pool.fetch_page(header.block_page_id(cur_block))?;
            let block_data = block_guard.data();
            let block = BlockPage::<K, V>::new(&block_data);

            let end = self.max_bucket_index(cur_block, num_blocks, num_buckets);
            for slot in cur_bucket..end {
                if cur_block == start_block && slot == start_bucket {
                    if first {
                        first = false;
                    } else {
                        break 'scan;
                    }
                }
                if !block.is_occupied(slot) {
                    // End of the probe chain.
                    return Ok(result);
                }
                if block.is_readable(slot) && block.key_at(slot) == *key {
                    result.push(block.value_at(slot));
                }
            }

            cur_block = (cur_block + 1) % num_blocks;
            cur_bucket = 0;
        }

        Ok(result)
    }

    /// Inserts `(key, value)`.
    ///
    /// Returns false if the exact pair is already present. When a probe
    /// pass finds no free slot, the table doubles and the insert retries;
    /// the retry terminates because each resize strictly grows the table.
    pub fn insert(&self, key: &K, value: &V) -> BufferResult<bool> {
        loop {
            let outcome = {
                let state = self.state.read();
                self.try_insert(&state, key, value)?
            };
            match outcome {
                InsertOutcome::Inserted => return Ok(true),
                InsertOutcome::Duplicate => return Ok(false),
                InsertOutcome::TableFull(size) => self.resize(size * 2)?,
            }
        }
    }

    /// Removes the exact `(key, value)` pair.
    ///
    /// Returns false if the pair is not present. The slot is left as a
    /// tombstone so probe chains passing through it stay intact.
    pub fn remove(&self, key: &K, value: &V) -> BufferResult<bool> {
        let state = self.state.read();

        let header_guard = self.pool.fetch_page(state.header_page_id)?;
        let header_data = header_guard.data();
        let header = HeaderPage::new(&header_data);

        let num_buckets = header.size() as usize;
        let num_blocks = header.num_blocks();
        let (start_block, start_bucket) = self.locate(key, num_buckets);

        let mut cur_block = start_block;
        let mut cur_bucket = start_bucket;
        let mut first = true;

        'scan: loop {
            let mut block_guard = self
                .pool
                .fetch_page_for_write(header.block_page_id(cur_block))?;
            let mut block_data = block_guard.data_mut();
            let mut block = BlockPageMut::<K, V>::new(&mut block_data);

            let end = self.max_bucket_index(cur_block, num_blocks, num_buckets);
            for slot in cur_bucket..end {
                if cur_block == start_block && slot == start_bucket {
                    if first {
                        first = false;
                    } else {
                        break 'scan;
                    }
                }
                if !block.is_occupied(slot) {
                    return Ok(false);
                }
                if block.is_readable(slot)
                    && block.key_at(slot) == *key
                    && block.value_at(slot) == *value
                {
                    block.remove(slot);
                    return Ok(true);
                }
            }

            cur_block = (cur_block + 1) % num_blocks;
            cur_bucket = 0;
        }

        Ok(false)
    }

    /// Grows the table to `new_size` buckets.
    ///
    /// Exclusive against every other operation. A no-op when `new_size`
    /// does not exceed the current bucket count. All live entries are
    /// re-homed into freshly allocated pages; the old pages are deleted
    /// and the header swap makes the new table visible atomically.
    pub fn resize(&self, new_size: usize) -> BufferResult<()> {
        let mut state = self.state.write();
        if new_size <= state.num_buckets {
            return Ok(());
        }

        let new_num_blocks = new_size.div_ceil(self.block_capacity);
        if new_num_blocks > max_block_ids() {
            return Err(BufferError::Config {
                message: format!("cannot grow hash table to {new_size} buckets"),
            });
        }
        debug!(
            from = state.num_buckets,
            to = new_size,
            "resizing hash table"
        );

        // Snapshot the old table's pages.
        let old_header_id = state.header_page_id;
        let old_block_ids: Vec<PageId> = {
            let guard = self.pool.fetch_page(old_header_id)?;
            let data = guard.data();
            let header = HeaderPage::new(&data);
            (0..header.num_blocks())
                .map(|i| header.block_page_id(i))
                .collect()
        };

        // Build the new table.
        let mut new_block_ids = Vec::with_capacity(new_num_blocks);
        let new_header_id = {
            let mut guard = self.pool.new_page()?;
            let new_header_id = guard.page_id();
            let mut data = guard.data_mut();
            let mut header = HeaderPageMut::new(&mut data);
            header.set_page_id(new_header_id);
            header.set_size(new_size as u64);
            for _ in 0..new_num_blocks {
                let block_guard = self.pool.new_page()?;
                header.add_block_page_id(block_guard.page_id());
                new_block_ids.push(block_guard.page_id());
            }
            new_header_id
        };

        // Re-home every live entry.
        for &old_block_id in &old_block_ids {
            let guard = self.pool.fetch_page(old_block_id)?;
            let data = guard.data();
            let block = BlockPage::<K, V>::new(&data);
            for slot in 0..self.block_capacity {
                if block.is_readable(slot) {
                    let key = block.key_at(slot);
                    let value = block.value_at(slot);
                    self.insert_into(&new_block_ids, new_size, &key, &value)?;
                }
            }
        }

        // Drop the old table's pages.
        for &old_block_id in &old_block_ids {
            self.pool.delete_page(old_block_id)?;
        }
        self.pool.delete_page(old_header_id)?;

        state.header_page_id = new_header_id;
        state.num_buckets = new_size;
        Ok(())
    }

    /// Current number of buckets.
    pub fn size(&self) -> usize {
        self.state.read().num_buckets
    }

    /// Page id of the current header page.
    pub fn header_page_id(&self) -> PageId {
        self.state.read().header_page_id
    }

    // -------------------------------------------------------------------------
    // Private helpers
    // -------------------------------------------------------------------------

    /// Maps a key to its home `(block_index, bucket_index)`.
    fn locate(&self, key: &K, num_buckets: usize) -> (usize, usize) {
        let slot = (self.hasher.hash_key(key) % num_buckets as u64) as usize;
        (slot / self.block_capacity, slot % self.block_capacity)
    }

    /// Addressable slot count of block `block_index`.
    ///
    /// The final block is truncated when the bucket count is not a
    /// multiple of the block capacity.
    fn max_bucket_index(&self, block_index: usize, num_blocks: usize, num_buckets: usize) -> usize {
        if block_index == num_blocks - 1 && num_buckets % self.block_capacity != 0 {
            num_buckets % self.block_capacity
        } else {
            self.block_capacity
        }
    }

    /// One probe pass under a held reader table-latch.
    fn try_insert(&self, state: &TableState, key: &K, value: &V) -> BufferResult<InsertOutcome> {
        let header_guard = self.pool.fetch_page(state.header_page_id)?;
        let header_data = header_guard.data();
        let header = HeaderPage::new(&header_data);

        let num_buckets = header.size() as usize;
        let num_blocks = header.num_blocks();
        let (start_block, start_bucket) = self.locate(key, num_buckets);

        let mut cur_block = start_block;
        let mut cur_bucket = start_bucket;
        let mut first = true;

        'scan: loop {
            let mut block_guard = self
                .pool
                .fetch_page_for_write(header.block_page_id(cur_block))?;
            let mut block_data = block_guard.data_mut();
            let mut block = BlockPageMut::<K, V>::new(&mut block_data);

            let end = self.max_bucket_index(cur_block, num_blocks, num_buckets);
            for slot in cur_bucket..end {
                if cur_block == start_block && slot == start_bucket {
                    if first {
                        first = false;
                    } else {
                        break 'scan;
                    }
                }
                if block.is_readable(slot) {
                    if block.key_at(slot) == *key && block.value_at(slot) == *value {
                        return Ok(InsertOutcome::Duplicate);
                    }
                } else {
                    // Free slot or reusable tombstone.
                    block.insert(slot, key, value);
                    return Ok(InsertOutcome::Inserted);
                }
            }

            cur_block = (cur_block + 1) % num_blocks;
            cur_bucket = 0;
        }

        Ok(InsertOutcome::TableFull(num_buckets))
    }

    /// Standard insert probe against an explicit block list; used while
    /// re-homing entries during `resize`.
    fn insert_into(
        &self,
        block_ids: &[PageId],
        num_buckets: usize,
        key: &K,
        value: &V,
    ) -> BufferResult<()> {
        let num_blocks = block_ids.len();
        let (start_block, start_bucket) = self.locate(key, num_buckets);

        let mut cur_block = start_block;
        let mut cur_bucket = start_bucket;
        let mut first = true;

        loop {
            let mut block_guard = self.pool.fetch_page_for_write(block_ids[cur_block])?;
            let mut block_data = block_guard.data_mut();
            let mut block = BlockPageMut::<K, V>::new(&mut block_data);

            let end = self.max_bucket_index(cur_block, num_blocks, num_buckets);
            for slot in cur_bucket..end {
                if cur_block == start_block && slot == start_bucket {
                    if first {
                        first = false;
                    } else {
                        // The destination table has at least double the
                        // entries being re-homed.
                        unreachable!("hash table ran out of slots during resize");
                    }
                }
                if !block.is_readable(slot) {
                    block.insert(slot, key, value);
                    return Ok(());
                }
            }

            cur_block = (cur_block + 1) % num_blocks;
            cur_bucket = 0;
        }
    }
}

impl<K, V> std::fmt::Debug for LinearProbeHashTable<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("LinearProbeHashTable")
            .field("header_page_id", &state.header_page_id)
            .field("num_buckets", &state.num_buckets)
            .field("block_capacity", &self.block_capacity)
            .finish()
    }
}
