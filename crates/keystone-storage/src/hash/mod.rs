//! Linear-probing hash index for KeystoneDB.
//!
//! A disk-resident open-addressing hash table built directly on the buffer
//! pool: one header page lists the attached block pages, and each block
//! page holds a fixed array of key/value slots with per-slot `occupied`
//! and `readable` bits.
//!
//! ```text
//! ┌──────────────┐
//! │ Header page  │  page_id · lsn · size · next_ind · block ids
//! └──────┬───────┘
//!        │
//!   ┌────┴─────┬──────────┬──────────┐
//!   ▼          ▼          ▼          ▼
//! [Block 0] [Block 1] [Block 2] ... [Block n]
//! ```
//!
//! Lookups probe linearly from the key's home slot, wrapping around the
//! whole table; removals leave tombstones so probe chains stay intact.
//! When an insert finds no free slot in a full cycle the table doubles.

mod block_page;
mod codec;
mod hasher;
mod header_page;
mod table;

pub use block_page::{block_capacity, BlockPage, BlockPageMut};
pub use codec::FixedCodec;
pub use hasher::{KeyHasher, SipKeyHasher};
pub use header_page::{max_block_ids, HeaderPage, HeaderPageMut};
pub use table::LinearProbeHashTable;
