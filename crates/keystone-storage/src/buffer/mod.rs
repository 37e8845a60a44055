//! Buffer pool manager for KeystoneDB.
//!
//! The buffer pool keeps a fixed set of in-memory page frames and serves
//! all page access for the engine:
//!
//! - **Pin/Unpin**: reference counting protects resident pages from eviction
//! - **Dirty tracking**: modified pages are written back before their frame
//!   is reused
//! - **Eviction**: clock algorithm over the unpinned frames
//! - **WAL ordering**: the log manager is flushed before any dirty write-back
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                  BufferPoolManager                    │
//! │  ┌─────────────────────────────────────────────────┐  │
//! │  │   Page table: HashMap<PageId, FrameId>          │  │
//! │  │   Free list:  VecDeque<FrameId>                 │  │
//! │  └─────────────────────────────────────────────────┘  │
//! │                         │                             │
//! │                         ▼                             │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐     ┌─────────┐  │
//! │  │ Frame 0 │ │ Frame 1 │ │ Frame 2 │ ... │ Frame N │  │
//! │  │ page_id │ │ page_id │ │ page_id │     │ page_id │  │
//! │  │ data[]  │ │ data[]  │ │ data[]  │     │ data[]  │  │
//! │  │ pin_cnt │ │ pin_cnt │ │ pin_cnt │     │ pin_cnt │  │
//! │  │ dirty   │ │ dirty   │ │ dirty   │     │ dirty   │  │
//! │  └─────────┘ └─────────┘ └─────────┘     └─────────┘  │
//! │                         │                             │
//! │                         ▼                             │
//! │  ┌─────────────────────────────────────────────────┐  │
//! │  │       ClockReplacer (eviction candidates)       │  │
//! │  └─────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! A frame is either on the free list or mapped by the page table, never
//! both. Every page handed out is wrapped in a guard that unpins on drop.

mod config;
mod error;
mod frame;
mod guard;
mod pool;
mod replacer;

pub use config::BufferPoolConfig;
pub use error::{BufferError, BufferResult};
pub use frame::{Frame, FrameId};
pub use guard::{PageReadGuard, PageWriteGuard};
pub use pool::{BufferPoolManager, BufferPoolStats};
pub use replacer::ClockReplacer;
