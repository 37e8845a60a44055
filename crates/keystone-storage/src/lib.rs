//! # keystone-storage
//!
//! Storage engine core for KeystoneDB.
//!
//! This crate implements the page-level storage machinery the rest of the
//! database is built on:
//!
//! - A fixed-size **buffer pool** with clock-based page replacement
//! - A **disk manager** abstraction with file-backed and in-memory backends
//! - A disk-resident **linear-probing hash index** whose buckets are
//!   themselves buffer-pool pages

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Buffer pool manager and page replacement
pub mod buffer;

/// Disk manager abstraction and backends
pub mod disk;

/// Linear-probing hash index
pub mod hash;

/// Write-ahead-log integration point
pub mod wal;
