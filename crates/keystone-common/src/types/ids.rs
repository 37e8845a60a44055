//! Identifier newtypes shared across the storage engine.
//!
//! Page ids and log sequence numbers are both "just a u64", which is
//! exactly how they end up swapped in call sites. Wrapping each in its own
//! `#[repr(transparent)]` newtype costs nothing at runtime and lets the
//! compiler keep them apart.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one on-disk page.
///
/// Handed out by the disk manager and used as the page-table key in the
/// buffer pool. A frame whose page id is [`INVALID`](Self::INVALID) holds
/// no page; the disk manager never allocates that value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PageId(u64);

impl PageId {
    /// Sentinel meaning "no page".
    pub const INVALID: Self = Self(u64::MAX);

    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Unwraps to the raw id.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// False only for the [`INVALID`](Self::INVALID) sentinel.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl fmt::Debug for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "PageId({})", self.0)
        } else {
            write!(f, "PageId(INVALID)")
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a record in the write-ahead log.
///
/// LSNs grow monotonically. The storage core never inspects them beyond
/// ordering: before a dirty page's bytes reach disk, the log manager is
/// asked to make the WAL durable up through that page's LSN. Zero is the
/// "never logged" sentinel.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Lsn(u64);

impl Lsn {
    /// Sentinel for a page that has never been logged.
    pub const INVALID: Self = Self(0);

    /// Wraps a raw sequence number.
    #[inline]
    #[must_use]
    pub const fn new(lsn: u64) -> Self {
        Self(lsn)
    }

    /// Unwraps to the raw sequence number.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// False only for the [`INVALID`](Self::INVALID) sentinel.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl fmt::Debug for Lsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Lsn({})", self.0)
        } else {
            write!(f, "Lsn(INVALID)")
        }
    }
}

impl fmt::Display for Lsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
