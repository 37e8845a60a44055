//! Type definitions for KeystoneDB.

mod ids;

pub use ids::{Lsn, PageId};
