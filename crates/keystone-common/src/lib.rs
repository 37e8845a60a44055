//! # keystone-common
//!
//! Common types and constants for KeystoneDB.
//!
//! This crate provides the foundational types used across all KeystoneDB
//! components:
//!
//! - **Types**: Core identifiers (`PageId`, `Lsn`)
//! - **Constants**: System-wide constants and limits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod types;

// Re-export commonly used items at the crate root
pub use constants::*;
pub use types::{Lsn, PageId};
