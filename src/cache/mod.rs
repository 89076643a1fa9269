//! Frame cache.
//!
//! This module provides the on-disk cache for the current frame. Only the
//! entry for the current bucket key is kept; committing a new one goes
//! through a staging file so readers never observe partial content.

pub mod entry;
pub mod store;

pub use entry::{CacheEntry, CacheMetadata};
pub use store::{CacheStore, EvictionReport, StagedEntry, Verification};
