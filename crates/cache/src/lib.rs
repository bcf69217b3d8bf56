//! Thumbgrid Cache Library
//!
//! Keyed thumbnail store with evictable payload slots and per-entry task
//! tracking. Payloads live under a byte budget with LRU eviction; an evicted
//! thumbnail reads as "never computed" and is regenerated, never reported as
//! an error.

pub mod bitmap;
pub mod entry;
pub mod holder;
pub mod store;

pub use bitmap::Bitmap;
pub use entry::{CacheEntry, TaskLaunch};
pub use holder::ThumbnailHolder;
pub use store::{CacheStats, Reconciliation, ThumbnailKey, ThumbnailStore};
