//! Evictable thumbnail slot
//!
//! Wraps a decoded bitmap with soft-eviction semantics: the payload may be
//! reclaimed by the store under memory pressure, and an empty read means
//! "gone, recompute" - never an error. This is the explicit-slot rendition
//! of a soft reference: `get`/`set`/`clear`, with the store's LRU budget
//! deciding when `clear` happens.

use crate::Bitmap;
use std::sync::{Arc, Mutex};

/// Nullable payload slot for one cache entry.
#[derive(Default)]
pub struct ThumbnailHolder {
    slot: Mutex<Option<Arc<Bitmap>>>,
}

impl ThumbnailHolder {
    /// Create an empty holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the payload, if still resident.
    pub fn get(&self) -> Option<Arc<Bitmap>> {
        self.slot.lock().unwrap().clone()
    }

    /// Install a payload, returning the one it replaced.
    pub fn set(&self, bitmap: Arc<Bitmap>) -> Option<Arc<Bitmap>> {
        self.slot.lock().unwrap().replace(bitmap)
    }

    /// Remove and return the payload.
    pub fn take(&self) -> Option<Arc<Bitmap>> {
        self.slot.lock().unwrap().take()
    }

    /// Drop the payload.
    pub fn clear(&self) {
        self.slot.lock().unwrap().take();
    }

    /// Whether the slot currently has no payload.
    pub fn is_empty(&self) -> bool {
        self.slot.lock().unwrap().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_holder_reads_none() {
        let holder = ThumbnailHolder::new();
        assert!(holder.get().is_none());
        assert!(holder.is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let holder = ThumbnailHolder::new();
        let bitmap = Arc::new(Bitmap::solid(4, 4, [0, 0, 0, 255]));

        assert!(holder.set(bitmap.clone()).is_none());
        let read = holder.get().unwrap();
        assert!(Arc::ptr_eq(&read, &bitmap));
    }

    #[test]
    fn test_set_returns_replaced_payload() {
        let holder = ThumbnailHolder::new();
        let first = Arc::new(Bitmap::solid(1, 1, [1, 1, 1, 255]));
        let second = Arc::new(Bitmap::solid(1, 1, [2, 2, 2, 255]));

        holder.set(first.clone());
        let replaced = holder.set(second).unwrap();
        assert!(Arc::ptr_eq(&replaced, &first));
    }

    #[test]
    fn test_clear_then_get_means_recompute() {
        let holder = ThumbnailHolder::new();
        holder.set(Arc::new(Bitmap::solid(1, 1, [0, 0, 0, 0])));

        holder.clear();
        assert!(holder.get().is_none());
    }
}
