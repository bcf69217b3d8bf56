//! Keyed thumbnail entry store
//!
//! One entry per thumbnail key, reconciled against the visible set on every
//! refresh. Payload bytes live under a memory limit with LRU eviction:
//! evicting clears an entry's holder but keeps the entry, so the thumbnail
//! is simply regenerated on the next request.
//!
//! Locking discipline: one mutex guards the key->entry map, the LRU queue
//! and the byte accounting; per-entry locks cover only payload and task
//! mutation. The store lock is never held while waiting on decode work.

use crate::bitmap::Bitmap;
use crate::entry::CacheEntry;
use log::debug;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Stable key correlating an item across reconciliation passes.
///
/// Keys are name-derived by the item, not identity-derived: two passes over
/// "the same" logical item must yield the same key.
pub type ThumbnailKey = String;

/// Statistics about store usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries currently held.
    pub entry_count: usize,

    /// Bytes of resident thumbnail payloads.
    pub memory_used: usize,

    /// Payload byte budget.
    pub memory_limit: usize,

    /// Payload reads that found a resident bitmap.
    pub hits: u64,

    /// Payload reads that found nothing (never computed, or evicted).
    pub misses: u64,

    /// Payloads cleared under memory pressure.
    pub evictions: u64,
}

impl CacheStats {
    /// Cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Fraction of the byte budget in use (0.0 to 1.0).
    pub fn memory_utilization(&self) -> f64 {
        if self.memory_limit == 0 {
            0.0
        } else {
            self.memory_used as f64 / self.memory_limit as f64
        }
    }
}

/// Result of a reconciliation pass.
#[derive(Debug, Default)]
pub struct Reconciliation {
    /// Keys present in the new ordered set but not yet in the store.
    pub created: Vec<ThumbnailKey>,

    /// Keys removed from the store; their in-flight tasks were cancelled
    /// before removal.
    pub retired: Vec<ThumbnailKey>,
}

struct StoreState {
    entries: HashMap<ThumbnailKey, Arc<CacheEntry>>,

    /// Keys with a resident payload; most recently used at the back.
    lru_queue: VecDeque<ThumbnailKey>,

    memory_used: usize,
    memory_limit: usize,
    stats: CacheStats,
}

impl StoreState {
    fn new(memory_limit: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru_queue: VecDeque::new(),
            memory_used: 0,
            memory_limit,
            stats: CacheStats {
                memory_limit,
                ..Default::default()
            },
        }
    }

    /// Mark a key most recently used.
    fn touch(&mut self, key: &str) {
        self.lru_queue.retain(|k| k != key);
        self.lru_queue.push_back(key.to_owned());
    }

    /// Clear the payload of the least recently used entry. The entry stays.
    fn evict_lru(&mut self) -> bool {
        while let Some(key) = self.lru_queue.pop_front() {
            if let Some(entry) = self.entries.get(&key) {
                if let Some(bitmap) = entry.holder().take() {
                    self.memory_used = self.memory_used.saturating_sub(bitmap.memory_size());
                    self.stats.evictions += 1;
                    self.stats.memory_used = self.memory_used;
                    return true;
                }
            }
        }
        false
    }

    /// Evict payloads until `required` more bytes fit under the limit.
    fn evict_to_fit(&mut self, required: usize) {
        while self.memory_used + required > self.memory_limit && !self.lru_queue.is_empty() {
            if !self.evict_lru() {
                break;
            }
        }
    }

    /// Stop accounting for a key's resident payload, if it has one.
    fn forget_payload(&mut self, key: &str, entry: &CacheEntry) {
        if let Some(bitmap) = entry.holder().take() {
            self.memory_used = self.memory_used.saturating_sub(bitmap.memory_size());
        }
        self.lru_queue.retain(|k| k != key);
        self.stats.memory_used = self.memory_used;
    }

    fn sync_counts(&mut self) {
        self.stats.entry_count = self.entries.len();
        self.stats.memory_used = self.memory_used;
    }
}

/// Thread-safe store of cache entries, one per thumbnail key.
///
/// # Example
///
/// ```
/// use thumbgrid_cache::ThumbnailStore;
///
/// let store = ThumbnailStore::with_mb_limit(64);
///
/// let entry = store.get_or_create("photo-001.jpg");
/// assert!(std::sync::Arc::ptr_eq(&entry, &store.get_or_create("photo-001.jpg")));
///
/// let outcome = store.reconcile(&["photo-002.jpg".to_owned()]);
/// assert_eq!(outcome.retired, vec!["photo-001.jpg".to_owned()]);
/// assert_eq!(outcome.created, vec!["photo-002.jpg".to_owned()]);
/// ```
pub struct ThumbnailStore {
    state: Mutex<StoreState>,
}

impl ThumbnailStore {
    /// Create a store with a payload byte budget.
    pub fn new(memory_limit: usize) -> Self {
        Self {
            state: Mutex::new(StoreState::new(memory_limit)),
        }
    }

    /// Create a store with a budget in megabytes.
    pub fn with_mb_limit(megabytes: usize) -> Self {
        Self::new(megabytes * 1024 * 1024)
    }

    /// Fetch the entry for a key, creating it on first sight.
    ///
    /// Idempotent: there are never two live entries for one key.
    pub fn get_or_create(&self, key: &str) -> Arc<CacheEntry> {
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.entries.get(key) {
            return entry.clone();
        }
        let entry = Arc::new(CacheEntry::new(key.to_owned()));
        state.entries.insert(key.to_owned(), entry.clone());
        state.sync_counts();
        entry
    }

    /// Fetch the entry for a key, if it exists.
    pub fn get(&self, key: &str) -> Option<Arc<CacheEntry>> {
        self.state.lock().unwrap().entries.get(key).cloned()
    }

    /// Whether an entry exists for the key.
    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().unwrap().entries.contains_key(key)
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().entries.is_empty()
    }

    /// Reconcile the store against the new ordered key set.
    ///
    /// Entries whose keys are absent from `current` are retired: their
    /// in-flight task is cancelled before the entry is removed, so a late
    /// decode completion can never write into a discarded entry. Keys in
    /// `current` without an entry are reported back for creation.
    pub fn reconcile(&self, current: &[ThumbnailKey]) -> Reconciliation {
        let mut state = self.state.lock().unwrap();

        let current_set: HashSet<&str> = current.iter().map(String::as_str).collect();
        debug_assert_eq!(
            current_set.len(),
            current.len(),
            "duplicate thumbnail keys in one reconciliation pass"
        );

        let retired: Vec<ThumbnailKey> = state
            .entries
            .keys()
            .filter(|key| !current_set.contains(key.as_str()))
            .cloned()
            .collect();

        for key in &retired {
            if let Some(entry) = state.entries.remove(key) {
                entry.cancel_task();
                state.forget_payload(key, &entry);
            }
        }

        let created: Vec<ThumbnailKey> = current
            .iter()
            .filter(|key| !state.entries.contains_key(*key))
            .cloned()
            .collect();

        state.sync_counts();
        if !created.is_empty() || !retired.is_empty() {
            debug!(
                "reconcile: {} keys to create, {} entries retired",
                created.len(),
                retired.len()
            );
        }

        Reconciliation { created, retired }
    }

    /// Read a resident payload.
    ///
    /// Touches LRU order and hit/miss counters but never triggers new work;
    /// a missing payload (never computed, evicted, or unknown key) is `None`.
    pub fn payload(&self, key: &str) -> Option<Arc<Bitmap>> {
        let mut state = self.state.lock().unwrap();
        let entry = match state.entries.get(key) {
            Some(entry) => entry.clone(),
            None => return None,
        };
        match entry.holder().get() {
            Some(bitmap) => {
                state.touch(key);
                state.stats.hits += 1;
                Some(bitmap)
            }
            None => {
                state.stats.misses += 1;
                None
            }
        }
    }

    /// Install a freshly decoded payload.
    ///
    /// Returns `false` when the key has been retired in the meantime - the
    /// result is dropped rather than written into a discarded entry. Evicts
    /// least recently used payloads until the new one fits the budget.
    pub fn store_payload(&self, key: &str, bitmap: Arc<Bitmap>) -> bool {
        let mut state = self.state.lock().unwrap();
        let entry = match state.entries.get(key) {
            Some(entry) => entry.clone(),
            None => return false,
        };

        state.forget_payload(key, &entry);

        let size = bitmap.memory_size();
        state.evict_to_fit(size);

        entry.holder().set(bitmap);
        state.memory_used += size;
        state.lru_queue.push_back(key.to_owned());
        state.sync_counts();
        true
    }

    /// Invalidate every payload and cancel every in-flight task.
    ///
    /// Used when the target thumbnail size changes: entries are kept, only
    /// their payload/task/failure state is reset, so the next icon request
    /// regenerates at the new size.
    pub fn invalidate_all(&self) {
        let mut state = self.state.lock().unwrap();
        for entry in state.entries.values() {
            entry.reset();
        }
        state.lru_queue.clear();
        state.memory_used = 0;
        state.sync_counts();
    }

    /// Cancel every in-flight task, leaving payloads untouched.
    ///
    /// Used on view teardown: outstanding thumbnails freeze at placeholder
    /// or last-good state.
    pub fn cancel_tasks(&self) {
        let state = self.state.lock().unwrap();
        for entry in state.entries.values() {
            entry.cancel_task();
        }
    }

    /// Cancel everything and empty the store.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        for entry in state.entries.values() {
            entry.cancel_task();
        }
        state.entries.clear();
        state.lru_queue.clear();
        state.memory_used = 0;
        state.sync_counts();
    }

    /// Current statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        self.state.lock().unwrap().stats
    }

    /// Bytes of resident payloads.
    pub fn memory_used(&self) -> usize {
        self.state.lock().unwrap().memory_used
    }

    /// The payload byte budget.
    pub fn memory_limit(&self) -> usize {
        self.state.lock().unwrap().memory_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<ThumbnailKey> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    fn bitmap_of(bytes: usize) -> Arc<Bitmap> {
        Arc::new(Bitmap::new(vec![0u8; bytes], (bytes / 4) as u32, 1))
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let store = ThumbnailStore::with_mb_limit(1);

        let first = store.get_or_create("a");
        let second = store.get_or_create("a");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reconcile_reports_symmetric_difference() {
        let store = ThumbnailStore::with_mb_limit(1);
        store.get_or_create("a");
        store.get_or_create("b");

        let outcome = store.reconcile(&keys(&["b", "c"]));
        assert_eq!(outcome.retired, vec!["a".to_owned()]);
        assert_eq!(outcome.created, vec!["c".to_owned()]);

        assert!(!store.contains("a"));
        assert!(store.contains("b"));
        // Creation is the caller's job, via get_or_create.
        assert!(!store.contains("c"));
    }

    #[test]
    fn test_reconcile_unchanged_set_is_a_noop() {
        let store = ThumbnailStore::with_mb_limit(1);
        store.get_or_create("a");
        store.get_or_create("b");

        let outcome = store.reconcile(&keys(&["a", "b"]));
        assert!(outcome.created.is_empty());
        assert!(outcome.retired.is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_reconcile_cancels_retired_tasks() {
        use thumbgrid_scheduler::{DecodePool, PoolConfig};
        let store = ThumbnailStore::with_mb_limit(1);
        let pool = DecodePool::new(
            PoolConfig::new(1).with_poll_interval(std::time::Duration::from_millis(2)),
        );

        let entry = store.get_or_create("a");
        let gate = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let open = gate.clone();
        entry.ensure_task(|| {
            pool.submit(move |task| {
                while !open.load(std::sync::atomic::Ordering::Acquire) {
                    std::thread::sleep(std::time::Duration::from_millis(1));
                }
                task.try_complete();
            })
        });
        assert!(entry.task_in_flight());

        let outcome = store.reconcile(&[]);
        assert_eq!(outcome.retired, vec!["a".to_owned()]);
        assert!(!entry.task_in_flight());
        gate.store(true, std::sync::atomic::Ordering::Release);
    }

    #[test]
    fn test_payload_roundtrip_counts_hits_and_misses() {
        let store = ThumbnailStore::with_mb_limit(1);
        store.get_or_create("a");

        assert!(store.payload("a").is_none());
        assert!(store.store_payload("a", bitmap_of(64)));
        assert!(store.payload("a").is_some());

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.memory_used, 64);
    }

    #[test]
    fn test_store_payload_for_retired_key_is_dropped() {
        let store = ThumbnailStore::with_mb_limit(1);
        store.get_or_create("a");
        store.reconcile(&[]);

        assert!(!store.store_payload("a", bitmap_of(64)));
        assert!(store.payload("a").is_none());
        assert_eq!(store.memory_used(), 0);
    }

    #[test]
    fn test_lru_eviction_clears_payload_but_keeps_entry() {
        let store = ThumbnailStore::new(256);
        store.get_or_create("a");
        store.get_or_create("b");
        store.get_or_create("c");

        store.store_payload("a", bitmap_of(128));
        store.store_payload("b", bitmap_of(128));
        // Third payload exceeds the budget; "a" is least recently used.
        store.store_payload("c", bitmap_of(128));

        assert!(store.payload("a").is_none());
        assert!(store.payload("b").is_some());
        assert!(store.payload("c").is_some());
        // The entry survives eviction; only its payload is gone.
        assert!(store.contains("a"));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_lru_order_follows_reads() {
        let store = ThumbnailStore::new(256);
        store.get_or_create("a");
        store.get_or_create("b");
        store.get_or_create("c");

        store.store_payload("a", bitmap_of(128));
        store.store_payload("b", bitmap_of(128));
        // Touch "a" so "b" becomes least recently used.
        assert!(store.payload("a").is_some());

        store.store_payload("c", bitmap_of(128));
        assert!(store.payload("a").is_some());
        assert!(store.payload("b").is_none());
        assert!(store.payload("c").is_some());
    }

    #[test]
    fn test_replacing_payload_updates_accounting() {
        let store = ThumbnailStore::new(1024);
        store.get_or_create("a");

        store.store_payload("a", bitmap_of(256));
        assert_eq!(store.memory_used(), 256);

        store.store_payload("a", bitmap_of(128));
        assert_eq!(store.memory_used(), 128);
    }

    #[test]
    fn test_invalidate_all_keeps_entries() {
        let store = ThumbnailStore::with_mb_limit(1);
        store.get_or_create("a");
        store.get_or_create("b");
        store.store_payload("a", bitmap_of(64));
        store.get("a").unwrap().mark_failed();

        store.invalidate_all();

        assert_eq!(store.len(), 2);
        assert!(store.payload("a").is_none());
        assert!(!store.get("a").unwrap().has_failed());
        assert_eq!(store.memory_used(), 0);
    }

    #[test]
    fn test_clear_empties_store() {
        let store = ThumbnailStore::with_mb_limit(1);
        store.get_or_create("a");
        store.store_payload("a", bitmap_of(64));

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.memory_used(), 0);
    }

    #[test]
    fn test_retired_key_reappears_clean() {
        let store = ThumbnailStore::with_mb_limit(1);
        store.get_or_create("a");
        store.store_payload("a", bitmap_of(64));

        store.reconcile(&[]);
        let entry = store.get_or_create("a");
        assert!(entry.holder().is_empty());
        assert!(!entry.task_in_flight());
        assert!(!entry.has_failed());
    }

    #[test]
    fn test_stats_ratios() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            memory_used: 512,
            memory_limit: 1024,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert!((stats.memory_utilization() - 0.5).abs() < f64::EPSILON);

        let empty = CacheStats::default();
        assert_eq!(empty.hit_rate(), 0.0);
        assert_eq!(empty.memory_utilization(), 0.0);
    }
}
