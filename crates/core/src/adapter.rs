//! View adapter
//!
//! Reconciles the ordered/filtered child sequence against the thumbnail
//! store and serves icons to the presentation layer. One coordination thread
//! calls `refresh`, `request_icon` and `set_target_size`; decode work runs
//! on the pool's workers and publishes results through the completion
//! channel. `request_icon` never blocks on a decode - it hands back a
//! placeholder and lets the channel trigger a later re-render.

use crate::event::GridEvent;
use crate::grid_item::GridItem;
use crate::item::{ContentTree, PlaceholderAssets, ThumbnailDecoder};
use crate::sort::{order_children, SortPreferences};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use thumbgrid_cache::{Bitmap, CacheStats, TaskLaunch, ThumbnailKey, ThumbnailStore};
use thumbgrid_scheduler::{DecodePool, PoolStats};

/// Grid-level configuration.
#[derive(Debug, Clone, Copy)]
pub struct GridConfig {
    /// Height and/or width of generated thumbnails in pixels.
    pub target_size: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { target_size: 128 }
    }
}

impl GridConfig {
    /// Set the initial thumbnail edge length.
    pub fn with_target_size(mut self, size: u32) -> Self {
        self.target_size = size;
        self
    }
}

/// The ordered snapshot produced by the last `refresh`.
#[derive(Default)]
struct ViewState {
    items: Vec<GridItem>,
    index: HashMap<ThumbnailKey, GridItem>,
}

/// Thumbnail grid over one parent collection.
///
/// Owns its store and its decode pool; constructing the pool and handing it
/// in makes shutdown ownership explicit - dropping or tearing down the grid
/// stops all decode work.
pub struct ThumbnailGrid {
    tree: Arc<dyn ContentTree>,
    decoder: Arc<dyn ThumbnailDecoder>,
    prefs: Arc<dyn SortPreferences>,
    assets: Arc<dyn PlaceholderAssets>,
    store: Arc<ThumbnailStore>,
    pool: DecodePool,
    target_size: AtomicU32,
    view: Mutex<ViewState>,

    /// Serializes the eligibility lookup; the underlying collaborator may
    /// not be reentrant-safe.
    eligibility_lock: Mutex<()>,

    events_tx: Sender<GridEvent>,
    events_rx: Receiver<GridEvent>,
}

impl ThumbnailGrid {
    /// Create a grid over `tree`, decoding through `decoder` on `pool`.
    pub fn new(
        tree: Arc<dyn ContentTree>,
        decoder: Arc<dyn ThumbnailDecoder>,
        prefs: Arc<dyn SortPreferences>,
        assets: Arc<dyn PlaceholderAssets>,
        store: Arc<ThumbnailStore>,
        pool: DecodePool,
        config: GridConfig,
    ) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            tree,
            decoder,
            prefs,
            assets,
            store,
            pool,
            target_size: AtomicU32::new(config.target_size),
            view: Mutex::new(ViewState::default()),
            eligibility_lock: Mutex::new(()),
            events_tx,
            events_rx,
        }
    }

    /// Re-derive the visible set.
    ///
    /// Pulls the current children, filters and orders them, retires cache
    /// entries whose keys disappeared (cancelling their tasks first) and
    /// builds wrapper items for the rest. Idempotent: an unchanged child set
    /// causes no entry churn and submits no work.
    pub fn refresh(&self) {
        let children = self.tree.children();
        let criteria = self.prefs.sort_criteria();

        let decoder = self.decoder.clone();
        let ordered = order_children(children, &criteria, |item| {
            let _guard = self.eligibility_lock.lock().unwrap();
            decoder.is_eligible(item)
        });

        let keys: Vec<ThumbnailKey> = ordered.iter().map(|item| item.key().to_owned()).collect();
        let outcome = self.store.reconcile(&keys);
        if !outcome.created.is_empty() || !outcome.retired.is_empty() {
            debug!(
                "refresh: {} new items, {} retired",
                outcome.created.len(),
                outcome.retired.len()
            );
        }

        let mut view = self.view.lock().unwrap();
        view.items.clear();
        view.index.clear();
        for item in ordered {
            let entry = self.store.get_or_create(item.key());
            let grid_item = GridItem::new(item, entry);
            view.index.insert(grid_item.key().to_owned(), grid_item.clone());
            view.items.push(grid_item);
        }
    }

    /// Serve the icon for a key without blocking.
    ///
    /// Returns the cached bitmap when resident; otherwise a placeholder,
    /// submitting a decode as a side effect when none is in flight. Unknown
    /// keys, latched decode failures and a shut-down pool all fall back to
    /// the default thumbnail.
    pub fn request_icon(&self, key: &str) -> Arc<Bitmap> {
        if let Some(bitmap) = self.store.payload(key) {
            return bitmap;
        }

        let grid_item = {
            let view = self.view.lock().unwrap();
            view.index.get(key).cloned()
        };
        let Some(grid_item) = grid_item else {
            return self.assets.default_thumbnail();
        };

        let entry = grid_item.entry().clone();
        if entry.has_failed() {
            return self.assets.default_thumbnail();
        }

        let launch = entry.ensure_task(|| {
            let item = grid_item.item_arc();
            let key = key.to_owned();
            let size = self.target_size.load(Ordering::Relaxed);
            let decoder = self.decoder.clone();
            let store = self.store.clone();
            let events = self.events_tx.clone();

            self.pool.submit(move |task| {
                match decoder.decode(item.as_ref(), size, task.token()) {
                    Ok(bitmap) => {
                        // Only the winner of the completion race publishes;
                        // a retired key additionally refuses the write.
                        if task.try_complete() {
                            if store.store_payload(&key, Arc::new(bitmap)) {
                                let _ = events.send(GridEvent::ThumbnailReady { key });
                            }
                        } else {
                            debug!("discarding decode result for {key}: task cancelled");
                        }
                    }
                    Err(err) => {
                        if task.try_complete() {
                            if let Some(entry) = store.get(&key) {
                                entry.mark_failed();
                            }
                            warn!("thumbnail decode failed for {key}: {err}");
                        } else {
                            debug!("decode for {key} failed after cancellation: {err}");
                        }
                    }
                }
            })
        });

        match launch {
            TaskLaunch::Started | TaskLaunch::AlreadyInFlight => self.assets.loading_spinner(),
            TaskLaunch::PoolUnavailable => self.assets.default_thumbnail(),
        }
    }

    /// Change the thumbnail size.
    ///
    /// Every cached payload is invalidated and every in-flight task
    /// cancelled - previous decodes are obsolete at the new size. Entries
    /// stay; the next icon request regenerates.
    pub fn set_target_size(&self, size: u32) {
        self.target_size.store(size, Ordering::Relaxed);
        self.store.invalidate_all();
        debug!("target size set to {size}px, cached thumbnails invalidated");
    }

    /// Current thumbnail edge length in pixels.
    pub fn target_size(&self) -> u32 {
        self.target_size.load(Ordering::Relaxed)
    }

    /// Stop all in-flight work and release the workers.
    ///
    /// Used on view teardown. Outstanding thumbnails freeze at placeholder
    /// or last-good state; later `request_icon` calls fall back to the
    /// default thumbnail instead of submitting.
    pub fn cancel_all(&self) {
        self.store.cancel_tasks();
        self.pool.shutdown_now();
    }

    /// The completion channel; one event per finished thumbnail.
    pub fn events(&self) -> Receiver<GridEvent> {
        self.events_rx.clone()
    }

    /// The ordered, filtered snapshot from the last `refresh`.
    pub fn visible_items(&self) -> Vec<GridItem> {
        self.view.lock().unwrap().items.clone()
    }

    /// Store counters (entries, bytes, hits, misses, evictions).
    pub fn cache_stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Pool counters (submitted, completed, cancelled).
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}
