//! Completion events
//!
//! The generic completion channel the presentation layer subscribes to,
//! replacing per-widget invalidation callbacks. One event is fired per
//! completed, non-cancelled decode; cancelled or failed decodes fire
//! nothing. Events may arrive in any order relative to request order.

use thumbgrid_cache::ThumbnailKey;

/// A notification from the thumbnail engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// A thumbnail finished decoding and is resident in the cache; the
    /// presentation layer should re-render the tile for this key.
    ThumbnailReady { key: ThumbnailKey },
}
