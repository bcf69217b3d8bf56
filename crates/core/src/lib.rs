//! Thumbgrid Core Library
//!
//! The view-adapter half of the thumbnail engine: it pulls the current child
//! set from an external content tree, orders and filters it through pluggable
//! sort criteria, reconciles the result against the thumbnail store, and
//! serves icons without ever blocking on decode work. Decodes run on the
//! dedicated worker pool from `thumbgrid-scheduler`; finished thumbnails are
//! announced on a completion channel the presentation layer subscribes to.
//!
//! External collaborators (the content tree, the decoder, persisted sort
//! preferences, placeholder assets) are consumed through the traits in
//! [`item`] and [`sort`]; this crate owns no widget, no disk format and no
//! decode routine.

pub mod adapter;
pub mod error;
pub mod event;
pub mod grid_item;
pub mod item;
pub mod sort;

pub use adapter::{GridConfig, ThumbnailGrid};
pub use error::DecodeError;
pub use event::GridEvent;
pub use grid_item::GridItem;
pub use item::{ContentTree, Item, PlaceholderAssets, PropertyValue, ThumbnailDecoder};
pub use sort::{SortCriterion, SortOrder, SortPreferences};

// Payload and scheduling types callers need alongside the adapter.
pub use thumbgrid_cache::{Bitmap, CacheStats, ThumbnailKey, ThumbnailStore};
pub use thumbgrid_scheduler::{CancellationToken, DecodePool, PoolConfig, PoolStats};
