//! Grid wrapper items
//!
//! A grid item pairs an external item with its cache entry by composition -
//! no inheriting of the external tree node's interface. It exposes only the
//! capability surface the presentation layer needs: a key and an abbreviated
//! display name. Icons are requested through the adapter, keyed.

use crate::item::Item;
use std::sync::Arc;
use thumbgrid_cache::CacheEntry;

/// Longest display name shown under a grid tile.
const DISPLAY_NAME_MAX: usize = 18;

/// One visible tile: an external item plus its cache entry.
#[derive(Clone)]
pub struct GridItem {
    item: Arc<dyn Item>,
    entry: Arc<CacheEntry>,
}

impl GridItem {
    pub(crate) fn new(item: Arc<dyn Item>, entry: Arc<CacheEntry>) -> Self {
        Self { item, entry }
    }

    /// The stable thumbnail key.
    pub fn key(&self) -> &str {
        self.entry.key()
    }

    /// Display name, abbreviated to fit under a tile.
    pub fn display_name(&self) -> String {
        abbreviate(self.item.display_name(), DISPLAY_NAME_MAX)
    }

    /// The wrapped external item.
    pub fn item(&self) -> &dyn Item {
        self.item.as_ref()
    }

    pub(crate) fn item_arc(&self) -> Arc<dyn Item> {
        self.item.clone()
    }

    pub(crate) fn entry(&self) -> &Arc<CacheEntry> {
        &self.entry
    }
}

/// Shorten `s` to at most `max` characters, ellipsis-terminated.
fn abbreviate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_owned();
    }
    let head: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviate_short_name_unchanged() {
        assert_eq!(abbreviate("photo.jpg", 18), "photo.jpg");
    }

    #[test]
    fn test_abbreviate_exact_length_unchanged() {
        let name = "123456789012345678";
        assert_eq!(abbreviate(name, 18), name);
    }

    #[test]
    fn test_abbreviate_long_name_gets_ellipsis() {
        let name = "a-very-long-file-name.jpeg";
        let short = abbreviate(name, 18);
        assert_eq!(short.chars().count(), 18);
        assert!(short.ends_with("..."));
        assert_eq!(short, "a-very-long-fil...");
    }

    #[test]
    fn test_abbreviate_counts_chars_not_bytes() {
        let name = "ääääääääääääääääääää";
        let short = abbreviate(name, 18);
        assert_eq!(short.chars().count(), 18);
        assert!(short.ends_with("..."));
    }
}
