//! External collaborator interfaces
//!
//! The thumbnail engine never owns file-system access, media decoding or
//! static imagery; it consumes them through the traits below. Items are
//! opaque handles supplied by the external content tree and are read-only
//! to this subsystem.

use crate::error::DecodeError;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use thumbgrid_cache::Bitmap;
use thumbgrid_scheduler::CancellationToken;

/// One file-like entity from the external content tree.
pub trait Item: Send + Sync {
    /// Stable, name-derived key. Must be unique within one parent collection
    /// and identical across reconciliation passes for the same logical item.
    fn key(&self) -> &str;

    /// Human-readable name for the grid tile.
    fn display_name(&self) -> &str;

    /// A sortable projection of the item, or `None` when the item has no
    /// value for that property.
    fn property(&self, name: &str) -> Option<PropertyValue>;
}

/// Lazy enumeration of one parent's children.
pub trait ContentTree: Send + Sync {
    /// The current child set. Children may arrive incrementally; every call
    /// returns the set as it stands now.
    fn children(&self) -> Vec<Arc<dyn Item>>;
}

/// The media collaborator: eligibility plus the actual decode routine.
pub trait ThumbnailDecoder: Send + Sync {
    /// Whether the item supports thumbnailing at all.
    fn is_eligible(&self, item: &dyn Item) -> bool;

    /// Decode `item` into a bitmap with `size` as the bounding edge length.
    ///
    /// Pure with respect to the cache. Should check `token` cooperatively;
    /// a decode that ignores the token still finishes harmlessly, its result
    /// is just discarded.
    fn decode(
        &self,
        item: &dyn Item,
        size: u32,
        token: &CancellationToken,
    ) -> Result<Bitmap, DecodeError>;
}

/// Static imagery from the presentation collaborator.
pub trait PlaceholderAssets: Send + Sync {
    /// Shown when no thumbnail can be produced.
    fn default_thumbnail(&self) -> Arc<Bitmap>;

    /// Shown while a decode is pending.
    fn loading_spinner(&self) -> Arc<Bitmap>;
}

/// A comparable projection of an item property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl PropertyValue {
    /// Total order over property values.
    ///
    /// Same-variant values compare naturally (floats via `total_cmp`);
    /// values of different variants fall back to comparing their string
    /// representations. The fallback can produce surprising orderings across
    /// heterogeneous property types; that behavior is deliberate and kept
    /// as-is.
    pub fn compare(&self, other: &PropertyValue) -> Ordering {
        use PropertyValue::*;
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Bool(a), Bool(b)) => a.cmp(b),
            _ => self.to_string().cmp(&other.to_string()),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Int(v) => write!(f, "{v}"),
            PropertyValue::Float(v) => write!(f, "{v}"),
            PropertyValue::Text(v) => write!(f, "{v}"),
            PropertyValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_variant_natural_order() {
        assert_eq!(
            PropertyValue::Int(3).compare(&PropertyValue::Int(5)),
            Ordering::Less
        );
        assert_eq!(
            PropertyValue::Text("b".into()).compare(&PropertyValue::Text("a".into())),
            Ordering::Greater
        );
        assert_eq!(
            PropertyValue::Float(1.5).compare(&PropertyValue::Float(1.5)),
            Ordering::Equal
        );
        assert_eq!(
            PropertyValue::Bool(false).compare(&PropertyValue::Bool(true)),
            Ordering::Less
        );
    }

    #[test]
    fn test_float_total_order_handles_nan() {
        let nan = PropertyValue::Float(f64::NAN);
        let one = PropertyValue::Float(1.0);
        // total_cmp puts NaN after all finite values; what matters is that
        // it neither panics nor reports a bogus Equal.
        assert_eq!(nan.compare(&one), Ordering::Greater);
        assert_eq!(nan.compare(&nan), Ordering::Equal);
    }

    #[test]
    fn test_cross_variant_falls_back_to_strings() {
        // "10" < "9" lexicographically - the imprecision is intentional.
        assert_eq!(
            PropertyValue::Int(10).compare(&PropertyValue::Text("9".into())),
            Ordering::Less
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(PropertyValue::Int(42).to_string(), "42");
        assert_eq!(PropertyValue::Text("x".into()).to_string(), "x");
        assert_eq!(PropertyValue::Bool(true).to_string(), "true");
    }
}
