//! Sort/filter pipeline
//!
//! Turns the raw child set into a deterministically ordered, filtered
//! sequence. Each criterion compares one extracted property; criteria
//! compose left to right, each breaking only the ties its predecessors left
//! unresolved. Missing values sort before present ones, and a descending
//! criterion reverses the whole ordering - null placement included, not
//! independently of it.

use crate::item::Item;
use std::cmp::Ordering;
use std::sync::Arc;

/// Direction of one sort criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
    /// Persisted criteria may carry no direction; treated like Descending,
    /// matching the behavior users already rely on.
    Unsorted,
}

/// One (property, direction) ordering rule.
#[derive(Debug, Clone)]
pub struct SortCriterion {
    /// Name of the property to project out of each item.
    pub property: String,

    /// Sort direction.
    pub order: SortOrder,
}

impl SortCriterion {
    /// Create a criterion over the named property.
    pub fn new(property: impl Into<String>, order: SortOrder) -> Self {
        Self {
            property: property.into(),
            order,
        }
    }

    /// Compare two items under this criterion alone.
    pub fn compare(&self, a: &dyn Item, b: &dyn Item) -> Ordering {
        let va = a.property(&self.property);
        let vb = b.property(&self.property);
        let ord = match (&va, &vb) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.compare(y),
        };
        match self.order {
            SortOrder::Ascending => ord,
            SortOrder::Descending | SortOrder::Unsorted => ord.reverse(),
        }
    }
}

/// Persisted sort settings from the settings collaborator.
pub trait SortPreferences: Send + Sync {
    /// The criteria to apply, first one most significant. An empty list is
    /// valid and means "no defined order".
    fn sort_criteria(&self) -> Vec<SortCriterion>;
}

/// Compare two items under a criteria list, left-to-right tie-breaking.
pub fn compare_with(criteria: &[SortCriterion], a: &dyn Item, b: &dyn Item) -> Ordering {
    for criterion in criteria {
        let ord = criterion.compare(a, b);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Filter eligible items, then order them.
///
/// With empty criteria the insertion order is kept (the sort is stable and
/// compares everything equal). The predicate runs once per item on the
/// calling thread; callers whose eligibility lookup is not reentrant-safe
/// serialize inside the closure.
pub fn order_children<F>(
    items: Vec<Arc<dyn Item>>,
    criteria: &[SortCriterion],
    mut predicate: F,
) -> Vec<Arc<dyn Item>>
where
    F: FnMut(&dyn Item) -> bool,
{
    let mut eligible: Vec<Arc<dyn Item>> = items
        .into_iter()
        .filter(|item| predicate(item.as_ref()))
        .collect();
    eligible.sort_by(|a, b| compare_with(criteria, a.as_ref(), b.as_ref()));
    eligible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::PropertyValue;
    use std::collections::HashMap;

    struct TestItem {
        key: String,
        props: HashMap<String, PropertyValue>,
    }

    impl TestItem {
        fn new(key: &str, props: &[(&str, PropertyValue)]) -> Arc<dyn Item> {
            Arc::new(Self {
                key: key.to_owned(),
                props: props
                    .iter()
                    .map(|(k, v)| ((*k).to_owned(), v.clone()))
                    .collect(),
            })
        }
    }

    impl Item for TestItem {
        fn key(&self) -> &str {
            &self.key
        }

        fn display_name(&self) -> &str {
            &self.key
        }

        fn property(&self, name: &str) -> Option<PropertyValue> {
            self.props.get(name).cloned()
        }
    }

    fn ordered_keys(items: &[Arc<dyn Item>]) -> Vec<&str> {
        items.iter().map(|i| i.key()).collect()
    }

    #[test]
    fn test_composition_breaks_ties_left_to_right() {
        let item = |name: &str, size: i64| {
            TestItem::new(
                name,
                &[
                    ("size", PropertyValue::Int(size)),
                    ("name", PropertyValue::Text(name.to_owned())),
                ],
            )
        };
        let items = vec![item("b", 5), item("a", 5), item("z", 3)];
        let criteria = vec![
            SortCriterion::new("size", SortOrder::Descending),
            SortCriterion::new("name", SortOrder::Ascending),
        ];

        let ordered = order_children(items, &criteria, |_| true);
        assert_eq!(ordered_keys(&ordered), vec!["a", "b", "z"]);
    }

    #[test]
    fn test_nulls_first_ascending() {
        let items = vec![
            TestItem::new("x", &[("size", PropertyValue::Int(1))]),
            TestItem::new("missing", &[]),
            TestItem::new("y", &[("size", PropertyValue::Int(2))]),
        ];
        let criteria = vec![SortCriterion::new("size", SortOrder::Ascending)];

        let ordered = order_children(items, &criteria, |_| true);
        assert_eq!(ordered_keys(&ordered), vec!["missing", "x", "y"]);
    }

    #[test]
    fn test_nulls_last_under_reversal() {
        let items = vec![
            TestItem::new("missing", &[]),
            TestItem::new("x", &[("size", PropertyValue::Int(1))]),
            TestItem::new("y", &[("size", PropertyValue::Int(2))]),
        ];
        let criteria = vec![SortCriterion::new("size", SortOrder::Descending)];

        let ordered = order_children(items, &criteria, |_| true);
        // The null-first rule participates in the reversal.
        assert_eq!(ordered_keys(&ordered), vec!["y", "x", "missing"]);
    }

    #[test]
    fn test_unsorted_behaves_like_descending() {
        let items = vec![
            TestItem::new("x", &[("size", PropertyValue::Int(1))]),
            TestItem::new("y", &[("size", PropertyValue::Int(2))]),
        ];
        let criteria = vec![SortCriterion::new("size", SortOrder::Unsorted)];

        let ordered = order_children(items, &criteria, |_| true);
        assert_eq!(ordered_keys(&ordered), vec!["y", "x"]);
    }

    #[test]
    fn test_empty_criteria_keeps_insertion_order() {
        let items = vec![
            TestItem::new("c", &[]),
            TestItem::new("a", &[]),
            TestItem::new("b", &[]),
        ];
        let ordered = order_children(items, &[], |_| true);
        assert_eq!(ordered_keys(&ordered), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_predicate_filters_before_ordering() {
        let items = vec![
            TestItem::new("keep-1", &[]),
            TestItem::new("drop", &[]),
            TestItem::new("keep-2", &[]),
        ];
        let ordered = order_children(items, &[], |item| item.key().starts_with("keep"));
        assert_eq!(ordered_keys(&ordered), vec!["keep-1", "keep-2"]);
    }

    #[test]
    fn test_mixed_property_types_do_not_panic() {
        let items = vec![
            TestItem::new("a", &[("v", PropertyValue::Int(10))]),
            TestItem::new("b", &[("v", PropertyValue::Text("9".into()))]),
        ];
        let criteria = vec![SortCriterion::new("v", SortOrder::Ascending)];
        // String fallback: "10" < "9".
        let ordered = order_children(items, &criteria, |_| true);
        assert_eq!(ordered_keys(&ordered), vec!["a", "b"]);
    }
}
