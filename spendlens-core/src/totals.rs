//! Per-category spending totals and the cross-document aggregator

use crate::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accumulated spend per category. Categories with no matches are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTotals(BTreeMap<Category, f64>);

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `category`, creating the entry if needed
    pub fn add(&mut self, category: Category, amount: f64) {
        *self.0.entry(category).or_insert(0.0) += amount;
    }

    pub fn get(&self, category: Category) -> Option<f64> {
        self.0.get(&category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.0.iter().map(|(c, a)| (*c, *a))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum across all categories
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Entries sorted by amount, largest first. Ties keep category order.
    pub fn sorted_desc(&self) -> Vec<(Category, f64)> {
        let mut items: Vec<_> = self.iter().collect();
        items.sort_by(|a, b| b.1.total_cmp(&a.1));
        items
    }

    /// Stable textual digest of the totals, used to detect stale summaries
    pub fn fingerprint(&self) -> String {
        self.iter()
            .map(|(c, a)| format!("{c}={a:.2}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl FromIterator<(Category, f64)> for CategoryTotals {
    fn from_iter<I: IntoIterator<Item = (Category, f64)>>(iter: I) -> Self {
        let mut totals = CategoryTotals::new();
        for (c, a) in iter {
            totals.add(c, a);
        }
        totals
    }
}

impl<'a> IntoIterator for &'a CategoryTotals {
    type Item = (&'a Category, &'a f64);
    type IntoIter = std::collections::btree_map::Iter<'a, Category, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Sum totals per category across documents.
///
/// Categories present in only some inputs carry through unchanged.
pub fn combine<'a, I>(parts: I) -> CategoryTotals
where
    I: IntoIterator<Item = &'a CategoryTotals>,
{
    parts.into_iter().flat_map(|t| t.iter()).collect()
}

/// Combine a session's per-document totals (keyed by file name)
pub fn combine_documents(documents: &BTreeMap<String, CategoryTotals>) -> CategoryTotals {
    combine(documents.values())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(items: &[(Category, f64)]) -> CategoryTotals {
        items.iter().copied().collect()
    }

    #[test]
    fn test_combine_two_documents() {
        let a = totals(&[(Category::Travel, 10.0)]);
        let b = totals(&[(Category::Travel, 5.0), (Category::Shopping, 2.0)]);
        let combined = combine([&a, &b]);
        assert_eq!(combined.get(Category::Travel), Some(15.0));
        assert_eq!(combined.get(Category::Shopping), Some(2.0));
        assert_eq!(combined.len(), 2);
    }

    #[test]
    fn test_combine_is_commutative_and_associative() {
        let a = totals(&[(Category::Travel, 10.5), (Category::Utilities, 40.0)]);
        let b = totals(&[(Category::Travel, 5.25), (Category::Shopping, 2.0)]);
        let ab = combine([&a, &b]);
        let ba = combine([&b, &a]);
        let nested = combine([&a, &combine([&b])]);
        assert_eq!(ab, ba);
        assert_eq!(ab, nested);
    }

    #[test]
    fn test_combine_empty_is_empty() {
        assert!(combine(std::iter::empty()).is_empty());
        assert!(combine_documents(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_sorted_desc_and_total() {
        let t = totals(&[
            (Category::Restaurants, 20.0),
            (Category::Shopping, 70.0),
            (Category::Travel, 10.0),
        ]);
        assert_eq!(t.total(), 100.0);
        let order: Vec<_> = t.sorted_desc().into_iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec![Category::Shopping, Category::Restaurants, Category::Travel]);
    }

    #[test]
    fn test_fingerprint_tracks_amounts() {
        let a = totals(&[(Category::Travel, 10.0)]);
        let b = totals(&[(Category::Travel, 10.01)]);
        assert_eq!(a.fingerprint(), "Travel=10.00");
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_serializes_as_name_keyed_object() {
        let t = totals(&[(Category::Shopping, 45.67)]);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"Shopping":45.67}"#);
    }
}
