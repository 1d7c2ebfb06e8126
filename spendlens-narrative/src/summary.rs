//! Session-scoped cache of generated summaries

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Label used for the summary spanning every valid document
pub const COMBINED_LABEL: &str = "Combined Summary";

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub label: String,
    pub text: String,
    /// Digest of the inputs this summary was generated from
    pub fingerprint: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SummaryBook {
    entries: BTreeMap<String, Summary>,
}

impl SummaryBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: &str) -> Option<&Summary> {
        self.entries.get(label)
    }

    pub fn insert(&mut self, label: &str, fingerprint: &str, text: String) -> &Summary {
        let summary = Summary {
            label: label.to_string(),
            text,
            fingerprint: fingerprint.to_string(),
            generated_at: Utc::now(),
        };
        self.entries.insert(label.to_string(), summary);
        &self.entries[label]
    }

    /// Cached summary for `label`, regenerated when `fingerprint` changed.
    /// Failed generations are not cached.
    pub fn get_or_insert_with<E>(
        &mut self,
        label: &str,
        fingerprint: &str,
        generate: impl FnOnce() -> Result<String, E>,
    ) -> Result<&Summary, E> {
        let fresh = self
            .entries
            .get(label)
            .is_some_and(|s| s.fingerprint == fingerprint);
        if fresh {
            return Ok(&self.entries[label]);
        }
        let text = generate()?;
        Ok(self.insert(label, fingerprint, text))
    }

    /// `label → text`, the shape the Q&A prompt expects
    pub fn texts(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.text.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuses_until_fingerprint_changes() {
        let mut book = SummaryBook::new();
        let mut calls = 0;

        for fp in ["a", "a", "b"] {
            book.get_or_insert_with(COMBINED_LABEL, fp, || {
                calls += 1;
                Ok::<_, ()>(format!("summary {calls}"))
            })
            .unwrap();
        }
        assert_eq!(calls, 2);
        assert_eq!(book.get(COMBINED_LABEL).unwrap().text, "summary 2");
        assert_eq!(book.get(COMBINED_LABEL).unwrap().fingerprint, "b");
    }

    #[test]
    fn test_failures_are_not_cached() {
        let mut book = SummaryBook::new();
        let res = book.get_or_insert_with("x.pdf", "fp", || Err::<String, _>("offline"));
        assert_eq!(res.unwrap_err(), "offline");
        assert!(book.is_empty());
    }

    #[test]
    fn test_texts_by_label() {
        let mut book = SummaryBook::new();
        book.insert("a.pdf", "1", "A".to_string());
        book.insert("b.pdf", "2", "B".to_string());
        book.insert("b.pdf", "3", "B2".to_string());
        assert_eq!(book.len(), 2);
        assert_eq!(book.texts().get("b.pdf").map(String::as_str), Some("B2"));
    }
}
