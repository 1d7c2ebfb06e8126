//! Keyword-count heuristic deciding whether text looks like a billing statement

use crate::keywords::{KeywordTables, StatementKeywords};
use tracing::debug;

/// Outcome of classifying one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Distinct keywords found, in table order
    pub matched: Vec<String>,
    pub threshold: usize,
}

impl Classification {
    pub fn is_statement(&self) -> bool {
        self.matched.len() >= self.threshold
    }
}

#[derive(Debug, Clone)]
pub struct StatementClassifier {
    keywords: Vec<String>,
    threshold: usize,
}

impl StatementClassifier {
    pub fn new(table: &StatementKeywords) -> Self {
        let mut keywords: Vec<String> = Vec::with_capacity(table.keywords.len());
        for k in &table.keywords {
            let k = k.trim().to_lowercase();
            if !k.is_empty() && !keywords.contains(&k) {
                keywords.push(k);
            }
        }
        Self {
            keywords,
            threshold: table.threshold,
        }
    }

    pub fn from_tables(tables: &KeywordTables) -> Self {
        Self::new(&tables.statement)
    }

    pub fn classify(&self, text: &str) -> Classification {
        let haystack = text.to_lowercase();
        let matched: Vec<String> = self
            .keywords
            .iter()
            .filter(|k| haystack.contains(k.as_str()))
            .cloned()
            .collect();
        debug!(?matched, threshold = self.threshold, "statement keywords detected");
        Classification {
            matched,
            threshold: self.threshold,
        }
    }

    pub fn looks_like_statement(&self, text: &str) -> bool {
        self.classify(text).is_statement()
    }
}

impl Default for StatementClassifier {
    fn default() -> Self {
        Self::from_tables(&KeywordTables::default())
    }
}

/// Classify with the built-in keyword table
pub fn is_credit_card_statement(text: &str) -> bool {
    StatementClassifier::default().looks_like_statement(text)
}
