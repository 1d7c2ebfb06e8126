//! Line-by-line keyword categorization of statement text.
//!
//! Each line is checked against every category's keywords. Every keyword
//! found on the line adds the first `$1,234.56`-style amount on that line to
//! its category: `TMobile bill $50.00` hits `tmobile`, `mobile` and `bill`
//! and adds $150.00 to Utilities. One line may feed several categories.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::keywords::{CategoryRule, KeywordTables};
use crate::{Category, CategoryTotals};

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$(\d+[,\d]*\.\d{2})").expect("invalid amount regex"))
}

#[derive(Debug, Clone)]
pub struct ExpenseCategorizer {
    rules: Vec<(Category, Vec<String>)>,
}

impl ExpenseCategorizer {
    pub fn new(rules: &[CategoryRule]) -> Self {
        let rules = rules
            .iter()
            .map(|r| {
                let keywords = r
                    .keywords
                    .iter()
                    .map(|k| k.to_lowercase())
                    .filter(|k| !k.trim().is_empty())
                    .collect();
                (r.category, keywords)
            })
            .collect();
        Self { rules }
    }

    pub fn from_tables(tables: &KeywordTables) -> Self {
        Self::new(&tables.categories)
    }

    /// First currency amount on the line, thousands separators stripped
    pub fn line_amount(&self, line: &str) -> Option<f64> {
        let caps = amount_re().captures(line)?;
        caps[1].replace(',', "").parse().ok()
    }

    /// One `(category, keyword)` entry per keyword occurring in the line
    pub fn line_matches<'a>(&'a self, line: &str) -> Vec<(Category, &'a str)> {
        let lower = line.to_lowercase();
        self.rules
            .iter()
            .flat_map(|(c, keywords)| {
                keywords
                    .iter()
                    .filter(|k| lower.contains(k.as_str()))
                    .map(move |k| (*c, k.as_str()))
            })
            .collect()
    }

    pub fn categorize(&self, text: &str) -> CategoryTotals {
        let mut totals = CategoryTotals::new();
        for line in text.lines() {
            let matches = self.line_matches(line);
            if matches.is_empty() {
                continue;
            }
            let Some(amount) = self.line_amount(line) else {
                continue;
            };
            for (category, keyword) in matches {
                debug!(%category, keyword, amount, line, "categorized line");
                totals.add(category, amount);
            }
        }
        totals
    }
}

impl Default for ExpenseCategorizer {
    fn default() -> Self {
        Self::from_tables(&KeywordTables::default())
    }
}

/// Categorize with the built-in keyword table
pub fn categorize_expenses(text: &str) -> CategoryTotals {
    static DEFAULT: OnceLock<ExpenseCategorizer> = OnceLock::new();
    DEFAULT.get_or_init(ExpenseCategorizer::default).categorize(text)
}
