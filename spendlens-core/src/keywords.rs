//! Keyword tables driving the classifier and categorizer.
//!
//! Tables are plain data: the built-in defaults can be replaced by a TOML
//! document of the same shape, e.g.
//!
//! ```toml
//! version = 1
//!
//! [statement]
//! threshold = 3
//! keywords = ["minimum payment", "statement period"]
//!
//! [[categories]]
//! category = "Travel"
//! keywords = ["uber", "lyft"]
//! ```

use crate::Category;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Schema version written into serialized tables
pub const KEYWORD_TABLE_VERSION: u32 = 1;

/// Minimum distinct statement keywords for a document to count as a statement
pub const DEFAULT_STATEMENT_THRESHOLD: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum KeywordTableError {
    #[error("reading keyword table {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing keyword table")]
    Parse(#[from] toml::de::Error),
    #[error("serializing keyword table")]
    Serialize(#[from] toml::ser::Error),
    #[error("unsupported keyword table version {found} (expected {})", KEYWORD_TABLE_VERSION)]
    Version { found: u32 },
    #[error("category {0} appears more than once")]
    DuplicateCategory(Category),
}

/// Keywords whose presence marks a document as a billing statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementKeywords {
    #[serde(default = "default_threshold")]
    pub threshold: usize,
    pub keywords: Vec<String>,
}

fn default_threshold() -> usize {
    DEFAULT_STATEMENT_THRESHOLD
}

/// One category and the substrings that select it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordTables {
    pub version: u32,
    pub statement: StatementKeywords,
    pub categories: Vec<CategoryRule>,
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            version: KEYWORD_TABLE_VERSION,
            statement: StatementKeywords {
                threshold: DEFAULT_STATEMENT_THRESHOLD,
                keywords: strings(&[
                    "credit card statement",
                    "minimum payment",
                    "payment due",
                    "total balance",
                    "previous balance",
                    "interest charge",
                    "transactions",
                    "purchases",
                    "cashback",
                    "statement period",
                ]),
            },
            categories: vec![
                rule(
                    Category::Restaurants,
                    &["restaurant", "biryani", "barbeque", "grubhub", "tacobell"],
                ),
                rule(Category::Groceries, &["bazaar", "supermarket", "grocery"]),
                rule(
                    Category::Entertainment,
                    &["netflix", "spotify", "amc", "fubo", "movie"],
                ),
                rule(
                    Category::Travel,
                    &["sw air", "lyft", "uber", "flight", "transport"],
                ),
                rule(
                    Category::Shopping,
                    &["amazon", "walmart", "kohls", "shopping", "store"],
                ),
                rule(Category::Utilities, &["tmobile", "mobile", "bill", "recharge"]),
                rule(Category::Services, &["salon", "nails", "services", "jadore"]),
            ],
        }
    }
}

impl KeywordTables {
    pub fn from_toml_str(s: &str) -> Result<Self, KeywordTableError> {
        let tables: KeywordTables = toml::from_str(s)?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn load(path: &Path) -> Result<Self, KeywordTableError> {
        let s = std::fs::read_to_string(path).map_err(|source| KeywordTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    pub fn to_toml_string(&self) -> Result<String, KeywordTableError> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), KeywordTableError> {
        if self.version != KEYWORD_TABLE_VERSION {
            return Err(KeywordTableError::Version {
                found: self.version,
            });
        }
        for (i, r) in self.categories.iter().enumerate() {
            if self.categories[..i].iter().any(|p| p.category == r.category) {
                return Err(KeywordTableError::DuplicateCategory(r.category));
            }
        }
        Ok(())
    }

    pub fn keywords_for(&self, category: Category) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|r| r.category == category)
            .map(|r| r.keywords.as_slice())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn rule(category: Category, keywords: &[&str]) -> CategoryRule {
    CategoryRule {
        category,
        keywords: strings(keywords),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_category() {
        let t = KeywordTables::default();
        for c in Category::ALL {
            assert!(t.keywords_for(c).is_some_and(|k| !k.is_empty()), "{c} missing");
        }
        assert_eq!(t.statement.keywords.len(), 10);
        assert_eq!(t.statement.threshold, 3);
    }

    #[test]
    fn test_toml_round_trip() {
        let t = KeywordTables::default();
        let s = t.to_toml_string().unwrap();
        assert_eq!(KeywordTables::from_toml_str(&s).unwrap(), t);
    }

    #[test]
    fn test_parse_custom_table() {
        let t = KeywordTables::from_toml_str(
            r#"
version = 1

[statement]
keywords = ["balance due", "account summary"]

[[categories]]
category = "Travel"
keywords = ["metro"]
"#,
        )
        .unwrap();
        assert_eq!(t.statement.threshold, DEFAULT_STATEMENT_THRESHOLD);
        assert_eq!(t.keywords_for(Category::Travel).unwrap(), ["metro"]);
        assert!(t.keywords_for(Category::Shopping).is_none());
    }

    #[test]
    fn test_rejects_wrong_version() {
        let err = KeywordTables::from_toml_str(
            "version = 2\ncategories = []\n[statement]\nkeywords = []\n",
        )
        .unwrap_err();
        assert!(matches!(err, KeywordTableError::Version { found: 2 }));
    }

    #[test]
    fn test_rejects_duplicate_category() {
        let err = KeywordTables::from_toml_str(
            r#"
version = 1
[statement]
keywords = []
[[categories]]
category = "Travel"
keywords = ["uber"]
[[categories]]
category = "Travel"
keywords = ["lyft"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, KeywordTableError::DuplicateCategory(Category::Travel)));
    }

    #[test]
    fn test_rejects_unknown_category() {
        let res = KeywordTables::from_toml_str(
            r#"
version = 1
[statement]
keywords = []
[[categories]]
category = "Housing"
keywords = ["rent"]
"#,
        );
        assert!(matches!(res, Err(KeywordTableError::Parse(_))));
    }
}
