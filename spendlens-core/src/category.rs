//! Spending categories a statement line can be classified into

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of spending categories matched by keyword
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Restaurants,
    Groceries,
    Entertainment,
    Travel,
    Shopping,
    Utilities,
    Services,
}

impl Category {
    /// Every category, in table order
    pub const ALL: [Category; 7] = [
        Category::Restaurants,
        Category::Groceries,
        Category::Entertainment,
        Category::Travel,
        Category::Shopping,
        Category::Utilities,
        Category::Services,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Restaurants => "Restaurants",
            Category::Groceries => "Groceries",
            Category::Entertainment => "Entertainment",
            Category::Travel => "Travel",
            Category::Shopping => "Shopping",
            Category::Utilities => "Utilities",
            Category::Services => "Services",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive lookup by name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
