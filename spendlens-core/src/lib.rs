//! spendlens-core: spending categories, keyword tables, statement
//! classification, line categorization and cross-document aggregation

pub mod category;
pub mod categorizer;
pub mod chart;
pub mod classifier;
pub mod keywords;
pub mod totals;

pub use category::{Category, UnknownCategory};
pub use categorizer::{ExpenseCategorizer, categorize_expenses};
pub use chart::{PieChart, PieSlice, generate_pie_chart};
pub use classifier::{Classification, StatementClassifier, is_credit_card_statement};
pub use keywords::{CategoryRule, KeywordTableError, KeywordTables, StatementKeywords};
pub use totals::{CategoryTotals, combine, combine_documents};
