//! Prompt templates sent to the completion service

use spendlens_core::CategoryTotals;
use std::collections::BTreeMap;

/// `- Shopping: $45.67 (62% of total spending)` lines, largest first
pub fn breakdown_lines(totals: &CategoryTotals) -> String {
    let total = totals.total();
    totals
        .sorted_desc()
        .into_iter()
        .map(|(category, amount)| {
            let pct = if total > 0.0 { amount / total * 100.0 } else { 0.0 };
            format!("- {category}: ${amount:.2} ({pct:.0}% of total spending)")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn breakdown_prompt(totals: &CategoryTotals) -> String {
    format!(
        "You are a personal finance assistant summarizing a user's credit card spending.\n\
\n\
Total Spending: ${total:.2}\n\
\n\
Spending by category:\n\
{lines}\n\
\n\
Write a short, friendly summary that covers:\n\
- the total spent\n\
- every category above\n\
- which categories dominate and which are small\n\
- any patterns or suggestions worth mentioning",
        total = totals.total(),
        lines = breakdown_lines(totals),
    )
}

/// Prompt over raw statement text, cut to at most `max_chars` characters
pub fn statement_text_prompt(text: &str, max_chars: usize) -> String {
    let excerpt = truncate_chars(text, max_chars);
    format!(
        "You are a personal finance assistant. The text below was extracted from a \
credit card statement and may contain OCR noise.\n\
\n\
Summarize it for the account holder: total spent, notable merchants, fees or \
interest, and anything that needs attention.\n\
\n\
Statement:\n\
{excerpt}"
    )
}

/// Every summary as `Summary for {label}:\n{text}`, separated by a blank line
pub fn summaries_context(summaries: &BTreeMap<String, String>) -> String {
    summaries
        .iter()
        .map(|(label, text)| format!("Summary for {label}:\n{text}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn question_prompt(summaries: &BTreeMap<String, String>, question: &str) -> String {
    format!(
        "You are an assistant helping the user understand spending across one or more \
credit card statements. Answer using only the summaries below.\n\
\n\
Summaries:\n\
{context}\n\
\n\
Question: {question}\n\
Answer:",
        context = summaries_context(summaries),
        question = question.trim(),
    )
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spendlens_core::Category;

    #[test]
    fn test_breakdown_sorted_with_percentages() {
        let totals: CategoryTotals = [(Category::Travel, 25.0), (Category::Shopping, 75.0)]
            .into_iter()
            .collect();
        assert_eq!(
            breakdown_lines(&totals),
            "- Shopping: $75.00 (75% of total spending)\n- Travel: $25.00 (25% of total spending)"
        );
        let prompt = breakdown_prompt(&totals);
        assert!(prompt.contains("Total Spending: $100.00"));
    }

    #[test]
    fn test_context_joins_labels() {
        let mut s = BTreeMap::new();
        s.insert("april.pdf".to_string(), "Mostly travel.".to_string());
        s.insert("Combined Summary".to_string(), "You spent $100.".to_string());
        assert_eq!(
            summaries_context(&s),
            "Summary for Combined Summary:\nYou spent $100.\n\nSummary for april.pdf:\nMostly travel."
        );
        let prompt = question_prompt(&s, "  how much on travel? ");
        assert!(prompt.ends_with("Question: how much on travel?\nAnswer:"));
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate_chars("café au lait", 4), "café");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert!(statement_text_prompt("x".repeat(50).as_str(), 10).ends_with(&"x".repeat(10)));
    }
}
