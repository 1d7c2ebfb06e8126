//! Terminal and file renderings of session results

use anyhow::{Context, Result};
use serde::Serialize;
use spendlens_core::{CategoryTotals, PieChart};
use std::collections::BTreeMap;
use std::io::Write;

use crate::session::{ChartPanel, Skipped};

pub const BAR_WIDTH: usize = 30;

/// Category totals, largest first, followed by the grand total
pub fn render_totals(totals: &CategoryTotals) -> String {
    let mut out = String::new();
    for (category, amount) in totals.sorted_desc() {
        out.push_str(&format!("  {:<14} {:>12}\n", category.as_str(), format!("${amount:.2}")));
    }
    out.push_str(&format!("  {:<14} {:>12}\n", "Total", format!("${:.2}", totals.total())));
    out
}

/// Horizontal bar rendering of a pie chart model
pub fn render_chart(chart: &PieChart, width: usize) -> String {
    let mut out = format!("{}\n", chart.title);
    for slice in &chart.slices {
        let filled = ((slice.share * width as f64).round() as usize).min(width);
        out.push_str(&format!(
            "  {:<14} {}{} {:>12} {:>4.0}%\n",
            slice.category.as_str(),
            "█".repeat(filled),
            "░".repeat(width - filled),
            format!("${:.2}", slice.amount),
            slice.share * 100.0
        ));
    }
    out
}

pub fn render_panel(panel: &ChartPanel) -> String {
    let heading = match &panel.document {
        Some(doc) => format!("**{doc}**\n"),
        None => String::new(),
    };
    match &panel.chart {
        Some(chart) => format!("{heading}{}", render_chart(chart, BAR_WIDTH)),
        None => format!("{heading}  (no categorized expenses)\n"),
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    document: &'a str,
    category: &'a str,
    amount: String,
}

/// One row per document and category, then the combined totals under `combined`
pub fn write_csv<W: Write>(
    w: W,
    labels: &[String],
    documents: &BTreeMap<String, CategoryTotals>,
    combined: &CategoryTotals,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    let per_doc = labels
        .iter()
        .filter_map(|l| documents.get(l).map(|t| (l.as_str(), t)));
    for (document, totals) in per_doc.chain(std::iter::once(("combined", combined))) {
        for (category, amount) in totals.sorted_desc() {
            wtr.serialize(CsvRow {
                document,
                category: category.as_str(),
                amount: format!("{amount:.2}"),
            })
            .context("write csv row")?;
        }
    }
    wtr.flush().context("flush csv")?;
    Ok(())
}

/// Machine-readable result of an `analyze` run
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub documents: &'a BTreeMap<String, CategoryTotals>,
    pub combined: CategoryTotals,
    pub skipped: &'a [Skipped],
    pub charts: Vec<ChartPanel>,
    pub summaries: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}
