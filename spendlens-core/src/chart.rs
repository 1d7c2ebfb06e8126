//! Pie-chart model of a spending breakdown. Rendering is left to the caller.

use crate::{Category, CategoryTotals};
use serde::Serialize;

pub const DEFAULT_CHART_TITLE: &str = "Expense Breakdown by Category";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub category: Category,
    pub amount: f64,
    /// Fraction of the chart total, 0.0 - 1.0
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    /// Inner radius as a fraction of the outer radius (donut hole)
    pub hole: f64,
    pub total: f64,
    pub slices: Vec<PieSlice>,
}

/// Build a chart from totals. Returns `None` when there is nothing to draw.
pub fn generate_pie_chart(totals: &CategoryTotals) -> Option<PieChart> {
    let total = totals.total();
    if totals.is_empty() || total <= 0.0 {
        return None;
    }
    let slices = totals
        .sorted_desc()
        .into_iter()
        .map(|(category, amount)| PieSlice {
            category,
            amount,
            share: amount / total,
        })
        .collect();
    Some(PieChart {
        title: DEFAULT_CHART_TITLE.to_string(),
        hole: 0.4,
        total,
        slices,
    })
}
