//! One analysis run over a batch of uploaded documents.
//!
//! Documents are processed in the order given. Each one is extracted,
//! screened by the statement classifier and categorized; rejected documents
//! are kept aside with the reason so the caller can warn about them.

use serde::Serialize;
use spendlens_core::{
    CategoryTotals, ExpenseCategorizer, KeywordTables, PieChart, StatementClassifier,
    combine_documents, generate_pie_chart,
};
use spendlens_ingest::{ExtractedText, TextExtractor};
use spendlens_narrative::{
    COMBINED_LABEL, CompletionClient, NarrativeError, NarrativeGenerator, Summary, SummaryBook,
};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

pub const NOT_A_STATEMENT: &str = "This does not appear to be a valid credit card statement.";
pub const NO_VALID_DOCUMENTS: &str =
    "Please upload at least one valid credit card statement to proceed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ChartMode {
    /// One chart over every valid document
    #[default]
    Combined,
    /// One chart per valid document
    Individual,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    NoText,
    NotAStatement {
        matched: Vec<String>,
        threshold: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skipped {
    pub document: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

impl Skipped {
    pub fn message(&self) -> String {
        format!("⚠️ Skipped '{}': {NOT_A_STATEMENT}", self.document)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartPanel {
    /// `None` for the combined chart
    pub document: Option<String>,
    pub chart: Option<PieChart>,
}

pub struct Session {
    extractor: TextExtractor,
    classifier: StatementClassifier,
    categorizer: ExpenseCategorizer,
    documents: BTreeMap<String, CategoryTotals>,
    /// Accepted labels in upload order
    order: Vec<String>,
    skipped: Vec<Skipped>,
    summaries: SummaryBook,
}

impl Session {
    pub fn new(extractor: TextExtractor, tables: &KeywordTables) -> Self {
        Self {
            extractor,
            classifier: StatementClassifier::from_tables(tables),
            categorizer: ExpenseCategorizer::from_tables(tables),
            documents: BTreeMap::new(),
            order: Vec::new(),
            skipped: Vec::new(),
            summaries: SummaryBook::new(),
        }
    }

    /// Extract and admit one file. Returns the label it was stored under.
    pub fn add_file(&mut self, path: &Path) -> Result<String, Skipped> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let text = self.extractor.extract(path);
        self.add_text(&name, &text)
    }

    /// Admit already-extracted text under `name`
    pub fn add_text(&mut self, name: &str, text: &ExtractedText) -> Result<String, Skipped> {
        if text.is_empty() {
            return Err(self.skip(name, SkipReason::NoText));
        }
        let classification = self.classifier.classify(text.as_str());
        if !classification.is_statement() {
            return Err(self.skip(
                name,
                SkipReason::NotAStatement {
                    matched: classification.matched,
                    threshold: classification.threshold,
                },
            ));
        }

        let totals = self.categorizer.categorize(text.as_str());
        let label = self.unique_label(name);
        info!(
            document = %label,
            categories = totals.len(),
            total = totals.total(),
            "statement accepted"
        );
        self.documents.insert(label.clone(), totals);
        self.order.push(label.clone());
        Ok(label)
    }

    fn skip(&mut self, name: &str, reason: SkipReason) -> Skipped {
        warn!(document = name, ?reason, "document skipped");
        let skipped = Skipped {
            document: name.to_string(),
            reason,
        };
        self.skipped.push(skipped.clone());
        skipped
    }

    // Same file name uploaded twice keeps both documents
    fn unique_label(&self, name: &str) -> String {
        let taken = |l: &str| self.documents.contains_key(l) || l == COMBINED_LABEL;
        if !taken(name) {
            return name.to_string();
        }
        (2..)
            .map(|n| format!("{name} ({n})"))
            .find(|l| !taken(l))
            .unwrap_or_else(|| name.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &BTreeMap<String, CategoryTotals> {
        &self.documents
    }

    pub fn labels(&self) -> &[String] {
        &self.order
    }

    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    pub fn summaries(&self) -> &SummaryBook {
        &self.summaries
    }

    pub fn combined(&self) -> CategoryTotals {
        combine_documents(&self.documents)
    }

    /// A single document always gets the combined chart
    pub fn charts(&self, mode: ChartMode) -> Vec<ChartPanel> {
        if mode == ChartMode::Combined || self.order.len() <= 1 {
            return vec![ChartPanel {
                document: None,
                chart: generate_pie_chart(&self.combined()),
            }];
        }
        self.order
            .iter()
            .filter_map(|label| {
                self.documents.get(label).map(|totals| ChartPanel {
                    document: Some(label.clone()),
                    chart: generate_pie_chart(totals),
                })
            })
            .collect()
    }

    fn combined_fingerprint(&self) -> String {
        self.documents
            .iter()
            .map(|(label, totals)| format!("{label}|{}", totals.fingerprint()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Summary of every valid document together, reused while the set of
    /// documents is unchanged
    pub fn combined_summary<C: CompletionClient>(
        &mut self,
        generator: &NarrativeGenerator<C>,
    ) -> Result<&Summary, NarrativeError> {
        let fingerprint = self.combined_fingerprint();
        let documents = &self.documents;
        self.summaries
            .get_or_insert_with(COMBINED_LABEL, &fingerprint, || {
                generator.summarize_documents(documents)
            })
    }

    /// One summary per valid document, in upload order
    pub fn document_summaries<C: CompletionClient>(
        &mut self,
        generator: &NarrativeGenerator<C>,
    ) -> Vec<(String, Result<String, NarrativeError>)> {
        let mut out = Vec::with_capacity(self.order.len());
        for label in &self.order {
            let Some(totals) = self.documents.get(label) else {
                continue;
            };
            let res = self
                .summaries
                .get_or_insert_with(label, &totals.fingerprint(), || {
                    generator.summarize(totals)
                })
                .map(|s| s.text.clone());
            out.push((label.clone(), res));
        }
        out
    }

    /// Answer from whatever summaries this session has produced so far
    pub fn answer<C: CompletionClient>(
        &self,
        generator: &NarrativeGenerator<C>,
        question: &str,
    ) -> Result<String, NarrativeError> {
        generator.answer(&self.summaries.texts(), question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spendlens_core::Category;
    use spendlens_ingest::LineMode;
    use std::cell::{Cell, RefCell};

    const STATEMENT: &str = "\
Credit Card Statement
Statement Period: 03/01 - 03/31
Previous Balance $100.00
Minimum Payment Due $25.00
Transactions
03/02 UBER TRIP $12.00
03/05 NETFLIX.COM $15.99
03/09 AMAZON MKTPLACE $45.67";

    const APRIL: &str = "\
Credit Card Statement
Statement Period: 04/01 - 04/30
Payment Due 05/25
Transactions
04/03 WALMART STORE $20.00
04/11 LYFT RIDE $8.50";

    struct CountingClient {
        calls: Cell<usize>,
        prompts: RefCell<Vec<String>>,
    }

    impl CountingClient {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl CompletionClient for CountingClient {
        fn complete(&self, prompt: &str) -> Result<String, NarrativeError> {
            self.calls.set(self.calls.get() + 1);
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok(format!("summary #{}", self.calls.get()))
        }
    }

    fn session() -> Session {
        Session::new(TextExtractor::default(), &KeywordTables::default())
    }

    fn text(raw: &str) -> ExtractedText {
        ExtractedText::new(raw, LineMode::Preserve)
    }

    #[test]
    fn test_statement_is_accepted_and_categorized() {
        let mut s = session();
        let label = s.add_text("march.pdf", &text(STATEMENT)).unwrap();
        assert_eq!(label, "march.pdf");
        let totals = &s.documents()["march.pdf"];
        assert_eq!(totals.get(Category::Travel), Some(12.0));
        assert_eq!(totals.get(Category::Entertainment), Some(15.99));
        assert_eq!(totals.get(Category::Shopping), Some(45.67));
    }

    #[test]
    fn test_rejections_are_recorded() {
        let mut s = session();
        let err = s.add_text("empty.png", &ExtractedText::empty()).unwrap_err();
        assert_eq!(err.reason, SkipReason::NoText);

        let err = s
            .add_text("receipt.txt", &text("Thanks for shopping at the store $4.00"))
            .unwrap_err();
        assert!(matches!(err.reason, SkipReason::NotAStatement { threshold: 3, .. }));
        assert_eq!(
            err.message(),
            format!("⚠️ Skipped 'receipt.txt': {NOT_A_STATEMENT}")
        );

        assert!(s.is_empty());
        assert_eq!(s.skipped().len(), 2);
    }

    #[test]
    fn test_duplicate_names_keep_both() {
        let mut s = session();
        s.add_text("stmt.pdf", &text(STATEMENT)).unwrap();
        let second = s.add_text("stmt.pdf", &text(APRIL)).unwrap();
        assert_eq!(second, "stmt.pdf (2)");
        assert_eq!(s.documents().len(), 2);
        assert_eq!(s.combined().get(Category::Travel), Some(20.5));
    }

    #[test]
    fn test_chart_modes() {
        let mut s = session();
        s.add_text("march.pdf", &text(STATEMENT)).unwrap();
        let panels = s.charts(ChartMode::Individual);
        assert_eq!(panels.len(), 1);
        assert!(panels[0].document.is_none());

        s.add_text("april.pdf", &text(APRIL)).unwrap();
        let panels = s.charts(ChartMode::Individual);
        let labels: Vec<_> = panels.iter().filter_map(|p| p.document.clone()).collect();
        assert_eq!(labels, ["march.pdf", "april.pdf"]);

        let combined = s.charts(ChartMode::Combined);
        assert_eq!(combined.len(), 1);
        let chart = combined[0].chart.as_ref().unwrap();
        // "WALMART STORE" hits two Shopping keywords
        assert!((chart.total - 122.16).abs() < 1e-9);
    }

    #[test]
    fn test_combined_summary_regenerates_on_new_document() {
        let generator = NarrativeGenerator::new(CountingClient::new());
        let mut s = session();
        s.add_text("march.pdf", &text(STATEMENT)).unwrap();

        assert_eq!(s.combined_summary(&generator).unwrap().text, "summary #1");
        assert_eq!(s.combined_summary(&generator).unwrap().text, "summary #1");
        assert_eq!(generator.client().calls.get(), 1);

        s.add_text("april.pdf", &text(APRIL)).unwrap();
        assert_eq!(s.combined_summary(&generator).unwrap().text, "summary #2");
        let prompt = generator.client().prompts.borrow().last().cloned().unwrap();
        assert!(prompt.contains("- Travel: $20.50"));
    }

    #[test]
    fn test_answer_sees_every_summary() {
        let generator = NarrativeGenerator::new(CountingClient::new());
        let mut s = session();
        s.add_text("march.pdf", &text(STATEMENT)).unwrap();
        s.combined_summary(&generator).unwrap();
        let per_doc = s.document_summaries(&generator);
        assert_eq!(per_doc.len(), 1);
        assert!(per_doc[0].1.is_ok());

        s.answer(&generator, "Where did most money go?").unwrap();
        let prompt = generator.client().prompts.borrow().last().cloned().unwrap();
        assert!(prompt.contains("Summary for Combined Summary:"));
        assert!(prompt.contains("Summary for march.pdf:"));
    }

    #[test]
    fn test_add_file_reads_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("march.txt");
        std::fs::write(&good, STATEMENT).unwrap();
        let odd = dir.path().join("notes.rtf");
        std::fs::write(&odd, STATEMENT).unwrap();

        let mut s = session();
        assert_eq!(s.add_file(&good).unwrap(), "march.txt");
        assert_eq!(s.add_file(&odd).unwrap_err().reason, SkipReason::NoText);
    }

    #[test]
    fn test_skipped_serializes_with_reason() {
        let skipped = Skipped {
            document: "x.png".to_string(),
            reason: SkipReason::NoText,
        };
        let v = serde_json::to_value(&skipped).unwrap();
        assert_eq!(v["document"], "x.png");
        assert_eq!(v["reason"], "no_text");
    }
}
