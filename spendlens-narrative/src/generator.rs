use spendlens_core::{CategoryTotals, combine_documents};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::client::CompletionClient;
use crate::error::NarrativeError;
use crate::prompts;

/// Characters of raw statement text forwarded to the model
pub const DEFAULT_MAX_TEXT_CHARS: usize = 12_000;

/// Produces summaries and answers through an injected completion client.
/// Every call is a single independent request; nothing is remembered.
pub struct NarrativeGenerator<C> {
    client: C,
    max_text_chars: usize,
}

impl<C: CompletionClient> NarrativeGenerator<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }

    pub fn with_max_text_chars(mut self, max_text_chars: usize) -> Self {
        self.max_text_chars = max_text_chars;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Narrative for one category breakdown
    pub fn summarize(&self, totals: &CategoryTotals) -> Result<String, NarrativeError> {
        if totals.is_empty() {
            return Err(NarrativeError::EmptyBreakdown);
        }
        self.send("summary", &prompts::breakdown_prompt(totals))
    }

    /// Narrative for the combined breakdown of several documents
    pub fn summarize_documents(
        &self,
        documents: &BTreeMap<String, CategoryTotals>,
    ) -> Result<String, NarrativeError> {
        self.summarize(&combine_documents(documents))
    }

    /// Narrative written straight from extracted statement text
    pub fn summarize_from_text(&self, raw_text: &str) -> Result<String, NarrativeError> {
        if raw_text.trim().is_empty() {
            return Err(NarrativeError::EmptyText);
        }
        self.send(
            "text summary",
            &prompts::statement_text_prompt(raw_text, self.max_text_chars),
        )
    }

    /// Answer a question from previously generated summaries (`label → text`)
    pub fn answer(
        &self,
        summaries: &BTreeMap<String, String>,
        question: &str,
    ) -> Result<String, NarrativeError> {
        if question.trim().is_empty() {
            return Err(NarrativeError::EmptyQuestion);
        }
        if summaries.is_empty() {
            return Err(NarrativeError::NoSummaries);
        }
        self.send("answer", &prompts::question_prompt(summaries, question))
    }

    fn send(&self, what: &str, prompt: &str) -> Result<String, NarrativeError> {
        match self.client.complete(prompt) {
            Ok(text) => {
                info!(what, chars = text.len(), "narrative generated");
                Ok(text.trim().to_string())
            }
            Err(e) => {
                warn!(what, kind = %e.kind(), error = %e, "narrative request failed");
                Err(e)
            }
        }
    }
}
