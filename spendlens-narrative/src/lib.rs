//! spendlens-narrative: LLM-written spending summaries and Q&A

pub mod client;
pub mod error;
pub mod generator;
pub mod prompts;
pub mod summary;

pub use client::{ChatCompletionsClient, CompletionClient, LlmConfig};
pub use error::{FAILURE_MARKER, FailureKind, NarrativeError, render_failure};
pub use generator::NarrativeGenerator;
pub use summary::{COMBINED_LABEL, Summary, SummaryBook};
