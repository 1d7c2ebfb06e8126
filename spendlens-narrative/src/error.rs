use std::fmt;
use thiserror::Error;

/// Coarse reason a narrative could not be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Auth,
    Quota,
    Api,
    Parse,
    Config,
    Input,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Network => "network",
            FailureKind::Auth => "auth",
            FailureKind::Quota => "quota",
            FailureKind::Api => "api",
            FailureKind::Parse => "parse",
            FailureKind::Config => "config",
            FailureKind::Input => "input",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("request to completion service failed: {0}")]
    Network(String),

    #[error("completion service rejected credentials ({status}): {body}")]
    Auth { status: u16, body: String },

    #[error("completion service quota exceeded ({status}): {body}")]
    Quota { status: u16, body: String },

    #[error("completion service error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed completion response: {0}")]
    Parse(String),

    #[error("missing API key; set {env_var}")]
    MissingApiKey { env_var: String },

    #[error("could not initialise completion client: {0}")]
    Client(String),

    #[error("no categorized expenses found")]
    EmptyBreakdown,

    #[error("no statement text to summarize")]
    EmptyText,

    #[error("no summaries available to answer from")]
    NoSummaries,

    #[error("question is empty")]
    EmptyQuestion,
}

impl NarrativeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            NarrativeError::Network(_) => FailureKind::Network,
            NarrativeError::Auth { .. } => FailureKind::Auth,
            NarrativeError::Quota { .. } => FailureKind::Quota,
            NarrativeError::Api { .. } => FailureKind::Api,
            NarrativeError::Parse(_) => FailureKind::Parse,
            NarrativeError::MissingApiKey { .. } | NarrativeError::Client(_) => {
                FailureKind::Config
            }
            NarrativeError::EmptyBreakdown
            | NarrativeError::EmptyText
            | NarrativeError::NoSummaries
            | NarrativeError::EmptyQuestion => FailureKind::Input,
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => NarrativeError::Auth { status, body },
            429 => NarrativeError::Quota { status, body },
            _ => NarrativeError::Api { status, body },
        }
    }
}

/// Marker prefixed to every user-visible failure message
pub const FAILURE_MARKER: &str = "❌";

/// Text shown to the user when a narrative step fails
pub fn render_failure(context: &str, err: &NarrativeError) -> String {
    match err {
        NarrativeError::EmptyBreakdown => format!("{FAILURE_MARKER} No categorized expenses found."),
        _ => format!("{FAILURE_MARKER} {context}. Error: {err}"),
    }
}
