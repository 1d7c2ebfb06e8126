use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Image,
    Pdf,
    WordProcessor,
    PlainText,
}

impl DocumentKind {
    /// Map a file extension (without the dot, any case) to a document kind
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" => Some(DocumentKind::Image),
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::WordProcessor),
            "txt" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// How line breaks are treated when normalizing extracted text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineMode {
    /// Collapse whitespace within each line, keep one `\n` between non-blank lines
    #[default]
    Preserve,
    /// Collapse every whitespace run, newlines included, into one space
    Flatten,
}

pub fn normalize(raw: &str, mode: LineMode) -> String {
    match mode {
        LineMode::Flatten => collapse(raw),
        LineMode::Preserve => raw
            .lines()
            .map(collapse)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized text of one document. Empty means nothing could be extracted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn new(raw: &str, mode: LineMode) -> Self {
        Self(normalize(raw, mode))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for ExtractedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_extension("PNG"), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_extension("jpeg"), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_extension("Pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_extension("docx"), Some(DocumentKind::WordProcessor));
        assert_eq!(DocumentKind::from_extension("txt"), Some(DocumentKind::PlainText));
        assert_eq!(DocumentKind::from_extension("doc"), None);
        assert_eq!(DocumentKind::from_path(&PathBuf::from("statement")), None);
    }

    #[test]
    fn test_preserve_keeps_lines() {
        let raw = "  Uber   ride\t$12.00 \r\n\n\n Netflix  $15.99\n   \n";
        assert_eq!(normalize(raw, LineMode::Preserve), "Uber ride $12.00\nNetflix $15.99");
    }

    #[test]
    fn test_flatten_joins_everything() {
        let raw = "  Uber   ride\t$12.00 \r\n\n Netflix  $15.99\x0c";
        assert_eq!(normalize(raw, LineMode::Flatten), "Uber ride $12.00 Netflix $15.99");
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert!(ExtractedText::new(" \n\t \n", LineMode::Preserve).is_empty());
        assert!(ExtractedText::new(" \n\t \n", LineMode::Flatten).is_empty());
    }
}
