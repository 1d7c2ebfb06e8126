//! Document → normalized text, dispatched on file extension.
//!
//! `try_extract` reports why a document yielded nothing; `extract` swallows
//! the error (after logging it) and returns empty text, which callers treat
//! as "skip this document".

use image::DynamicImage;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::docx::extract_docx_text;
use crate::error::ExtractError;
use crate::ocr::{OcrEngine, TesseractCli};
use crate::raster::{PageRasterizer, Pdftoppm};
use crate::types::{DocumentKind, ExtractedText, LineMode};

pub struct TextExtractor {
    ocr: Box<dyn OcrEngine>,
    rasterizer: Box<dyn PageRasterizer>,
    line_mode: LineMode,
}

impl TextExtractor {
    pub fn new(
        ocr: impl OcrEngine + 'static,
        rasterizer: impl PageRasterizer + 'static,
    ) -> Self {
        Self {
            ocr: Box::new(ocr),
            rasterizer: Box::new(rasterizer),
            line_mode: LineMode::default(),
        }
    }

    pub fn with_line_mode(mut self, line_mode: LineMode) -> Self {
        self.line_mode = line_mode;
        self
    }

    pub fn try_extract(&self, path: &Path) -> Result<ExtractedText, ExtractError> {
        let kind = DocumentKind::from_path(path).ok_or_else(|| {
            ExtractError::Unsupported(
                path.extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "<none>".to_string()),
            )
        })?;
        info!(path = %path.display(), ?kind, "extracting text");
        let raw = self.raw_text(kind, path)?;
        Ok(ExtractedText::new(&raw, self.line_mode))
    }

    pub fn extract(&self, path: &Path) -> ExtractedText {
        match self.try_extract(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "text extraction failed");
                ExtractedText::empty()
            }
        }
    }

    /// Extract an uploaded document held in memory.
    ///
    /// The bytes go to a temp file carrying the original extension; the file
    /// is removed when this returns.
    pub fn extract_bytes(&self, file_name: &str, bytes: &[u8]) -> ExtractedText {
        let suffix = Path::new(file_name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let tmp = tempfile::Builder::new()
            .prefix("spendlens-upload-")
            .suffix(&suffix)
            .tempfile()
            .and_then(|mut f| {
                f.write_all(bytes)?;
                f.flush()?;
                Ok(f)
            });
        match tmp {
            Ok(f) => self.extract(f.path()),
            Err(e) => {
                warn!(file_name, error = %e, "could not stage upload");
                ExtractedText::empty()
            }
        }
    }

    fn raw_text(&self, kind: DocumentKind, path: &Path) -> Result<String, ExtractError> {
        match kind {
            DocumentKind::Image => {
                let img = image::open(path)?;
                self.ocr.recognize(&img)
            }
            DocumentKind::Pdf => self.pdf_text(path),
            DocumentKind::WordProcessor => extract_docx_text(path),
            DocumentKind::PlainText => {
                let bytes = std::fs::read(path)
                    .map_err(|e| ExtractError::io(path.display().to_string(), e))?;
                String::from_utf8(bytes).map_err(|_| ExtractError::Utf8 {
                    path: path.display().to_string(),
                })
            }
        }
    }

    fn pdf_text(&self, path: &Path) -> Result<String, ExtractError> {
        let pages = self.rasterizer.rasterize(path)?;
        let mut texts = Vec::with_capacity(pages.len());
        for (i, page) in pages.into_iter().enumerate() {
            let gray = DynamicImage::ImageLuma8(page.to_luma8());
            let text = self.ocr.recognize(&gray)?;
            debug!(page = i + 1, chars = text.len(), "ocr page done");
            texts.push(text);
        }
        Ok(texts.join("\n"))
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(TesseractCli::default(), Pdftoppm::default())
    }
}

/// Extract with the default OCR/rasterizer tools; empty text on any failure
pub fn extract_text_from_file(path: impl AsRef<Path>) -> ExtractedText {
    TextExtractor::default().extract(path.as_ref())
}
