//! OCR seam. The production engine shells out to the `tesseract` CLI.

use image::{DynamicImage, ImageFormat};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::ExtractError;

/// Converts a decoded bitmap into text
pub trait OcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, ExtractError>;
}

#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: String,
    lang: Option<String>,
}

impl TesseractCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            lang: None,
        }
    }

    /// Tesseract language pack, e.g. `eng`
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &DynamicImage) -> Result<String, ExtractError> {
        let bin = which::which(&self.command).map_err(|_| ExtractError::ToolMissing {
            tool: self.command.clone(),
        })?;

        // tesseract reads from a file; hand it a lossless copy of the bitmap
        let tmp = tempfile::Builder::new()
            .prefix("spendlens-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| ExtractError::io("ocr temp file", e))?;
        image.save_with_format(tmp.path(), ImageFormat::Png)?;

        let mut cmd = Command::new(&bin);
        cmd.arg(tmp.path()).arg("stdout");
        if let Some(lang) = &self.lang {
            cmd.arg("-l").arg(lang);
        }
        debug!(command = %bin.display(), width = image.width(), height = image.height(), "running ocr");

        let out = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ExtractError::io(bin.display().to_string(), e))?;
        if !out.status.success() {
            return Err(ExtractError::ToolFailed {
                tool: self.command.clone(),
                message: format!(
                    "exited with {}: {}",
                    out.status,
                    String::from_utf8_lossy(&out.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_reported() {
        let engine = TesseractCli::new("spendlens-no-such-ocr-binary");
        let img = DynamicImage::new_luma8(2, 2);
        let err = engine.recognize(&img).unwrap_err();
        assert!(matches!(err, ExtractError::ToolMissing { tool } if tool == "spendlens-no-such-ocr-binary"));
    }
}
