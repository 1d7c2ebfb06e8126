//! PDF page rendering. The production rasterizer drives poppler's `pdftoppm`.

use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::ExtractError;

pub const DEFAULT_DPI: u32 = 200;

/// Renders every page of a PDF to a bitmap, in page order
pub trait PageRasterizer {
    fn rasterize(&self, pdf: &Path) -> Result<Vec<DynamicImage>, ExtractError>;
}

#[derive(Debug, Clone)]
pub struct Pdftoppm {
    command: String,
    dpi: u32,
}

impl Pdftoppm {
    pub fn new(command: impl Into<String>, dpi: u32) -> Self {
        Self {
            command: command.into(),
            dpi,
        }
    }
}

impl Default for Pdftoppm {
    fn default() -> Self {
        Self::new("pdftoppm", DEFAULT_DPI)
    }
}

impl PageRasterizer for Pdftoppm {
    fn rasterize(&self, pdf: &Path) -> Result<Vec<DynamicImage>, ExtractError> {
        let bin = which::which(&self.command).map_err(|_| ExtractError::ToolMissing {
            tool: self.command.clone(),
        })?;
        let dir = tempfile::tempdir().map_err(|e| ExtractError::io("raster temp dir", e))?;
        let prefix = dir.path().join("page");

        let out = Command::new(&bin)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(pdf)
            .arg(&prefix)
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

        let pages = page_files(dir.path())?;
        debug!(pdf = %pdf.display(), pages = pages.len(), dpi = self.dpi, "rasterized pdf");
        pages
            .into_iter()
            .map(|(_, p)| image::open(&p).map_err(ExtractError::from))
            .collect()
    }
}

/// `page-1.png`, `page-02.png`, ... sorted by page number
fn page_files(dir: &Path) -> Result<Vec<(u32, PathBuf)>, ExtractError> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| ExtractError::io(dir.display().to_string(), e))?;
    let mut pages = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| ExtractError::io(dir.display().to_string(), e))?
            .path();
        if let Some(n) = page_number(&path) {
            pages.push((n, path));
        }
    }
    pages.sort_by_key(|(n, _)| *n);
    Ok(pages)
}

fn page_number(path: &Path) -> Option<u32> {
    if path.extension()?.to_str()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.rsplit_once('-')?.1.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_parsing() {
        assert_eq!(page_number(Path::new("/tmp/x/page-1.png")), Some(1));
        assert_eq!(page_number(Path::new("/tmp/x/page-012.png")), Some(12));
        assert_eq!(page_number(Path::new("/tmp/x/page-1.ppm")), None);
        assert_eq!(page_number(Path::new("/tmp/x/cover.png")), None);
    }

    #[test]
    fn test_page_files_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-2.png", "page-1.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let order: Vec<u32> = page_files(dir.path()).unwrap().into_iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec![1, 2, 10]);
    }

    #[test]
    fn test_missing_binary_is_reported() {
        let r = Pdftoppm::new("spendlens-no-such-rasterizer", 72);
        let err = r.rasterize(Path::new("statement.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::ToolMissing { .. }));
    }
}
