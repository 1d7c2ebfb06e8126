//! spendlens-ingest: turn statement documents (images, PDFs, docx, text)
//! into normalized text.

pub mod docx;
pub mod error;
pub mod extractor;
pub mod ocr;
pub mod raster;
pub mod types;

pub use error::ExtractError;
pub use extractor::{TextExtractor, extract_text_from_file};
pub use ocr::{OcrEngine, TesseractCli};
pub use raster::{PageRasterizer, Pdftoppm};
pub use types::{DocumentKind, ExtractedText, LineMode, normalize};
