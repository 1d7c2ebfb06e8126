//! Plain text from `.docx` containers.
//!
//! Reads headers, the document body, then footers. Only `w:t` runs are kept;
//! paragraph ends and breaks become newlines, tabs become spaces after
//! normalization. Drawings and formatting are skipped.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::ExtractError;

const BODY_PART: &str = "word/document.xml";

pub fn extract_docx_text(path: &Path) -> Result<String, ExtractError> {
    let file = File::open(path).map_err(|e| ExtractError::io(path.display().to_string(), e))?;
    docx_text_from_reader(file)
}

pub fn docx_text_from_reader<R: Read + Seek>(reader: R) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let mut parts = part_names(&names, "word/header");
    parts.push(BODY_PART.to_string());
    parts.extend(part_names(&names, "word/footer"));

    let mut out = String::new();
    for name in parts {
        let mut xml = String::new();
        archive
            .by_name(&name)?
            .read_to_string(&mut xml)
            .map_err(|e| ExtractError::io(name.clone(), e))?;
        out.push_str(&xml_text(&xml)?);
        out.push('\n');
    }
    Ok(out)
}

/// Parts like `word/header1.xml`, in numeric order
fn part_names(names: &[String], prefix: &str) -> Vec<String> {
    let mut found: Vec<(u32, String)> = names
        .iter()
        .filter_map(|n| {
            let idx = n.strip_prefix(prefix)?.strip_suffix(".xml")?;
            let idx = if idx.is_empty() { 0 } else { idx.parse().ok()? };
            Some((idx, n.clone()))
        })
        .collect();
    found.sort();
    found.into_iter().map(|(_, n)| n).collect()
}

fn xml_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                if e.local_name().as_ref() == b"t" {
                    in_run_text = true;
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" | b"p" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                out.push_str(&t.unescape().map_err(xml_err)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

fn xml_err(e: impl std::fmt::Display) -> ExtractError {
    ExtractError::Xml(e.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    /// Build an in-memory docx from `(part name, xml)` pairs
    pub(crate) fn docx_bytes(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut w = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, xml) in parts {
            w.start_file(*name, SimpleFileOptions::default()).unwrap();
            w.write_all(xml.as_bytes()).unwrap();
        }
        w.finish().unwrap().into_inner()
    }

    pub(crate) fn body(paragraphs: &[&str]) -> String {
        let ps: String = paragraphs
            .iter()
            .map(|p| format!(r#"<w:p><w:r><w:t xml:space="preserve">{p}</w:t></w:r></w:p>"#))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{ps}</w:body></w:document>"#
        )
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let bytes = docx_bytes(&[(BODY_PART, &body(&["Uber ride $12.00", "Netflix &amp; chill $15.99"]))]);
        let text = docx_text_from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(text.trim(), "Uber ride $12.00\nNetflix & chill $15.99");
    }

    #[test]
    fn test_runs_join_and_tabs_break() {
        let xml = r#"<w:document xmlns:w="w"><w:body><w:p><w:r><w:t>AMAZ</w:t></w:r><w:r><w:t>ON</w:t><w:tab/><w:t>$9.99</w:t><w:br/><w:t>next</w:t></w:r></w:p><w:p><w:r><w:drawing><wp:docPr name="logo"/></w:drawing></w:r></w:p></w:body></w:document>"#;
        assert_eq!(xml_text(xml).unwrap(), "AMAZON\t$9.99\nnext\n\n");
    }

    #[test]
    fn test_headers_before_body_before_footers() {
        let bytes = docx_bytes(&[
            ("word/footer1.xml", &body(&["footer"])),
            (BODY_PART, &body(&["body"])),
            ("word/header2.xml", &body(&["header two"])),
            ("word/header1.xml", &body(&["header one"])),
            ("word/media/image1.png", "not xml"),
        ]);
        let text = docx_text_from_reader(Cursor::new(bytes)).unwrap();
        let lines: Vec<_> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines, vec!["header one", "header two", "body", "footer"]);
    }

    #[test]
    fn test_missing_body_is_error() {
        let bytes = docx_bytes(&[("word/header1.xml", &body(&["only header"]))]);
        assert!(matches!(
            docx_text_from_reader(Cursor::new(bytes)),
            Err(ExtractError::Zip(_))
        ));
    }

    #[test]
    fn test_not_a_zip_is_error() {
        assert!(docx_text_from_reader(Cursor::new(b"plain text".to_vec())).is_err());
    }
}
