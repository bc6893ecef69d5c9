//! DOCX text extraction
//!
//! A DOCX file is a zip container; the body lives in `word/document.xml`.
//! Text runs (`w:t`) are collected per paragraph (`w:p`), tabs and line
//! breaks are kept, and non-empty paragraphs are joined with blank lines.
//!
//! The inflated size of `word/document.xml` is capped: a small upload can
//! decompress to far more than the upload limit.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::ZipArchive;

use crate::ExtractError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Largest inflated `word/document.xml` accepted
pub const MAX_DOCUMENT_XML_BYTES: u64 = 64 * 1024 * 1024;

pub struct DocxExtractor;

impl DocxExtractor {
    pub fn extract_text(docx_bytes: &[u8]) -> Result<String, ExtractError> {
        Self::extract_text_capped(docx_bytes, MAX_DOCUMENT_XML_BYTES)
    }

    pub(crate) fn extract_text_capped(
        docx_bytes: &[u8],
        max_xml_bytes: u64,
    ) -> Result<String, ExtractError> {
        let mut archive = ZipArchive::new(Cursor::new(docx_bytes))
            .map_err(|e| ExtractError::Extraction(format!("not a DOCX container: {}", e)))?;

        let part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| ExtractError::Extraction(format!("missing {}: {}", DOCUMENT_PART, e)))?;

        // Declared sizes are untrusted; the read is bounded as well
        if part.size() > max_xml_bytes {
            return Err(Self::too_large(max_xml_bytes));
        }
        let mut xml = String::new();
        part.take(max_xml_bytes + 1)
            .read_to_string(&mut xml)
            .map_err(|e| ExtractError::Extraction(format!("unreadable {}: {}", DOCUMENT_PART, e)))?;
        if xml.len() as u64 > max_xml_bytes {
            return Err(Self::too_large(max_xml_bytes));
        }

        let paragraphs = Self::paragraphs_from_xml(&xml)?;
        debug!("Extracted {} paragraph(s) from DOCX", paragraphs.len());

        Ok(paragraphs.join("\n\n"))
    }

    fn too_large(max_xml_bytes: u64) -> ExtractError {
        ExtractError::Extraction(format!(
            "{} inflates to more than {} bytes",
            DOCUMENT_PART, max_xml_bytes
        ))
    }

    fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, ExtractError> {
        let mut reader = Reader::from_str(xml);
        let mut paragraphs = Vec::new();
        let mut current = String::new();
        let mut in_text_run = false;
        // Tabs and breaks count only inside a run (`w:r`); `w:pPr/w:tabs` holds tab stops
        let mut run_depth = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"t" => in_text_run = true,
                    b"r" => run_depth += 1,
                    _ => {}
                },
                Ok(Event::Empty(e)) if run_depth > 0 => match e.local_name().as_ref() {
                    b"tab" => current.push('\t'),
                    b"br" | b"cr" => current.push('\n'),
                    _ => {}
                },
                Ok(Event::Text(t)) if in_text_run => {
                    let text = t.unescape().map_err(|e| {
                        ExtractError::Extraction(format!("bad text run at {}: {}", reader.buffer_position(), e))
                    })?;
                    current.push_str(&text);
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"t" => in_text_run = false,
                    b"r" => run_depth = run_depth.saturating_sub(1),
                    b"p" => Self::flush_paragraph(&mut current, &mut paragraphs),
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(ExtractError::Extraction(format!(
                        "malformed document.xml at {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
        }
        Self::flush_paragraph(&mut current, &mut paragraphs);

        Ok(paragraphs)
    }

    fn flush_paragraph(current: &mut String, paragraphs: &mut Vec<String>) {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            paragraphs.push(trimmed.to_string());
        }
        current.clear();
    }
}
