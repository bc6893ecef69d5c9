//! PDF text extraction
//!
//! lopdf parses the file structure first so that truncated or non-PDF
//! uploads fail fast with a clear message; pdf-extract then produces the
//! text. Page boundaries (form feeds) become paragraph breaks.

use std::panic;

use pdf_extract::extract_text_from_mem;
use tracing::debug;

use crate::ExtractError;

pub struct PdfExtractor;

impl PdfExtractor {
    /// Extract the plain text of a PDF
    ///
    /// # Errors
    /// - `ExtractError::PasswordProtected` - The PDF requires a password
    /// - `ExtractError::Extraction` - The PDF is malformed, corrupted or the parser failed
    pub fn extract_text(pdf_bytes: &[u8]) -> Result<String, ExtractError> {
        let page_count = Self::preflight(pdf_bytes)?;

        // The parsers panic on some malformed inputs instead of returning an error
        let raw_text = panic::catch_unwind(|| extract_text_from_mem(pdf_bytes))
            .map_err(|_| ExtractError::extraction("PDF parser aborted on malformed content"))?
            .map_err(|e| {
                let error_msg = e.to_string();
                let lower = error_msg.to_lowercase();
                if lower.contains("encrypt") || lower.contains("password") {
                    ExtractError::PasswordProtected
                } else {
                    ExtractError::Extraction(error_msg)
                }
            })?;

        let pages = Self::split_pages(&raw_text);
        debug!(
            "Extracted {} characters from {} page(s) ({} with text)",
            raw_text.len(),
            page_count,
            pages.len()
        );

        Ok(pages.join("\n\n"))
    }

    /// Validate the PDF structure and return its page count
    fn preflight(pdf_bytes: &[u8]) -> Result<usize, ExtractError> {
        if !pdf_bytes.starts_with(b"%PDF-") {
            return Err(ExtractError::extraction("missing %PDF header"));
        }

        let document = panic::catch_unwind(|| lopdf::Document::load_mem(pdf_bytes))
            .map_err(|_| ExtractError::extraction("PDF structure could not be parsed"))?
            .map_err(|e| {
                let error_msg = e.to_string();
                if error_msg.to_lowercase().contains("decrypt") {
                    ExtractError::PasswordProtected
                } else {
                    ExtractError::Extraction(format!("invalid PDF: {}", error_msg))
                }
            })?;

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(ExtractError::extraction("PDF has no pages"));
        }
        Ok(page_count)
    }

    /// Split extracted text on form feeds, dropping pages without text
    fn split_pages(text: &str) -> Vec<String> {
        text.replace("\r\n", "\n")
            .split('\x0C')
            .map(str::trim)
            .filter(|page| !page.is_empty())
            .map(str::to_string)
            .collect()
    }
}
