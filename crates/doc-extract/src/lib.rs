//! Plain-text extraction for uploaded legal documents
//!
//! Selects the parser by [`DocumentKind`] and returns the document text with
//! paragraph (or page) boundaries kept as blank lines, which is what the
//! clause segmenter splits on first.
//!
//! # Example
//! ```no_run
//! use doc_extract::{extract, ExtractError};
//! use shared_types::DocumentKind;
//!
//! fn read_contract(bytes: &[u8]) -> Result<String, ExtractError> {
//!     let kind = DocumentKind::detect("contract.pdf", None)?;
//!     extract(bytes, kind)
//! }
//! ```

pub mod docx;
pub mod error;
pub mod pdf;

pub use docx::DocxExtractor;
pub use error::ExtractError;
pub use pdf::PdfExtractor;

use shared_types::{Document, DocumentKind};

/// Extract plain text from `bytes` using the parser for `kind`
pub fn extract(bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Pdf => PdfExtractor::extract_text(bytes),
        DocumentKind::Docx => DocxExtractor::extract_text(bytes),
    }
}

pub fn extract_document(document: &Document) -> Result<String, ExtractError> {
    extract(&document.bytes, document.kind)
}

/// Resolve the kind of an upload and extract it in one step.
///
/// Unsupported uploads fail before any parser sees the bytes.
pub fn extract_upload(
    filename: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<(DocumentKind, String), ExtractError> {
    let kind = DocumentKind::detect(filename, content_type)?;
    Ok((kind, extract(bytes, kind)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::tests::create_test_docx;
    use crate::pdf::tests::create_test_pdf;
    use proptest::prelude::*;

    #[test]
    fn test_dispatch_pdf() {
        let pdf = create_test_pdf(&["The Licensee shall not sublicense the software."]);
        let text = extract(&pdf, DocumentKind::Pdf).unwrap();
        assert!(text.contains("sublicense"));
    }

    #[test]
    fn test_dispatch_docx() {
        let docx = create_test_docx(
            "<w:p><w:r><w:t>This Agreement is governed by the laws of Texas.</w:t></w:r></w:p>",
        );
        let document = Document::new("nda.docx", DocumentKind::Docx, docx);
        let text = extract_document(&document).unwrap();
        assert_eq!(text, "This Agreement is governed by the laws of Texas.");
    }

    #[test]
    fn test_docx_bytes_declared_as_pdf_fail_cleanly() {
        let docx = create_test_docx("<w:p><w:r><w:t>Text</w:t></w:r></w:p>");
        assert!(matches!(
            extract(&docx, DocumentKind::Pdf),
            Err(ExtractError::Extraction(_))
        ));
    }

    #[test]
    fn test_txt_upload_rejected_before_parsing() {
        // Valid PDF bytes must not matter: the extension already disqualifies the upload
        let pdf = create_test_pdf(&["Some text"]);
        let result = extract_upload("contract.txt", Some("application/pdf"), &pdf);
        assert!(matches!(result, Err(ExtractError::UnsupportedFileType(_))));
    }

    #[test]
    fn test_extract_upload_resolves_kind() {
        let docx = create_test_docx("<w:p><w:r><w:t>Payment terms apply.</w:t></w:r></w:p>");
        let (kind, text) = extract_upload("Terms.DOCX", None, &docx).unwrap();
        assert_eq!(kind, DocumentKind::Docx);
        assert_eq!(text, "Payment terms apply.");
    }

    proptest! {
        #[test]
        fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512), docx in any::<bool>()) {
            let kind = if docx { DocumentKind::Docx } else { DocumentKind::Pdf };
            let _ = extract(&bytes, kind);
        }

        #[test]
        fn pdf_header_with_garbage_is_an_error(tail in prop::collection::vec(any::<u8>(), 0..256)) {
            let mut bytes = b"%PDF-1.4\n".to_vec();
            bytes.extend(tail);
            prop_assert!(extract(&bytes, DocumentKind::Pdf).is_err());
        }
    }
}
