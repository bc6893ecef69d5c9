//! Uploaded document and file-type resolution

use std::fmt;
use std::path::Path;

use thiserror::Error;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
}

/// Raised when an upload is neither a PDF nor a DOCX
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported file type '{0}'. Please upload a PDF or DOCX file.")]
pub struct UnsupportedFileType(pub String);

impl DocumentKind {
    /// Resolve the kind from a file extension (without the dot, any case)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// Resolve the kind from a declared MIME type, ignoring parameters
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(PDF_MIME) {
            Some(Self::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_MIME) {
            Some(Self::Docx)
        } else {
            None
        }
    }

    /// Resolve the kind of an upload.
    ///
    /// The file extension decides when there is one, so `contract.txt` is
    /// rejected even if the client claims `application/pdf`. The declared
    /// MIME type is only consulted for names without an extension.
    pub fn detect(filename: &str, content_type: Option<&str>) -> Result<Self, UnsupportedFileType> {
        match Path::new(filename).extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                Self::from_extension(ext).ok_or_else(|| UnsupportedFileType(format!(".{}", ext)))
            }
            None => content_type
                .and_then(Self::from_mime)
                .ok_or_else(|| {
                    UnsupportedFileType(content_type.unwrap_or(filename).to_string())
                }),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Docx => DOCX_MIME,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Docx => write!(f, "docx"),
        }
    }
}

/// An uploaded document. Lives for exactly one request.
#[derive(Clone)]
pub struct Document {
    pub filename: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(filename: impl Into<String>, kind: DocumentKind, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            kind,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Debug never prints the bytes: document content must not reach the logs.
impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("filename", &self.filename)
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(DocumentKind::detect("lease.pdf", None), Ok(DocumentKind::Pdf));
        assert_eq!(DocumentKind::detect("Lease.PDF", None), Ok(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::detect("nda.docx", Some("application/octet-stream")),
            Ok(DocumentKind::Docx)
        );
    }

    #[test]
    fn test_txt_rejected_even_with_pdf_mime() {
        let err = DocumentKind::detect("contract.txt", Some(PDF_MIME)).unwrap_err();
        assert_eq!(err, UnsupportedFileType(".txt".to_string()));
    }

    #[test]
    fn test_legacy_doc_rejected() {
        assert!(DocumentKind::detect("old.doc", None).is_err());
    }

    #[test]
    fn test_mime_fallback_without_extension() {
        assert_eq!(
            DocumentKind::detect("upload", Some("application/pdf; charset=binary")),
            Ok(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::detect("upload", Some(DOCX_MIME)),
            Ok(DocumentKind::Docx)
        );
        assert!(DocumentKind::detect("upload", Some("text/plain")).is_err());
        assert!(DocumentKind::detect("upload", None).is_err());
    }

    #[test]
    fn test_debug_hides_content() {
        let doc = Document::new("a.pdf", DocumentKind::Pdf, b"secret terms".to_vec());
        let dbg = format!("{:?}", doc);
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("len: 12"));
    }

    proptest! {
        #[test]
        fn unknown_extensions_rejected(ext in "[a-z]{1,6}".prop_filter(
            "Must not be a supported extension",
            |s| !matches!(s.as_str(), "pdf" | "docx")
        )) {
            let name = format!("document.{}", ext);
            prop_assert!(DocumentKind::detect(&name, Some(PDF_MIME)).is_err());
        }

        #[test]
        fn supported_extensions_any_case(stem in "[a-zA-Z0-9_-]{1,20}", upper in any::<bool>()) {
            let ext = if upper { "DOCX" } else { "docx" };
            let name = format!("{}.{}", stem, ext);
            prop_assert_eq!(DocumentKind::detect(&name, None), Ok(DocumentKind::Docx));
        }
    }
}
