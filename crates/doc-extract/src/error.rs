use shared_types::UnsupportedFileType;
use thiserror::Error;

/// Errors that can occur while turning an upload into plain text
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    UnsupportedFileType(#[from] UnsupportedFileType),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Password-protected PDF")]
    PasswordProtected,
}

impl ExtractError {
    pub(crate) fn extraction(msg: impl Into<String>) -> Self {
        ExtractError::Extraction(msg.into())
    }
}
