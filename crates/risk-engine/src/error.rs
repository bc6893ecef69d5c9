use doc_extract::ExtractError;
use thiserror::Error;

/// Errors that abort the analysis of a whole document.
///
/// Per-clause scoring failures never show up here; they are recorded on the
/// clause itself (see [`shared_types::ClauseOutcome`]).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Document contains no analyzable clauses")]
    EmptyDocument,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Task(String),
}
