//! The seam between the pipeline and whatever model scores a clause

use async_trait::async_trait;
use shared_types::ClauseAssessment;
use thiserror::Error;

/// Failure of a single scoring attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("Scoring service unreachable: {0}")]
    Transport(String),

    #[error("Scoring service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed scoring response: {0}")]
    Parse(String),
}

impl ScoreError {
    /// Whether another attempt may succeed.
    ///
    /// Network failures, timeouts, rate limiting (429) and server errors (5xx)
    /// are transient. Other client errors and unparseable answers are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ScoreError::Transport(_) => true,
            ScoreError::Status { status, .. } => *status == 429 || *status >= 500,
            ScoreError::Parse(_) => false,
        }
    }
}

/// Scores one clause for legal risk.
///
/// Implementations make exactly one attempt per call; retries belong to the
/// caller (see [`crate::analyzer::analyze`]).
#[async_trait]
pub trait ClauseScorer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn score_clause(&self, clause: &str) -> Result<ClauseAssessment, ScoreError>;
}
