//! Per-clause analysis with bounded retries

use std::time::Duration;

use shared_types::{AnalysisError, ClauseAnalysis};
use tracing::{debug, warn};

use crate::scorer::{ClauseScorer, ScoreError};

/// Exponential backoff between attempts on transient failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        let millis = self.initial_backoff.as_millis() as f64 * self.multiplier.powi(exponent);
        Duration::from_millis(millis.min(self.max_backoff.as_millis() as f64) as u64)
    }
}

/// Score one clause, retrying transient failures per `policy`.
///
/// Never fails: the outcome is recorded on the returned [`ClauseAnalysis`].
/// Only the clause index and length are logged, never its text.
pub async fn analyze(
    scorer: &dyn ClauseScorer,
    index: usize,
    clause: String,
    policy: &RetryPolicy,
) -> ClauseAnalysis {
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match scorer.score_clause(&clause).await {
            Ok(assessment) => {
                debug!(
                    clause_index = index,
                    clause_len = clause.len(),
                    attempt,
                    "Clause scored {:.1} ({})",
                    assessment.risk_score,
                    assessment.clause_type
                );
                return ClauseAnalysis::scored(index, clause, assessment);
            }
            Err(e) if e.is_transient() && attempt <= policy.max_retries => {
                let delay = policy.backoff(attempt);
                warn!(
                    clause_index = index,
                    attempt,
                    "{} failed transiently, retrying in {}ms: {}",
                    scorer.name(),
                    delay.as_millis(),
                    e
                );
                tokio::time::sleep(delay).await;
            }
            Err(ScoreError::Parse(reason)) => {
                warn!(clause_index = index, "Unusable answer from {}: {}", scorer.name(), reason);
                return ClauseAnalysis::failed(index, clause, AnalysisError::Parse { reason });
            }
            Err(e) => {
                warn!(
                    clause_index = index,
                    attempts = attempt,
                    "{} unavailable: {}",
                    scorer.name(),
                    e
                );
                return ClauseAnalysis::failed(
                    index,
                    clause,
                    AnalysisError::Unavailable {
                        reason: e.to_string(),
                        attempts: attempt,
                    },
                );
            }
        }
    }
}
