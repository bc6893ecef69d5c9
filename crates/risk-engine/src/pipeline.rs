//! Document to report: extract, segment, score concurrently, aggregate

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use shared_types::{ClauseAnalysis, Document, Report};
use tracing::{info, warn};

use crate::aggregate::aggregate;
use crate::analyzer::{analyze, RetryPolicy};
use crate::scorer::ClauseScorer;
use crate::segment::{Segmenter, SegmenterConfig};
use crate::EngineError;

pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Clause calls in flight per document
    pub max_concurrency: usize,
    pub retry: RetryPolicy,
    pub segmenter: SegmenterConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            retry: RetryPolicy::default(),
            segmenter: SegmenterConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_concurrency == 0 {
            return Err(EngineError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.segmenter.min_clause_chars == 0 {
            return Err(EngineError::Config(
                "min_clause_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Shared, read-only analysis pipeline. One instance serves every request.
pub struct RiskPipeline {
    scorer: Arc<dyn ClauseScorer>,
    segmenter: Segmenter,
    retry: RetryPolicy,
    max_concurrency: usize,
}

impl RiskPipeline {
    pub fn new(scorer: Arc<dyn ClauseScorer>, config: PipelineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            scorer,
            segmenter: Segmenter::new(config.segmenter),
            retry: config.retry,
            max_concurrency: config.max_concurrency,
        })
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    /// Extract the document on a blocking thread, then analyze its text
    pub async fn analyze_document(&self, document: Document) -> Result<Report, EngineError> {
        let kind = document.kind;
        let size = document.len();

        let extracted = tokio::task::spawn_blocking(move || doc_extract::extract_document(&document))
            .await
            .map_err(|e| EngineError::Task(format!("extraction task: {}", e)))?;
        let text = match extracted {
            Ok(text) => text,
            Err(e) => {
                warn!("Extraction failed for {} bytes of {}: {}", size, kind, e);
                return Err(e.into());
            }
        };

        info!(
            "Extracted {} characters from {} bytes of {}",
            text.len(),
            size,
            kind
        );
        self.analyze_text(&text).await
    }

    /// Segment `text`, score every clause and aggregate the results.
    ///
    /// # Errors
    /// `EngineError::EmptyDocument` when segmentation yields no clause.
    /// Scoring failures never fail the call; they are recorded per clause.
    pub async fn analyze_text(&self, text: &str) -> Result<Report, EngineError> {
        let clauses = self.segmenter.segment(text);
        if clauses.is_empty() {
            warn!("No clauses found in {} characters of text", text.len());
            return Err(EngineError::EmptyDocument);
        }
        info!(
            "Scoring {} clauses with {} (concurrency {})",
            clauses.len(),
            self.scorer.name(),
            self.max_concurrency
        );

        let analyses = self.analyze_clauses(clauses).await;
        let report = aggregate(analyses)?;

        match report.overall_risk {
            Some(risk) => info!(
                "Overall risk {:.2} from {} scored clause(s), {} failed",
                risk, report.scored_clauses, report.failed_clauses
            ),
            None => warn!("No clause could be scored ({} failed)", report.failed_clauses),
        }
        Ok(report)
    }

    /// Score clauses with at most `max_concurrency` calls in flight.
    ///
    /// Results arrive in completion order; `aggregate` restores clause order.
    /// Dropping the returned future drops every pending call.
    async fn analyze_clauses(&self, clauses: Vec<String>) -> Vec<ClauseAnalysis> {
        let scorer = self.scorer.as_ref();
        let retry = &self.retry;

        stream::iter(clauses.into_iter().enumerate())
            .map(|(index, clause)| analyze(scorer, index, clause, retry))
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await
    }
}
