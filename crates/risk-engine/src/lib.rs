//! Clause risk analysis engine
//!
//! Splits contract text into clauses, scores each clause through a
//! [`ClauseScorer`] with bounded retries, and averages the scores into a
//! document [`Report`](shared_types::Report). Scoring runs concurrently
//! with a per-document limit and the report keeps clause order.

pub mod aggregate;
pub mod analyzer;
pub mod error;
pub mod openrouter;
pub mod pipeline;
pub mod prompt;
pub mod scorer;
pub mod segment;

#[cfg(test)]
mod test_support;

pub use aggregate::aggregate;
pub use analyzer::{analyze, RetryPolicy};
pub use error::EngineError;
pub use openrouter::{OpenRouterConfig, OpenRouterScorer};
pub use pipeline::{PipelineConfig, RiskPipeline};
pub use scorer::{ClauseScorer, ScoreError};
pub use segment::{Segmenter, SegmenterConfig};
