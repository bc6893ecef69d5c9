pub mod document;
pub mod types;

pub use document::{Document, DocumentKind, UnsupportedFileType};
pub use types::{
    AnalysisError, ClauseAnalysis, ClauseAssessment, ClauseOutcome, Report, RiskLevel,
    MAX_RISK_SCORE, MIN_RISK_SCORE,
};
