//! Document-level risk from per-clause results

use shared_types::{ClauseAnalysis, ClauseOutcome, Report, RiskLevel};

use crate::EngineError;

/// Combine clause results into a report.
///
/// Clauses are returned in segmentation order. The overall risk is the
/// arithmetic mean of the scored clauses; failed clauses are counted but
/// never contribute a score. When no clause could be scored the overall
/// risk is `None`.
///
/// # Errors
/// `EngineError::EmptyDocument` for an empty clause list.
pub fn aggregate(mut clauses: Vec<ClauseAnalysis>) -> Result<Report, EngineError> {
    if clauses.is_empty() {
        return Err(EngineError::EmptyDocument);
    }
    clauses.sort_by_key(|c| c.index);

    let mut total = 0.0;
    let mut scored = 0usize;
    let mut failed = 0usize;
    for clause in &clauses {
        match &clause.outcome {
            ClauseOutcome::Scored(assessment) => {
                total += assessment.risk_score;
                scored += 1;
            }
            ClauseOutcome::Failed(_) => failed += 1,
        }
    }

    let overall_risk = (scored > 0).then(|| total / scored as f64);

    Ok(Report {
        clauses,
        overall_risk,
        risk_level: overall_risk.map(RiskLevel::from_score),
        scored_clauses: scored,
        failed_clauses: failed,
    })
}
