pub const MIN_RISK_SCORE: f64 = 0.0;
pub const MAX_RISK_SCORE: f64 = 5.0;

/// Successful scoring of a single clause
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClauseAssessment {
    pub risk_score: f64, // 0 = no risk, 5 = high risk
    pub explanation: String,
    pub clause_type: String,
    pub safer_version: String,
}

/// Why a clause could not be scored
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisError {
    /// Scoring service unreachable, timed out or rejected the request
    #[error("Analysis unavailable after {attempts} attempt(s): {reason}")]
    Unavailable { reason: String, attempts: u32 },

    /// Scoring service answered with something that is not a valid assessment
    #[error("Could not parse analysis response: {reason}")]
    Parse { reason: String },
}

impl AnalysisError {
    pub fn status(&self) -> &'static str {
        match self {
            AnalysisError::Unavailable { .. } => "unavailable",
            AnalysisError::Parse { .. } => "parse_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClauseOutcome {
    Scored(ClauseAssessment),
    Failed(AnalysisError),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClauseAnalysis {
    pub index: usize, // Position in segmenter output
    pub clause: String,
    pub outcome: ClauseOutcome,
}

impl ClauseAnalysis {
    pub fn scored(index: usize, clause: impl Into<String>, assessment: ClauseAssessment) -> Self {
        Self {
            index,
            clause: clause.into(),
            outcome: ClauseOutcome::Scored(assessment),
        }
    }

    pub fn failed(index: usize, clause: impl Into<String>, error: AnalysisError) -> Self {
        Self {
            index,
            clause: clause.into(),
            outcome: ClauseOutcome::Failed(error),
        }
    }

    /// Score of the clause, `None` when analysis failed
    pub fn risk_score(&self) -> Option<f64> {
        match &self.outcome {
            ClauseOutcome::Scored(a) => Some(a.risk_score),
            ClauseOutcome::Failed(_) => None,
        }
    }

    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.risk_score().map(RiskLevel::from_score)
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match &self.outcome {
            ClauseOutcome::Scored(_) => None,
            ClauseOutcome::Failed(e) => Some(e),
        }
    }
}

/// Aggregated analysis of one document
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Report {
    pub clauses: Vec<ClauseAnalysis>,
    pub overall_risk: Option<f64>, // None when no clause could be scored
    pub risk_level: Option<RiskLevel>,
    pub scored_clauses: usize,
    pub failed_clauses: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 4.0 {
            RiskLevel::High
        } else if score >= 2.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}
