//! Prompt construction and answer parsing for LLM-backed scorers

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use shared_types::{ClauseAssessment, MAX_RISK_SCORE, MIN_RISK_SCORE};

use crate::scorer::ScoreError;

pub const DEFAULT_CLAUSE_TYPE: &str = "Other";

lazy_static! {
    /// Reasoning models wrap their chain of thought in <think> tags
    static ref THINK_BLOCK: Regex = Regex::new(r"(?s)<think>.*?</think>").unwrap();
}

pub fn build_prompt(clause: &str) -> String {
    format!(
        r#"You are a legal document analysis assistant. Analyze the following legal clause and provide:

1. Risk score (0-5, where 0 is no risk and 5 is high risk)
2. Brief explanation of the risk
3. Clause type (e.g., 'Liability', 'Confidentiality', 'Termination', 'Governing Law', 'Indemnification')
4. A safer rewritten version of the clause

IMPORTANT: Return ONLY a valid JSON object with these exact keys: risk_score, explanation, clause_type, safer_version

Clause to analyze:
{}

JSON Response:"#,
        clause
    )
}

#[derive(Debug, Deserialize)]
struct RawAssessment {
    risk_score: Option<Value>,
    explanation: Option<String>,
    clause_type: Option<String>,
    safer_version: Option<String>,
}

/// Turn the model's answer for `clause` into an assessment.
///
/// The answer may carry a `<think>` block, a markdown code fence or prose
/// around the JSON object. `risk_score` is mandatory and must be a number
/// (or numeric string) within 0..=5. Missing optional fields fall back to
/// an empty explanation, the "Other" clause type and the clause itself as
/// its safer version.
pub fn parse_assessment(answer: &str, clause: &str) -> Result<ClauseAssessment, ScoreError> {
    let answer = THINK_BLOCK.replace_all(answer, "");
    let raw = first_json_object(&answer)?;

    let risk_score = match raw.risk_score {
        Some(value) => score_from_value(&value)?,
        None => return Err(ScoreError::Parse("missing risk_score".to_string())),
    };

    Ok(ClauseAssessment {
        risk_score,
        explanation: raw.explanation.unwrap_or_default().trim().to_string(),
        clause_type: non_blank(raw.clause_type).unwrap_or_else(|| DEFAULT_CLAUSE_TYPE.to_string()),
        safer_version: non_blank(raw.safer_version).unwrap_or_else(|| clause.to_string()),
    })
}

/// Deserialize the first JSON object in `answer`, ignoring whatever follows it
fn first_json_object(answer: &str) -> Result<RawAssessment, ScoreError> {
    let mut first_error = None;

    for (start, _) in answer.match_indices('{') {
        let mut values =
            serde_json::Deserializer::from_str(&answer[start..]).into_iter::<RawAssessment>();
        match values.next() {
            Some(Ok(raw)) => return Ok(raw),
            Some(Err(e)) => {
                first_error.get_or_insert(e);
            }
            None => {}
        }
    }

    Err(match first_error {
        Some(e) => ScoreError::Parse(format!("invalid assessment JSON: {}", e)),
        None => ScoreError::Parse("answer contains no JSON object".to_string()),
    })
}

fn score_from_value(value: &Value) -> Result<f64, ScoreError> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ScoreError::Parse(format!("risk_score is not a number: {}", value)))?;

    if !score.is_finite() || !(MIN_RISK_SCORE..=MAX_RISK_SCORE).contains(&score) {
        return Err(ScoreError::Parse(format!(
            "risk_score {} outside {}..={}",
            score, MIN_RISK_SCORE, MAX_RISK_SCORE
        )));
    }
    Ok(score)
}

fn non_blank(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
