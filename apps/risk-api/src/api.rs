//! API handlers for the risk API
//!
//! Provides REST endpoints for:
//! - Contract upload and clause-by-clause risk analysis
//! - Liveness checks

use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use shared_types::{ClauseAnalysis, ClauseOutcome, Document, DocumentKind, Report, RiskLevel};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::ServerError;
use crate::AppState;

/// Multipart field carrying the document
pub const FILE_FIELD: &str = "file";

/// Clause type reported for clauses that could not be scored
const UNSCORED_CLAUSE_TYPE: &str = "Unknown";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health and GET /api/v1/health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "risk-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// One analyzed clause as returned to clients
#[derive(Debug, Serialize)]
pub struct ClauseInfo {
    pub clause: String,
    pub risk_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub explanation: String,
    pub clause_type: String,
    pub safer_version: String,
    /// "ok", "unavailable" or "parse_error"
    pub status: &'static str,
    pub error: Option<String>,
}

impl From<ClauseAnalysis> for ClauseInfo {
    fn from(analysis: ClauseAnalysis) -> Self {
        match analysis.outcome {
            ClauseOutcome::Scored(assessment) => ClauseInfo {
                risk_level: Some(RiskLevel::from_score(assessment.risk_score)),
                risk_score: Some(assessment.risk_score),
                explanation: assessment.explanation,
                clause_type: assessment.clause_type,
                safer_version: assessment.safer_version,
                status: "ok",
                error: None,
                clause: analysis.clause,
            },
            ClauseOutcome::Failed(error) => ClauseInfo {
                risk_score: None,
                risk_level: None,
                explanation: String::new(),
                clause_type: UNSCORED_CLAUSE_TYPE.to_string(),
                safer_version: analysis.clause.clone(),
                status: error.status(),
                error: Some(error.to_string()),
                clause: analysis.clause,
            },
        }
    }
}

/// Analysis response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub clauses: Vec<ClauseInfo>,
    /// Mean score of the scored clauses, null when none could be scored
    pub overall_risk: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub clause_count: usize,
    pub failed_count: usize,
}

impl From<Report> for AnalyzeResponse {
    fn from(report: Report) -> Self {
        AnalyzeResponse {
            clause_count: report.clauses.len(),
            failed_count: report.failed_clauses,
            overall_risk: report.overall_risk,
            risk_level: report.risk_level,
            clauses: report.clauses.into_iter().map(ClauseInfo::from).collect(),
        }
    }
}

/// The file part of an upload, already checked to be a supported type
struct Upload {
    filename: String,
    kind: DocumentKind,
    bytes: Vec<u8>,
}

/// Handler: POST /api/v1/analyze
///
/// Expects a multipart form with the document in the `file` field.
/// The file type is resolved from the part headers before its bytes are read.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let upload = read_upload(&mut multipart, state.max_upload_bytes).await?;

    let span = info_span!(
        "analyze",
        request_id = %Uuid::new_v4(),
        filename = %upload.filename,
        kind = %upload.kind,
    );

    async move {
        info!("Analyzing {} byte upload", upload.bytes.len());

        let document = Document::new(upload.filename, upload.kind, upload.bytes);
        let report = tokio::time::timeout(
            state.request_timeout,
            state.pipeline.analyze_document(document),
        )
        .await
        .map_err(|_| deadline_exceeded(state.request_timeout))??;

        info!(
            "Analysis complete: {} clauses, {} failed",
            report.clauses.len(),
            report.failed_clauses
        );
        Ok::<_, ServerError>(Json(AnalyzeResponse::from(report)))
    }
    .instrument(span)
    .await
}

pub(crate) fn deadline_exceeded(timeout: Duration) -> ServerError {
    warn!("Analysis exceeded the {}s request deadline", timeout.as_secs());
    ServerError::Timeout(timeout.as_secs())
}

async fn read_upload(multipart: &mut Multipart, limit: usize) -> Result<Upload, ServerError> {
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::from_multipart(e, limit))?
    {
        if part.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = part.file_name().unwrap_or_default().to_string();
        let kind = DocumentKind::detect(&filename, part.content_type()).map_err(|e| {
            warn!("Rejected upload '{}': {}", filename, e);
            e
        })?;

        let bytes = part
            .bytes()
            .await
            .map_err(|e| ServerError::from_multipart(e, limit))?;

        if bytes.is_empty() {
            return Err(ServerError::InvalidRequest(
                "Uploaded file is empty".to_string(),
            ));
        }
        if bytes.len() > limit {
            return Err(ServerError::PayloadTooLarge(limit));
        }

        return Ok(Upload {
            filename,
            kind,
            bytes: bytes.to_vec(),
        });
    }

    Err(ServerError::InvalidRequest(format!(
        "Missing '{}' field in multipart form",
        FILE_FIELD
    )))
}
