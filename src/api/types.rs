//! Shared state and request/response bodies for the HTTP layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::enums::{ExtractionStrategy, PathKind};
use crate::models::{AnalysisProvenance, AnalysisResult, DocumentPath, DocumentRef, ReportMeta};
use crate::pipeline::{AnalysisOutcome, AnalysisPipeline, ReportOutcome};

use super::error::ApiError;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub pipeline: Arc<AnalysisPipeline>,
}

impl ApiContext {
    pub fn new(pipeline: Arc<AnalysisPipeline>) -> Self {
        Self { pipeline }
    }
}

/// `?scope=` on every exam route.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    pub scope: Option<String>,
}

impl ScopeQuery {
    pub fn doc_ref(self, patient_id: String, exam_id: String) -> DocumentRef {
        DocumentRef {
            patient_id,
            exam_id,
            scope_id: self.scope,
        }
    }
}

/// `?strategy=&scope=` on the analyze route. Strategy defaults to heuristic.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeQuery {
    pub strategy: Option<String>,
    pub scope: Option<String>,
}

impl AnalyzeQuery {
    pub fn strategy(&self) -> Result<ExtractionStrategy, ApiError> {
        match self.strategy.as_deref().map(str::trim) {
            None | Some("") => Ok(ExtractionStrategy::Heuristic),
            Some(value) => value
                .parse()
                .map_err(|_| ApiError::bad_request(format!("Unknown strategy: {value}"))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRequest {
    pub transcript: Option<String>,
    pub exam_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResponse {
    pub path: DocumentPath,
    pub path_kind: PathKind,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub path: DocumentPath,
    pub path_kind: PathKind,
    pub analysis: AnalysisResult,
    pub analysis_meta: AnalysisProvenance,
    pub report: String,
    pub report_meta: ReportMeta,
}

impl From<AnalysisOutcome> for AnalyzeResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        Self {
            path: outcome.path,
            path_kind: outcome.path_kind,
            analysis: outcome.analysis,
            analysis_meta: outcome.provenance,
            report: outcome.report,
            report_meta: outcome.report_meta,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub path: DocumentPath,
    pub path_kind: PathKind,
    pub report: String,
    pub report_meta: ReportMeta,
}

impl From<ReportOutcome> for ReportResponse {
    fn from(outcome: ReportOutcome) -> Self {
        Self {
            path: outcome.path,
            path_kind: outcome.path_kind,
            report: outcome.report,
            report_meta: outcome.report_meta,
        }
    }
}
