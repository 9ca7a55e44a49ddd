//! Examination document endpoints.
//!
//! The pipeline is synchronous (blocking store and inference client), so
//! every handler runs it on the blocking thread pool.

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{
    AnalyzeQuery, AnalyzeResponse, ApiContext, ReportResponse, ScopeQuery, SourceRequest,
    SourceResponse,
};

/// `PUT /api/exams/:patient/:exam`: create or replace the transcript and
/// exam type of a document.
pub async fn put_source(
    State(ctx): State<ApiContext>,
    Path((patient_id, exam_id)): Path<(String, String)>,
    Query(query): Query<ScopeQuery>,
    Json(body): Json<SourceRequest>,
) -> Result<Json<SourceResponse>, ApiError> {
    let doc_ref = query.doc_ref(patient_id, exam_id);
    let (path_kind, path) = tokio::task::spawn_blocking(move || {
        ctx.pipeline.seed_source(
            &doc_ref,
            body.transcript.as_deref(),
            body.exam_type.as_deref(),
        )
    })
    .await??;

    Ok(Json(SourceResponse { path, path_kind }))
}

/// `POST /api/exams/:patient/:exam/analyze`: run extraction, classification
/// and rendering with the requested strategy.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    Path((patient_id, exam_id)): Path<(String, String)>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let strategy = query.strategy()?;
    let doc_ref = ScopeQuery { scope: query.scope }.doc_ref(patient_id, exam_id);

    let outcome =
        tokio::task::spawn_blocking(move || ctx.pipeline.analyze(&doc_ref, strategy)).await??;
    Ok(Json(outcome.into()))
}

/// `POST /api/exams/:patient/:exam/report`: render the report from the
/// stored analysis, or the template-only report from the transcript.
pub async fn report(
    State(ctx): State<ApiContext>,
    Path((patient_id, exam_id)): Path<(String, String)>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<ReportResponse>, ApiError> {
    let doc_ref = query.doc_ref(patient_id, exam_id);
    let outcome =
        tokio::task::spawn_blocking(move || ctx.pipeline.generate_report(&doc_ref)).await??;
    Ok(Json(outcome.into()))
}
