use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use super::classify::{classify_case, derive_key_findings, infer_organ_findings};
use super::extraction::{
    extract_sections, InferenceClient, InferenceExtractor, HEURISTIC_RULES_VERSION, TEMPLATE_VERSION,
};
use super::normalize::normalize_transcript;
use super::report::{render_analysis, render_template, RenderedReport, REPORT_TEMPLATE_VERSION};
use super::storage::{resolve_document, DocumentStore, Resolution, ResolvedDocument};
use super::PipelineError;
use crate::config::{AppConfig, DEFAULT_EXAM_TYPE, DEFAULT_INFERENCE_MODEL, DEFAULT_MAX_TOKENS};
use crate::models::enums::{ExtractionStrategy, PathKind, ReportVariant};
use crate::models::{
    AnalysisProvenance, AnalysisResult, DocumentPath, DocumentRef, DocumentUpdate, ExtractedSections,
    FieldPresence, KeyFindings, ReportMeta,
};

/// Model identifier recorded for heuristic runs.
pub const HEURISTIC_MODEL: &str = "label-patterns";

/// Settings the pipeline needs from the application configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub max_tokens: u32,
    pub default_exam_type: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_INFERENCE_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            default_exam_type: DEFAULT_EXAM_TYPE.to_string(),
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.inference.model.clone(),
            max_tokens: config.inference.max_tokens,
            default_exam_type: config.default_exam_type.clone(),
        }
    }
}

/// Result of one `analyze` run, as written to the document.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub path: DocumentPath,
    pub path_kind: PathKind,
    pub analysis: AnalysisResult,
    pub provenance: AnalysisProvenance,
    pub report: String,
    pub report_meta: ReportMeta,
}

/// Result of one report generation, as written to the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub path: DocumentPath,
    pub path_kind: PathKind,
    pub report: String,
    pub report_meta: ReportMeta,
}

/// Structured extraction & report rendering pipeline.
///
/// Stateless between invocations; the only collaborators are the document
/// store and the inference client. No retries and no locking: concurrent
/// runs on the same document resolve as last write wins.
pub struct AnalysisPipeline {
    store: Arc<dyn DocumentStore + Send + Sync>,
    inference: Arc<dyn InferenceClient + Send + Sync>,
    settings: PipelineSettings,
}

impl AnalysisPipeline {
    pub fn new(
        store: Arc<dyn DocumentStore + Send + Sync>,
        inference: Arc<dyn InferenceClient + Send + Sync>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            inference,
            settings,
        }
    }

    /// Extract, classify and render one document with the given strategy,
    /// then merge the results into it.
    pub fn analyze(
        &self,
        doc_ref: &DocumentRef,
        strategy: ExtractionStrategy,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let span = tracing::info_span!(
            "analyze",
            run_id = %Uuid::new_v4(),
            strategy = %strategy,
            path = tracing::field::Empty,
        );
        let _guard = span.enter();

        validate_ref(doc_ref)?;
        let resolved = self.resolve(doc_ref)?;
        span.record("path", resolved.path.as_str());

        let raw = resolved
            .document
            .usable_transcript()
            .ok_or_else(|| PipelineError::MissingTranscript {
                path: resolved.path.to_string(),
            })?;
        let exam_type = self.exam_type(&resolved);

        let started = Instant::now();
        let normalized = normalize_transcript(raw);

        let (sections, key_findings, model, template_version) = match strategy {
            ExtractionStrategy::Heuristic => {
                let sections = extract_sections(&normalized);
                let key_findings = derive_key_findings(sections.findings.as_deref());
                (sections, key_findings, HEURISTIC_MODEL, HEURISTIC_RULES_VERSION)
            }
            ExtractionStrategy::Inference => {
                let extractor = InferenceExtractor::new(
                    self.inference.as_ref(),
                    &self.settings.model,
                    self.settings.max_tokens,
                );
                let parsed = extractor.extract(&normalized, &exam_type).map_err(|e| {
                    tracing::warn!(error = %e, "Inference-assisted extraction failed");
                    PipelineError::from(e)
                })?;
                (parsed.sections, parsed.key_findings, extractor.model(), TEMPLATE_VERSION)
            }
        };

        let analysis = build_analysis(sections, key_findings);
        let rendered = render_analysis(&exam_type, &analysis);
        let latency_ms = elapsed_ms(started);
        let now = Utc::now();

        let provenance = AnalysisProvenance {
            engine: strategy.as_str().to_string(),
            model: model.to_string(),
            template_version: template_version.to_string(),
            latency_ms,
            timestamp: now,
        };
        let report_meta = build_report_meta(strategy.as_str(), model, &rendered, latency_ms);

        self.store.merge_update(
            &resolved.path,
            &DocumentUpdate {
                analysis: Some(analysis.clone()),
                analysis_meta: Some(provenance.clone()),
                report: Some(rendered.text.clone()),
                report_meta: Some(report_meta.clone()),
                analyzed_at: Some(now),
                reported_at: Some(now),
            },
        )?;

        tracing::info!(
            case_status = %analysis.case_status,
            abnormal_organs = analysis.organ_findings.abnormal_count(),
            key_findings = analysis.key_findings.len(),
            variant = %rendered.variant,
            latency_ms,
            "Analysis written"
        );

        Ok(AnalysisOutcome {
            path: resolved.path,
            path_kind: resolved.kind,
            analysis,
            provenance,
            report: rendered.text,
            report_meta,
        })
    }

    /// Render the report from the stored analysis, or from the transcript
    /// when no analysis exists yet.
    pub fn generate_report(&self, doc_ref: &DocumentRef) -> Result<ReportOutcome, PipelineError> {
        let span = tracing::info_span!(
            "generate_report",
            run_id = %Uuid::new_v4(),
            path = tracing::field::Empty,
        );
        let _guard = span.enter();

        validate_ref(doc_ref)?;
        let resolved = self.resolve(doc_ref)?;
        span.record("path", resolved.path.as_str());

        match &resolved.document.analysis {
            Some(analysis) => {
                let started = Instant::now();
                let exam_type = self.exam_type(&resolved);
                let rendered = render_analysis(&exam_type, analysis);
                let (engine, model) = match &resolved.document.analysis_meta {
                    Some(meta) => (meta.engine.as_str(), meta.model.as_str()),
                    None => ("unknown", "unknown"),
                };
                let meta = build_report_meta(engine, model, &rendered, elapsed_ms(started));
                self.write_report(resolved, rendered.text, meta)
            }
            None if resolved.document.usable_transcript().is_some() => {
                tracing::debug!("No stored analysis, rendering from transcript");
                self.report_from_transcript(resolved)
            }
            None => Err(PipelineError::MissingAnalysisOrTranscript {
                path: resolved.path.to_string(),
            }),
        }
    }

    /// Template-only report straight from the transcript: heuristic section
    /// extraction, no organ or case inference.
    pub fn generate_report_from_transcript(&self, doc_ref: &DocumentRef) -> Result<ReportOutcome, PipelineError> {
        let span = tracing::info_span!(
            "generate_report_from_transcript",
            run_id = %Uuid::new_v4(),
            path = tracing::field::Empty,
        );
        let _guard = span.enter();

        validate_ref(doc_ref)?;
        let resolved = self.resolve(doc_ref)?;
        span.record("path", resolved.path.as_str());
        self.report_from_transcript(resolved)
    }

    /// Create or replace the source fields of a document. A non-blank scope
    /// targets the clinic-scoped path. Stored results are left in place.
    pub fn seed_source(
        &self,
        doc_ref: &DocumentRef,
        transcript: Option<&str>,
        exam_type: Option<&str>,
    ) -> Result<(PathKind, DocumentPath), PipelineError> {
        validate_ref(doc_ref)?;
        let (kind, path) = match doc_ref.scope_id.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(scope) => (
                PathKind::Secondary,
                DocumentPath::scoped(scope, &doc_ref.patient_id, &doc_ref.exam_id),
            ),
            None => (
                PathKind::Primary,
                DocumentPath::primary(&doc_ref.patient_id, &doc_ref.exam_id),
            ),
        };

        self.store.put_source(&path, transcript, exam_type)?;
        tracing::info!(
            path = %path,
            transcript_len = transcript.map_or(0, str::len),
            "Document source stored"
        );
        Ok((kind, path))
    }

    fn report_from_transcript(&self, resolved: ResolvedDocument) -> Result<ReportOutcome, PipelineError> {
        let raw = resolved
            .document
            .usable_transcript()
            .ok_or_else(|| PipelineError::MissingTranscript {
                path: resolved.path.to_string(),
            })?;

        let started = Instant::now();
        let exam_type = self.exam_type(&resolved);
        let sections = extract_sections(&normalize_transcript(raw));
        let rendered = render_template(&exam_type, &sections, raw);
        let meta = build_report_meta(
            ExtractionStrategy::Heuristic.as_str(),
            HEURISTIC_MODEL,
            &rendered,
            elapsed_ms(started),
        );

        if let Some(present) = &rendered.fields_present {
            log_presence(present);
        }
        self.write_report(resolved, rendered.text, meta)
    }

    fn write_report(
        &self,
        resolved: ResolvedDocument,
        report: String,
        report_meta: ReportMeta,
    ) -> Result<ReportOutcome, PipelineError> {
        self.store.merge_update(
            &resolved.path,
            &DocumentUpdate {
                report: Some(report.clone()),
                report_meta: Some(report_meta.clone()),
                reported_at: Some(report_meta.timestamp),
                ..Default::default()
            },
        )?;

        tracing::info!(
            variant = %report_meta.variant,
            latency_ms = report_meta.latency_ms,
            "Report written"
        );

        Ok(ReportOutcome {
            path: resolved.path,
            path_kind: resolved.kind,
            report,
            report_meta,
        })
    }

    fn resolve(&self, doc_ref: &DocumentRef) -> Result<ResolvedDocument, PipelineError> {
        match resolve_document(self.store.as_ref(), doc_ref)? {
            Resolution::Found(resolved) => Ok(resolved),
            Resolution::NotFound { attempted } => {
                tracing::warn!(attempts = attempted.len(), "Document not found");
                Err(PipelineError::DocumentNotFound {
                    attempted: attempted.iter().map(ToString::to_string).collect(),
                })
            }
        }
    }

    fn exam_type(&self, resolved: &ResolvedDocument) -> String {
        resolved
            .document
            .exam_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.settings.default_exam_type)
            .to_string()
    }
}

/// Reject blank identifiers and identifiers that would alter the path shape.
fn validate_ref(doc_ref: &DocumentRef) -> Result<(), PipelineError> {
    let fields = [
        ("patient_id", Some(doc_ref.patient_id.as_str())),
        ("exam_id", Some(doc_ref.exam_id.as_str())),
        ("scope_id", doc_ref.scope_id.as_deref().filter(|s| !s.trim().is_empty())),
    ];
    for (name, value) in fields {
        let Some(value) = value else { continue };
        if value.trim().is_empty() {
            return Err(PipelineError::InputMissing(format!("{name} is required")));
        }
        if value.contains('/') {
            return Err(PipelineError::InputMissing(format!(
                "{name} must be a single path segment"
            )));
        }
    }
    Ok(())
}

fn build_analysis(sections: ExtractedSections, key_findings: KeyFindings) -> AnalysisResult {
    let organ_findings = infer_organ_findings(sections.findings.as_deref());
    let case_status = classify_case(sections.findings.as_deref(), sections.conclusions.as_deref());
    AnalysisResult {
        sections,
        key_findings,
        organ_findings,
        case_status,
    }
}

fn build_report_meta(engine: &str, model: &str, rendered: &RenderedReport, latency_ms: u64) -> ReportMeta {
    ReportMeta {
        engine: engine.to_string(),
        model: model.to_string(),
        template_version: REPORT_TEMPLATE_VERSION.to_string(),
        variant: rendered.variant,
        latency_ms,
        timestamp: Utc::now(),
        fields_present: match rendered.variant {
            ReportVariant::TemplateOnly => rendered.fields_present,
            _ => None,
        },
    }
}

fn log_presence(present: &FieldPresence) {
    tracing::info!(
        reason = present.reason,
        findings = present.findings,
        conclusions = present.conclusions,
        recommendations = present.recommendations,
        "Template-only report field presence"
    );
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
