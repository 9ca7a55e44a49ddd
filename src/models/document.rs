use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::{AnalysisProvenance, AnalysisResult, ReportMeta};

/// Location of an examination document in the external store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentPath(String);

impl DocumentPath {
    /// `patients/{patient}/exams/{exam}`
    pub fn primary(patient_id: &str, exam_id: &str) -> Self {
        Self(format!("patients/{patient_id}/exams/{exam_id}"))
    }

    /// `clinics/{scope}/patients/{patient}/exams/{exam}`
    pub fn scoped(scope_id: &str, patient_id: &str, exam_id: &str) -> Self {
        Self(format!("clinics/{scope_id}/patients/{patient_id}/exams/{exam_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-supplied identifiers for an examination document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub patient_id: String,
    pub exam_id: String,
    /// Optional clinic scope enabling the secondary lookup path.
    #[serde(default)]
    pub scope_id: Option<String>,
}

impl DocumentRef {
    pub fn new(patient_id: impl Into<String>, exam_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            exam_id: exam_id.into(),
            scope_id: None,
        }
    }

    pub fn with_scope(mut self, scope_id: impl Into<String>) -> Self {
        self.scope_id = Some(scope_id.into());
        self
    }
}

/// Examination document as exposed by the document store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub transcript: Option<String>,
    pub exam_type: Option<String>,
    pub analysis: Option<AnalysisResult>,
    pub analysis_meta: Option<AnalysisProvenance>,
    pub report: Option<String>,
    pub report_meta: Option<ReportMeta>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub reported_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Transcript text if present and not blank.
    pub fn usable_transcript(&self) -> Option<&str> {
        self.transcript
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Partial write merged into an existing document. `None` fields are left
/// untouched by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentUpdate {
    pub analysis: Option<AnalysisResult>,
    pub analysis_meta: Option<AnalysisProvenance>,
    pub report: Option<String>,
    pub report_meta: Option<ReportMeta>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub reported_at: Option<DateTime<Utc>>,
}

impl DocumentUpdate {
    /// Apply this update onto an in-memory document with merge semantics.
    pub fn merge_into(&self, doc: &mut Document) {
        if let Some(analysis) = &self.analysis {
            doc.analysis = Some(analysis.clone());
        }
        if let Some(meta) = &self.analysis_meta {
            doc.analysis_meta = Some(meta.clone());
        }
        if let Some(report) = &self.report {
            doc.report = Some(report.clone());
        }
        if let Some(meta) = &self.report_meta {
            doc.report_meta = Some(meta.clone());
        }
        if let Some(at) = self.analyzed_at {
            doc.analyzed_at = Some(at);
        }
        if let Some(at) = self.reported_at {
            doc.reported_at = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_and_scoped_paths() {
        assert_eq!(DocumentPath::primary("p1", "e1").as_str(), "patients/p1/exams/e1");
        assert_eq!(
            DocumentPath::scoped("c9", "p1", "e1").to_string(),
            "clinics/c9/patients/p1/exams/e1"
        );
    }

    #[test]
    fn blank_transcript_is_not_usable() {
        let doc = Document {
            transcript: Some("  \n ".into()),
            ..Default::default()
        };
        assert!(doc.usable_transcript().is_none());
    }

    #[test]
    fn merge_leaves_unset_fields_alone() {
        let mut doc = Document {
            transcript: Some("tekst".into()),
            report: Some("stary".into()),
            ..Default::default()
        };
        let update = DocumentUpdate {
            report: Some("nowy".into()),
            ..Default::default()
        };
        update.merge_into(&mut doc);
        assert_eq!(doc.report.as_deref(), Some("nowy"));
        assert_eq!(doc.transcript.as_deref(), Some("tekst"));
        assert!(doc.analysis.is_none());
    }
}
