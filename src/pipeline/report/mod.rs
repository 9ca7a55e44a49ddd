//! Deterministic report rendering.
//!
//! One renderer serves all three variants. The variant is chosen by the
//! input: an [`AnalysisResult`] renders as the abnormal-case narrative or the
//! normal-case summary depending on its case status; bare sections with the
//! source transcript render as the template-only report.

use crate::models::enums::{CaseStatus, OrganStatus, ReportVariant};
use crate::models::{AnalysisResult, ExtractedSections, FieldPresence, KeyFindings, OrganFindings};

/// Version tag of the report layout, recorded in report provenance.
pub const REPORT_TEMPLATE_VERSION: &str = "report-v2";

/// Rendered in place of an absent field.
pub const PLACEHOLDER: &str = "—";

const NORMAL_ORGAN: &str = "bez odchyleń";
const NORMAL_CONCLUSIONS: &str = "Bez istotnych odchyleń od normy.";
const NORMAL_RECOMMENDATIONS: &str = "Bez szczególnych zaleceń.";
const TRAILER: &str =
    "Opis sporządzony na podstawie dyktowanego transkryptu. Wymaga weryfikacji i podpisu lekarza.";

/// What the renderer works from.
#[derive(Debug, Clone, Copy)]
pub enum ReportSource<'a> {
    /// A completed analysis.
    Analysis(&'a AnalysisResult),
    /// Sections extracted straight from a transcript, without organ or case
    /// inference. The transcript is appended verbatim.
    Transcript {
        sections: &'a ExtractedSections,
        transcript: &'a str,
    },
}

impl ReportSource<'_> {
    pub fn variant(&self) -> ReportVariant {
        match self {
            ReportSource::Analysis(analysis) => match analysis.case_status {
                CaseStatus::Abnormal => ReportVariant::AbnormalCase,
                CaseStatus::Normal => ReportVariant::NormalCase,
            },
            ReportSource::Transcript { .. } => ReportVariant::TemplateOnly,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub text: String,
    pub variant: ReportVariant,
    /// Which sections were extracted; template-only reports only.
    pub fields_present: Option<FieldPresence>,
}

pub fn render_analysis(exam_type: &str, analysis: &AnalysisResult) -> RenderedReport {
    render(exam_type, ReportSource::Analysis(analysis))
}

pub fn render_template(exam_type: &str, sections: &ExtractedSections, transcript: &str) -> RenderedReport {
    render(exam_type, ReportSource::Transcript { sections, transcript })
}

/// Render a report. Pure: identical inputs give byte-identical text.
pub fn render(exam_type: &str, source: ReportSource<'_>) -> RenderedReport {
    let variant = source.variant();
    let mut out = ReportWriter::new(exam_type);

    match source {
        ReportSource::Analysis(analysis) => {
            out.field_inline("Powód badania", analysis.sections.reason.as_deref());
            match variant {
                ReportVariant::NormalCase => {
                    out.organ_summary(&analysis.organ_findings);
                    out.block("Wnioski", Some(NORMAL_CONCLUSIONS));
                    out.block("Zalecenia", Some(NORMAL_RECOMMENDATIONS));
                }
                _ => out.narrative(&analysis.sections, &analysis.key_findings),
            }
            out.trailer();
        }
        ReportSource::Transcript { sections, transcript } => {
            out.field_inline("Powód badania", sections.reason.as_deref());
            out.narrative(sections, &KeyFindings::default());
            out.trailer();
            out.block("Transkrypt źródłowy", Some(transcript));
        }
    }

    RenderedReport {
        text: out.finish(),
        variant,
        fields_present: match source {
            ReportSource::Transcript { sections, .. } => Some(sections.presence()),
            ReportSource::Analysis(_) => None,
        },
    }
}

/// Accumulates report paragraphs separated by blank lines.
struct ReportWriter {
    paragraphs: Vec<String>,
}

impl ReportWriter {
    fn new(exam_type: &str) -> Self {
        let heading = exam_type.trim().to_uppercase();
        let heading = if heading.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            heading
        };
        Self {
            paragraphs: vec![heading],
        }
    }

    fn field_inline(&mut self, label: &str, value: Option<&str>) {
        self.paragraphs
            .push(format!("{label}: {}", value.unwrap_or(PLACEHOLDER)));
    }

    fn block(&mut self, label: &str, value: Option<&str>) {
        self.paragraphs
            .push(format!("{label}:\n{}", value.unwrap_or(PLACEHOLDER)));
    }

    fn narrative(&mut self, sections: &ExtractedSections, key_findings: &KeyFindings) {
        self.block("Opis badania", sections.findings.as_deref());
        if !key_findings.is_empty() {
            let bullets: Vec<String> = key_findings
                .as_slice()
                .iter()
                .map(|item| format!("- {item}"))
                .collect();
            self.paragraphs
                .push(format!("Najważniejsze odchylenia:\n{}", bullets.join("\n")));
        }
        self.block("Wnioski", sections.conclusions.as_deref());
        self.block("Zalecenia", sections.recommendations.as_deref());
    }

    fn organ_summary(&mut self, organs: &OrganFindings) {
        let lines: Vec<String> = organs
            .iter()
            .map(|(organ, status)| {
                let value = match status {
                    OrganStatus::Normal => NORMAL_ORGAN,
                    OrganStatus::Abnormal => PLACEHOLDER,
                };
                format!("{}: {value}", organ.display_name())
            })
            .collect();
        self.paragraphs
            .push(format!("Opis badania:\n{}", lines.join("\n")));
    }

    fn trailer(&mut self) {
        self.paragraphs.push(format!("---\n{TRAILER}"));
    }

    fn finish(self) -> String {
        let mut text = self.paragraphs.join("\n\n");
        text.push('\n');
        text
    }
}
