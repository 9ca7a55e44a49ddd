use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{CaseStatus, Organ, OrganStatus, ReportVariant};

/// Maximum number of key findings kept per analysis.
pub const MAX_KEY_FINDINGS: usize = 12;

/// Trim a candidate field value; empty after trimming means "not stated".
pub fn non_empty(value: impl AsRef<str>) -> Option<String> {
    let trimmed = value.as_ref().trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// The four clinical sections located in a transcript.
/// Each field is either a trimmed non-empty string or absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSections {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
}

impl ExtractedSections {
    /// Build sections from raw candidates, enforcing the non-empty invariant.
    pub fn from_candidates(
        reason: Option<String>,
        findings: Option<String>,
        conclusions: Option<String>,
        recommendations: Option<String>,
    ) -> Self {
        Self {
            reason: reason.and_then(non_empty),
            findings: findings.and_then(non_empty),
            conclusions: conclusions.and_then(non_empty),
            recommendations: recommendations.and_then(non_empty),
        }
    }

    pub fn findings_text(&self) -> &str {
        self.findings.as_deref().unwrap_or("")
    }

    pub fn conclusions_text(&self) -> &str {
        self.conclusions.as_deref().unwrap_or("")
    }

    pub fn presence(&self) -> FieldPresence {
        FieldPresence {
            reason: self.reason.is_some(),
            findings: self.findings.is_some(),
            conclusions: self.conclusions.is_some(),
            recommendations: self.recommendations.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reason.is_none()
            && self.findings.is_none()
            && self.conclusions.is_none()
            && self.recommendations.is_none()
    }
}

/// Which sections were successfully extracted (template-only provenance).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPresence {
    pub reason: bool,
    pub findings: bool,
    pub conclusions: bool,
    pub recommendations: bool,
}

/// Ordered short findings, at most [`MAX_KEY_FINDINGS`], never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyFindings(Vec<String>);

impl KeyFindings {
    /// Keep non-empty trimmed items in order, capped at [`MAX_KEY_FINDINGS`].
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            items
                .into_iter()
                .filter_map(non_empty)
                .take(MAX_KEY_FINDINGS)
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Normal/abnormal status for each tracked organ. All five are always present;
/// absence of evidence is recorded as `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganFindings {
    pub liver: OrganStatus,
    pub spleen: OrganStatus,
    pub kidneys: OrganStatus,
    pub bladder: OrganStatus,
    pub prostate: OrganStatus,
}

impl Default for OrganFindings {
    fn default() -> Self {
        Self::all_normal()
    }
}

impl OrganFindings {
    pub fn all_normal() -> Self {
        Self {
            liver: OrganStatus::Normal,
            spleen: OrganStatus::Normal,
            kidneys: OrganStatus::Normal,
            bladder: OrganStatus::Normal,
            prostate: OrganStatus::Normal,
        }
    }

    pub fn get(&self, organ: Organ) -> OrganStatus {
        match organ {
            Organ::Liver => self.liver,
            Organ::Spleen => self.spleen,
            Organ::Kidneys => self.kidneys,
            Organ::Bladder => self.bladder,
            Organ::Prostate => self.prostate,
        }
    }

    pub fn set(&mut self, organ: Organ, status: OrganStatus) {
        let slot = match organ {
            Organ::Liver => &mut self.liver,
            Organ::Spleen => &mut self.spleen,
            Organ::Kidneys => &mut self.kidneys,
            Organ::Bladder => &mut self.bladder,
            Organ::Prostate => &mut self.prostate,
        };
        *slot = status;
    }

    /// Entries in the fixed organ order.
    pub fn iter(&self) -> impl Iterator<Item = (Organ, OrganStatus)> + '_ {
        Organ::ALL.iter().map(move |organ| (*organ, self.get(*organ)))
    }

    pub fn abnormal_count(&self) -> usize {
        self.iter()
            .filter(|(_, status)| *status == OrganStatus::Abnormal)
            .count()
    }
}

/// Aggregate output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub sections: ExtractedSections,
    pub key_findings: KeyFindings,
    pub organ_findings: OrganFindings,
    pub case_status: CaseStatus,
}

/// Which engine produced an analysis, and how long it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisProvenance {
    /// `heuristic` or `inference`.
    pub engine: String,
    /// Model identifier, or the rule-set identifier for the heuristic engine.
    pub model: String,
    pub template_version: String,
    pub latency_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Provenance attached to a rendered report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub engine: String,
    pub model: String,
    pub template_version: String,
    pub variant: ReportVariant,
    pub latency_ms: u64,
    pub timestamp: DateTime<Utc>,
    /// Set only when the report was rendered straight from a transcript.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields_present: Option<FieldPresence>,
}
