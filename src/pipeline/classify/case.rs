use std::sync::LazyLock;

use regex::Regex;

use crate::models::enums::CaseStatus;
use crate::models::KeyFindings;
use crate::pipeline::normalize::normalize_single_line;

use super::vocabulary::{case_indicators, OrganVocabulary, CASE_EXTRA_INDICATORS, STANDARD_ORGANS};

/// A single global abnormality pattern over findings and conclusions.
pub struct CaseRules {
    pattern: Regex,
}

impl CaseRules {
    pub fn new(indicators: &[&str]) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!("(?i)(?:{})", indicators.join("|")))?;
        Ok(Self { pattern })
    }

    /// Rules built from the union of organ vocabularies plus extras.
    pub fn from_vocabulary(organs: &[OrganVocabulary], extra: &[&'static str]) -> Result<Self, regex::Error> {
        Self::new(&case_indicators(organs, extra))
    }

    pub fn standard() -> &'static CaseRules {
        &STANDARD_RULES
    }

    pub fn is_abnormal(&self, lowercase_text: &str) -> bool {
        self.pattern.is_match(lowercase_text)
    }
}

static STANDARD_RULES: LazyLock<CaseRules> = LazyLock::new(|| {
    CaseRules::from_vocabulary(&STANDARD_ORGANS, CASE_EXTRA_INDICATORS).unwrap()
});

/// Overall status from findings and conclusions. Independent of the
/// per-organ engine: the two may disagree.
pub fn classify_case(findings: Option<&str>, conclusions: Option<&str>) -> CaseStatus {
    classify_case_with(findings, conclusions, CaseRules::standard())
}

pub fn classify_case_with(
    findings: Option<&str>,
    conclusions: Option<&str>,
    rules: &CaseRules,
) -> CaseStatus {
    let text = format!(
        "{}\n{}",
        findings.unwrap_or(""),
        conclusions.unwrap_or("")
    )
    .to_lowercase();

    if rules.is_abnormal(&text) {
        CaseStatus::Abnormal
    } else {
        CaseStatus::Normal
    }
}

/// Key findings for the heuristic strategy: findings sentences that carry an
/// abnormality indicator, in text order.
pub fn derive_key_findings(findings: Option<&str>) -> KeyFindings {
    derive_key_findings_with(findings, CaseRules::standard())
}

pub fn derive_key_findings_with(findings: Option<&str>, rules: &CaseRules) -> KeyFindings {
    let text = findings.unwrap_or("");
    KeyFindings::from_items(
        split_sentences(text)
            .into_iter()
            .filter(|sentence| rules.is_abnormal(&sentence.to_lowercase()))
            .map(normalize_single_line),
    )
}

/// Split on line breaks and on `.`, `;`, `!`, `?` followed by whitespace.
/// A terminator followed by a digit ("10.5") does not end a sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    for line in text.lines() {
        let mut start = 0;
        let mut chars = line.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            let at_boundary = matches!(c, '.' | ';' | '!' | '?')
                && chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                let end = i + c.len_utf8();
                sentences.push(line[start..end].trim());
                start = end;
            }
        }
        sentences.push(line[start..].trim());
    }
    sentences.retain(|s| !s.is_empty());
    sentences
}
