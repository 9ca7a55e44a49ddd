//! Ordered label-pattern rules for the heuristic section extractor.
//!
//! A label line is a line consisting only of a section label, optionally
//! decorated with markdown (`#`, `**`) and followed by a colon or dash. Text
//! after the colon on the same line belongs to the section.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::enums::Section;

/// Safety cap on an accumulated label block.
pub const BLOCK_MAX_CHARS: usize = 1200;

/// Length of the findings fallback taken from the head of the transcript.
pub const FINDINGS_FALLBACK_CHARS: usize = 900;

/// A label pattern for one section.
pub struct SectionLabel {
    pub section: Section,
    pattern: Regex,
}

impl SectionLabel {
    /// Build a label rule from alternation-ready synonyms (regex syntax).
    pub fn new(section: Section, synonyms: &[&str]) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"(?i)^[#*\s]*(?:{})[*]*\s*(?:[:\-–—]\s*(?P<rest>.*))?$",
            synonyms.join("|")
        ))?;
        Ok(Self { section, pattern })
    }

    /// `Some(inline text)` when `line` is a label line for this section.
    /// The inline text is empty when the label stands alone.
    pub fn match_line<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.pattern.captures(line).map(|caps| {
            caps.name("rest")
                .map(|m| m.as_str().trim_matches(|c: char| c == '*' || c.is_whitespace()))
                .unwrap_or("")
        })
    }
}

/// Single-line fallback for a section without a label: a line opening with a
/// recommending or concluding verb. The remainder of the line is the value.
pub struct SentenceFallback {
    pub section: Section,
    pattern: Regex,
}

impl SentenceFallback {
    pub fn new(section: Section, openers: &[&str]) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"(?i)^(?:{})\b[\s:,\-–—]*(?P<rest>.+)$",
            openers.join("|")
        ))?;
        Ok(Self { section, pattern })
    }

    pub fn match_line<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(line)
            .and_then(|caps| caps.name("rest"))
            .map(|m| m.as_str().trim())
            .filter(|rest| !rest.is_empty())
    }
}

/// Complete rule set consumed by the heuristic extractor.
pub struct LabelRules {
    labels: Vec<SectionLabel>,
    divider: Regex,
    fallbacks: Vec<SentenceFallback>,
}

impl LabelRules {
    pub fn new(labels: Vec<SectionLabel>, divider: Regex, fallbacks: Vec<SentenceFallback>) -> Self {
        Self {
            labels,
            divider,
            fallbacks,
        }
    }

    /// Built-in Polish rules.
    pub fn standard() -> &'static LabelRules {
        &STANDARD_RULES
    }

    /// Labels of one section, in table order.
    pub fn labels_for(&self, section: Section) -> impl Iterator<Item = &SectionLabel> {
        self.labels.iter().filter(move |l| l.section == section)
    }

    /// True when the line opens any section or is a divider.
    pub fn is_boundary(&self, line: &str) -> bool {
        self.divider.is_match(line) || self.labels.iter().any(|l| l.match_line(line).is_some())
    }

    pub fn fallback_for(&self, section: Section) -> Option<&SentenceFallback> {
        self.fallbacks.iter().find(|f| f.section == section)
    }
}

static STANDARD_RULES: LazyLock<LabelRules> = LazyLock::new(|| {
    LabelRules::new(
        vec![
            label(
                Section::Reason,
                &[
                    r"powód\s+(?:wizyty|badania|skierowania)",
                    r"przyczyna\s+(?:wizyty|badania)",
                    r"wskazani[ae](?:\s+do\s+badania)?",
                    r"cel\s+badania",
                    r"skierowanie",
                ],
            ),
            label(
                Section::Findings,
                &[
                    r"opis\s+badania",
                    r"wynik\s+badania",
                    r"badanie\s+usg",
                    r"w\s+badaniu",
                    r"opis",
                    r"badanie",
                ],
            ),
            label(
                Section::Conclusions,
                &[r"wnioski", r"wniosek", r"podsumowanie", r"rozpoznanie", r"konkluzja"],
            ),
            label(
                Section::Recommendations,
                &[
                    r"zalecenia",
                    r"zalecenie",
                    r"dalsze\s+postępowanie",
                    r"zalecane\s+postępowanie",
                ],
            ),
        ],
        Regex::new(r"(?i)^(?:[-=_*~]{3,}|koniec(?:\s+opisu)?\.?)$").unwrap(),
        vec![
            fallback(
                Section::Recommendations,
                &[
                    r"zalecam",
                    r"zaleca\s+się",
                    r"zalecono",
                    r"zalecana\s+jest",
                    r"proponuję",
                    r"sugeruję",
                ],
            ),
            fallback(
                Section::Conclusions,
                &[
                    r"wniosek",
                    r"wnioskuję",
                    r"stwierdzam",
                    r"podsumowując",
                    r"w\s+podsumowaniu",
                    r"obraz\s+(?:sugeruje|przemawia\s+za)",
                ],
            ),
        ],
    )
});

fn label(section: Section, synonyms: &[&str]) -> SectionLabel {
    SectionLabel::new(section, synonyms).unwrap()
}

fn fallback(section: Section, openers: &[&str]) -> SentenceFallback {
    SentenceFallback::new(section, openers).unwrap()
}
