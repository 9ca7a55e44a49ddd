//! Ordered table of known transcription typos in ultrasound vocabulary.
//!
//! Each rule is a case-insensitive pattern anchored at a word boundary. A
//! trailing `(\w*)` capture carries the inflectional suffix through to the
//! replacement, so "watrobie" becomes "wątrobie". Replacements never match
//! any pattern in the table, which keeps the pass idempotent.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// A single {pattern, replacement} correction.
pub struct CorrectionRule {
    pattern: Regex,
    replacement: &'static str,
}

impl CorrectionRule {
    /// Compile a rule. `pattern` is wrapped in `(?i)`; `replacement` may use
    /// `${1}`-style capture references.
    pub fn new(pattern: &str, replacement: &'static str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&format!("(?i){pattern}"))?,
            replacement,
        })
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures| {
                let mut corrected = String::new();
                caps.expand(self.replacement, &mut corrected);
                preserve_case(&caps[0], &corrected)
            })
            .into_owned()
    }
}

/// Immutable, ordered list of correction rules.
pub struct CorrectionTable {
    rules: Vec<CorrectionRule>,
}

impl CorrectionTable {
    pub fn new(rules: Vec<CorrectionRule>) -> Self {
        Self { rules }
    }

    /// The built-in table for Polish abdominal ultrasound dictation.
    pub fn standard() -> &'static CorrectionTable {
        &STANDARD_TABLE
    }

    /// Apply every rule in order.
    pub fn apply(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, rule| rule.apply(&acc))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

static STANDARD_TABLE: LazyLock<CorrectionTable> = LazyLock::new(|| {
    CorrectionTable::new(vec![
        rule(r"\bwatrob(\w*)", "wątrob${1}"),
        rule(r"\bsledzion(\w*)", "śledzion${1}"),
        rule(r"\bpecherz(\w*)", "pęcherz${1}"),
        rule(r"\bzolc(\w*)", "żółc${1}"),
        rule(r"\bzoladk(\w*)", "żołądk${1}"),
        rule(r"\bpowieksz(\w*)", "powiększ${1}"),
        rule(r"\bzlog(\w*)", "złog${1}"),
        rule(r"\bwodo[ \t]+nercz(\w*)", "wodonercz${1}"),
        rule(r"\bnie[ \t]+jednorod(\w*)", "niejednorod${1}"),
        rule(r"\bhiper[ \t]+echogen(\w*)", "hiperechogen${1}"),
        rule(r"\bhipo[ \t]+echogen(\w*)", "hipoechogen${1}"),
        rule(r"\bu[ \t]?s[ \t]?g\b", "USG"),
    ])
});

fn rule(pattern: &str, replacement: &'static str) -> CorrectionRule {
    CorrectionRule::new(pattern, replacement).unwrap()
}

/// Carry the capitalization of the matched text over to the correction:
/// all-caps stays all-caps, a leading capital stays a leading capital.
fn preserve_case(original: &str, corrected: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return corrected.to_uppercase();
    }

    let first_upper = original.chars().next().is_some_and(|c| c.is_uppercase());
    if first_upper {
        let mut chars = corrected.chars();
        match chars.next() {
            Some(c) => {
                let mut s: String = c.to_uppercase().collect();
                s.extend(chars);
                s
            }
            None => corrected.to_string(),
        }
    } else {
        corrected.to_string()
    }
}
