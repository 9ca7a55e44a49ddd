//! Abnormality vocabulary, as plain data. Entries are regex fragments
//! matched case-insensitively against lowercased text; most are word stems
//! so that every inflected form matches.

use crate::models::enums::Organ;

/// Name tokens and abnormality indicators for one tracked organ.
#[derive(Debug, Clone, Copy)]
pub struct OrganVocabulary {
    pub organ: Organ,
    pub tokens: &'static [&'static str],
    pub indicators: &'static [&'static str],
}

const FOCAL_LESION: &str = r"zmian[aąyę]\s+ognisk";

pub const STANDARD_ORGANS: [OrganVocabulary; 5] = [
    OrganVocabulary {
        organ: Organ::Liver,
        tokens: &[r"wątrob\w*"],
        indicators: &[
            "powiększ",
            "niejednorod",
            "stłuszcz",
            "hiperechogen",
            "hipoechogen",
            FOCAL_LESION,
            "guz",
            "torbiel",
            "marsk",
            "naczyniak",
            "przerzut",
        ],
    },
    OrganVocabulary {
        organ: Organ::Spleen,
        tokens: &[r"śledzion\w*"],
        indicators: &[
            "powiększ",
            "splenomegal",
            "niejednorod",
            "torbiel",
            "zawał",
            FOCAL_LESION,
        ],
    },
    OrganVocabulary {
        organ: Organ::Kidneys,
        tokens: &[r"\bner(?:k\w*|ce|ek)\b"],
        indicators: &[
            "wodonercz",
            "poszerz",
            "zastój",
            "zastoj",
            "kamie",
            "kamic",
            "złog",
            "torbiel",
            FOCAL_LESION,
            "guz",
        ],
    },
    OrganVocabulary {
        organ: Organ::Bladder,
        tokens: &[r"\bpęcherz(?:a|u|em|owi)?\b"],
        indicators: &[
            "pogrubi",
            "kamie",
            "złog",
            "uchył",
            "polip",
            "zalegani",
            FOCAL_LESION,
            "guz",
            "beleczkow",
        ],
    },
    OrganVocabulary {
        organ: Organ::Prostate,
        tokens: &[r"prostat\w*", r"gruczoł\w*\s+krokow\w*"],
        indicators: &[
            "powiększ",
            "przerost",
            "niejednorod",
            "zwapni",
            FOCAL_LESION,
            "guz",
        ],
    },
];

/// Case-level indicators on top of the union of organ indicators; these
/// cover abnormalities of structures that are not tracked per organ.
pub const CASE_EXTRA_INDICATORS: &[&str] = &[
    "podejrzeni",
    "nieprawidł",
    "patolog",
    "wolny\\s+płyn",
    "płyn\\s+w\\s+jamie",
    "kamic",
    "polip",
    "tętniak",
];

/// Union of every organ's indicators and the case-level extras, deduplicated
/// and in first-seen order.
pub fn case_indicators(organs: &[OrganVocabulary], extra: &[&'static str]) -> Vec<&'static str> {
    let mut all: Vec<&'static str> = Vec::new();
    for indicator in organs
        .iter()
        .flat_map(|o| o.indicators.iter().copied())
        .chain(extra.iter().copied())
    {
        if !all.contains(&indicator) {
            all.push(indicator);
        }
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tracked_organ_has_vocabulary_in_order() {
        let organs: Vec<Organ> = STANDARD_ORGANS.iter().map(|v| v.organ).collect();
        assert_eq!(organs, Organ::ALL);
        assert!(STANDARD_ORGANS.iter().all(|v| !v.tokens.is_empty() && !v.indicators.is_empty()));
    }

    #[test]
    fn case_vocabulary_covers_every_organ_indicator() {
        let union = case_indicators(&STANDARD_ORGANS, CASE_EXTRA_INDICATORS);
        for vocab in &STANDARD_ORGANS {
            for indicator in vocab.indicators {
                assert!(union.contains(indicator), "missing {indicator}");
            }
        }
        let unique: std::collections::HashSet<_> = union.iter().collect();
        assert_eq!(unique.len(), union.len());
    }
}
