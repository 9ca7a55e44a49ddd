use std::sync::LazyLock;

use regex::Regex;

use crate::models::enums::{Organ, OrganStatus};
use crate::models::OrganFindings;

use super::vocabulary::{OrganVocabulary, STANDARD_ORGANS};

/// One compiled organ rule: the organ's name followed, anywhere later in the
/// findings text, by one of its abnormality indicators.
pub struct OrganRule {
    pub organ: Organ,
    pattern: Regex,
}

impl OrganRule {
    pub fn from_vocabulary(vocab: &OrganVocabulary) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"(?i)(?:{})[\s\S]*?(?:{})",
            vocab.tokens.join("|"),
            vocab.indicators.join("|")
        ))?;
        Ok(Self {
            organ: vocab.organ,
            pattern,
        })
    }

    pub fn is_abnormal(&self, lowercase_text: &str) -> bool {
        self.pattern.is_match(lowercase_text)
    }
}

/// Ordered organ rules, one per tracked organ.
pub struct OrganRules {
    rules: Vec<OrganRule>,
}

impl OrganRules {
    pub fn new(rules: Vec<OrganRule>) -> Self {
        Self { rules }
    }

    pub fn from_vocabulary(vocab: &[OrganVocabulary]) -> Result<Self, regex::Error> {
        let rules = vocab
            .iter()
            .map(OrganRule::from_vocabulary)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn standard() -> &'static OrganRules {
        &STANDARD_RULES
    }
}

static STANDARD_RULES: LazyLock<OrganRules> =
    LazyLock::new(|| OrganRules::from_vocabulary(&STANDARD_ORGANS).unwrap());

/// Classify each tracked organ from findings text.
///
/// An organ with no matching evidence, including one never mentioned, is
/// reported `Normal`. All five organs are always present in the result.
pub fn infer_organ_findings(findings: Option<&str>) -> OrganFindings {
    infer_organ_findings_with(findings, OrganRules::standard())
}

pub fn infer_organ_findings_with(findings: Option<&str>, rules: &OrganRules) -> OrganFindings {
    let text = findings.unwrap_or("").to_lowercase();
    let mut result = OrganFindings::all_normal();
    for rule in &rules.rules {
        if rule.is_abnormal(&text) {
            result.set(rule.organ, OrganStatus::Abnormal);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn abnormal(text: &str) -> Vec<Organ> {
        infer_organ_findings(Some(text))
            .iter()
            .filter(|(_, s)| *s == OrganStatus::Abnormal)
            .map(|(o, _)| o)
            .collect()
    }

    #[test]
    fn kidneys_with_hydronephrosis_are_abnormal() {
        let findings = infer_organ_findings(Some("Nerki z wodonerczem II stopnia."));
        assert_eq!(findings.kidneys, OrganStatus::Abnormal);
        assert_eq!(findings.liver, OrganStatus::Normal);
        assert_eq!(findings.spleen, OrganStatus::Normal);
        assert_eq!(findings.bladder, OrganStatus::Normal);
        assert_eq!(findings.prostate, OrganStatus::Normal);
    }

    #[test]
    fn empty_or_absent_text_is_all_normal() {
        assert_eq!(infer_organ_findings(None), OrganFindings::all_normal());
        assert_eq!(infer_organ_findings(Some("")), OrganFindings::all_normal());
    }

    #[test]
    fn indicator_may_follow_on_a_later_line() {
        assert_eq!(abnormal("Wątroba:\npowiększona, niejednorodna."), [Organ::Liver]);
    }

    #[test]
    fn abbreviations_and_decimals_do_not_hide_indicators() {
        assert_eq!(abnormal("Wątroba wym. 17 cm, powiększona."), [Organ::Liver]);
        assert_eq!(abnormal("Wątroba 16.5 cm, powiększona."), [Organ::Liver]);
        assert_eq!(abnormal("Nerka lewa ok. 11 cm. Cechy wodonercza II st."), [Organ::Kidneys]);
    }

    #[test]
    fn indicator_in_a_following_sentence_counts() {
        assert_eq!(
            abnormal("Wątroba o wymiarach 17 cm. Miąższ niejednorodny, powiększony."),
            [Organ::Liver]
        );
    }

    #[test]
    fn indicator_before_the_organ_name_does_not_count() {
        assert!(abnormal("Powiększone węzły chłonne. Wątroba bez zmian.").is_empty());
    }

    #[test]
    fn organ_per_line_findings_agree_with_case_status() {
        let sections = crate::pipeline::extraction::extract_sections(
            "Opis badania:\nWątroba:\npowiększona, niejednorodna.\nWnioski:\nHepatomegalia.",
        );
        let findings = infer_organ_findings(sections.findings.as_deref());
        assert_eq!(findings.liver, OrganStatus::Abnormal);
        assert_eq!(
            crate::pipeline::classify::classify_case(
                sections.findings.as_deref(),
                sections.conclusions.as_deref()
            ),
            crate::models::enums::CaseStatus::Abnormal
        );
    }

    #[test]
    fn inflected_names_and_mixed_case_match() {
        assert_eq!(abnormal("W WĄTROBIE liczne torbiele."), [Organ::Liver]);
        assert_eq!(abnormal("W nerce lewej złóg 5 mm, w nerce prawej złogi."), [Organ::Kidneys]);
        assert_eq!(abnormal("Gruczoł krokowy powiększony, 45 ml."), [Organ::Prostate]);
    }

    #[test]
    fn gallbladder_is_not_the_urinary_bladder() {
        assert!(abnormal("Pęcherzyk żółciowy z kamieniem 8 mm.").is_empty());
        assert_eq!(abnormal("Pęcherz moczowy o pogrubiałej ścianie."), [Organ::Bladder]);
    }

    #[test]
    fn multiple_organs_in_fixed_order() {
        assert_eq!(
            abnormal("Prostata powiększona. Wątroba stłuszczona. Nerka prawa z poszerzonym UKM."),
            [Organ::Liver, Organ::Kidneys, Organ::Prostate]
        );
    }

    #[test]
    fn custom_rules_only_flag_their_organs() {
        let vocab = [OrganVocabulary {
            organ: Organ::Spleen,
            tokens: &["spleen"],
            indicators: &["enlarged"],
        }];
        let rules = OrganRules::from_vocabulary(&vocab).unwrap();
        let findings = infer_organ_findings_with(Some("Spleen enlarged. Liver enlarged."), &rules);
        assert_eq!(findings.spleen, OrganStatus::Abnormal);
        assert_eq!(findings.liver, OrganStatus::Normal);
    }

    proptest! {
        #[test]
        fn always_emits_all_five_organs(s in "\\PC*") {
            let findings = infer_organ_findings(Some(&s));
            let json = serde_json::to_value(findings).unwrap();
            prop_assert_eq!(json.as_object().unwrap().len(), 5);
            prop_assert_eq!(findings.iter().count(), 5);
        }
    }
}
