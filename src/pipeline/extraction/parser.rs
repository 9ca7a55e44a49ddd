use serde_json::Value;

use crate::models::{ExtractedSections, KeyFindings};
use crate::pipeline::normalize::normalize_single_line;

use super::{preview, InferenceError};

/// Sections and key findings recovered from one inference response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCompletion {
    pub sections: ExtractedSections,
    pub key_findings: KeyFindings,
}

/// Parse a raw response body into sections and key findings.
/// Each failure point of the upstream contract has its own error variant.
pub fn parse_inference_response(body: &str) -> Result<ParsedCompletion, InferenceError> {
    let content = parse_completion_envelope(body)?;
    let object = extract_json_object(&content)?;
    Ok(parse_structured_content(&object))
}

/// Validate the transport envelope and return `choices[0].message.content`.
pub fn parse_completion_envelope(body: &str) -> Result<String, InferenceError> {
    let envelope: Value = serde_json::from_str(body).map_err(|_| InferenceError::EnvelopeInvalid {
        preview: preview(body),
    })?;

    envelope
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|content| !content.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| InferenceError::ContentEmpty {
            preview: preview(body),
        })
}

/// Parse the substring between the first `{` and the last `}` of `content`.
/// Leading or trailing prose and markdown fences are tolerated.
pub fn extract_json_object(content: &str) -> Result<Value, InferenceError> {
    let not_json = || InferenceError::NotJson {
        preview: preview(content),
    };

    let start = content.find('{').ok_or_else(not_json)?;
    let end = content.rfind('}').ok_or_else(not_json)?;
    if end < start {
        return Err(not_json());
    }

    serde_json::from_str(&content[start..=end]).map_err(|_| not_json())
}

/// Accept only correctly typed fields. Anything else is treated as absent.
pub fn parse_structured_content(object: &Value) -> ParsedCompletion {
    let section = |key: &str| {
        object
            .pointer(&format!("/sections/{key}"))
            .and_then(Value::as_str)
            .map(normalize_single_line)
    };

    let sections = ExtractedSections::from_candidates(
        section("reason"),
        section("findings"),
        section("conclusions"),
        section("recommendations"),
    );

    let key_findings = match object.get("keyFindings").and_then(Value::as_array) {
        Some(items) => KeyFindings::from_items(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(normalize_single_line),
        ),
        None => KeyFindings::default(),
    };

    ParsedCompletion {
        sections,
        key_findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_KEY_FINDINGS;
    use serde_json::json;

    fn envelope(content: &str) -> String {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }).to_string()
    }

    #[test]
    fn recovers_json_embedded_in_prose() {
        let content = r#"Here is the result: {"sections":{"reason":"Kontrola","findings":"Wątroba powiększona."},"keyFindings":["Hepatomegalia"]} Thanks."#;
        let parsed = parse_inference_response(&envelope(content)).unwrap();
        assert_eq!(parsed.sections.reason.as_deref(), Some("Kontrola"));
        assert_eq!(parsed.sections.findings.as_deref(), Some("Wątroba powiększona."));
        assert_eq!(parsed.key_findings.as_slice(), ["Hepatomegalia"]);
    }

    #[test]
    fn extracts_exactly_first_to_last_brace() {
        let value = extract_json_object("prefix {\"a\": {\"b\": 1}} suffix").unwrap();
        assert_eq!(value, json!({"a": {"b": 1}}));
    }

    #[test]
    fn tolerates_markdown_fences() {
        let content = "```json\n{\"sections\":{\"conclusions\":\"Bez zmian\"}}\n```";
        let parsed = parse_inference_response(&envelope(content)).unwrap();
        assert_eq!(parsed.sections.conclusions.as_deref(), Some("Bez zmian"));
    }

    #[test]
    fn content_without_braces_is_not_json() {
        let err = parse_inference_response(&envelope("Nie mogę pomóc.")).unwrap_err();
        assert_eq!(
            err,
            InferenceError::NotJson {
                preview: "Nie mogę pomóc.".into()
            }
        );
    }

    #[test]
    fn reversed_or_broken_braces_are_not_json() {
        assert!(matches!(extract_json_object("} oops {"), Err(InferenceError::NotJson { .. })));
        assert!(matches!(extract_json_object("{ not: json }"), Err(InferenceError::NotJson { .. })));
    }

    #[test]
    fn invalid_envelope_is_reported_with_preview() {
        let body = "<html>502 Bad Gateway</html>";
        assert_eq!(
            parse_inference_response(body).unwrap_err(),
            InferenceError::EnvelopeInvalid {
                preview: body.into()
            }
        );
    }

    #[test]
    fn missing_or_blank_content_is_content_empty() {
        for body in [
            json!({ "choices": [] }).to_string(),
            json!({ "choices": [{ "message": { "content": null } }] }).to_string(),
            json!({ "choices": [{ "message": { "content": 42 } }] }).to_string(),
            envelope("   "),
        ] {
            assert!(matches!(
                parse_inference_response(&body),
                Err(InferenceError::ContentEmpty { .. })
            ));
        }
    }

    #[test]
    fn preview_is_bounded() {
        let body = "x".repeat(5000);
        match parse_inference_response(&body) {
            Err(InferenceError::EnvelopeInvalid { preview }) => assert_eq!(preview.len(), 300),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn non_string_fields_are_absent() {
        let value = json!({
            "sections": { "reason": 5, "findings": ["a"], "conclusions": "  ", "recommendations": "Kontrola" },
            "keyFindings": "not a list"
        });
        let parsed = parse_structured_content(&value);
        assert_eq!(parsed.sections.reason, None);
        assert_eq!(parsed.sections.findings, None);
        assert_eq!(parsed.sections.conclusions, None);
        assert_eq!(parsed.sections.recommendations.as_deref(), Some("Kontrola"));
        assert!(parsed.key_findings.is_empty());
    }

    #[test]
    fn key_findings_are_filtered_single_lined_and_capped() {
        let mut items: Vec<Value> = vec![json!(1), json!("  "), json!("Torbiel\n nerki  lewej"), json!(null)];
        items.extend((0..20).map(|i| json!(format!("zmiana {i}"))));
        let parsed = parse_structured_content(&json!({ "keyFindings": items }));
        assert_eq!(parsed.key_findings.len(), MAX_KEY_FINDINGS);
        assert_eq!(parsed.key_findings.as_slice()[0], "Torbiel nerki lewej");
        assert_eq!(parsed.key_findings.as_slice()[1], "zmiana 0");
    }

    #[test]
    fn section_strings_get_typo_correction() {
        let parsed = parse_structured_content(&json!({
            "sections": { "findings": "Watroba nie jednorodna,\n sledziona prawidłowa" }
        }));
        assert_eq!(
            parsed.sections.findings.as_deref(),
            Some("Wątroba niejednorodna, śledziona prawidłowa")
        );
    }
}
