use serde::{Deserialize, Serialize};

/// Version tag of the instruction template, recorded in provenance.
pub const TEMPLATE_VERSION: &str = "usg-sections-v3";

const SYSTEM_PROMPT_TEMPLATE: &str = r#"
Jesteś asystentem porządkującym dyktowane opisy badań: {exam_type}.
Twoim JEDYNYM zadaniem jest przeniesienie treści transkryptu do ustalonej
struktury. Nie stawiasz rozpoznań i nie oceniasz wyników.

ZASADY BEZWZGLĘDNE:
1. Przenoś wyłącznie informacje wprost zawarte w transkrypcie.
2. NIGDY nie dopisuj treści, której nie ma w transkrypcie.
3. Jeśli sekcji brak, pomiń klucz albo podaj null.
4. Zachowaj dosłownie wymiary, liczby i jednostki.
5. "keyFindings" to krótkie odchylenia od normy (maksymalnie 12), w kolejności z transkryptu.
6. Odpowiedz WYŁĄCZNIE obiektem JSON, bez komentarzy i bez bloków markdown.

FORMAT ODPOWIEDZI:
{
  "sections": {
    "reason": "powód badania lub null",
    "findings": "opis badania lub null",
    "conclusions": "wnioski lub null",
    "recommendations": "zalecenia lub null"
  },
  "keyFindings": ["odchylenie 1", "odchylenie 2"]
}
"#;

/// Build the fixed system instruction for one exam type.
pub fn build_system_prompt(exam_type: &str) -> String {
    SYSTEM_PROMPT_TEMPLATE
        .trim()
        .replace("{exam_type}", exam_type.trim())
}

/// One chat message of an OpenAI-compatible completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Request body sent to the inference service. Deterministic sampling only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatRequest {
    /// One system instruction plus the transcript as the user message.
    pub fn for_transcript(model: &str, max_tokens: u32, exam_type: &str, transcript: &str) -> Self {
        Self {
            model: model.to_string(),
            temperature: 0.0,
            max_tokens,
            messages: vec![
                ChatMessage::system(build_system_prompt(exam_type)),
                ChatMessage::user(format!("<transkrypt>\n{transcript}\n</transkrypt>")),
            ],
            stream: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_parameterized_by_exam_type_only() {
        let a = build_system_prompt("USG jamy brzusznej");
        let b = build_system_prompt("USG tarczycy");
        assert!(a.contains("USG jamy brzusznej"));
        assert!(!a.contains("{exam_type}"));
        assert_eq!(a.replace("USG jamy brzusznej", "X"), b.replace("USG tarczycy", "X"));
    }

    #[test]
    fn prompt_forbids_fabrication_and_names_keys() {
        let prompt = build_system_prompt("USG");
        assert!(prompt.contains("NIGDY nie dopisuj"));
        assert!(prompt.contains("\"keyFindings\""));
        assert!(prompt.contains("\"recommendations\""));
    }

    #[test]
    fn request_has_system_then_user_message() {
        let req = ChatRequest::for_transcript("m", 800, "USG", "Wątroba prawidłowa.");
        assert_eq!(req.temperature, 0.0);
        assert!(!req.stream);
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, "system");
        assert_eq!(req.messages[1].role, "user");
        assert!(req.messages[1].content.contains("Wątroba prawidłowa."));
    }

    #[test]
    fn request_serializes_openai_shape() {
        let req = ChatRequest::for_transcript("gpt-4o-mini", 1200, "USG", "t");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 1200);
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["messages"][0]["role"], "system");
    }
}
