use super::client::InferenceClient;
use super::parser::{parse_inference_response, ParsedCompletion};
use super::prompt::ChatRequest;
use super::InferenceError;

/// Inference-assisted section extraction: exactly one round trip, no retry.
pub struct InferenceExtractor<'a> {
    client: &'a dyn InferenceClient,
    model: &'a str,
    max_tokens: u32,
}

impl<'a> InferenceExtractor<'a> {
    pub fn new(client: &'a dyn InferenceClient, model: &'a str, max_tokens: u32) -> Self {
        Self {
            client,
            model,
            max_tokens,
        }
    }

    pub fn model(&self) -> &'a str {
        self.model
    }

    /// Send the normalized transcript and parse the structured response.
    pub fn extract(&self, normalized: &str, exam_type: &str) -> Result<ParsedCompletion, InferenceError> {
        let request = ChatRequest::for_transcript(self.model, self.max_tokens, exam_type, normalized);
        let body = self.client.complete(&request)?;

        let parsed = parse_inference_response(&body);
        if let Err(e) = &parsed {
            tracing::warn!(error = %e, body_len = body.len(), "Inference response rejected");
        }
        parsed
    }
}
