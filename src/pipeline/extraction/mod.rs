//! Section extraction. Two strategies share one output shape:
//! the label-pattern heuristic (never fails) and the inference-assisted
//! extractor (fails with a typed [`InferenceError`]).

pub mod labels;
pub mod heuristic;
pub mod prompt;
pub mod client;
pub mod parser;
pub mod inference;

pub use heuristic::*;
pub use prompt::*;
pub use client::*;
pub use parser::*;
pub use inference::*;

use thiserror::Error;

/// Upper bound on raw upstream text carried inside an error.
pub const PREVIEW_MAX_CHARS: usize = 300;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("Inference transport failure: {0}")]
    Transport(String),

    #[error("Response envelope is not valid JSON: {preview}")]
    EnvelopeInvalid { preview: String },

    #[error("Response content is missing or empty: {preview}")]
    ContentEmpty { preview: String },

    #[error("Response content has no JSON object: {preview}")]
    NotJson { preview: String },
}

/// First [`PREVIEW_MAX_CHARS`] characters of an upstream payload.
pub fn preview(raw: &str) -> String {
    raw.chars().take(PREVIEW_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_bounded_by_chars() {
        let raw = "ż".repeat(1000);
        let p = preview(&raw);
        assert_eq!(p.chars().count(), PREVIEW_MAX_CHARS);
        assert_eq!(preview("short"), "short");
    }
}
