pub mod normalize;
pub mod extraction;
pub mod classify;
pub mod report;
pub mod storage;
pub mod orchestrator; // Analyze / GenerateReport entry points

pub use orchestrator::*;

use thiserror::Error;

use extraction::InferenceError;
use storage::StorageError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Required input missing: {0}")]
    InputMissing(String),

    #[error("Document not found (attempted: {})", .attempted.join(", "))]
    DocumentNotFound { attempted: Vec<String> },

    #[error("Document {path} has no transcript")]
    MissingTranscript { path: String },

    #[error("Document {path} has neither an analysis nor a transcript")]
    MissingAnalysisOrTranscript { path: String },

    #[error("Inference service unreachable: {0}")]
    UpstreamTransport(String),

    #[error("Inference service returned an invalid envelope: {preview}")]
    UpstreamEnvelopeInvalid { preview: String },

    #[error("Inference service returned empty content: {preview}")]
    UpstreamContentEmpty { preview: String },

    #[error("Inference service content contains no JSON object: {preview}")]
    UpstreamNotJson { preview: String },

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StorageError),
}

impl PipelineError {
    /// Stable identifier exposed to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InputMissing(_) => "INPUT_MISSING",
            Self::DocumentNotFound { .. } => "DOCUMENT_NOT_FOUND",
            Self::MissingTranscript { .. } => "MISSING_TRANSCRIPT",
            Self::MissingAnalysisOrTranscript { .. } => "MISSING_ANALYSIS_OR_TRANSCRIPT",
            Self::UpstreamTransport(_) => "UPSTREAM_TRANSPORT",
            Self::UpstreamEnvelopeInvalid { .. } => "UPSTREAM_ENVELOPE_INVALID",
            Self::UpstreamContentEmpty { .. } => "UPSTREAM_CONTENT_EMPTY",
            Self::UpstreamNotJson { .. } => "UPSTREAM_NOT_JSON",
            Self::Persistence(_) => "PERSISTENCE_FAILURE",
        }
    }

    /// Caller errors (4xx class) as opposed to upstream or storage failures.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InputMissing(_)
                | Self::DocumentNotFound { .. }
                | Self::MissingTranscript { .. }
                | Self::MissingAnalysisOrTranscript { .. }
        )
    }
}

impl From<InferenceError> for PipelineError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Transport(msg) => Self::UpstreamTransport(msg),
            InferenceError::EnvelopeInvalid { preview } => Self::UpstreamEnvelopeInvalid { preview },
            InferenceError::ContentEmpty { preview } => Self::UpstreamContentEmpty { preview },
            InferenceError::NotJson { preview } => Self::UpstreamNotJson { preview },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_errors_map_onto_upstream_variants() {
        let err: PipelineError = InferenceError::NotJson { preview: "abc".into() }.into();
        assert!(matches!(err, PipelineError::UpstreamNotJson { ref preview } if preview == "abc"));
        assert_eq!(err.code(), "UPSTREAM_NOT_JSON");
        assert!(!err.is_client_error());

        let err: PipelineError = InferenceError::Transport("refused".into()).into();
        assert_eq!(err.code(), "UPSTREAM_TRANSPORT");
    }

    #[test]
    fn not_found_lists_attempted_paths() {
        let err = PipelineError::DocumentNotFound {
            attempted: vec!["patients/p/exams/e".into(), "clinics/c/patients/p/exams/e".into()],
        };
        assert!(err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Document not found (attempted: patients/p/exams/e, clinics/c/patients/p/exams/e)"
        );
    }
}
