//! Error types for the question-answering pipeline

use policylens_synthesizer::SynthesisError;
use thiserror::Error;

/// Pipeline errors surfaced to the caller
///
/// Extraction, retrieval, and scoring degrade instead of failing, so in
/// practice only synthesis, input validation, and configuration loading
/// produce these.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A model or retrieval backend could not be reached or failed
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A model response could not be parsed
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    /// A stage ran out of time
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Malformed input
    #[error("Validation failure: {0}")]
    ValidationFailure(String),

    /// Configuration could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<SynthesisError> for EngineError {
    fn from(e: SynthesisError) -> Self {
        match e {
            SynthesisError::ServiceUnavailable(msg) => EngineError::ServiceUnavailable(msg),
            SynthesisError::Validation(msg) => EngineError::ValidationFailure(msg),
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Config(format!("I/O error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_errors_keep_their_category() {
        let unavailable: EngineError = SynthesisError::ServiceUnavailable("refused".into()).into();
        assert!(matches!(unavailable, EngineError::ServiceUnavailable(ref m) if m == "refused"));

        let invalid: EngineError = SynthesisError::Validation("empty question".into()).into();
        assert!(matches!(invalid, EngineError::ValidationFailure(_)));
        assert_eq!(invalid.to_string(), "Validation failure: empty question");
    }
}
