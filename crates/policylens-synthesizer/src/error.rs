//! Synthesizer error types

use thiserror::Error;

/// Errors that can occur during answer synthesis
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The model service failed, timed out, or could not be reached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Malformed input
    #[error("Validation error: {0}")]
    Validation(String),
}
