//! Trust engine error types
//!
//! These never escape [`crate::TrustEngine::assess`]; they are turned into
//! terminal assessments at the engine boundary.

use thiserror::Error;

/// Errors raised while scoring
#[derive(Error, Debug)]
pub enum TrustError {
    /// The wall-clock budget ran out
    #[error("Scoring exceeded its budget of {budget_ms} ms")]
    Timeout {
        /// Budget in milliseconds
        budget_ms: u64,
    },

    /// A scorer panicked or a worker could not be joined
    #[error("Internal error: {0}")]
    Internal(String),
}
