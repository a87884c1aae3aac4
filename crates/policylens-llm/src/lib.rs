//! PolicyLens Model Service Layer
//!
//! Implementations of the `LlmProvider` and `EmbeddingModel` traits from
//! `policylens-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: scripted, deterministic text generation for tests
//! - `OllamaProvider`: text generation against an Ollama server
//! - `OllamaEmbeddingModel`: embeddings from an Ollama server
//! - `MockEmbeddingModel`: hash-based deterministic embeddings
//!
//! # Examples
//!
//! ```
//! use policylens_llm::MockProvider;
//! use policylens_domain::{GenerationOptions, LlmProvider};
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt", &GenerationOptions::default()).unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod embedding;
pub mod ollama;

use policylens_domain::{GenerationOptions, LlmProvider};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use config::OllamaConfig;
pub use embedding::{cosine_similarity, MockEmbeddingModel};
pub use ollama::{OllamaEmbeddingModel, OllamaProvider};

/// Errors that can occur during model service operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Request did not complete in time
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether the backend could not be reached or answered with a failure
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, Self::InvalidResponse(_))
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail,
}

/// Mock LLM provider for deterministic testing
///
/// Replies are chosen by the first rule whose pattern occurs in the prompt,
/// falling back to the default response. Clones share rules, recorded
/// prompts, and the call counter.
///
/// # Examples
///
/// ```
/// use policylens_llm::MockProvider;
/// use policylens_domain::{GenerationOptions, LlmProvider};
///
/// let options = GenerationOptions::default();
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt", &options).unwrap(), "Fixed response");
///
/// // Responses keyed by prompt substring
/// let mut provider = MockProvider::default();
/// provider.add_response("capital", "Paris");
/// assert_eq!(provider.generate("What is the capital?", &options).unwrap(), "Paris");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            delay: None,
        }
    }

    /// Sleep this long before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Reply with `response` whenever the prompt contains `pattern`
    pub fn add_response(&mut self, pattern: impl Into<String>, response: impl Into<String>) {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((pattern.into(), MockReply::Text(response.into())));
    }

    /// Fail whenever the prompt contains `pattern`
    pub fn add_error(&mut self, pattern: impl Into<String>) {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((pattern.into(), MockReply::Fail));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset the call count and recorded prompts
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner) = 0;
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Every prompt received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str, _options: &GenerationOptions) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let rules = self.rules.lock().unwrap_or_else(PoisonError::into_inner);
        let reply = rules
            .iter()
            .find(|(pattern, _)| prompt.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail) => Err(LlmError::Communication("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}
