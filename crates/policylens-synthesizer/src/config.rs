//! Configuration for the Answer Synthesizer

use policylens_domain::GenerationOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Answer Synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Sampling temperature
    pub temperature: f64,

    /// Nucleus sampling cutoff
    pub top_p: f64,

    /// Top-k sampling cutoff
    pub top_k: u32,

    /// Maximum tokens in the answer
    pub max_tokens: u32,

    /// Contexts shorter than this (in characters) skip the model call
    pub min_context_chars: usize,

    /// Maximum time for the generation call (seconds)
    pub synthesis_timeout_secs: u64,

    /// Returned when there is no usable context
    pub no_context_answer: String,

    /// Returned when the model answers with nothing
    pub empty_answer: String,
}

impl SynthesizerConfig {
    /// Decoding options for the generation call
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            top_p: Some(self.top_p),
            top_k: Some(self.top_k),
            max_tokens: Some(self.max_tokens),
        }
    }

    /// Get the synthesis timeout as a Duration
    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be within [0, 2]".to_string());
        }
        if !(0.0..=1.0).contains(&self.top_p) || self.top_p == 0.0 {
            return Err("top_p must be within (0, 1]".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if self.synthesis_timeout_secs == 0 {
            return Err("synthesis_timeout_secs must be greater than 0".to_string());
        }
        if self.no_context_answer.trim().is_empty() || self.empty_answer.trim().is_empty() {
            return Err("fallback answers must not be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.9,
            top_k: 40,
            max_tokens: 500,
            min_context_chars: 10,
            synthesis_timeout_secs: 300,
            no_context_answer: "Sorry, no information relevant to your question was found in \
                                the policy knowledge base. Please try different keywords or a \
                                more specific question."
                .to_string(),
            empty_answer: "Sorry, the question cannot be answered from the available information."
                .to_string(),
        }
    }
}
