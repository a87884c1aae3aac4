//! Configuration for the Ollama model service

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default generation model
pub const DEFAULT_MODEL: &str = "llama3.2:latest";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "bge-m3:latest";

/// Configuration for the Ollama clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    pub endpoint: String,

    /// Model used for text generation
    pub model: String,

    /// Model used for embeddings
    pub embedding_model: String,

    /// Dimensionality of the embedding model's vectors
    pub embedding_dimension: usize,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Attempts per request before giving up
    pub max_retries: u32,
}

impl OllamaConfig {
    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Copy whose requests fit inside `budget`: one attempt, timeout capped
    /// at the budget rounded up to whole seconds
    pub fn bounded_by(&self, budget: Duration) -> Self {
        let budget_secs = budget.as_millis().div_ceil(1000).max(1) as u64;
        Self {
            request_timeout_secs: self.request_timeout_secs.min(budget_secs),
            max_retries: 1,
            ..self.clone()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(format!("endpoint must be an http(s) URL, got '{}'", self.endpoint));
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.embedding_model.trim().is_empty() {
            return Err("embedding_model must not be empty".to_string());
        }
        if self.embedding_dimension == 0 {
            return Err("embedding_dimension must be greater than 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".to_string());
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

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: 1024,
            request_timeout_secs: 120,
            max_retries: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(OllamaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = OllamaConfig {
            endpoint: "localhost:11434".to_string(),
            ..OllamaConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bounded_by_budget() {
        let bounded = OllamaConfig::default().bounded_by(Duration::from_millis(4500));
        assert_eq!(bounded.request_timeout_secs, 5);
        assert_eq!(bounded.max_retries, 1);
        assert_eq!(bounded.model, DEFAULT_MODEL);
        assert!(bounded.validate().is_ok());

        let tiny = OllamaConfig::default().bounded_by(Duration::from_millis(10));
        assert_eq!(tiny.request_timeout_secs, 1);

        let short = OllamaConfig {
            request_timeout_secs: 2,
            ..OllamaConfig::default()
        };
        assert_eq!(short.bounded_by(Duration::from_secs(30)).request_timeout_secs, 2);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = OllamaConfig::from_toml("model = \"qwen2.5:7b\"").unwrap();
        assert_eq!(config.model, "qwen2.5:7b");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = OllamaConfig::default();
        let parsed = OllamaConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
