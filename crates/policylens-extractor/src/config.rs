//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Input is truncated to this many characters before prompting
    pub max_text_length: usize,

    /// Maximum entities returned per call
    pub max_entities: usize,

    /// Entities with names this short (in characters) or shorter are dropped
    pub min_name_chars: usize,

    /// Entities below this confidence are dropped
    pub confidence_threshold: f64,

    /// Confidence given to entities the model reports without one
    pub default_confidence: f64,

    /// Sampling temperature for extraction calls
    pub temperature: f64,

    /// Maximum time for a single extraction call (seconds)
    pub extraction_timeout_secs: u64,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.max_entities == 0 {
            return Err("max_entities must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err("confidence_threshold must be within [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.default_confidence) {
            return Err("default_confidence must be within [0, 1]".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be within [0, 2]".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_text_length: 1000,
            max_entities: 20,
            min_name_chars: 1,
            confidence_threshold: 0.4,
            default_confidence: 0.5,
            temperature: 0.2,
            extraction_timeout_secs: 60,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: shorter inputs, fewer entities, stricter confidence
    pub fn aggressive() -> Self {
        Self {
            max_text_length: 500,
            max_entities: 10,
            confidence_threshold: 0.6,
            extraction_timeout_secs: 20,
            ..Self::default()
        }
    }

    /// Lenient preset: longer inputs, more entities, anything the model reports
    pub fn lenient() -> Self {
        Self {
            max_text_length: 4000,
            max_entities: 40,
            confidence_threshold: 0.0,
            extraction_timeout_secs: 180,
            ..Self::default()
        }
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
