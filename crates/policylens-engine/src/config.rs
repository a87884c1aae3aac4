//! Aggregated configuration for the whole pipeline

use crate::error::EngineError;
use policylens_extractor::ExtractorConfig;
use policylens_llm::OllamaConfig;
use policylens_retrieval::RetrievalConfig;
use policylens_synthesizer::SynthesizerConfig;
use policylens_trust::TrustConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One section per component, each optional in the TOML file
///
/// ```toml
/// [llm]
/// model = "qwen2.5:7b"
///
/// [trust]
/// scheme = "graph_verified"
/// budget_ms = 8000
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyLensConfig {
    /// Model service
    pub llm: OllamaConfig,

    /// Entity extraction
    pub extractor: ExtractorConfig,

    /// Retrieval and context fusion
    pub retrieval: RetrievalConfig,

    /// Answer synthesis
    pub synthesizer: SynthesizerConfig,

    /// Trust scoring
    pub trust: TrustConfig,
}

impl PolicyLensConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        self.llm.validate().map_err(|e| format!("[llm] {}", e))?;
        self.extractor
            .validate()
            .map_err(|e| format!("[extractor] {}", e))?;
        self.retrieval
            .validate()
            .map_err(|e| format!("[retrieval] {}", e))?;
        self.synthesizer
            .validate()
            .map_err(|e| format!("[synthesizer] {}", e))?;
        self.trust.validate().map_err(|e| format!("[trust] {}", e))?;
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

    /// Read and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&contents).map_err(EngineError::Config)?;
        config.validate().map_err(EngineError::Config)?;
        Ok(config)
    }

    /// Write the configuration, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = self.to_toml().map_err(EngineError::Config)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policylens_trust::ScoringScheme;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PolicyLensConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = PolicyLensConfig::from_toml(
            r#"
            [llm]
            model = "qwen2.5:7b"

            [trust]
            scheme = "graph_verified"
            budget_ms = 8000

            [retrieval]
            max_hops = "three"
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "qwen2.5:7b");
        assert_eq!(config.llm.endpoint, OllamaConfig::default().endpoint);
        assert_eq!(config.trust.scheme, ScoringScheme::GraphVerified);
        assert_eq!(config.trust.budget_ms, 8000);
        assert_eq!(config.retrieval.max_hops.get(), 2);
        assert_eq!(config.synthesizer, SynthesizerConfig::default());
    }

    #[test]
    fn test_invalid_section_is_named() {
        let mut config = PolicyLensConfig::default();
        config.trust.parallel_workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("[trust]"), "{err}");
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = PolicyLensConfig::default();
        config.trust = TrustConfig::strict();
        let parsed = PolicyLensConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = PolicyLensConfig::default();
        config.retrieval.top_k = 3;
        config.save(&path).unwrap();

        let loaded = PolicyLensConfig::load(&path).unwrap();
        assert_eq!(loaded.retrieval.top_k, 3);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PolicyLensConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
