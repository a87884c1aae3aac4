//! Trust engine configuration
//!
//! Everything the engine reads at scoring time lives here and is injected at
//! construction; nothing is looked up from process state.

use crate::dimensions::names;
use crate::strategy::ScoringScheme;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Weights of the entity-aware scheme
///
/// The hallucination weight is negative: a high hallucination rate is a penalty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityAwareWeights {
    /// Weight of entity coverage
    pub entity_coverage: f64,
    /// Weight of faithfulness
    pub faithfulness: f64,
    /// Weight of relevancy
    pub relevancy: f64,
    /// Weight of sufficiency
    pub sufficiency: f64,
    /// Weight of the hallucination rate
    pub hallucination: f64,
}

impl Default for EntityAwareWeights {
    fn default() -> Self {
        Self {
            entity_coverage: 0.30,
            faithfulness: 0.25,
            relevancy: 0.15,
            sufficiency: 0.15,
            hallucination: -0.15,
        }
    }
}

/// Weights of the graph-verified scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphVerifiedWeights {
    /// Weight of entity consistency
    pub entity_consistency: f64,
    /// Weight of relation verification
    pub relation_verification: f64,
    /// Weight of content overlap
    pub content_overlap: f64,
    /// Weight of semantic coherence
    pub semantic_coherence: f64,
}

impl Default for GraphVerifiedWeights {
    fn default() -> Self {
        Self {
            entity_consistency: 0.4,
            relation_verification: 0.3,
            content_overlap: 0.2,
            semantic_coherence: 0.1,
        }
    }
}

/// Per-dimension thresholds
///
/// A dimension is deficient below its threshold, except hallucination, which
/// is deficient above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum entity coverage
    pub entity_coverage: f64,
    /// Minimum faithfulness
    pub faithfulness: f64,
    /// Minimum relevancy
    pub relevancy: f64,
    /// Minimum sufficiency
    pub sufficiency: f64,
    /// Maximum hallucination rate
    pub hallucination: f64,
    /// Minimum entity consistency
    pub entity_consistency: f64,
    /// Minimum relation verification
    pub relation_verification: f64,
    /// Minimum content overlap
    pub content_overlap: f64,
    /// Minimum semantic coherence
    pub semantic_coherence: f64,
    /// Minimum overall score
    pub overall: f64,
}

impl Thresholds {
    /// Threshold for a named dimension
    pub fn for_dimension(&self, name: &str) -> Option<f64> {
        match name {
            names::ENTITY_COVERAGE => Some(self.entity_coverage),
            names::FAITHFULNESS => Some(self.faithfulness),
            names::RELEVANCY => Some(self.relevancy),
            names::SUFFICIENCY => Some(self.sufficiency),
            names::HALLUCINATION => Some(self.hallucination),
            names::ENTITY_CONSISTENCY => Some(self.entity_consistency),
            names::RELATION_VERIFICATION => Some(self.relation_verification),
            names::CONTENT_OVERLAP => Some(self.content_overlap),
            names::SEMANTIC_COHERENCE => Some(self.semantic_coherence),
            _ => None,
        }
    }

    /// Whether a value is on the wrong side of its dimension's threshold
    pub fn is_deficient(&self, name: &str, value: f64) -> bool {
        match self.for_dimension(name) {
            Some(threshold) if name == names::HALLUCINATION => value > threshold,
            Some(threshold) => value < threshold,
            None => false,
        }
    }

    fn all(&self) -> [f64; 10] {
        [
            self.entity_coverage,
            self.faithfulness,
            self.relevancy,
            self.sufficiency,
            self.hallucination,
            self.entity_consistency,
            self.relation_verification,
            self.content_overlap,
            self.semantic_coherence,
            self.overall,
        ]
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            entity_coverage: 0.8,
            faithfulness: 0.7,
            relevancy: 0.7,
            sufficiency: 0.8,
            hallucination: 0.2,
            entity_consistency: 0.5,
            relation_verification: 0.4,
            content_overlap: 0.3,
            semantic_coherence: 0.4,
            overall: 0.7,
        }
    }
}

/// Cut points mapping the overall score onto quality levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityCutPoints {
    /// Lowest excellent score
    pub excellent: f64,
    /// Lowest good score
    pub good: f64,
    /// Lowest fair score
    pub fair: f64,
}

impl Default for QualityCutPoints {
    fn default() -> Self {
        Self {
            excellent: 0.8,
            good: 0.7,
            fair: 0.6,
        }
    }
}

/// Configuration for the Trust Engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Dimension scheme used for scoring
    pub scheme: ScoringScheme,

    /// Weights of the entity-aware scheme
    pub entity_aware_weights: EntityAwareWeights,

    /// Weights of the graph-verified scheme
    pub graph_verified_weights: GraphVerifiedWeights,

    /// Per-dimension thresholds
    pub thresholds: Thresholds,

    /// Quality level cut points
    pub quality: QualityCutPoints,

    /// Wall-clock budget for entity extraction plus all dimensions (milliseconds)
    pub budget_ms: u64,

    /// Texts are truncated to this many characters before extraction and embedding
    pub max_text_length: usize,

    /// Characters of context and answer shown to the faithfulness judge
    pub judge_chars: usize,

    /// Passages joined into the context used for extraction and judging
    pub context_passages: usize,

    /// Dimension scorers running at once
    pub parallel_workers: usize,
}

impl TrustConfig {
    /// Get the wall-clock budget as a Duration
    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.budget_ms)
    }

    /// Combination weight of a named dimension; unknown dimensions weigh nothing
    pub fn weight(&self, name: &str) -> f64 {
        let ea = &self.entity_aware_weights;
        let gv = &self.graph_verified_weights;
        match name {
            names::ENTITY_COVERAGE => ea.entity_coverage,
            names::FAITHFULNESS => ea.faithfulness,
            names::RELEVANCY => ea.relevancy,
            names::SUFFICIENCY => ea.sufficiency,
            names::HALLUCINATION => ea.hallucination,
            names::ENTITY_CONSISTENCY => gv.entity_consistency,
            names::RELATION_VERIFICATION => gv.relation_verification,
            names::CONTENT_OVERLAP => gv.content_overlap,
            names::SEMANTIC_COHERENCE => gv.semantic_coherence,
            _ => 0.0,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            self.entity_aware_weights.entity_coverage,
            self.entity_aware_weights.faithfulness,
            self.entity_aware_weights.relevancy,
            self.entity_aware_weights.sufficiency,
            self.entity_aware_weights.hallucination,
            self.graph_verified_weights.entity_consistency,
            self.graph_verified_weights.relation_verification,
            self.graph_verified_weights.content_overlap,
            self.graph_verified_weights.semantic_coherence,
        ];
        if weights.iter().any(|w| !w.is_finite()) {
            return Err("weights must be finite".to_string());
        }
        if self.thresholds.all().iter().any(|t| !(0.0..=1.0).contains(t)) {
            return Err("thresholds must be within [0, 1]".to_string());
        }
        let q = &self.quality;
        if !(0.0..=1.0).contains(&q.excellent) || !(q.excellent >= q.good && q.good >= q.fair && q.fair >= 0.0) {
            return Err("quality cut points must satisfy 1 >= excellent >= good >= fair >= 0".to_string());
        }
        if self.budget_ms == 0 {
            return Err("budget_ms must be greater than 0".to_string());
        }
        if self.max_text_length == 0 || self.judge_chars == 0 {
            return Err("max_text_length and judge_chars must be greater than 0".to_string());
        }
        if self.context_passages == 0 {
            return Err("context_passages must be greater than 0".to_string());
        }
        if self.parallel_workers == 0 {
            return Err("parallel_workers must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Strict preset: higher thresholds and cut points
    pub fn strict() -> Self {
        Self {
            thresholds: Thresholds {
                entity_coverage: 0.9,
                faithfulness: 0.8,
                relevancy: 0.8,
                sufficiency: 0.9,
                hallucination: 0.1,
                overall: 0.8,
                ..Thresholds::default()
            },
            quality: QualityCutPoints {
                excellent: 0.85,
                good: 0.75,
                fair: 0.65,
            },
            ..Self::default()
        }
    }

    /// Lenient preset: lower thresholds and a longer budget
    pub fn lenient() -> Self {
        Self {
            thresholds: Thresholds {
                entity_coverage: 0.6,
                faithfulness: 0.5,
                relevancy: 0.5,
                sufficiency: 0.6,
                hallucination: 0.4,
                overall: 0.5,
                ..Thresholds::default()
            },
            budget_ms: 15_000,
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

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            scheme: ScoringScheme::default(),
            entity_aware_weights: EntityAwareWeights::default(),
            graph_verified_weights: GraphVerifiedWeights::default(),
            thresholds: Thresholds::default(),
            quality: QualityCutPoints::default(),
            budget_ms: 5000,
            max_text_length: 1000,
            judge_chars: 500,
            context_passages: 3,
            parallel_workers: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(TrustConfig::default().validate().is_ok());
        assert!(TrustConfig::strict().validate().is_ok());
        assert!(TrustConfig::lenient().validate().is_ok());
        assert_eq!(TrustConfig::default().budget(), Duration::from_secs(5));
    }

    #[test]
    fn test_hallucination_deficient_above_threshold() {
        let thresholds = Thresholds::default();
        assert!(thresholds.is_deficient(names::HALLUCINATION, 0.3));
        assert!(!thresholds.is_deficient(names::HALLUCINATION, 0.1));
        assert!(thresholds.is_deficient(names::ENTITY_COVERAGE, 0.5));
        assert!(!thresholds.is_deficient("unknown", 0.0));
    }

    #[test]
    fn test_weights_by_name() {
        let config = TrustConfig::default();
        assert_eq!(config.weight(names::ENTITY_COVERAGE), 0.30);
        assert_eq!(config.weight(names::HALLUCINATION), -0.15);
        assert_eq!(config.weight(names::ENTITY_CONSISTENCY), 0.4);
        assert_eq!(config.weight("unknown"), 0.0);
    }

    #[test]
    fn test_invalid_cut_points() {
        let config = TrustConfig {
            quality: QualityCutPoints {
                excellent: 0.5,
                good: 0.7,
                fair: 0.6,
            },
            ..TrustConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_scheme_selection() {
        let config = TrustConfig::from_toml("scheme = \"graph_verified\"\nbudget_ms = 2000").unwrap();
        assert_eq!(config.scheme, ScoringScheme::GraphVerified);
        assert_eq!(config.budget_ms, 2000);
        assert_eq!(config.thresholds, Thresholds::default());

        let parsed = TrustConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
