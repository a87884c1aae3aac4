//! Scoring schemes
//!
//! A scheme decides which dimensions are scored, which are derived from
//! others, and how the results are combined into one verdict. Two schemes
//! share the same [`DimensionScorer`] machinery:
//!
//! - **entity_aware**: entity coverage, faithfulness, relevancy, sufficiency,
//!   and the hallucination rate derived from faithfulness
//! - **graph_verified**: entity consistency, relation verification, content
//!   overlap, and semantic coherence

use crate::config::TrustConfig;
use crate::dimensions::{
    hallucination_from, names, ContentOverlapScorer, DimensionScorer, EntityConsistencyScorer,
    EntityCoverageScorer, FaithfulnessScorer, RelationVerificationScorer, RelevancyScorer,
    SemanticCoherenceScorer, SufficiencyScorer,
};
use policylens_domain::{
    clamp_unit, DimensionScore, EmbeddingModel, GraphStore, LlmProvider, QualityLevel, RiskLevel,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;

/// Maximum dimension messages carried into the diagnosis
const MAX_DIAGNOSIS_ISSUES: usize = 5;

const ENTITY_AWARE_DIMENSIONS: &[&str] = &[
    names::ENTITY_COVERAGE,
    names::FAITHFULNESS,
    names::RELEVANCY,
    names::SUFFICIENCY,
    names::HALLUCINATION,
];

const GRAPH_VERIFIED_DIMENSIONS: &[&str] = &[
    names::ENTITY_CONSISTENCY,
    names::RELATION_VERIFICATION,
    names::CONTENT_OVERLAP,
    names::SEMANTIC_COHERENCE,
];

/// Which dimension set scores an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringScheme {
    /// Entity coverage, faithfulness, relevancy, sufficiency, hallucination
    #[default]
    EntityAware,
    /// Entity consistency, relation verification, content overlap, coherence
    GraphVerified,
}

/// Combined result of one scheme's dimension scores
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// Weighted sum of dimension values, clamped to [0, 1]
    pub overall_score: f64,
    /// Step function of the overall score
    pub quality_level: QualityLevel,
    /// Risk of unsupported content
    pub risk_level: RiskLevel,
    /// One line per deficient dimension, plus overall warnings
    pub warnings: Vec<String>,
    /// Overall verdict followed by dimension messages
    pub diagnosis: String,
}

impl ScoringScheme {
    /// Lowercase label, as used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntityAware => "entity_aware",
            Self::GraphVerified => "graph_verified",
        }
    }

    /// Every dimension this scheme reports, in combination order
    pub fn dimensions(&self) -> &'static [&'static str] {
        match self {
            Self::EntityAware => ENTITY_AWARE_DIMENSIONS,
            Self::GraphVerified => GRAPH_VERIFIED_DIMENSIONS,
        }
    }

    /// Build the independent scorers of this scheme
    ///
    /// Derived dimensions are not included; see [`ScoringScheme::derive`].
    pub fn scorers<L, E, G>(
        &self,
        config: &TrustConfig,
        llm: &Arc<L>,
        embedder: &Arc<E>,
        graph: &Arc<G>,
    ) -> Vec<Arc<dyn DimensionScorer>>
    where
        L: LlmProvider + Send + Sync + 'static,
        L::Error: Display,
        E: EmbeddingModel + Send + Sync + 'static,
        E::Error: Display,
        G: GraphStore + Send + Sync + 'static,
        G::Error: Display,
    {
        let t = &config.thresholds;
        let mut scorers: Vec<Arc<dyn DimensionScorer>> = Vec::new();
        match self {
            Self::EntityAware => {
                scorers.push(Arc::new(EntityCoverageScorer::new(t.entity_coverage)));
                scorers.push(Arc::new(FaithfulnessScorer::new(
                    Arc::clone(llm),
                    t.faithfulness,
                    config.judge_chars,
                )));
                scorers.push(Arc::new(RelevancyScorer::new(
                    Arc::clone(embedder),
                    t.relevancy,
                    config.max_text_length,
                )));
                scorers.push(Arc::new(SufficiencyScorer::new(t.sufficiency)));
            }
            Self::GraphVerified => {
                scorers.push(Arc::new(EntityConsistencyScorer::new(t.entity_consistency)));
                scorers.push(Arc::new(RelationVerificationScorer::new(
                    Arc::clone(graph),
                    t.relation_verification,
                )));
                scorers.push(Arc::new(ContentOverlapScorer::new(t.content_overlap)));
                scorers.push(Arc::new(SemanticCoherenceScorer::new(t.semantic_coherence)));
            }
        }
        scorers
    }

    /// Add the dimensions computed from other dimensions' results
    pub fn derive(&self, scores: &mut BTreeMap<String, DimensionScore>, config: &TrustConfig) {
        if let Self::EntityAware = self {
            if let Some(faithfulness) = scores.get(names::FAITHFULNESS) {
                let hallucination = hallucination_from(faithfulness, config.thresholds.hallucination);
                scores.insert(names::HALLUCINATION.to_string(), hallucination);
            }
        }
    }

    /// Combine dimension scores into the overall verdict
    ///
    /// Dimensions missing from `scores` contribute nothing.
    pub fn combine(&self, scores: &BTreeMap<String, DimensionScore>, config: &TrustConfig) -> Verdict {
        let present: Vec<&DimensionScore> = self
            .dimensions()
            .iter()
            .filter_map(|name| scores.get(*name))
            .collect();

        let weighted: f64 = present.iter().map(|s| config.weight(&s.name) * s.value).sum();
        let overall_score = clamp_unit(weighted);

        let (quality_level, description) = quality_for(overall_score, config);
        let risk_level = match scores.get(names::HALLUCINATION) {
            Some(hallucination) => RiskLevel::from_hallucination_rate(hallucination.value),
            None => RiskLevel::from_overall_score(overall_score),
        };

        let deficient: Vec<&DimensionScore> = present
            .iter()
            .copied()
            .filter(|s| config.thresholds.is_deficient(&s.name, s.value))
            .collect();

        let mut warnings: Vec<String> = deficient
            .iter()
            .filter_map(|s| warning_for(&s.name))
            .map(str::to_string)
            .collect();
        if overall_score < config.thresholds.overall {
            warnings.push("Consider regenerating the answer or refining the retrieval strategy".to_string());
        }
        if !present.is_empty() && deficient.len() == present.len() {
            warnings.push("Low overall confidence, treat this answer with caution".to_string());
        }

        let mut diagnosis = format!(
            "Overall score: {:.3} ({}) - {}",
            overall_score, quality_level, description
        );
        let issues: Vec<&str> = deficient
            .iter()
            .flat_map(|s| s.diagnosis.iter().map(String::as_str))
            .take(MAX_DIAGNOSIS_ISSUES)
            .collect();
        if !issues.is_empty() {
            diagnosis.push_str(" | Issues found: ");
            diagnosis.push_str(&issues.join("; "));
        }

        Verdict {
            overall_score,
            quality_level,
            risk_level,
            warnings,
            diagnosis,
        }
    }
}

impl fmt::Display for ScoringScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "entity_aware" => Ok(Self::EntityAware),
            "graph_verified" => Ok(Self::GraphVerified),
            other => Err(format!("Unknown scoring scheme: {}", other)),
        }
    }
}

fn quality_for(score: f64, config: &TrustConfig) -> (QualityLevel, &'static str) {
    let cuts = &config.quality;
    if score >= cuts.excellent {
        (QualityLevel::Excellent, "High-quality answer, ready to use")
    } else if score >= cuts.good {
        (QualityLevel::Good, "Good answer, review before use")
    } else if score >= cuts.fair {
        (QualityLevel::Fair, "Fair answer, needs improvement")
    } else {
        (QualityLevel::Poor, "Poor answer, consider regenerating")
    }
}

fn warning_for(dimension: &str) -> Option<&'static str> {
    let warning = match dimension {
        names::ENTITY_COVERAGE => "The answer leaves out key entities of the question",
        names::FAITHFULNESS => "The answer may not be supported by the retrieved context",
        names::RELEVANCY => "The answer may not address the question",
        names::SUFFICIENCY => "The retrieved context may not cover the question",
        names::HALLUCINATION => "The answer may contain hallucinated content",
        names::ENTITY_CONSISTENCY => "The answer contains entities not verified by the knowledge graph",
        names::RELATION_VERIFICATION => "Relations described in the answer may be inaccurate",
        names::CONTENT_OVERLAP => "The answer has little in common with the retrieved documents",
        names::SEMANTIC_COHERENCE => "The logical coherence of the answer could be improved",
        _ => return None,
    };
    Some(warning)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[(&str, f64)]) -> BTreeMap<String, DimensionScore> {
        values
            .iter()
            .map(|(name, value)| (name.to_string(), DimensionScore::new(*name, *value)))
            .collect()
    }

    #[test]
    fn test_perfect_entity_aware_scores() {
        let config = TrustConfig::default();
        let verdict = ScoringScheme::EntityAware.combine(
            &scores(&[
                (names::ENTITY_COVERAGE, 1.0),
                (names::FAITHFULNESS, 1.0),
                (names::RELEVANCY, 1.0),
                (names::SUFFICIENCY, 1.0),
                (names::HALLUCINATION, 0.0),
            ]),
            &config,
        );
        assert!((verdict.overall_score - 0.85).abs() < 1e-9);
        assert_eq!(verdict.quality_level, QualityLevel::Excellent);
        assert_eq!(verdict.risk_level, RiskLevel::Low);
        assert!(verdict.warnings.is_empty());
        assert_eq!(
            verdict.diagnosis,
            "Overall score: 0.850 (excellent) - High-quality answer, ready to use"
        );
    }

    #[test]
    fn test_graph_verified_risk_from_overall() {
        let config = TrustConfig::default();
        let verdict = ScoringScheme::GraphVerified.combine(
            &scores(&[
                (names::ENTITY_CONSISTENCY, 0.5),
                (names::RELATION_VERIFICATION, 0.5),
                (names::CONTENT_OVERLAP, 0.3),
                (names::SEMANTIC_COHERENCE, 0.4),
            ]),
            &config,
        );
        // 0.2 + 0.15 + 0.06 + 0.04
        assert!((verdict.overall_score - 0.45).abs() < 1e-9);
        assert_eq!(verdict.risk_level, RiskLevel::High);
        assert_eq!(verdict.quality_level, QualityLevel::Poor);
    }

    #[test]
    fn test_all_deficient_adds_blanket_warning() {
        let config = TrustConfig::default();
        let mut input = scores(&[
            (names::ENTITY_CONSISTENCY, 0.1),
            (names::RELATION_VERIFICATION, 0.1),
            (names::CONTENT_OVERLAP, 0.1),
            (names::SEMANTIC_COHERENCE, 0.1),
        ]);
        for score in input.values_mut() {
            score.diagnosis.push(format!("{} is low", score.name));
        }
        let verdict = ScoringScheme::GraphVerified.combine(&input, &config);
        // four dimension warnings, the overall recommendation, the blanket warning
        assert_eq!(verdict.warnings.len(), 6);
        assert!(verdict.warnings.last().is_some_and(|w| w.starts_with("Low overall confidence")));
        assert!(verdict.diagnosis.contains(" | Issues found: entity_consistency is low; "));
    }

    #[test]
    fn test_diagnosis_caps_issues() {
        let config = TrustConfig::default();
        let mut input = scores(&[(names::ENTITY_COVERAGE, 0.0), (names::SUFFICIENCY, 0.0)]);
        for score in input.values_mut() {
            for i in 0..4 {
                score.diagnosis.push(format!("issue {i}"));
            }
        }
        let verdict = ScoringScheme::EntityAware.combine(&input, &config);
        let issues = verdict.diagnosis.split(" | Issues found: ").nth(1).unwrap_or_default();
        assert_eq!(issues.split("; ").count(), 5);
    }

    #[test]
    fn test_derive_adds_hallucination() {
        let config = TrustConfig::default();
        let mut input = scores(&[(names::FAITHFULNESS, 0.9)]);
        ScoringScheme::EntityAware.derive(&mut input, &config);
        assert!((input[names::HALLUCINATION].value - 0.1).abs() < 1e-9);

        let mut graph_input = scores(&[(names::FAITHFULNESS, 0.9)]);
        ScoringScheme::GraphVerified.derive(&mut graph_input, &config);
        assert!(!graph_input.contains_key(names::HALLUCINATION));
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("graph-verified".parse::<ScoringScheme>(), Ok(ScoringScheme::GraphVerified));
        assert_eq!("Entity_Aware".parse::<ScoringScheme>(), Ok(ScoringScheme::EntityAware));
        assert!("other".parse::<ScoringScheme>().is_err());
    }
}
