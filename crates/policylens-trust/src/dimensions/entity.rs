//! Entity-set dimensions: coverage, sufficiency, consistency

use super::{names, ratio_or, DimensionScorer, ScoringInput};
use policylens_domain::DimensionScore;

fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("'{i}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fraction of question entities the answer mentions
#[derive(Debug, Clone)]
pub struct EntityCoverageScorer {
    threshold: f64,
}

impl EntityCoverageScorer {
    /// Scorer flagging coverage below `threshold`
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl DimensionScorer for EntityCoverageScorer {
    fn name(&self) -> &'static str {
        names::ENTITY_COVERAGE
    }

    fn score(&self, input: &ScoringInput) -> DimensionScore {
        let question = &input.question_entities;
        let covered = question.intersection(&input.answer_entities).count();
        let value = ratio_or(covered, question.len(), 1.0);

        let mut score = DimensionScore::new(names::ENTITY_COVERAGE, value);
        if value < self.threshold {
            let missing: Vec<String> = question
                .difference(&input.answer_entities)
                .map(|e| e.name().to_string())
                .collect();
            score = score
                .with_note(format!(
                    "Insufficient entity coverage, missing key entities: [{}]",
                    quoted_list(&missing)
                ))
                .with_note("Suggestion: add the missing policy entities to the answer");
        }
        score
    }
}

/// Fraction of question entities present in the retrieved context
#[derive(Debug, Clone)]
pub struct SufficiencyScorer {
    threshold: f64,
}

impl SufficiencyScorer {
    /// Scorer flagging sufficiency below `threshold`
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl DimensionScorer for SufficiencyScorer {
    fn name(&self) -> &'static str {
        names::SUFFICIENCY
    }

    fn score(&self, input: &ScoringInput) -> DimensionScore {
        let question = &input.question_entities;
        let covered = question.intersection(&input.context_entities).count();
        let value = ratio_or(covered, question.len(), 1.0);

        let mut score = DimensionScore::new(names::SUFFICIENCY, value);
        if value < self.threshold {
            let uncovered: Vec<String> = question
                .difference(&input.context_entities)
                .map(|e| e.name().to_string())
                .collect();
            score = score
                .with_note("Context coverage is insufficient, relevant information is missing")
                .with_note(format!(
                    "Suggestion: retrieve more information about [{}]",
                    quoted_list(&uncovered)
                ));
        }
        score
    }
}

/// Share of answer entities the graph knows, with partial credit for near matches
///
/// An exact normalized match counts 1. Otherwise an entity longer than two
/// characters that contains, or is contained in, a graph entity counts 0.5.
#[derive(Debug, Clone)]
pub struct EntityConsistencyScorer {
    threshold: f64,
}

impl EntityConsistencyScorer {
    /// Scorer flagging consistency below `threshold`
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    fn credit(key: &str, input: &ScoringInput) -> f64 {
        if input.graph_entities.contains(key) {
            return 1.0;
        }
        let partial = key.chars().count() > 2
            && input
                .graph_entities
                .iter()
                .any(|known| known.contains(key) || key.contains(known.as_str()));
        if partial {
            0.5
        } else {
            0.0
        }
    }
}

impl DimensionScorer for EntityConsistencyScorer {
    fn name(&self) -> &'static str {
        names::ENTITY_CONSISTENCY
    }

    fn score(&self, input: &ScoringInput) -> DimensionScore {
        let answer = &input.answer_entities;
        if answer.is_empty() {
            return DimensionScore::new(names::ENTITY_CONSISTENCY, 0.5)
                .with_note("No entities found in the answer");
        }

        let verified: f64 = answer.keys().iter().map(|k| Self::credit(k, input)).sum();
        let value = (verified / answer.len() as f64).min(1.0);

        let mut score = DimensionScore::new(names::ENTITY_CONSISTENCY, value)
            .with_metric("verified_entities", verified);
        if value < self.threshold {
            score = score.with_note("Entity consistency is low; answer entities are not in the knowledge graph");
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensions::graph_entity_keys;
    use policylens_domain::{Entity, EntitySet, EntityType, SourceRole};

    fn set(names: &[&str], role: SourceRole) -> EntitySet {
        names
            .iter()
            .map(|n| Entity::new(*n, EntityType::Unclassified, 0.9, role))
            .collect()
    }

    #[test]
    fn test_coverage_names_missing_entities() {
        let input = ScoringInput {
            question_entities: set(&["试验区", "管委会"], SourceRole::Question),
            answer_entities: set(&["管委会"], SourceRole::Answer),
            ..ScoringInput::default()
        };
        let score = EntityCoverageScorer::new(0.8).score(&input);
        assert_eq!(score.value, 0.5);
        assert!(score.diagnosis[0].contains("'试验区'"));
    }

    #[test]
    fn test_empty_question_entities_are_vacuously_covered() {
        let input = ScoringInput::default();
        assert_eq!(EntityCoverageScorer::new(0.8).score(&input).value, 1.0);
        assert_eq!(SufficiencyScorer::new(0.8).score(&input).value, 1.0);
        assert!(SufficiencyScorer::new(0.8).score(&input).diagnosis.is_empty());
    }

    #[test]
    fn test_sufficiency_uses_context_entities() {
        let input = ScoringInput {
            question_entities: set(&["Tax Credit"], SourceRole::Question),
            context_entities: set(&["tax credit"], SourceRole::Passage),
            ..ScoringInput::default()
        };
        assert_eq!(SufficiencyScorer::new(0.8).score(&input).value, 1.0);
    }

    #[test]
    fn test_consistency_partial_credit() {
        let input = ScoringInput {
            answer_entities: set(&["试验区管委会", "汕头", "未知机构"], SourceRole::Answer),
            graph_entities: graph_entity_keys(["试验区管委会", "汕头市人民政府"]),
            ..ScoringInput::default()
        };
        let score = EntityConsistencyScorer::new(0.5).score(&input);
        // exact 1 + "汕头" too short for partial credit + no match
        assert!((score.value - 1.0 / 3.0).abs() < 1e-9);
        assert!(!score.diagnosis.is_empty());
    }

    #[test]
    fn test_consistency_without_answer_entities() {
        let score = EntityConsistencyScorer::new(0.5).score(&ScoringInput::default());
        assert_eq!(score.value, 0.5);
    }
}
