//! Keyword dimensions: content overlap and semantic coherence

use super::{names, DimensionScorer, ScoringInput};
use crate::keywords::extract_keywords;
use policylens_domain::DimensionScore;

/// Score when there is nothing to compare the answer against
const NO_REFERENCE_SCORE: f64 = 0.3;

/// Answers shorter than this many characters are too short to be coherent
const MIN_COHERENT_CHARS: usize = 10;

const LOGICAL_CONNECTORS: &[&str] = &[
    "因为", "所以", "由于", "因此", "根据", "按照", "依据",
    "because", "therefore", "according to", "pursuant to", "thus",
];

const DOMAIN_TERMS: &[&str] = &[
    "规定", "要求", "政策", "条款", "办法",
    "regulation", "requirement", "policy", "clause", "measures",
];

/// Average share of answer keywords found in each passage
#[derive(Debug, Clone)]
pub struct ContentOverlapScorer {
    threshold: f64,
}

impl ContentOverlapScorer {
    /// Scorer flagging overlap below `threshold`
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl DimensionScorer for ContentOverlapScorer {
    fn name(&self) -> &'static str {
        names::CONTENT_OVERLAP
    }

    fn score(&self, input: &ScoringInput) -> DimensionScore {
        if input.passages.is_empty() {
            return DimensionScore::new(names::CONTENT_OVERLAP, NO_REFERENCE_SCORE)
                .with_note("No reference passages to compare against");
        }
        let answer = extract_keywords(&input.answer);
        if answer.is_empty() {
            return DimensionScore::new(names::CONTENT_OVERLAP, NO_REFERENCE_SCORE)
                .with_note("No keywords found in the answer");
        }

        let ratios: Vec<f64> = input
            .passages
            .iter()
            .map(|p| extract_keywords(p))
            .filter(|k| !k.is_empty())
            .map(|k| answer.intersection(&k).count() as f64 / answer.len() as f64)
            .collect();
        if ratios.is_empty() {
            return DimensionScore::new(names::CONTENT_OVERLAP, NO_REFERENCE_SCORE)
                .with_note("No keywords found in the reference passages");
        }

        let value = (ratios.iter().sum::<f64>() / ratios.len() as f64).min(1.0);
        let mut score = DimensionScore::new(names::CONTENT_OVERLAP, value);
        if value < self.threshold {
            score = score.with_note("Low content overlap, the answer may not be based on the retrieved documents");
        }
        score
    }
}

/// Question keyword coverage plus a bonus for logical structure
///
/// `(overlap + min(indicators / 5, 0.5)) / 1.5`, where indicators counts the
/// distinct connectors in the answer plus one if any domain term appears.
#[derive(Debug, Clone)]
pub struct SemanticCoherenceScorer {
    threshold: f64,
}

impl SemanticCoherenceScorer {
    /// Scorer flagging coherence below `threshold`
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    fn indicators(answer: &str) -> usize {
        let lowered = answer.to_lowercase();
        let connectors = LOGICAL_CONNECTORS
            .iter()
            .filter(|c| lowered.contains(*c))
            .count();
        let domain = usize::from(DOMAIN_TERMS.iter().any(|t| lowered.contains(t)));
        connectors + domain
    }

    fn flagged(&self, value: f64) -> DimensionScore {
        let score = DimensionScore::new(names::SEMANTIC_COHERENCE, value);
        if value < self.threshold {
            score.with_note("Low semantic coherence, the answer may be off-topic or poorly structured")
        } else {
            score
        }
    }
}

impl DimensionScorer for SemanticCoherenceScorer {
    fn name(&self) -> &'static str {
        names::SEMANTIC_COHERENCE
    }

    fn score(&self, input: &ScoringInput) -> DimensionScore {
        let answer = input.answer.trim();
        if answer.chars().count() < MIN_COHERENT_CHARS {
            return self.flagged(0.2).with_note("The answer is too short");
        }

        let question_keywords = extract_keywords(&input.question);
        let answer_keywords = extract_keywords(answer);
        if question_keywords.is_empty() || answer_keywords.is_empty() {
            return self.flagged(0.4);
        }

        let overlap = question_keywords.intersection(&answer_keywords).count() as f64
            / question_keywords.len() as f64;
        let structure = (Self::indicators(answer) as f64 / 5.0).min(0.5);
        let value = ((overlap + structure) / 1.5).min(1.0);

        self.flagged(value).with_metric("keyword_overlap", overlap)
    }
}
