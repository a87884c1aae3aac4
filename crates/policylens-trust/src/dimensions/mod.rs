//! Trust dimensions
//!
//! Each dimension is a [`DimensionScorer`]: a function of the already
//! materialized [`ScoringInput`] that returns one [`DimensionScore`] in
//! [0, 1]. Scorers share nothing mutable and never depend on each other, so
//! the engine may run them in any order or in parallel. The one derived
//! dimension, hallucination, is computed afterwards from the faithfulness
//! score (see [`hallucination_from`]).

mod entity;
mod faithfulness;
mod lexical;
mod relation;
mod relevancy;

pub use entity::{EntityConsistencyScorer, EntityCoverageScorer, SufficiencyScorer};
pub use faithfulness::{
    hallucination_from, parse_judge_score, FaithfulnessScorer, LLM_SCORE, UNMATCHED_RATIO,
};
pub use lexical::{ContentOverlapScorer, SemanticCoherenceScorer};
pub use relation::RelationVerificationScorer;
pub use relevancy::RelevancyScorer;

use policylens_domain::entity::normalize_name;
use policylens_domain::{DimensionScore, EntitySet};
use std::collections::BTreeSet;

/// Dimension names
pub mod names {
    /// Question entities mentioned by the answer
    pub const ENTITY_COVERAGE: &str = "entity_coverage";
    /// Support of the answer by its context
    pub const FAITHFULNESS: &str = "faithfulness";
    /// Semantic similarity of question and answer
    pub const RELEVANCY: &str = "relevancy";
    /// Question entities present in the context
    pub const SUFFICIENCY: &str = "sufficiency";
    /// Share of unsupported content
    pub const HALLUCINATION: &str = "hallucination";
    /// Answer entities known to the graph
    pub const ENTITY_CONSISTENCY: &str = "entity_consistency";
    /// Answer statements confirmed by graph edges
    pub const RELATION_VERIFICATION: &str = "relation_verification";
    /// Keyword overlap of answer and passages
    pub const CONTENT_OVERLAP: &str = "content_overlap";
    /// Keyword relevance plus logical structure
    pub const SEMANTIC_COHERENCE: &str = "semantic_coherence";
}

/// Everything a scorer may look at for one assessment
///
/// Built once per request after entity extraction and shared read-only by all
/// scorers.
#[derive(Debug, Clone, Default)]
pub struct ScoringInput {
    /// The user's question
    pub question: String,
    /// The answer under assessment
    pub answer: String,
    /// Retrieved passage texts, best first
    pub passages: Vec<String>,
    /// The leading passages joined by newlines
    pub context_text: String,
    /// Normalized names of every entity the graph channel returned
    pub graph_entities: BTreeSet<String>,
    /// Entities of the question
    pub question_entities: EntitySet,
    /// Entities of the answer
    pub answer_entities: EntitySet,
    /// Entities of the joined context
    pub context_entities: EntitySet,
}

impl ScoringInput {
    /// Answer entities whose normalized name is not a graph entity, in key order
    pub fn unverified_answer_entities(&self) -> Vec<String> {
        self.answer_entities
            .missing_from(&self.graph_entities)
            .map(|e| e.name().to_string())
            .collect()
    }

    /// Share of answer entities the graph does not know; 0 with no answer entities
    pub fn unmatched_ratio(&self) -> f64 {
        if self.answer_entities.is_empty() {
            return 0.0;
        }
        self.unverified_answer_entities().len() as f64 / self.answer_entities.len() as f64
    }
}

/// Normalize graph entity names into the set scorers compare against
pub fn graph_entity_keys<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| normalize_name(n.as_ref()))
        .filter(|n| !n.is_empty())
        .collect()
}

/// One independent trust dimension
pub trait DimensionScorer: Send + Sync {
    /// Dimension name, one of [`names`]
    fn name(&self) -> &'static str;

    /// Score the input; must not panic on any input and must stay in [0, 1]
    fn score(&self, input: &ScoringInput) -> DimensionScore;
}

/// Ratio of `part` to `whole`, or `empty` when `whole` is 0
pub(crate) fn ratio_or(part: usize, whole: usize, empty: f64) -> f64 {
    if whole == 0 {
        empty
    } else {
        part as f64 / whole as f64
    }
}

/// Leading `max_chars` characters of `text`
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
