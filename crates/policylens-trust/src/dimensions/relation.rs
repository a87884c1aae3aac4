//! Relation verification against the knowledge graph

use super::{names, DimensionScorer, ScoringInput};
use crate::relations::extract_relations;
use policylens_domain::{DimensionScore, GraphStore};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};

/// Share of answer statements backed by a graph edge
///
/// 0.5 when the answer states no recognizable relation, 0.4 when the graph
/// cannot be asked.
pub struct RelationVerificationScorer<G> {
    graph: Arc<G>,
    threshold: f64,
}

impl<G> RelationVerificationScorer<G>
where
    G: GraphStore,
    G::Error: Display,
{
    /// Scorer verifying statements against `graph`
    pub fn new(graph: Arc<G>, threshold: f64) -> Self {
        Self { graph, threshold }
    }
}

impl<G> DimensionScorer for RelationVerificationScorer<G>
where
    G: GraphStore + Send + Sync,
    G::Error: Display,
{
    fn name(&self) -> &'static str {
        names::RELATION_VERIFICATION
    }

    fn score(&self, input: &ScoringInput) -> DimensionScore {
        let triples = extract_relations(&input.answer);
        if triples.is_empty() {
            return DimensionScore::new(names::RELATION_VERIFICATION, 0.5)
                .with_note("No relation statements found in the answer");
        }

        let mut verified = 0usize;
        for triple in &triples {
            match self.graph.verify_relation(
                (triple.subject.as_str(), triple.object.as_str()),
                &[triple.predicate],
            ) {
                Ok(true) => verified += 1,
                Ok(false) => debug!(
                    "Unverified relation: {} {} {}",
                    triple.subject,
                    triple.predicate.as_str(),
                    triple.object
                ),
                Err(e) => {
                    warn!("Relation verification failed: {}", e);
                    return DimensionScore::new(names::RELATION_VERIFICATION, 0.4)
                        .with_note("Relation verification unavailable");
                }
            }
        }

        let value = verified as f64 / triples.len() as f64;
        debug!("Relation verification: {}/{} = {:.3}", verified, triples.len(), value);

        let mut score = DimensionScore::new(names::RELATION_VERIFICATION, value)
            .with_metric("verified_relations", verified as f64)
            .with_metric("total_relations", triples.len() as f64);
        if value < self.threshold {
            score = score.with_note("Low relation verification, relations in the answer may be incorrect");
        }
        score
    }
}
