//! Context Retriever facade over the vector and graph channels

use crate::config::RetrievalConfig;
use policylens_domain::{
    rank_passages, Entity, GraphNeighborhood, GraphStore, RelationshipNetwork, RetrievedPassage,
    VectorSearch,
};
use std::fmt::Display;
use tracing::{debug, warn};

/// What both channels returned for one question
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetrievalOutcome {
    /// Passages, best first
    pub passages: Vec<RetrievedPassage>,
    /// Graph neighborhood; empty when no entities were given
    pub neighborhood: GraphNeighborhood,
}

impl RetrievalOutcome {
    /// Whether the graph channel contributed any entity, policy, or path
    pub fn graph_enhanced(&self) -> bool {
        !self.neighborhood.is_empty()
    }
}

/// Runs both retrieval channels for a question
///
/// Channel failures never propagate: each failing call is logged and its
/// sub-result becomes empty.
pub struct ContextRetriever<V, G> {
    vector: V,
    graph: G,
    config: RetrievalConfig,
}

impl<V, G> ContextRetriever<V, G>
where
    V: VectorSearch,
    V::Error: Display,
    G: GraphStore,
    G::Error: Display,
{
    /// Create a retriever over the two channels
    pub fn new(vector: V, graph: G, config: RetrievalConfig) -> Self {
        Self {
            vector,
            graph,
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Get the graph channel
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Retrieve passages and, when entities are known, the graph neighborhood
    ///
    /// The question placeholder entity is never sent to the graph.
    pub fn retrieve(&self, question: &str, entities: &[Entity]) -> RetrievalOutcome {
        let passages = self.search_passages(question);

        let names: Vec<String> = entities
            .iter()
            .filter(|e| !e.is_placeholder())
            .map(|e| e.name().to_string())
            .collect();

        let neighborhood = if names.is_empty() {
            debug!("No entities for graph channel, skipping");
            GraphNeighborhood::default()
        } else {
            self.query_graph(&names)
        };

        debug!(
            "Retrieved {} passages, {} graph entities, {} policies, {} paths",
            passages.len(),
            neighborhood.entities.len(),
            neighborhood.policies.len(),
            neighborhood.relationships.paths.len()
        );

        RetrievalOutcome {
            passages,
            neighborhood,
        }
    }

    fn search_passages(&self, question: &str) -> Vec<RetrievedPassage> {
        match self.vector.search(question, self.config.top_k) {
            Ok(hits) => {
                let mut passages: Vec<RetrievedPassage> = hits
                    .into_iter()
                    .map(|hit| {
                        let mut passage = RetrievedPassage::new(hit.document, hit.similarity);
                        passage.metadata = hit.metadata;
                        passage
                    })
                    .collect();
                rank_passages(&mut passages);
                passages
            }
            Err(e) => {
                warn!("Vector search failed, continuing without passages: {}", e);
                Vec::new()
            }
        }
    }

    fn query_graph(&self, names: &[String]) -> GraphNeighborhood {
        let entities = self.graph.query_entities(names).unwrap_or_else(|e| {
            warn!("Graph entity query failed: {}", e);
            Vec::new()
        });

        let policies = self.graph.query_policies(names).unwrap_or_else(|e| {
            warn!("Graph policy query failed: {}", e);
            Vec::new()
        });

        let seed = &names[0];
        let relationships = self
            .graph
            .query_relationships(seed, self.config.max_hops)
            .unwrap_or_else(|e| {
                warn!("Relationship walk from '{}' failed: {}", seed, e);
                RelationshipNetwork::empty(seed.as_str())
            });

        GraphNeighborhood {
            entities,
            policies,
            relationships,
        }
    }
}
