//! JSON corpus loader
//!
//! A corpus file carries passages for the vector index and the nodes and
//! edges of the knowledge graph:
//!
//! ```json
//! {
//!   "documents": [{"text": "...", "metadata": {"title": "..."}}],
//!   "entities":  [{"name": "...", "type": "ORG", "text": "..."}],
//!   "relations": [{"source": "...", "relation": "MANAGES", "target": "..."}],
//!   "policies":  [{"title": "...", "document_number": "...", "publish_date": "2021-05-01",
//!                  "issuing_agency": "...", "sections": ["..."], "mentions": ["..."]}]
//! }
//! ```

use crate::error::RetrievalError;
use crate::graph::{EntityNode, InMemoryGraph, PolicyNode};
use crate::vector_index::InMemoryVectorIndex;
use policylens_domain::EmbeddingModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;
use tracing::{info, warn};

/// A passage for the vector index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusDocument {
    /// Passage text
    pub text: String,
    /// Passage metadata
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// An entity node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntity {
    /// Entity name
    pub name: String,
    /// Entity type label
    #[serde(rename = "type", default = "unknown_type")]
    pub entity_type: String,
    /// Free text attached to the node
    #[serde(default)]
    pub text: Option<String>,
}

fn unknown_type() -> String {
    "unknown".to_string()
}

/// An edge between two entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRelation {
    /// Source entity name
    pub source: String,
    /// Edge label
    pub relation: String,
    /// Target entity name
    pub target: String,
}

/// A policy document node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusPolicy {
    /// Policy title
    pub title: String,
    /// Official document number
    #[serde(default)]
    pub document_number: Option<String>,
    /// Publication date
    #[serde(default)]
    pub publish_date: Option<String>,
    /// Issuing agency
    #[serde(default)]
    pub issuing_agency: Option<String>,
    /// Section titles
    #[serde(default)]
    pub sections: Vec<String>,
    /// Names of mentioned entities
    #[serde(default)]
    pub mentions: Vec<String>,
}

/// Everything needed to stand up the in-memory retrieval backends
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Corpus {
    /// Passages
    #[serde(default)]
    pub documents: Vec<CorpusDocument>,
    /// Graph entities
    #[serde(default)]
    pub entities: Vec<CorpusEntity>,
    /// Graph edges
    #[serde(default)]
    pub relations: Vec<CorpusRelation>,
    /// Policy documents
    #[serde(default)]
    pub policies: Vec<CorpusPolicy>,
}

impl Corpus {
    /// Parse a corpus from JSON text
    pub fn from_json(json: &str) -> Result<Self, RetrievalError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a corpus file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RetrievalError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RetrievalError::Corpus(format!("{}: {}", path.display(), e)))?;
        let corpus = Self::from_json(&content)?;
        info!(
            "Loaded corpus {}: {} documents, {} entities, {} relations, {} policies",
            path.display(),
            corpus.documents.len(),
            corpus.entities.len(),
            corpus.relations.len(),
            corpus.policies.len()
        );
        Ok(corpus)
    }

    /// Build the knowledge graph
    pub fn build_graph(&self, top_k: usize, path_limit: usize) -> InMemoryGraph {
        let mut graph = InMemoryGraph::new(top_k, path_limit);
        for entity in &self.entities {
            graph.add_entity(EntityNode {
                name: entity.name.clone(),
                entity_type: entity.entity_type.clone(),
                text: entity.text.clone(),
            });
        }
        for relation in &self.relations {
            graph.add_edge(&relation.source, &relation.relation, &relation.target);
        }
        for policy in &self.policies {
            graph.add_policy(PolicyNode {
                title: policy.title.clone(),
                document_number: policy.document_number.clone(),
                publish_date: policy.publish_date.clone(),
                issuing_agency: policy.issuing_agency.clone(),
                sections: policy.sections.clone(),
                mentions: policy.mentions.clone(),
            });
        }
        graph
    }

    /// Embed every document into a new vector index
    ///
    /// Blank documents are skipped; an embedding failure aborts the build.
    pub fn build_index<E>(&self, embedder: E) -> Result<InMemoryVectorIndex<E>, RetrievalError>
    where
        E: EmbeddingModel,
        E::Error: Display,
    {
        let index = InMemoryVectorIndex::new(embedder);
        for (i, document) in self.documents.iter().enumerate() {
            if document.text.trim().is_empty() {
                warn!("Skipping blank corpus document {}", i);
                continue;
            }
            index.add_document(document.text.clone(), document.metadata.clone())?;
        }
        Ok(index)
    }
}
