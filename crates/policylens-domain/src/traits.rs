//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and the services it
//! consumes. Implementations live in other crates (policylens-llm,
//! policylens-retrieval). Every call is blocking; callers that need a time bound
//! wrap them themselves.

use crate::retrieval::{GraphEntity, HopLimit, PolicyRef, RelationCode, RelationshipNetwork};
use std::sync::Arc;

/// Decoding options for a single text generation call
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationOptions {
    /// Sampling temperature
    pub temperature: f64,

    /// Nucleus sampling cutoff
    pub top_p: Option<f64>,

    /// Top-k sampling cutoff
    pub top_k: Option<u32>,

    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
}

impl GenerationOptions {
    /// Options with only a temperature set
    pub fn with_temperature(temperature: f64) -> Self {
        Self {
            temperature,
            top_p: None,
            top_k: None,
            max_tokens: None,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::with_temperature(0.7)
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (policylens-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a single completion
    ///
    /// An empty prompt must not fail; unreachable or non-success responses
    /// must return an error.
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, Self::Error>;
}

/// Trait for embedding text into a fixed-dimension vector
pub trait EmbeddingModel {
    /// Error type for embedding operations
    type Error;

    /// Embed one text
    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error>;

    /// Dimensionality of every vector this model returns
    fn dimension(&self) -> usize;
}

/// A hit from vector search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Document text
    pub document: String,
    /// Similarity in [0, 1]
    pub similarity: f64,
    /// Document metadata
    pub metadata: std::collections::BTreeMap<String, String>,
}

/// Trait for similarity search over passages
pub trait VectorSearch {
    /// Error type for search operations
    type Error;

    /// Top-k most similar documents, best first
    fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, Self::Error>;
}

/// Trait for queries against the policy knowledge graph
pub trait GraphStore {
    /// Error type for graph operations
    type Error;

    /// Entities whose names match any of the given names, with their relations
    fn query_entities(&self, names: &[String]) -> Result<Vec<GraphEntity>, Self::Error>;

    /// Policies mentioning any of the given entity names
    fn query_policies(&self, names: &[String]) -> Result<Vec<PolicyRef>, Self::Error>;

    /// Bounded relationship walk from one entity
    fn query_relationships(
        &self,
        entity: &str,
        max_hops: HopLimit,
    ) -> Result<RelationshipNetwork, Self::Error>;

    /// Whether an edge of one of the given types links the pair
    fn verify_relation(
        &self,
        pair: (&str, &str),
        relation_types: &[RelationCode],
    ) -> Result<bool, Self::Error>;
}

// Shared handles forward to the inner service, so one backend can serve
// several pipeline stages.

impl<T: LlmProvider + ?Sized> LlmProvider for Arc<T> {
    type Error = T::Error;

    fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, Self::Error> {
        (**self).generate(prompt, options)
    }
}

impl<T: EmbeddingModel + ?Sized> EmbeddingModel for Arc<T> {
    type Error = T::Error;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        (**self).embed(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }
}

impl<T: VectorSearch + ?Sized> VectorSearch for Arc<T> {
    type Error = T::Error;

    fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, Self::Error> {
        (**self).search(query, top_k)
    }
}

impl<T: GraphStore + ?Sized> GraphStore for Arc<T> {
    type Error = T::Error;

    fn query_entities(&self, names: &[String]) -> Result<Vec<GraphEntity>, Self::Error> {
        (**self).query_entities(names)
    }

    fn query_policies(&self, names: &[String]) -> Result<Vec<PolicyRef>, Self::Error> {
        (**self).query_policies(names)
    }

    fn query_relationships(
        &self,
        entity: &str,
        max_hops: HopLimit,
    ) -> Result<RelationshipNetwork, Self::Error> {
        (**self).query_relationships(entity, max_hops)
    }

    fn verify_relation(
        &self,
        pair: (&str, &str),
        relation_types: &[RelationCode],
    ) -> Result<bool, Self::Error> {
        (**self).verify_relation(pair, relation_types)
    }
}
