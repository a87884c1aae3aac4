//! In-memory vector index
//!
//! Brute-force cosine search over embedded passages. Documents are embedded
//! once on insert with the index's [`EmbeddingModel`]; queries are embedded
//! with the same model.
//!
//! # Examples
//!
//! ```
//! use policylens_retrieval::InMemoryVectorIndex;
//! use policylens_domain::VectorSearch;
//! use policylens_llm::MockEmbeddingModel;
//!
//! let index = InMemoryVectorIndex::new(MockEmbeddingModel::new(64));
//! index.add_document("Zone management rules", Default::default()).unwrap();
//!
//! let hits = index.search("Zone management rules", 5).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert!(hits[0].similarity > 0.99);
//! ```

use crate::error::RetrievalError;
use policylens_domain::{EmbeddingModel, SearchHit, VectorSearch};
use policylens_llm::cosine_similarity;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

struct IndexedDocument {
    text: String,
    metadata: BTreeMap<String, String>,
    embedding: Vec<f32>,
}

/// Vector index holding (document, embedding) pairs in memory
pub struct InMemoryVectorIndex<E> {
    embedder: E,
    documents: RwLock<Vec<IndexedDocument>>,
}

impl<E> InMemoryVectorIndex<E>
where
    E: EmbeddingModel,
    E::Error: Display,
{
    /// Create an empty index
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            documents: RwLock::new(Vec::new()),
        }
    }

    /// Embed and add a document
    pub fn add_document(
        &self,
        text: impl Into<String>,
        metadata: BTreeMap<String, String>,
    ) -> Result<(), RetrievalError> {
        let text = text.into();
        let embedding = self
            .embedder
            .embed(&text)
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;

        if embedding.len() != self.embedder.dimension() {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.embedder.dimension(),
                actual: embedding.len(),
            });
        }

        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(IndexedDocument {
                text,
                metadata,
                embedding,
            });
        Ok(())
    }

    /// Get the number of documents in the index
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> VectorSearch for InMemoryVectorIndex<E>
where
    E: EmbeddingModel,
    E::Error: Display,
{
    type Error = RetrievalError;

    fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, Self::Error> {
        if top_k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(query)
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;

        let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);
        let mut scored: Vec<(usize, f64)> = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                let similarity = cosine_similarity(&query_embedding, &doc.embedding) as f64;
                (i, policylens_domain::clamp_unit(similarity))
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        debug!("Vector search returned {} of {} documents", scored.len(), documents.len());

        Ok(scored
            .into_iter()
            .map(|(i, similarity)| SearchHit {
                document: documents[i].text.clone(),
                similarity,
                metadata: documents[i].metadata.clone(),
            })
            .collect())
    }
}
