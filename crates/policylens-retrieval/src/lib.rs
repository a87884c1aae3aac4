//! PolicyLens Retrieval
//!
//! Dual-channel retrieval and context fusion.
//!
//! # Architecture
//!
//! - [`ContextRetriever`] runs vector search for the question and, when
//!   entities are known, three graph queries (entities, policies, and a
//!   bounded relationship walk from the first entity)
//! - [`ContextFuser`] merges both channels into a size-bounded composite context
//! - [`InMemoryVectorIndex`] and [`InMemoryGraph`] are the bundled backends;
//!   a JSON [`Corpus`] file populates both
//!
//! # Examples
//!
//! ```
//! use policylens_retrieval::{ContextFuser, ContextRetriever, Corpus, RetrievalConfig};
//! use policylens_domain::EntitySet;
//! use policylens_llm::MockEmbeddingModel;
//!
//! let corpus = Corpus::from_json(r#"{"documents": [{"text": "Zone rules"}]}"#).unwrap();
//! let config = RetrievalConfig::default();
//! let retriever = ContextRetriever::new(
//!     corpus.build_index(MockEmbeddingModel::new(32)).unwrap(),
//!     corpus.build_graph(config.graph_top_k, config.path_limit),
//!     config.clone(),
//! );
//!
//! let outcome = retriever.retrieve("Zone rules", &[]);
//! let context = ContextFuser::new(config.fusion).fuse(
//!     "Zone rules",
//!     &EntitySet::new(),
//!     &outcome.passages,
//!     &outcome.neighborhood,
//! );
//! assert!(context.text().contains("Document 1"));
//! ```

#![warn(missing_docs)]

mod config;
mod corpus;
mod error;
mod fusion;
mod graph;
mod retriever;
mod vector_index;

pub use config::RetrievalConfig;
pub use corpus::{Corpus, CorpusDocument, CorpusEntity, CorpusPolicy, CorpusRelation};
pub use error::RetrievalError;
pub use fusion::{ContextFuser, FusionConfig, NOTHING_FOUND_NOTE, NO_DOCUMENTS_NOTE};
pub use graph::{Edge, EntityNode, InMemoryGraph, PolicyNode, ISSUED_BY, MENTIONED_IN};
pub use retriever::{ContextRetriever, RetrievalOutcome};
pub use vector_index::InMemoryVectorIndex;
