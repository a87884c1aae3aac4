//! PolicyLens Trust Engine
//!
//! Scores how far a generated answer can be trusted.
//!
//! The engine provides:
//! - Entity resolution for question, answer, and context
//! - Independent per-dimension scoring behind the [`DimensionScorer`] trait
//! - Two scoring schemes ([`ScoringScheme::EntityAware`], [`ScoringScheme::GraphVerified`])
//! - Weighted combination into quality and risk levels with diagnoses
//! - One wall-clock budget over the whole assessment
//!
//! # Examples
//!
//! ```no_run
//! use policylens_llm::{MockEmbeddingModel, MockProvider};
//! use policylens_retrieval::InMemoryGraph;
//! use policylens_trust::{AssessmentRequest, ScoringScheme, TrustConfig, TrustEngine};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let config = TrustConfig {
//!     scheme: ScoringScheme::GraphVerified,
//!     ..TrustConfig::default()
//! };
//! let engine = TrustEngine::new(
//!     Arc::new(MockProvider::default()),
//!     Arc::new(MockEmbeddingModel::new(64)),
//!     Arc::new(InMemoryGraph::default()),
//!     config,
//! );
//!
//! let request = AssessmentRequest::new("Who manages the zone?", "The committee manages the zone.")
//!     .with_passages(["The committee manages the zone."]);
//! let assessment = engine.assess_request(request).await;
//! println!("{}", assessment.diagnosis);
//! # }
//! ```

#![warn(missing_docs)]

mod config;
pub mod dimensions;
mod engine;
mod error;
mod keywords;
mod relations;
mod strategy;

pub use config::{EntityAwareWeights, GraphVerifiedWeights, QualityCutPoints, Thresholds, TrustConfig};
pub use dimensions::{DimensionScorer, ScoringInput};
pub use engine::{AssessmentRequest, AssessmentState, TrustEngine};
pub use error::TrustError;
pub use keywords::extract_keywords;
pub use relations::{extract_relations, RelationTriple};
pub use strategy::{ScoringScheme, Verdict};
