//! PolicyLens Domain Layer
//!
//! Value types and service traits shared by every PolicyLens crate. Nothing
//! in here performs I/O; network clients and stores live in other crates and
//! implement the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Entity**: a typed name with confidence, identified by its normalized name
//! - **RetrievedPassage / GraphNeighborhood**: what the two retrieval channels return
//! - **CompositeContext**: the fused, size-bounded text given to the synthesizer
//! - **TrustAssessment**: the scored verdict on an answer

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod entity;
pub mod retrieval;
pub mod score;
pub mod traits;

// Re-exports for convenience
pub use context::{CompositeContext, RequestId};
pub use entity::{Entity, EntitySet, EntityType, SourceRole, PLACEHOLDER_ENTITY_NAME};
pub use retrieval::{
    GraphEntity, GraphNeighborhood, GraphRelation, HopLimit, NodeKind, PathNode, PolicyRef,
    RelationCode, RelationshipNetwork, RelationshipPath, RetrievedPassage, rank_passages,
};
pub use score::{DimensionScore, EntityAnalysis, QualityLevel, RiskLevel, TrustAssessment};
pub use traits::{EmbeddingModel, GenerationOptions, GraphStore, LlmProvider, SearchHit, VectorSearch};

/// Clamp a score into [0, 1]; NaN becomes 0
///
/// # Examples
///
/// ```
/// use policylens_domain::clamp_unit;
///
/// assert_eq!(clamp_unit(1.7), 1.0);
/// assert_eq!(clamp_unit(-0.1), 0.0);
/// assert_eq!(clamp_unit(f64::NAN), 0.0);
/// ```
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
