//! Candidate and result types for extraction

use policylens_domain::{Entity, EntityType, SourceRole};

/// An entity as parsed from model output, before filtering
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCandidate {
    /// Surface text
    pub name: String,

    /// Category label as given by the model
    pub label: Option<String>,

    /// Confidence as given by the model
    pub confidence: Option<f64>,

    /// Alternative surface forms
    pub aliases: Vec<String>,
}

impl EntityCandidate {
    /// Candidate from a bare name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            confidence: None,
            aliases: Vec::new(),
        }
    }

    /// Convert into a domain entity
    pub fn into_entity(self, role: SourceRole, default_confidence: f64) -> Entity {
        let entity_type = self
            .label
            .as_deref()
            .map(EntityType::from_label)
            .unwrap_or(EntityType::Unclassified);
        Entity::new(
            self.name,
            entity_type,
            self.confidence.unwrap_or(default_confidence),
            role,
        )
        .with_aliases(self.aliases)
    }
}

/// Outcome of one extraction call, for callers that want the details
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Entities kept after filtering
    pub entities: Vec<Entity>,

    /// Candidates dropped for low confidence
    pub below_threshold: usize,

    /// Candidates dropped by the cap
    pub truncated: usize,

    /// Wall-clock time spent
    pub processing_time_ms: u64,
}
