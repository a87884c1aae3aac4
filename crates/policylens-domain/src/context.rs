//! Composite context handed to the answer synthesizer

use std::collections::BTreeMap;
use std::fmt;

use crate::entity::{EntitySet, SourceRole};

/// Identifier for one question's trip through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u128);

impl RequestId {
    /// Generate a new UUIDv7-based RequestId
    ///
    /// # Examples
    ///
    /// ```
    /// use policylens_domain::RequestId;
    ///
    /// let id = RequestId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Milliseconds since the Unix epoch at which the id was minted
    pub fn timestamp(&self) -> u64 {
        // UUIDv7: top 48 bits are Unix millisecond timestamp
        (self.0 >> 80) as u64
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Fused text block plus the entities known for each source role
///
/// Built once per request and never modified.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompositeContext {
    text: String,
    entities_by_role: BTreeMap<SourceRole, EntitySet>,
    has_evidence: bool,
}

impl CompositeContext {
    /// Create a composite context
    pub fn new(text: impl Into<String>, entities_by_role: BTreeMap<SourceRole, EntitySet>) -> Self {
        Self {
            text: text.into(),
            entities_by_role,
            has_evidence: true,
        }
    }

    /// Mark that neither retrieval channel contributed anything
    pub fn without_evidence(mut self) -> Self {
        self.has_evidence = false;
        self
    }

    /// Whether any passage or graph fact made it into the text
    pub fn has_evidence(&self) -> bool {
        self.has_evidence
    }

    /// The fused text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the fused text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Entities extracted for a role; empty when none were recorded
    pub fn entities(&self, role: SourceRole) -> EntitySet {
        self.entities_by_role.get(&role).cloned().unwrap_or_default()
    }

    /// All recorded roles and their entities
    pub fn entities_by_role(&self) -> &BTreeMap<SourceRole, EntitySet> {
        &self.entities_by_role
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, EntityType};

    #[test]
    fn test_request_id_ordering() {
        let first = RequestId::new();
        let second = RequestId::new();
        assert!(second.value() >= first.value());
        assert!(first.timestamp() > 0);
    }

    #[test]
    fn test_context_entities_by_role() {
        let mut roles = BTreeMap::new();
        let question: EntitySet = vec![Entity::new(
            "试验区",
            EntityType::Location,
            0.9,
            SourceRole::Question,
        )]
        .into_iter()
        .collect();
        roles.insert(SourceRole::Question, question);

        let context = CompositeContext::new("问题：试验区", roles);
        assert_eq!(context.char_len(), 6);
        assert_eq!(context.entities(SourceRole::Question).len(), 1);
        assert!(context.entities(SourceRole::Passage).is_empty());
        assert!(context.has_evidence());
        assert!(!context.without_evidence().has_evidence());
    }
}
