//! Entity module - typed names extracted from questions, answers, and passages
//!
//! Entities are compared by their normalized name. Two entities whose names
//! normalize to the same key are the same identity; merging keeps the higher
//! confidence and the union of aliases.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Name used for the placeholder entity returned for an empty question
pub const PLACEHOLDER_ENTITY_NAME: &str = "generic_query";

/// Fixed category set for policy-domain entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EntityType {
    /// Named policy, plan, or programme
    Policy,
    /// Government body, company, institution
    Organization,
    /// Country, province, zone, address
    Location,
    /// Law, article, clause, regulation
    Regulation,
    /// Industry or sector
    Industry,
    /// Position, role, or category of person
    PersonRole,
    /// Date, deadline, period
    Time,
    /// Amount, rate, quota
    Amount,
    /// Domain-specific business term
    BusinessTerm,
    /// Abstract policy concept
    Concept,
    /// Type could not be determined
    Unclassified,
}

impl EntityType {
    /// Map a free-form label (English code or Chinese category name) onto the fixed set
    ///
    /// # Examples
    ///
    /// ```
    /// use policylens_domain::EntityType;
    ///
    /// assert_eq!(EntityType::from_label("ORG"), EntityType::Organization);
    /// assert_eq!(EntityType::from_label("机构组织"), EntityType::Organization);
    /// assert_eq!(EntityType::from_label("???"), EntityType::Unclassified);
    /// ```
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        match label.to_ascii_uppercase().as_str() {
            "POLICY" => return Self::Policy,
            "ORG" | "ORGANIZATION" | "ORGANISATION" | "AGENCY" => return Self::Organization,
            "LOC" | "LOCATION" | "GPE" => return Self::Location,
            "REGULATION" | "LAW" => return Self::Regulation,
            "INDUSTRY" => return Self::Industry,
            "PERSON" | "ROLE" | "PERSON_ROLE" => return Self::PersonRole,
            "TIME" | "DATE" => return Self::Time,
            "AMOUNT" | "MONEY" | "NUMBER" => return Self::Amount,
            "TERM" | "BUSINESS_TERM" => return Self::BusinessTerm,
            "CONCEPT" => return Self::Concept,
            _ => {}
        }

        match label {
            "政策名称" => Self::Policy,
            "机构组织" | "组织机构" => Self::Organization,
            "地理位置" => Self::Location,
            "法律条款" | "法规条款" => Self::Regulation,
            "行业领域" => Self::Industry,
            "人员角色" => Self::PersonRole,
            "时间信息" => Self::Time,
            "数值金额" => Self::Amount,
            "业务术语" => Self::BusinessTerm,
            "政策概念" => Self::Concept,
            _ => Self::Unclassified,
        }
    }

    /// Stable lowercase code for display and serialization
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Policy => "policy",
            Self::Organization => "organization",
            Self::Location => "location",
            Self::Regulation => "regulation",
            Self::Industry => "industry",
            Self::PersonRole => "person_role",
            Self::Time => "time",
            Self::Amount => "amount",
            Self::BusinessTerm => "business_term",
            Self::Concept => "concept",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which text an entity was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SourceRole {
    /// The user's question
    Question,
    /// The generated answer
    Answer,
    /// Retrieved passages
    Passage,
}

impl SourceRole {
    /// Lowercase role name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
            Self::Passage => "passage",
        }
    }
}

impl fmt::Display for SourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize an entity name into its identity key
///
/// Trims, lowercases, and collapses internal whitespace runs to a single space.
///
/// # Examples
///
/// ```
/// use policylens_domain::entity::normalize_name;
///
/// assert_eq!(normalize_name("  Free  Trade Zone "), "free trade zone");
/// assert_eq!(normalize_name("试验区"), "试验区");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A typed entity
///
/// Immutable once created; use [`Entity::merged`] to combine two records
/// that share an identity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    name: String,
    entity_type: EntityType,
    confidence: f64,
    aliases: BTreeSet<String>,
    source: SourceRole,
}

impl Entity {
    /// Create a new entity; confidence is clamped to [0, 1]
    pub fn new(
        name: impl Into<String>,
        entity_type: EntityType,
        confidence: f64,
        source: SourceRole,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            entity_type,
            confidence: crate::clamp_unit(confidence),
            aliases: BTreeSet::new(),
            source,
        }
    }

    /// Placeholder returned for an empty question so coverage ratios stay defined
    pub fn question_placeholder() -> Self {
        Self::new(
            PLACEHOLDER_ENTITY_NAME,
            EntityType::Unclassified,
            0.0,
            SourceRole::Question,
        )
    }

    /// Attach aliases
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(
            aliases
                .into_iter()
                .map(Into::into)
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        );
        self
    }

    /// Display name as extracted
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity key
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    /// Entity category
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Extraction confidence in [0, 1]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Alternative surface forms
    pub fn aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }

    /// Text the entity came from
    pub fn source(&self) -> SourceRole {
        self.source
    }

    /// Whether this is the empty-question placeholder
    pub fn is_placeholder(&self) -> bool {
        self.name == PLACEHOLDER_ENTITY_NAME
    }

    /// Combine two records of the same identity
    ///
    /// Keeps the higher confidence, unions aliases, and keeps the first
    /// record's name, source, and a classified type when one side is unclassified.
    pub fn merged(&self, other: &Entity) -> Entity {
        let mut aliases = self.aliases.clone();
        aliases.extend(other.aliases.iter().cloned());
        if other.name != self.name {
            aliases.insert(other.name.clone());
        }

        let entity_type = match (self.entity_type, other.entity_type) {
            (EntityType::Unclassified, t) => t,
            (t, _) => t,
        };

        Entity {
            name: self.name.clone(),
            entity_type,
            confidence: self.confidence.max(other.confidence),
            aliases,
            source: self.source,
        }
    }
}

/// Set of entities keyed by normalized name
///
/// Iteration order is the sorted key order, so anything derived from a set
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntitySet {
    entries: BTreeMap<String, Entity>,
}

impl EntitySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, merging with an existing entity of the same identity
    pub fn insert(&mut self, entity: Entity) {
        let key = entity.key();
        if key.is_empty() {
            return;
        }
        match self.entries.get(&key) {
            Some(existing) => {
                let merged = existing.merged(&entity);
                self.entries.insert(key, merged);
            }
            None => {
                self.entries.insert(key, entity);
            }
        }
    }

    /// Number of distinct identities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an identity with this (un-normalized) name is present
    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_name(name))
    }

    /// Look up by (un-normalized) name
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entries.get(&normalize_name(name))
    }

    /// Iterate entities in key order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.values()
    }

    /// Identity keys in sorted order
    pub fn keys(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }

    /// Display names in key order
    pub fn names(&self) -> Vec<String> {
        self.entries.values().map(|e| e.name.clone()).collect()
    }

    /// Entities of `self` whose identity is also in `other`
    pub fn intersection<'a>(&'a self, other: &'a EntitySet) -> impl Iterator<Item = &'a Entity> {
        self.entries
            .iter()
            .filter(move |(k, _)| other.entries.contains_key(*k))
            .map(|(_, e)| e)
    }

    /// Entities of `self` whose identity is not in `other`
    pub fn difference<'a>(&'a self, other: &'a EntitySet) -> impl Iterator<Item = &'a Entity> {
        self.entries
            .iter()
            .filter(move |(k, _)| !other.entries.contains_key(*k))
            .map(|(_, e)| e)
    }

    /// Entities of `self` whose key is absent from a plain key set
    pub fn missing_from<'a>(&'a self, keys: &'a BTreeSet<String>) -> impl Iterator<Item = &'a Entity> {
        self.entries
            .iter()
            .filter(move |(k, _)| !keys.contains(*k))
            .map(|(_, e)| e)
    }
}

impl FromIterator<Entity> for EntitySet {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        let mut set = EntitySet::new();
        for entity in iter {
            set.insert(entity);
        }
        set
    }
}

impl Extend<Entity> for EntitySet {
    fn extend<I: IntoIterator<Item = Entity>>(&mut self, iter: I) {
        for entity in iter {
            self.insert(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str, confidence: f64) -> Entity {
        Entity::new(name, EntityType::Organization, confidence, SourceRole::Question)
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(entity("a", 1.7).confidence(), 1.0);
        assert_eq!(entity("a", -0.2).confidence(), 0.0);
    }

    #[test]
    fn test_merge_same_identity() {
        let mut set = EntitySet::new();
        set.insert(entity("Trade Zone", 0.6).with_aliases(["TZ"]));
        set.insert(entity("trade  zone", 0.9).with_aliases(["Zone"]));

        assert_eq!(set.len(), 1);
        let merged = set.get("TRADE ZONE").unwrap();
        assert_eq!(merged.confidence(), 0.9);
        assert_eq!(merged.name(), "Trade Zone");
        assert!(merged.aliases().contains("TZ"));
        assert!(merged.aliases().contains("Zone"));
        assert!(merged.aliases().contains("trade  zone"));
    }

    #[test]
    fn test_merge_prefers_classified_type() {
        let a = Entity::new("x", EntityType::Unclassified, 0.5, SourceRole::Answer);
        let b = Entity::new("x", EntityType::Policy, 0.4, SourceRole::Answer);
        assert_eq!(a.merged(&b).entity_type(), EntityType::Policy);
        assert_eq!(b.merged(&a).entity_type(), EntityType::Policy);
    }

    #[test]
    fn test_empty_names_are_ignored() {
        let mut set = EntitySet::new();
        set.insert(entity("   ", 0.9));
        assert!(set.is_empty());
    }

    #[test]
    fn test_intersection_and_difference() {
        let q: EntitySet = vec![entity("A", 0.5), entity("B", 0.5)].into_iter().collect();
        let a: EntitySet = vec![entity("b", 0.5), entity("C", 0.5)].into_iter().collect();

        let common: Vec<_> = q.intersection(&a).map(|e| e.name().to_string()).collect();
        let missing: Vec<_> = q.difference(&a).map(|e| e.name().to_string()).collect();

        assert_eq!(common, vec!["B"]);
        assert_eq!(missing, vec!["A"]);
    }

    #[test]
    fn test_placeholder() {
        let p = Entity::question_placeholder();
        assert!(p.is_placeholder());
        assert_eq!(p.source(), SourceRole::Question);
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(EntityType::from_label("location"), EntityType::Location);
        assert_eq!(EntityType::from_label("法律条款"), EntityType::Regulation);
        assert_eq!(EntityType::from_label("PERSON"), EntityType::PersonRole);
    }
}
