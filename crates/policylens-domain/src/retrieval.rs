//! Retrieval value types
//!
//! What the two retrieval channels hand back: ranked passages from vector
//! search and a neighborhood from the policy knowledge graph. All read-only.

use std::collections::BTreeMap;
use std::fmt;

/// Default number of hops for the relationship walk
pub const DEFAULT_MAX_HOPS: u32 = 2;

/// Smallest allowed hop count
pub const MIN_HOPS: u32 = 1;

/// Largest allowed hop count
pub const MAX_HOPS: u32 = 10;

/// A passage returned by vector search
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetrievedPassage {
    /// Passage text
    pub text: String,

    /// Similarity to the query in [0, 1]
    pub similarity: f64,

    /// Source metadata (title, document number, ...)
    pub metadata: BTreeMap<String, String>,
}

impl RetrievedPassage {
    /// Create a passage; similarity is clamped to [0, 1]
    pub fn new(text: impl Into<String>, similarity: f64) -> Self {
        Self {
            text: text.into(),
            similarity: crate::clamp_unit(similarity),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The `title` metadata entry, if any
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").map(String::as_str)
    }
}

/// Sort passages by descending similarity; ties keep their original order
///
/// ```
/// use policylens_domain::{rank_passages, RetrievedPassage};
///
/// let mut passages = vec![
///     RetrievedPassage::new("low", 0.2),
///     RetrievedPassage::new("first tie", 0.7),
///     RetrievedPassage::new("second tie", 0.7),
/// ];
/// rank_passages(&mut passages);
/// let texts: Vec<_> = passages.iter().map(|p| p.text.as_str()).collect();
/// assert_eq!(texts, ["first tie", "second tie", "low"]);
/// ```
pub fn rank_passages(passages: &mut [RetrievedPassage]) {
    passages.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Canonical relation codes used by the policy graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RelationCode {
    /// Agency publishes a policy
    Publishes,
    /// Policy applies to a subject
    AppliesTo,
    /// Body manages an affair
    Manages,
    /// Policy requires an action
    Requires,
    /// Document contains content
    Contains,
    /// Body is responsible for an affair
    ResponsibleFor,
    /// Body approves a matter
    Approves,
    /// Body supervises an activity
    Supervises,
}

impl RelationCode {
    /// Every code, in declaration order
    pub const ALL: [RelationCode; 8] = [
        Self::Publishes,
        Self::AppliesTo,
        Self::Manages,
        Self::Requires,
        Self::Contains,
        Self::ResponsibleFor,
        Self::Approves,
        Self::Supervises,
    ];

    /// Graph edge label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Publishes => "PUBLISHES",
            Self::AppliesTo => "APPLIES_TO",
            Self::Manages => "MANAGES",
            Self::Requires => "REQUIRES",
            Self::Contains => "CONTAINS",
            Self::ResponsibleFor => "RESPONSIBLE_FOR",
            Self::Approves => "APPROVES",
            Self::Supervises => "SUPERVISES",
        }
    }

    /// Parse a graph edge label
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for RelationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing relation of a graph entity
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphRelation {
    /// Edge label
    pub relation: String,
    /// Target entity name
    pub target: String,
    /// Target entity type label
    pub target_type: Option<String>,
}

/// An entity record from the knowledge graph
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphEntity {
    /// Entity name
    pub name: String,
    /// Entity type label as stored in the graph
    pub entity_type: String,
    /// Free text attached to the node
    pub text: Option<String>,
    /// Outgoing relations
    pub relations: Vec<GraphRelation>,
}

/// Reference to a policy document in the graph
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolicyRef {
    /// Policy title
    pub title: String,
    /// Official document number
    pub document_number: Option<String>,
    /// Publication date as stored
    pub publish_date: Option<String>,
    /// Issuing agency name
    pub issuing_agency: Option<String>,
    /// Section titles
    pub sections: Vec<String>,
    /// Entities mentioned in the policy
    pub related_entities: Vec<String>,
}

/// Kind of node on a relationship path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NodeKind {
    /// Entity node
    Entity,
    /// Policy node
    Policy,
    /// Agency node
    Agency,
}

/// A node visited by the relationship walk
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathNode {
    /// Node name (entity name or policy title)
    pub name: String,
    /// Node kind
    pub kind: NodeKind,
}

/// One path found by the relationship walk
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelationshipPath {
    /// Nodes from the seed outwards
    pub nodes: Vec<PathNode>,
    /// Edge labels; `relations.len() == nodes.len() - 1`
    pub relations: Vec<String>,
}

impl RelationshipPath {
    /// Number of hops on this path
    pub fn hops(&self) -> usize {
        self.relations.len()
    }
}

/// Result of a bounded relationship walk from one seed entity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelationshipNetwork {
    /// Seed entity name
    pub center_entity: String,
    /// Paths found
    pub paths: Vec<RelationshipPath>,
    /// Distinct entity names reached
    pub related_entities: Vec<String>,
    /// Distinct policy titles reached
    pub related_policies: Vec<String>,
}

impl RelationshipNetwork {
    /// Empty result for a seed
    pub fn empty(center_entity: impl Into<String>) -> Self {
        Self {
            center_entity: center_entity.into(),
            ..Self::default()
        }
    }
}

/// Everything the graph channel returned for one question
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphNeighborhood {
    /// Matched entities with their relations
    pub entities: Vec<GraphEntity>,
    /// Policies mentioning the entities
    pub policies: Vec<PolicyRef>,
    /// Relationship walk from the first entity
    pub relationships: RelationshipNetwork,
}

impl GraphNeighborhood {
    /// Whether the graph channel produced nothing usable
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
            && self.policies.is_empty()
            && self.relationships.paths.is_empty()
    }

    /// Every entity name known to this neighborhood
    ///
    /// Includes matched entities, their relation targets, entities mentioned by
    /// policies, and entities reached by the walk. Used as the graph-entity
    /// set when validating answers.
    pub fn entity_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for entity in &self.entities {
            names.push(entity.name.clone());
            names.extend(entity.relations.iter().map(|r| r.target.clone()));
        }
        for policy in &self.policies {
            names.extend(policy.related_entities.iter().cloned());
        }
        names.extend(self.relationships.related_entities.iter().cloned());
        names.sort();
        names.dedup();
        names
    }
}

/// Hop count for the relationship walk, always within [1, 10]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HopLimit(u32);

impl HopLimit {
    /// Clamp an integer hop count into [1, 10]
    ///
    /// # Examples
    ///
    /// ```
    /// use policylens_domain::HopLimit;
    ///
    /// assert_eq!(HopLimit::clamped(0).get(), 1);
    /// assert_eq!(HopLimit::clamped(15).get(), 10);
    /// assert_eq!(HopLimit::clamped(3).get(), 3);
    /// ```
    pub fn clamped(hops: i64) -> Self {
        Self(hops.clamp(MIN_HOPS as i64, MAX_HOPS as i64) as u32)
    }

    /// Parse raw user input; anything that is not an integer yields the default
    ///
    /// # Examples
    ///
    /// ```
    /// use policylens_domain::HopLimit;
    ///
    /// assert_eq!(HopLimit::parse("4").get(), 4);
    /// assert_eq!(HopLimit::parse("2.5").get(), 2);
    /// assert_eq!(HopLimit::parse("deep").get(), 2);
    /// ```
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(hops) => Self::clamped(hops),
            Err(_) => Self::default(),
        }
    }

    /// The hop count
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for HopLimit {
    fn default() -> Self {
        Self(DEFAULT_MAX_HOPS)
    }
}

impl fmt::Display for HopLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
