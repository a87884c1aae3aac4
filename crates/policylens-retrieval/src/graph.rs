//! In-memory policy knowledge graph
//!
//! Entities, typed edges between entities, and policy documents that mention
//! entities and are issued by agencies. Name lookups use substring matching
//! against an entity's name or free text, so a short query name such as
//! "试验区" finds "华侨经济文化合作试验区".

use crate::error::RetrievalError;
use policylens_domain::{
    GraphEntity, GraphRelation, GraphStore, HopLimit, NodeKind, PathNode, PolicyRef, RelationCode,
    RelationshipNetwork, RelationshipPath,
};
use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

/// Label of the entity→policy edge
pub const MENTIONED_IN: &str = "MENTIONED_IN";

/// Label of the policy→agency edge
pub const ISSUED_BY: &str = "ISSUED_BY";

/// An entity node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNode {
    /// Entity name
    pub name: String,
    /// Entity type label
    pub entity_type: String,
    /// Free text attached to the node
    pub text: Option<String>,
}

/// A typed edge between two entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Source entity name
    pub source: String,
    /// Edge label
    pub relation: String,
    /// Target entity name
    pub target: String,
}

/// A policy document node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolicyNode {
    /// Policy title
    pub title: String,
    /// Official document number
    pub document_number: Option<String>,
    /// Publication date, ISO formatted so it sorts lexically
    pub publish_date: Option<String>,
    /// Issuing agency
    pub issuing_agency: Option<String>,
    /// Section titles
    pub sections: Vec<String>,
    /// Names of entities mentioned in the policy
    pub mentions: Vec<String>,
}

/// Graph store held in memory
#[derive(Debug, Clone)]
pub struct InMemoryGraph {
    entities: Vec<EntityNode>,
    edges: Vec<Edge>,
    policies: Vec<PolicyNode>,
    top_k: usize,
    path_limit: usize,
}

fn matches_query(node: &EntityNode, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return false;
    }
    node.name.to_lowercase().contains(&query)
        || node
            .text
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(&query))
}

impl InMemoryGraph {
    /// Create an empty graph with the given result limits
    pub fn new(top_k: usize, path_limit: usize) -> Self {
        Self {
            entities: Vec::new(),
            edges: Vec::new(),
            policies: Vec::new(),
            top_k: top_k.max(1),
            path_limit: path_limit.max(1),
        }
    }

    /// Add an entity node; a node with the same name is replaced
    pub fn add_entity(&mut self, node: EntityNode) {
        self.entities.retain(|e| e.name != node.name);
        self.entities.push(node);
    }

    /// Add a typed edge between two entity names
    pub fn add_edge(
        &mut self,
        source: impl Into<String>,
        relation: impl Into<String>,
        target: impl Into<String>,
    ) {
        self.edges.push(Edge {
            source: source.into(),
            relation: relation.into().to_uppercase(),
            target: target.into(),
        });
    }

    /// Add a policy node
    pub fn add_policy(&mut self, policy: PolicyNode) {
        self.policies.push(policy);
    }

    /// Number of entity nodes
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of policy nodes
    pub fn policy_count(&self) -> usize {
        self.policies.len()
    }

    fn entity_type_of(&self, name: &str) -> Option<String> {
        self.entities
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.entity_type.clone())
    }

    fn matching_entities<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a EntityNode> {
        self.entities.iter().filter(move |e| matches_query(e, query))
    }

    fn name_matches(&self, name: &str, query: &str) -> bool {
        match self.entities.iter().find(|e| e.name == name) {
            Some(node) => matches_query(node, query),
            None => name.to_lowercase().contains(&query.trim().to_lowercase()) && !query.trim().is_empty(),
        }
    }

    /// Node list and undirected adjacency over entities, policies, and agencies
    fn adjacency(&self) -> (Vec<PathNode>, Vec<Vec<(usize, String)>>) {
        fn index_of(nodes: &mut Vec<PathNode>, name: &str, kind: NodeKind) -> usize {
            match nodes.iter().position(|n| n.name == name && n.kind == kind) {
                Some(i) => i,
                None => {
                    nodes.push(PathNode {
                        name: name.to_string(),
                        kind,
                    });
                    nodes.len() - 1
                }
            }
        }

        let mut nodes: Vec<PathNode> = Vec::new();
        let mut links: Vec<(usize, usize, String)> = Vec::new();
        for entity in &self.entities {
            index_of(&mut nodes, &entity.name, NodeKind::Entity);
        }
        for edge in &self.edges {
            let a = index_of(&mut nodes, &edge.source, NodeKind::Entity);
            let b = index_of(&mut nodes, &edge.target, NodeKind::Entity);
            links.push((a, b, edge.relation.clone()));
        }
        for policy in &self.policies {
            let p = index_of(&mut nodes, &policy.title, NodeKind::Policy);
            for mention in &policy.mentions {
                let e = index_of(&mut nodes, mention, NodeKind::Entity);
                links.push((e, p, MENTIONED_IN.to_string()));
            }
            if let Some(agency) = &policy.issuing_agency {
                let a = index_of(&mut nodes, agency, NodeKind::Agency);
                links.push((p, a, ISSUED_BY.to_string()));
            }
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (a, b, relation) in links {
            adjacency[a].push((b, relation.clone()));
            adjacency[b].push((a, relation));
        }
        (nodes, adjacency)
    }
}

impl Default for InMemoryGraph {
    fn default() -> Self {
        Self::new(5, 20)
    }
}

impl GraphStore for InMemoryGraph {
    type Error = RetrievalError;

    fn query_entities(&self, names: &[String]) -> Result<Vec<GraphEntity>, Self::Error> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let limit = self.top_k * names.len();
        let mut seen = BTreeSet::new();
        let mut results = Vec::new();

        for name in names {
            for node in self.matching_entities(name) {
                if results.len() >= limit {
                    break;
                }
                if !seen.insert(node.name.clone()) {
                    continue;
                }
                let relations = self
                    .edges
                    .iter()
                    .filter(|edge| edge.source == node.name)
                    .map(|edge| GraphRelation {
                        relation: edge.relation.clone(),
                        target: edge.target.clone(),
                        target_type: self.entity_type_of(&edge.target),
                    })
                    .collect();
                results.push(GraphEntity {
                    name: node.name.clone(),
                    entity_type: node.entity_type.clone(),
                    text: node.text.clone(),
                    relations,
                });
            }
        }

        debug!("Graph entity query for {} names matched {}", names.len(), results.len());
        Ok(results)
    }

    fn query_policies(&self, names: &[String]) -> Result<Vec<PolicyRef>, Self::Error> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut matched: Vec<&PolicyNode> = self
            .policies
            .iter()
            .filter(|policy| {
                policy
                    .mentions
                    .iter()
                    .any(|mention| names.iter().any(|query| self.name_matches(mention, query)))
            })
            .collect();

        // Newest first; undated policies last
        matched.sort_by(|a, b| match (&a.publish_date, &b.publish_date) {
            (Some(x), Some(y)) => y.cmp(x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        matched.truncate(self.top_k);

        Ok(matched
            .into_iter()
            .map(|policy| PolicyRef {
                title: policy.title.clone(),
                document_number: policy.document_number.clone(),
                publish_date: policy.publish_date.clone(),
                issuing_agency: policy.issuing_agency.clone(),
                sections: policy.sections.clone(),
                related_entities: policy.mentions.clone(),
            })
            .collect())
    }

    fn query_relationships(
        &self,
        entity: &str,
        max_hops: HopLimit,
    ) -> Result<RelationshipNetwork, Self::Error> {
        let mut network = RelationshipNetwork::empty(entity);
        if entity.trim().is_empty() {
            return Ok(network);
        }

        let (nodes, adjacency) = self.adjacency();
        let seeds: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.kind == NodeKind::Entity)
            .filter(|(_, node)| {
                self.entities
                    .iter()
                    .any(|e| e.name == node.name && matches_query(e, entity))
            })
            .map(|(i, _)| i)
            .collect();

        let hops = max_hops.get() as usize;
        let mut queue: VecDeque<(Vec<usize>, Vec<String>)> =
            seeds.iter().map(|&s| (vec![s], Vec::new())).collect();

        'walk: while let Some((path, relations)) = queue.pop_front() {
            if relations.len() >= hops {
                continue;
            }
            let Some(&last) = path.last() else {
                continue;
            };
            for (next, relation) in &adjacency[last] {
                if path.contains(next) {
                    continue;
                }
                let mut next_path = path.clone();
                next_path.push(*next);
                let mut next_relations = relations.clone();
                next_relations.push(relation.clone());

                network.paths.push(RelationshipPath {
                    nodes: next_path.iter().map(|&i| nodes[i].clone()).collect(),
                    relations: next_relations.clone(),
                });
                if network.paths.len() >= self.path_limit {
                    break 'walk;
                }
                queue.push_back((next_path, next_relations));
            }
        }

        for path in &network.paths {
            for node in &path.nodes {
                let list = match node.kind {
                    NodeKind::Entity => &mut network.related_entities,
                    NodeKind::Policy => &mut network.related_policies,
                    NodeKind::Agency => continue,
                };
                let is_seed = node.kind == NodeKind::Entity
                    && seeds.iter().any(|&s| nodes[s].name == node.name);
                if !is_seed && !list.contains(&node.name) {
                    list.push(node.name.clone());
                }
            }
        }

        debug!(
            "Relationship walk from '{}' ({} hops) found {} paths",
            entity,
            hops,
            network.paths.len()
        );
        Ok(network)
    }

    fn verify_relation(
        &self,
        pair: (&str, &str),
        relation_types: &[RelationCode],
    ) -> Result<bool, Self::Error> {
        let (first, second) = pair;
        let type_allowed = |label: &str| {
            relation_types.is_empty() || relation_types.iter().any(|code| code.as_str() == label)
        };

        Ok(self.edges.iter().any(|edge| {
            type_allowed(&edge.relation)
                && ((self.name_matches(&edge.source, first) && self.name_matches(&edge.target, second))
                    || (self.name_matches(&edge.source, second)
                        && self.name_matches(&edge.target, first)))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str, entity_type: &str) -> EntityNode {
        EntityNode {
            name: name.to_string(),
            entity_type: entity_type.to_string(),
            text: None,
        }
    }

    fn sample_graph() -> InMemoryGraph {
        let mut graph = InMemoryGraph::new(5, 20);
        graph.add_entity(entity("华侨经济文化合作试验区", "LOCATION"));
        graph.add_entity(entity("试验区管委会", "ORG"));
        graph.add_entity(entity("汕头市人民政府", "ORG"));
        graph.add_edge("试验区管委会", "MANAGES", "华侨经济文化合作试验区");
        graph.add_edge("汕头市人民政府", "supervises", "试验区管委会");
        graph.add_policy(PolicyNode {
            title: "试验区管理办法".to_string(),
            publish_date: Some("2021-05-01".to_string()),
            issuing_agency: Some("汕头市人民政府".to_string()),
            mentions: vec!["华侨经济文化合作试验区".to_string(), "试验区管委会".to_string()],
            ..PolicyNode::default()
        });
        graph.add_policy(PolicyNode {
            title: "旧办法".to_string(),
            publish_date: Some("2015-01-01".to_string()),
            mentions: vec!["试验区管委会".to_string()],
            ..PolicyNode::default()
        });
        graph
    }

    #[test]
    fn test_query_entities_by_substring() {
        let graph = sample_graph();
        let found = graph.query_entities(&["试验区".to_string()]).unwrap();
        let names: Vec<_> = found.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["华侨经济文化合作试验区", "试验区管委会"]);

        let manager = &found[1];
        assert_eq!(manager.relations.len(), 1);
        assert_eq!(manager.relations[0].relation, "MANAGES");
        assert_eq!(manager.relations[0].target_type.as_deref(), Some("LOCATION"));
    }

    #[test]
    fn test_query_entities_empty_input() {
        assert!(sample_graph().query_entities(&[]).unwrap().is_empty());
        assert!(sample_graph().query_entities(&["  ".to_string()]).unwrap().is_empty());
    }

    #[test]
    fn test_query_policies_newest_first() {
        let graph = sample_graph();
        let policies = graph.query_policies(&["管委会".to_string()]).unwrap();
        assert_eq!(policies.len(), 2);
        assert_eq!(policies[0].title, "试验区管理办法");
        assert_eq!(policies[0].issuing_agency.as_deref(), Some("汕头市人民政府"));
    }

    #[test]
    fn test_relationship_walk_respects_hops() {
        let graph = sample_graph();
        let one = graph
            .query_relationships("华侨经济文化合作试验区", HopLimit::clamped(1))
            .unwrap();
        assert!(one.paths.iter().all(|p| p.hops() == 1));
        assert!(one.related_entities.contains(&"试验区管委会".to_string()));
        assert!(one.related_policies.contains(&"试验区管理办法".to_string()));
        assert!(!one.related_entities.contains(&"华侨经济文化合作试验区".to_string()));

        let two = graph
            .query_relationships("华侨经济文化合作试验区", HopLimit::clamped(2))
            .unwrap();
        assert!(two.paths.len() > one.paths.len());
        assert!(two.paths.iter().any(|p| p.hops() == 2));
        assert!(two.related_entities.contains(&"汕头市人民政府".to_string()));
    }

    #[test]
    fn test_relationship_walk_path_limit() {
        let mut graph = InMemoryGraph::new(5, 3);
        graph.add_entity(entity("hub", "ORG"));
        for i in 0..10 {
            graph.add_edge("hub", "MANAGES", format!("spoke{i}"));
        }
        let network = graph.query_relationships("hub", HopLimit::clamped(10)).unwrap();
        assert_eq!(network.paths.len(), 3);
    }

    #[test]
    fn test_relationship_walk_unknown_entity() {
        let network = sample_graph()
            .query_relationships("不存在", HopLimit::default())
            .unwrap();
        assert_eq!(network.center_entity, "不存在");
        assert!(network.paths.is_empty());
    }

    #[test]
    fn test_verify_relation() {
        let graph = sample_graph();
        assert!(graph
            .verify_relation(("管委会", "试验区"), &[RelationCode::Manages])
            .unwrap());
        // Either direction
        assert!(graph
            .verify_relation(("合作试验区", "管委会"), &[RelationCode::Manages])
            .unwrap());
        assert!(!graph
            .verify_relation(("管委会", "试验区"), &[RelationCode::Approves])
            .unwrap());
        assert!(graph.verify_relation(("管委会", "汕头市"), &[]).unwrap());
    }
}
