//! Context fusion
//!
//! Merges the question, its extracted entities, the ranked passages, and the
//! graph neighborhood into one size-bounded text block. Sections are written
//! in a fixed priority order (question, entities, passages, graph entities,
//! policies) so that hard truncation always cuts the least important material
//! first. Identical inputs always produce identical output.

use policylens_domain::{
    rank_passages, CompositeContext, EntitySet, GraphNeighborhood, RetrievedPassage, SourceRole,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Written when vector search returned nothing but the graph did
pub const NO_DOCUMENTS_NOTE: &str = "No relevant documents found.";

/// Written when neither channel returned anything
pub const NOTHING_FOUND_NOTE: &str =
    "No relevant information was found in the knowledge base for this question.";

/// Layout limits for the composite context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Hard cap on the fused text, in characters
    pub max_context_chars: usize,

    /// Passages included
    pub max_passages: usize,

    /// Characters kept from each passage
    pub passage_chars: usize,

    /// Graph entities included
    pub max_graph_entities: usize,

    /// Relations listed per graph entity
    pub relations_per_entity: usize,

    /// Policies included
    pub max_policies: usize,

    /// Related entities listed per policy
    pub policy_entities: usize,
}

impl FusionConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_context_chars == 0 {
            return Err("max_context_chars must be greater than 0".to_string());
        }
        if self.passage_chars == 0 {
            return Err("passage_chars must be greater than 0".to_string());
        }
        if self.passage_chars > self.max_context_chars {
            return Err(format!(
                "passage_chars ({}) must not exceed max_context_chars ({})",
                self.passage_chars, self.max_context_chars
            ));
        }
        Ok(())
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 2000,
            max_passages: 3,
            passage_chars: 300,
            max_graph_entities: 3,
            relations_per_entity: 3,
            max_policies: 2,
            policy_entities: 5,
        }
    }
}

/// Builds [`CompositeContext`] values
#[derive(Debug, Clone, Default)]
pub struct ContextFuser {
    config: FusionConfig,
}

fn truncate_chars(text: &str, limit: usize) -> (&str, bool) {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => (&text[..byte_index], true),
        None => (text, false),
    }
}

impl ContextFuser {
    /// Create a fuser with the given layout
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    /// Get the layout configuration
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Fuse one request's retrieval results
    ///
    /// Passages are re-ranked by similarity before the top ones are taken,
    /// so callers may pass them in any order.
    pub fn fuse(
        &self,
        question: &str,
        question_entities: &EntitySet,
        passages: &[RetrievedPassage],
        neighborhood: &GraphNeighborhood,
    ) -> CompositeContext {
        let mut text = String::new();
        text.push_str(&format!("Question: {}\n", question.trim()));

        let names: Vec<&str> = question_entities
            .iter()
            .filter(|e| !e.is_placeholder())
            .map(|e| e.name())
            .collect();
        if names.is_empty() {
            text.push_str("Key entities: none\n");
        } else {
            text.push_str(&format!("Key entities: {}\n", names.join(", ")));
        }

        let has_evidence = !passages.is_empty() || !neighborhood.is_empty();

        if !has_evidence {
            text.push('\n');
            text.push_str(NOTHING_FOUND_NOTE);
        } else {
            self.write_passages(&mut text, passages);
            self.write_graph_entities(&mut text, neighborhood);
            self.write_policies(&mut text, neighborhood);
        }

        let (bounded, _) = truncate_chars(text.trim_end(), self.config.max_context_chars);

        let mut roles = BTreeMap::new();
        roles.insert(SourceRole::Question, question_entities.clone());
        let context = CompositeContext::new(bounded, roles);
        if has_evidence {
            context
        } else {
            context.without_evidence()
        }
    }

    fn write_passages(&self, text: &mut String, passages: &[RetrievedPassage]) {
        text.push_str("\n=== Relevant documents ===\n");
        if passages.is_empty() {
            text.push_str(NO_DOCUMENTS_NOTE);
            text.push('\n');
            return;
        }

        let mut ranked = passages.to_vec();
        rank_passages(&mut ranked);

        for (i, passage) in ranked.iter().take(self.config.max_passages).enumerate() {
            let (excerpt, cut) = truncate_chars(passage.text.trim(), self.config.passage_chars);
            text.push_str(&format!(
                "Document {} (similarity: {:.3}):\n{}{}\n",
                i + 1,
                passage.similarity,
                excerpt,
                if cut { "..." } else { "" }
            ));
            if let Some(title) = passage.title() {
                text.push_str(&format!("Title: {}\n", title));
            }
        }
    }

    fn write_graph_entities(&self, text: &mut String, neighborhood: &GraphNeighborhood) {
        if neighborhood.entities.is_empty() {
            return;
        }
        text.push_str("\n=== Knowledge graph entities ===\n");
        for entity in neighborhood.entities.iter().take(self.config.max_graph_entities) {
            text.push_str(&format!(
                "Entity: {} (type: {})\n",
                entity.name, entity.entity_type
            ));
            let relations: Vec<String> = entity
                .relations
                .iter()
                .take(self.config.relations_per_entity)
                .map(|r| format!("{}→{}", r.relation, r.target))
                .collect();
            if !relations.is_empty() {
                text.push_str(&format!("Relations: {}\n", relations.join(", ")));
            }
        }
    }

    fn write_policies(&self, text: &mut String, neighborhood: &GraphNeighborhood) {
        if neighborhood.policies.is_empty() {
            return;
        }
        text.push_str("\n=== Related policies ===\n");
        for policy in neighborhood.policies.iter().take(self.config.max_policies) {
            text.push_str(&format!("Policy: {}\n", policy.title));
            if let Some(number) = &policy.document_number {
                text.push_str(&format!("Document number: {}\n", number));
            }
            if let Some(agency) = &policy.issuing_agency {
                text.push_str(&format!("Issuing agency: {}\n", agency));
            }
            let entities: Vec<&str> = policy
                .related_entities
                .iter()
                .take(self.config.policy_entities)
                .map(String::as_str)
                .collect();
            if !entities.is_empty() {
                text.push_str(&format!("Entities: {}\n", entities.join(", ")));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policylens_domain::{Entity, EntityType, GraphEntity, GraphRelation, PolicyRef};

    fn question_entities() -> EntitySet {
        vec![Entity::new(
            "华侨经济文化合作试验区",
            EntityType::Location,
            0.9,
            SourceRole::Question,
        )]
        .into_iter()
        .collect()
    }

    fn neighborhood() -> GraphNeighborhood {
        GraphNeighborhood {
            entities: vec![GraphEntity {
                name: "试验区管委会".to_string(),
                entity_type: "ORG".to_string(),
                text: None,
                relations: vec![GraphRelation {
                    relation: "MANAGES".to_string(),
                    target: "华侨经济文化合作试验区".to_string(),
                    target_type: Some("LOCATION".to_string()),
                }],
            }],
            policies: vec![PolicyRef {
                title: "试验区管理办法".to_string(),
                issuing_agency: Some("汕头市人民政府".to_string()),
                related_entities: vec!["试验区管委会".to_string()],
                ..PolicyRef::default()
            }],
            ..GraphNeighborhood::default()
        }
    }

    #[test]
    fn test_sections_in_priority_order() {
        let passages = vec![
            RetrievedPassage::new("low passage", 0.2),
            RetrievedPassage::new("high passage", 0.9).with_metadata("title", "办法"),
        ];
        let context = ContextFuser::default().fuse(
            "试验区的管理机构是什么？",
            &question_entities(),
            &passages,
            &neighborhood(),
        );
        let text = context.text();

        let q = text.find("Question:").unwrap();
        let e = text.find("Key entities: 华侨经济文化合作试验区").unwrap();
        let d = text.find("=== Relevant documents ===").unwrap();
        let g = text.find("Entity: 试验区管委会 (type: ORG)").unwrap();
        let p = text.find("Policy: 试验区管理办法").unwrap();
        assert!(q < e && e < d && d < g && g < p);

        // Best passage first
        assert!(text.find("high passage").unwrap() < text.find("low passage").unwrap());
        assert!(text.contains("Document 1 (similarity: 0.900)"));
        assert!(text.contains("Title: 办法"));
        assert!(text.contains("Relations: MANAGES→华侨经济文化合作试验区"));
        assert!(text.contains("Issuing agency: 汕头市人民政府"));
        assert!(context.has_evidence());
        assert_eq!(context.entities(SourceRole::Question).len(), 1);
    }

    #[test]
    fn test_hard_truncation_by_chars() {
        let passages: Vec<_> = (0..3)
            .map(|i| RetrievedPassage::new("政".repeat(1000), 0.9 - i as f64 * 0.1))
            .collect();
        let config = FusionConfig {
            max_context_chars: 500,
            ..FusionConfig::default()
        };
        let context = ContextFuser::new(config).fuse("问题", &EntitySet::new(), &passages, &neighborhood());
        assert_eq!(context.char_len(), 500);
        assert!(context.text().contains("政政政..."));
    }

    #[test]
    fn test_empty_channels() {
        let fuser = ContextFuser::default();
        let context = fuser.fuse("问题", &EntitySet::new(), &[], &GraphNeighborhood::default());
        assert!(!context.has_evidence());
        assert!(context.text().contains(NOTHING_FOUND_NOTE));
        assert!(context.text().contains("Key entities: none"));

        let graph_only = fuser.fuse("问题", &question_entities(), &[], &neighborhood());
        assert!(graph_only.has_evidence());
        assert!(graph_only.text().contains(NO_DOCUMENTS_NOTE));
    }

    #[test]
    fn test_placeholder_not_listed() {
        let entities: EntitySet = vec![Entity::question_placeholder()].into_iter().collect();
        let context = ContextFuser::default().fuse("", &entities, &[], &GraphNeighborhood::default());
        assert!(context.text().contains("Key entities: none"));
    }

    #[test]
    fn test_deterministic() {
        let passages = vec![
            RetrievedPassage::new("a", 0.5),
            RetrievedPassage::new("b", 0.5),
        ];
        let fuser = ContextFuser::default();
        let first = fuser.fuse("q", &question_entities(), &passages, &neighborhood());
        let second = fuser.fuse("q", &question_entities(), &passages, &neighborhood());
        assert_eq!(first, second);
        assert!(first.text().find("\na\n").unwrap() < first.text().find("\nb\n").unwrap());
    }

    #[test]
    fn test_config_validation() {
        assert!(FusionConfig::default().validate().is_ok());
        let bad = FusionConfig {
            passage_chars: 3000,
            ..FusionConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
