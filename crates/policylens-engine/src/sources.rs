//! Source attribution for answers

use policylens_domain::{GraphNeighborhood, RetrievedPassage};
use serde::{Deserialize, Serialize};

/// Document sources reported per answer
pub const MAX_DOCUMENT_SOURCES: usize = 3;

/// Characters of passage text kept in a preview
pub const PREVIEW_CHARS: usize = 100;

const GRAPH_ENTITIES: usize = 3;
const RELATIONS_PER_ENTITY: usize = 2;
const UNKNOWN_TITLE: &str = "Unknown document";

/// Where part of an answer came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Source {
    /// A passage from vector search
    Document {
        /// Title metadata, or a placeholder when the passage has none
        title: String,
        /// Similarity to the question
        relevance: f64,
        /// Leading text of the passage
        content_preview: String,
    },

    /// Entities from the knowledge graph
    #[serde(rename = "graph_entity")]
    Graph {
        /// Names of the leading matched entities
        entities: Vec<String>,
        /// Distinct relation types seen on those entities
        relations: Vec<String>,
    },
}

/// Build the source list for one answer
///
/// Passages are expected best first, as the retriever returns them.
pub fn build_sources(passages: &[RetrievedPassage], neighborhood: &GraphNeighborhood) -> Vec<Source> {
    let mut sources: Vec<Source> = passages
        .iter()
        .take(MAX_DOCUMENT_SOURCES)
        .map(|passage| Source::Document {
            title: passage
                .metadata
                .get("title")
                .cloned()
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            relevance: passage.similarity,
            content_preview: preview(&passage.text),
        })
        .collect();

    if !neighborhood.entities.is_empty() {
        let leading = &neighborhood.entities[..neighborhood.entities.len().min(GRAPH_ENTITIES)];
        let mut relations: Vec<String> = Vec::new();
        for relation in leading
            .iter()
            .flat_map(|e| e.relations.iter().take(RELATIONS_PER_ENTITY))
        {
            if !relations.contains(&relation.relation) {
                relations.push(relation.relation.clone());
            }
        }
        sources.push(Source::Graph {
            entities: leading.iter().map(|e| e.name.clone()).collect(),
            relations,
        });
    }

    sources
}

fn preview(text: &str) -> String {
    let end = text
        .char_indices()
        .nth(PREVIEW_CHARS)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use policylens_domain::{GraphEntity, GraphRelation};

    fn entity(name: &str, relations: &[&str]) -> GraphEntity {
        GraphEntity {
            name: name.to_string(),
            entity_type: "ORG".to_string(),
            text: None,
            relations: relations
                .iter()
                .map(|r| GraphRelation {
                    relation: r.to_string(),
                    target: "target".to_string(),
                    target_type: Some("ORG".to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn test_document_sources_are_capped_and_previewed() {
        let mut titled = RetrievedPassage::new("短文", 0.9);
        titled.metadata.insert("title".to_string(), "试验区条例".to_string());
        let passages = vec![
            titled,
            RetrievedPassage::new("条".repeat(150), 0.8),
            RetrievedPassage::new("c", 0.7),
            RetrievedPassage::new("d", 0.6),
        ];

        let sources = build_sources(&passages, &GraphNeighborhood::default());
        assert_eq!(sources.len(), MAX_DOCUMENT_SOURCES);

        match &sources[0] {
            Source::Document { title, content_preview, .. } => {
                assert_eq!(title, "试验区条例");
                assert_eq!(content_preview, "短文...");
            }
            other => panic!("unexpected source {other:?}"),
        }
        match &sources[1] {
            Source::Document { title, content_preview, .. } => {
                assert_eq!(title, UNKNOWN_TITLE);
                assert_eq!(content_preview.chars().count(), PREVIEW_CHARS + 3);
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn test_graph_source_takes_first_relations_of_leading_entities() {
        let neighborhood = GraphNeighborhood {
            entities: vec![
                entity("A", &["MANAGES", "LOCATED_IN", "ISSUED"]),
                entity("B", &["MANAGES"]),
                entity("C", &["SUPERVISES"]),
                entity("D", &["IGNORED"]),
            ],
            ..GraphNeighborhood::default()
        };

        let sources = build_sources(&[], &neighborhood);
        assert_eq!(
            sources,
            vec![Source::Graph {
                entities: vec!["A".into(), "B".into(), "C".into()],
                relations: vec!["MANAGES".into(), "LOCATED_IN".into(), "SUPERVISES".into()],
            }]
        );
    }

    #[test]
    fn test_source_type_tags() {
        let graph = Source::Graph {
            entities: vec![],
            relations: vec![],
        };
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["type"], "graph_entity");

        let doc = Source::Document {
            title: "t".into(),
            relevance: 0.5,
            content_preview: "p...".into(),
        };
        assert_eq!(serde_json::to_value(&doc).unwrap()["type"], "document");
    }
}
