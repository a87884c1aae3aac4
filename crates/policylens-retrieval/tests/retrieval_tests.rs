//! Integration tests for policylens-retrieval
//!
//! Loads the fixture corpus from disk and runs both channels plus fusion.

use policylens_domain::{Entity, EntitySet, EntityType, GraphStore, HopLimit, SourceRole};
use policylens_llm::MockEmbeddingModel;
use policylens_retrieval::{
    ContextFuser, ContextRetriever, Corpus, InMemoryGraph, InMemoryVectorIndex, RetrievalConfig,
};
use std::io::Write;

const CORPUS: &str = include_str!("fixtures/corpus.json");

const MANAGER_PASSAGE: &str =
    "汕头华侨经济文化合作试验区管理委员会是市人民政府的派出机构，负责试验区的开发建设、经济管理和社会事务管理工作。";

fn retriever(
    config: RetrievalConfig,
) -> ContextRetriever<InMemoryVectorIndex<MockEmbeddingModel>, InMemoryGraph> {
    let corpus = Corpus::from_json(CORPUS).unwrap();
    let index = corpus.build_index(MockEmbeddingModel::new(64)).unwrap();
    let graph = corpus.build_graph(config.graph_top_k, config.path_limit);
    ContextRetriever::new(index, graph, config)
}

fn zone() -> Entity {
    Entity::new(
        "华侨经济文化合作试验区",
        EntityType::Location,
        0.95,
        SourceRole::Question,
    )
}

#[test]
fn test_corpus_loads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CORPUS.as_bytes()).unwrap();

    let corpus = Corpus::load(file.path()).unwrap();
    assert_eq!(corpus.documents.len(), 4);
    assert_eq!(corpus.policies.len(), 2);
}

#[test]
fn test_retrieve_both_channels() {
    let retriever = retriever(RetrievalConfig::default());
    let outcome = retriever.retrieve(MANAGER_PASSAGE, &[zone()]);

    assert_eq!(outcome.passages.len(), 4);
    assert_eq!(outcome.passages[0].text, MANAGER_PASSAGE);
    assert!(outcome.passages[0].similarity > 0.99);
    assert!(outcome
        .passages
        .windows(2)
        .all(|w| w[0].similarity >= w[1].similarity));

    assert!(outcome.graph_enhanced());
    assert_eq!(outcome.neighborhood.entities[0].name, "华侨经济文化合作试验区");
    // Newest policy first
    assert_eq!(outcome.neighborhood.policies[0].title, "试验区产业扶持办法");
    assert!(outcome
        .neighborhood
        .relationships
        .related_entities
        .contains(&"汕头市人民政府".to_string()));
}

#[test]
fn test_fused_context_is_bounded() {
    let config = RetrievalConfig::default();
    let retriever = retriever(config.clone());
    let question = "华侨经济文化合作试验区的管理机构是什么？";
    let outcome = retriever.retrieve(question, &[zone()]);

    let entities: EntitySet = vec![zone()].into_iter().collect();
    let context = ContextFuser::new(config.fusion.clone()).fuse(
        question,
        &entities,
        &outcome.passages,
        &outcome.neighborhood,
    );

    assert!(context.char_len() <= config.fusion.max_context_chars);
    assert!(context.has_evidence());
    assert!(context.text().starts_with("Question: 华侨经济文化合作试验区的管理机构是什么？"));
    assert!(context.text().contains("Document 3"));
    assert!(!context.text().contains("Document 4"));
    assert!(context.text().contains("Issuing agency: 汕头市人民代表大会常务委员会"));
}

#[test]
fn test_hop_limit_changes_walk() {
    let corpus = Corpus::from_json(CORPUS).unwrap();
    let graph = corpus.build_graph(5, 100);

    let near = graph
        .query_relationships("汕头市人民政府", HopLimit::clamped(1))
        .unwrap();
    let far = graph
        .query_relationships("汕头市人民政府", HopLimit::clamped(3))
        .unwrap();
    assert!(far.paths.len() > near.paths.len());
    assert!(near.paths.iter().all(|p| p.hops() == 1));

    let zone = "华侨经济文化合作试验区".to_string();
    assert!(near.related_entities.contains(&"试验区管委会".to_string()));
    assert!(!near.related_entities.contains(&zone));
    assert!(far.related_entities.contains(&zone));
}

#[test]
fn test_max_hops_from_toml() {
    let config = RetrievalConfig::from_toml("max_hops = 0\ntop_k = 2").unwrap();
    assert_eq!(config.max_hops.get(), 1);

    let retriever = retriever(config);
    let outcome = retriever.retrieve("问题", &[zone()]);
    assert_eq!(outcome.passages.len(), 2);
    assert!(outcome
        .neighborhood
        .relationships
        .paths
        .iter()
        .all(|p| p.hops() == 1));
}
