//! Integration tests for policylens-engine
//!
//! Runs the full pipeline over the fixture corpus with scripted model
//! replies. Extraction prompts are routed by their role line, answer
//! generation and the faithfulness judge by their opening instructions.

use policylens_domain::QualityLevel;
use policylens_engine::{EngineError, GraphRagEngine, PolicyLensConfig, Source};
use policylens_llm::{MockEmbeddingModel, MockProvider};
use policylens_retrieval::{Corpus, InMemoryGraph, InMemoryVectorIndex};
use std::sync::Arc;

const CORPUS: &str = include_str!("fixtures/corpus.json");
const COMMITTEE: &str = "试验区管委会";
const QUESTION: &str = "试验区管委会负责哪些工作？";
const ANSWER: &str = "试验区管委会负责试验区的开发建设、经济管理和社会事务管理工作。";
const ANSWER_PROMPT: &str = "Answer only from the context";
const JUDGE: &str = "Rate how faithful";

type TestEngine =
    GraphRagEngine<MockProvider, MockEmbeddingModel, InMemoryVectorIndex<Arc<MockEmbeddingModel>>, InMemoryGraph>;

fn scripted() -> MockProvider {
    let mut provider = MockProvider::new("[]");
    provider.add_response(JUDGE, "0.9");
    provider.add_response(ANSWER_PROMPT, ANSWER);
    provider.add_response("Text role: question", r#"["试验区管委会"]"#);
    provider.add_response("Text role: answer", r#"["试验区管委会"]"#);
    provider
}

fn engine_over(provider: MockProvider, corpus: &str) -> TestEngine {
    let corpus = Corpus::from_json(corpus).unwrap();
    GraphRagEngine::from_corpus(
        Arc::new(provider),
        Arc::new(MockEmbeddingModel::new(64)),
        &corpus,
        PolicyLensConfig::default(),
    )
    .unwrap()
}

fn count_prompts(provider: &MockProvider, marker: &str) -> usize {
    provider.prompts().iter().filter(|p| p.contains(marker)).count()
}

#[tokio::test]
async fn test_answer_uses_both_channels() {
    let provider = scripted();
    let recorder = provider.clone();
    let engine = engine_over(provider, CORPUS);

    let response = engine.answer(&format!("  {}\n", QUESTION)).await.unwrap();

    assert_eq!(response.question, QUESTION);
    assert_eq!(response.answer, ANSWER);
    assert_eq!(response.question_entities, vec![COMMITTEE.to_string()]);
    assert!(response.graph_enhanced);
    assert!(!response.request_id.is_empty());

    let documents = response
        .sources
        .iter()
        .filter(|s| matches!(s, Source::Document { .. }))
        .count();
    assert_eq!(documents, 3);
    match response.sources.last() {
        Some(Source::Graph { entities, relations }) => {
            assert_eq!(entities[0], COMMITTEE);
            assert!(relations.contains(&"MANAGES".to_string()));
        }
        other => panic!("expected a graph source last, got {other:?}"),
    }

    let answer_prompt = recorder
        .prompts()
        .into_iter()
        .find(|p| p.contains(ANSWER_PROMPT))
        .unwrap();
    assert!(answer_prompt.contains("Key entities: 试验区管委会"));
    assert_eq!(count_prompts(&recorder, JUDGE), 0);
}

#[tokio::test]
async fn test_invalid_question_makes_no_model_call() {
    let provider = scripted();
    let recorder = provider.clone();
    let engine = engine_over(provider, CORPUS);

    let err = engine.answer(" \t\n").await.unwrap_err();
    assert!(matches!(err, EngineError::ValidationFailure(_)));

    let err = engine.answer(&"问".repeat(1001)).await.unwrap_err();
    assert!(matches!(err, EngineError::ValidationFailure(_)));

    assert_eq!(recorder.call_count(), 0);
}

#[tokio::test]
async fn test_generation_failure_is_service_unavailable() {
    let mut provider = MockProvider::new("[]");
    provider.add_error(ANSWER_PROMPT);
    provider.add_response("Text role: question", r#"["试验区管委会"]"#);
    let engine = engine_over(provider, CORPUS);

    let err = engine.answer(QUESTION).await.unwrap_err();
    assert!(matches!(err, EngineError::ServiceUnavailable(_)), "{err}");
}

#[tokio::test]
async fn test_extraction_failure_only_degrades() {
    let mut provider = MockProvider::new("[]");
    provider.add_response(ANSWER_PROMPT, ANSWER);
    provider.add_error("Text role: question");
    let engine = engine_over(provider, CORPUS);

    let response = engine.answer(QUESTION).await.unwrap();

    // the placeholder entity is never reported or sent to the graph
    assert!(response.question_entities.is_empty());
    assert!(!response.graph_enhanced);
    assert_eq!(response.answer, ANSWER);
    assert!(response
        .sources
        .iter()
        .all(|s| matches!(s, Source::Document { .. })));
}

#[tokio::test]
async fn test_empty_knowledge_base_skips_generation() {
    let provider = scripted();
    let recorder = provider.clone();
    let engine = engine_over(provider, "{}");

    let response = engine.answer(QUESTION).await.unwrap();

    assert_eq!(
        response.answer,
        PolicyLensConfig::default().synthesizer.no_context_answer
    );
    assert!(!response.graph_enhanced);
    assert!(response.sources.is_empty());
    assert_eq!(count_prompts(&recorder, ANSWER_PROMPT), 0);
}

#[tokio::test]
async fn test_answer_with_assessment_reuses_question_entities() {
    let provider = scripted();
    let recorder = provider.clone();
    let engine = engine_over(provider, CORPUS);

    let assessed = engine.answer_with_assessment(QUESTION).await.unwrap();
    let assessment = &assessed.assessment;

    assert_eq!(count_prompts(&recorder, "Text role: question"), 1);
    assert_eq!(count_prompts(&recorder, JUDGE), 1);
    assert!(!matches!(
        assessment.quality_level,
        QualityLevel::Timeout | QualityLevel::Error
    ));
    assert_eq!(assessment.scheme, "entity_aware");
    assert_eq!(assessment.dimension_scores.len(), 5);
    assert_eq!(
        assessment.entity_analysis.question_entities,
        vec![COMMITTEE.to_string()]
    );
    // the committee is in the retrieved neighborhood
    assert!(assessment.entity_analysis.unverified_entities.is_empty());
    assert!(assessed.total_time_ms >= assessed.response.processing_time_ms);

    let json = serde_json::to_value(&assessed).unwrap();
    assert_eq!(json["answer"], ANSWER);
    assert_eq!(json["graph_enhanced"], true);
    assert_eq!(json["sources"][0]["type"], "document");
    assert!(json["assessment"]["overall_score"].is_number());
}

#[tokio::test]
async fn test_scoring_services_are_separate_from_answering() {
    let answering = scripted();
    let answering_recorder = answering.clone();
    let scoring = scripted();
    let scoring_recorder = scoring.clone();
    let engine = engine_over(answering, CORPUS)
        .with_scoring_services(Arc::new(scoring), Arc::new(MockEmbeddingModel::new(64)));

    let assessed = engine.answer_with_assessment(QUESTION).await.unwrap();

    assert_eq!(assessed.response.answer, ANSWER);
    assert_eq!(count_prompts(&answering_recorder, ANSWER_PROMPT), 1);
    assert_eq!(count_prompts(&answering_recorder, JUDGE), 0);
    assert_eq!(count_prompts(&scoring_recorder, JUDGE), 1);
    assert_eq!(count_prompts(&scoring_recorder, ANSWER_PROMPT), 0);
}

#[tokio::test]
async fn test_assess_external_answer() {
    let engine = engine_over(scripted(), CORPUS);
    let passages = vec![ANSWER.to_string()];
    let graph_entities = vec![COMMITTEE.to_string()];

    let assessment = engine
        .assess(QUESTION, ANSWER, &passages, &graph_entities)
        .await;

    assert_eq!(assessment.dimension_scores["entity_coverage"].value, 1.0);
    assert!((0.0..=1.0).contains(&assessment.overall_score));
}

#[tokio::test]
#[ignore = "requires a running Ollama server"]
async fn test_ollama_end_to_end() {
    use policylens_llm::{OllamaEmbeddingModel, OllamaProvider};

    let config = PolicyLensConfig::default();
    let corpus = Corpus::from_json(CORPUS).unwrap();
    let engine = GraphRagEngine::from_corpus(
        Arc::new(OllamaProvider::from_config(&config.llm)),
        Arc::new(OllamaEmbeddingModel::from_config(&config.llm)),
        &corpus,
        config,
    )
    .unwrap();

    let assessed = engine.answer_with_assessment(QUESTION).await.unwrap();
    assert!(!assessed.response.answer.is_empty());
}
