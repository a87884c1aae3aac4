//! End-to-end question answering

use crate::config::PolicyLensConfig;
use crate::error::EngineError;
use crate::question::validate_question;
use crate::sources::{build_sources, Source};
use policylens_domain::{
    EmbeddingModel, Entity, EntitySet, GraphStore, LlmProvider, RequestId, SourceRole,
    TrustAssessment, VectorSearch,
};
use policylens_extractor::{Extractor, ExtractorConfig};
use policylens_retrieval::{
    ContextFuser, ContextRetriever, Corpus, InMemoryGraph, InMemoryVectorIndex, RetrievalOutcome,
};
use policylens_synthesizer::AnswerSynthesizer;
use policylens_trust::{AssessmentRequest, TrustEngine};
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// What `answer` returns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResponse {
    /// Identifier used in the log lines of this request
    pub request_id: String,
    /// The validated question
    pub question: String,
    /// The generated answer, or a fixed sentence when nothing was found
    pub answer: String,
    /// Documents and graph entities the answer drew on
    pub sources: Vec<Source>,
    /// Entities found in the question
    pub question_entities: Vec<String>,
    /// Whether the knowledge graph contributed anything
    pub graph_enhanced: bool,
    /// Wall-clock time to answer
    pub processing_time_ms: u64,
}

/// An answer together with its trust assessment
#[derive(Debug, Clone, Serialize)]
pub struct AssessedAnswer {
    /// The answer
    #[serde(flatten)]
    pub response: AnswerResponse,
    /// Trust scoring of the answer
    pub assessment: TrustAssessment,
    /// Wall-clock time for answering and scoring
    pub total_time_ms: u64,
}

/// Intermediate results kept for the assessment stage
struct Answered {
    response: AnswerResponse,
    question_entities: EntitySet,
    outcome: RetrievalOutcome,
}

/// Graph-enhanced question answering with trust scoring
///
/// Stages run strictly in order: entity extraction, dual-channel retrieval,
/// fusion, synthesis, and optionally scoring. Only synthesis and input
/// validation can fail the request.
pub struct GraphRagEngine<L, E, V, G>
where
    L: LlmProvider,
{
    extractor: Extractor<L>,
    retriever: Arc<ContextRetriever<V, Arc<G>>>,
    fuser: ContextFuser,
    synthesizer: AnswerSynthesizer<L>,
    trust: TrustEngine<L, E, G>,
}

impl<L, E, V, G> GraphRagEngine<L, E, V, G>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
    E: EmbeddingModel + Send + Sync + 'static,
    E::Error: Display,
    V: VectorSearch + Send + Sync + 'static,
    V::Error: Display,
    G: GraphStore + Send + Sync + 'static,
    G::Error: Display,
{
    /// Assemble the pipeline over shared services
    ///
    /// The model provider is shared by extraction, synthesis, and the
    /// faithfulness judge; the graph by retrieval and relation verification.
    pub fn new(llm: Arc<L>, embedder: Arc<E>, vector: V, graph: Arc<G>, config: PolicyLensConfig) -> Self {
        let PolicyLensConfig {
            extractor,
            retrieval,
            synthesizer,
            trust,
            ..
        } = config;

        let fuser = ContextFuser::new(retrieval.fusion.clone());
        let scoring_extractor = ExtractorConfig {
            max_text_length: trust.max_text_length,
            ..extractor.clone()
        };

        Self {
            extractor: Extractor::from_shared(Arc::clone(&llm), extractor),
            retriever: Arc::new(ContextRetriever::new(vector, Arc::clone(&graph), retrieval)),
            fuser,
            synthesizer: AnswerSynthesizer::from_shared(Arc::clone(&llm), synthesizer),
            trust: TrustEngine::new(llm, embedder, graph, trust).with_extractor_config(scoring_extractor),
        }
    }

    /// Score answers with dedicated model and embedding clients
    ///
    /// Extraction and synthesis keep the services given to [`Self::new`].
    pub fn with_scoring_services(mut self, llm: Arc<L>, embedder: Arc<E>) -> Self {
        self.trust = self.trust.with_services(llm, embedder);
        self
    }

    /// Answer a question
    ///
    /// # Errors
    ///
    /// - [`EngineError::ValidationFailure`] for an empty or overlong question
    /// - [`EngineError::ServiceUnavailable`] when answer generation fails
    pub async fn answer(&self, question: &str) -> Result<AnswerResponse, EngineError> {
        Ok(self.run(question).await?.response)
    }

    /// Answer a question, then score the answer
    ///
    /// The assessment reuses the question entities found while answering and
    /// checks the answer against the retrieved passages and graph entities.
    pub async fn answer_with_assessment(&self, question: &str) -> Result<AssessedAnswer, EngineError> {
        let start = Instant::now();
        let answered = self.run(question).await?;

        let request = AssessmentRequest::new(
            answered.response.question.clone(),
            answered.response.answer.clone(),
        )
        .with_passages(answered.outcome.passages.iter().map(|p| p.text.clone()))
        .with_graph_entities(answered.outcome.neighborhood.entity_names())
        .with_question_entities(answered.question_entities);

        let assessment = self.trust.assess_request(request).await;
        let total_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Request {} assessed: {} ({:.3}, risk {})",
            answered.response.request_id,
            assessment.quality_level,
            assessment.overall_score,
            assessment.risk_level
        );

        Ok(AssessedAnswer {
            response: answered.response,
            assessment,
            total_time_ms,
        })
    }

    /// Score an answer produced elsewhere; never fails
    pub async fn assess(
        &self,
        question: &str,
        answer: &str,
        context_passages: &[String],
        graph_entities: &[String],
    ) -> TrustAssessment {
        self.trust
            .assess(question, answer, context_passages, graph_entities)
            .await
    }

    async fn run(&self, raw_question: &str) -> Result<Answered, EngineError> {
        let start = Instant::now();
        let request_id = RequestId::new();
        let question = validate_question(raw_question)?;
        info!("Request {}: answering {:?}", request_id, question);

        let question_entities = self.extractor.extract_set(&question, SourceRole::Question).await;
        debug!("Request {}: {} question entities", request_id, question_entities.len());

        let outcome = self.retrieve(&question, &question_entities).await?;
        let context = self.fuser.fuse(
            &question,
            &question_entities,
            &outcome.passages,
            &outcome.neighborhood,
        );
        debug!("Request {}: fused context of {} chars", request_id, context.char_len());

        let answer = self.synthesizer.synthesize(&question, &context).await?;
        let sources = build_sources(&outcome.passages, &outcome.neighborhood);
        let graph_enhanced = outcome.graph_enhanced();
        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Request {} answered in {} ms ({} sources, graph enhanced: {})",
            request_id,
            processing_time_ms,
            sources.len(),
            graph_enhanced
        );

        Ok(Answered {
            response: AnswerResponse {
                request_id: request_id.to_string(),
                question,
                answer,
                sources,
                question_entities: question_entities
                    .iter()
                    .filter(|e| !e.is_placeholder())
                    .map(|e| e.name().to_string())
                    .collect(),
                graph_enhanced,
                processing_time_ms,
            },
            question_entities,
            outcome,
        })
    }

    async fn retrieve(&self, question: &str, entities: &EntitySet) -> Result<RetrievalOutcome, EngineError> {
        let retriever = Arc::clone(&self.retriever);
        let question = question.to_string();
        let entities: Vec<Entity> = entities.iter().cloned().collect();

        // Backends are blocking calls
        tokio::task::spawn_blocking(move || retriever.retrieve(&question, &entities))
            .await
            .map_err(|e| EngineError::ServiceUnavailable(format!("Retrieval task failed: {}", e)))
    }
}

impl<L, E> GraphRagEngine<L, E, InMemoryVectorIndex<Arc<E>>, InMemoryGraph>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
    E: EmbeddingModel + Send + Sync + 'static,
    E::Error: Display,
{
    /// Assemble the pipeline over the in-memory backends built from a corpus
    ///
    /// Every corpus document is embedded up front.
    ///
    /// # Errors
    ///
    /// [`EngineError::ServiceUnavailable`] when a document cannot be embedded.
    pub fn from_corpus(
        llm: Arc<L>,
        embedder: Arc<E>,
        corpus: &Corpus,
        config: PolicyLensConfig,
    ) -> Result<Self, EngineError> {
        let index = corpus
            .build_index(Arc::clone(&embedder))
            .map_err(|e| EngineError::ServiceUnavailable(format!("Failed to index corpus: {}", e)))?;
        let graph = corpus.build_graph(config.retrieval.graph_top_k, config.retrieval.path_limit);
        info!(
            "Indexed {} corpus documents",
            corpus.documents.len()
        );
        Ok(Self::new(llm, embedder, index, Arc::new(graph), config))
    }
}
