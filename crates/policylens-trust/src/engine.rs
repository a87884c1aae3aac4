//! Trust engine: entity resolution, parallel dimension scoring, combination
//!
//! One assessment walks `Idle → EntitiesResolved → DimensionsComputing →
//! Combined → Done`. Entity extraction and every dimension run under a
//! single wall-clock budget; when it expires the still-running work is
//! dropped and a `timeout` assessment is returned. A scorer that panics ends
//! the run with an `error` assessment. Callers always get a well-formed
//! [`TrustAssessment`].

use crate::config::TrustConfig;
use crate::dimensions::{graph_entity_keys, DimensionScorer, ScoringInput};
use crate::error::TrustError;
use policylens_domain::{
    DimensionScore, EmbeddingModel, EntityAnalysis, EntitySet, GraphStore, LlmProvider,
    SourceRole, TrustAssessment,
};
use policylens_extractor::{Extractor, ExtractorConfig};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Progress of one assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentState {
    /// Nothing done yet; entity extraction runs from here
    Idle,
    /// Question, answer, and context entities are known
    EntitiesResolved,
    /// Dimension scorers are running
    DimensionsComputing,
    /// Dimension scores are combined into a verdict
    Combined,
    /// Assessment delivered
    Done,
    /// Budget exceeded
    TimedOut,
    /// Unrecoverable failure
    Errored,
}

impl AssessmentState {
    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::TimedOut | Self::Errored)
    }

    /// Whether `next` may follow this state
    pub fn can_transition_to(&self, next: AssessmentState) -> bool {
        use AssessmentState::*;
        match (*self, next) {
            (Idle, EntitiesResolved)
            | (EntitiesResolved, DimensionsComputing)
            | (DimensionsComputing, Combined)
            | (Combined, Done) => true,
            (Idle | EntitiesResolved | DimensionsComputing, TimedOut) => true,
            (from, Errored) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Per-assessment state holder
struct StateTracker {
    state: Mutex<AssessmentState>,
}

impl StateTracker {
    fn new() -> Self {
        Self {
            state: Mutex::new(AssessmentState::Idle),
        }
    }

    fn advance(&self, next: AssessmentState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.can_transition_to(next) {
            debug!("Assessment state {:?} -> {:?}", *state, next);
            *state = next;
        } else {
            warn!("Ignoring assessment transition {:?} -> {:?}", *state, next);
        }
    }

    fn current(&self) -> AssessmentState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// What to assess
#[derive(Debug, Clone, Default)]
pub struct AssessmentRequest {
    /// The user's question
    pub question: String,
    /// The answer under assessment
    pub answer: String,
    /// Retrieved passage texts, best first
    pub passages: Vec<String>,
    /// Names of entities the graph channel returned
    pub graph_entities: Vec<String>,
    /// Question entities already extracted upstream
    pub question_entities: Option<EntitySet>,
}

impl AssessmentRequest {
    /// Request for a question and its answer, with no context
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            ..Self::default()
        }
    }

    /// Attach the retrieved passages
    pub fn with_passages<I, S>(mut self, passages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.passages = passages.into_iter().map(Into::into).collect();
        self
    }

    /// Attach the graph entity names
    pub fn with_graph_entities<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.graph_entities = names.into_iter().map(Into::into).collect();
        self
    }

    /// Reuse question entities instead of extracting them again
    pub fn with_question_entities(mut self, entities: EntitySet) -> Self {
        self.question_entities = Some(entities);
        self
    }
}

/// Scores how far an answer can be trusted
///
/// # Examples
///
/// ```
/// use policylens_llm::{MockEmbeddingModel, MockProvider};
/// use policylens_retrieval::InMemoryGraph;
/// use policylens_trust::{TrustConfig, TrustEngine};
/// use std::sync::Arc;
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let engine = TrustEngine::new(
///     Arc::new(MockProvider::new("[]")),
///     Arc::new(MockEmbeddingModel::new(64)),
///     Arc::new(InMemoryGraph::default()),
///     TrustConfig::default(),
/// );
/// let assessment = runtime.block_on(engine.assess("question", "answer", &[], &[]));
/// assert!((0.0..=1.0).contains(&assessment.overall_score));
/// ```
pub struct TrustEngine<L, E, G>
where
    L: LlmProvider,
{
    extractor: Extractor<L>,
    llm: Arc<L>,
    embedder: Arc<E>,
    graph: Arc<G>,
    config: TrustConfig,
}

impl<L, E, G> Clone for TrustEngine<L, E, G>
where
    L: LlmProvider,
{
    fn clone(&self) -> Self {
        Self {
            extractor: self.extractor.clone(),
            llm: Arc::clone(&self.llm),
            embedder: Arc::clone(&self.embedder),
            graph: Arc::clone(&self.graph),
            config: self.config.clone(),
        }
    }
}

impl<L, E, G> TrustEngine<L, E, G>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
    E: EmbeddingModel + Send + Sync + 'static,
    E::Error: Display,
    G: GraphStore + Send + Sync + 'static,
    G::Error: Display,
{
    /// Create an engine over shared services
    ///
    /// The internal extractor truncates texts to `config.max_text_length`.
    pub fn new(llm: Arc<L>, embedder: Arc<E>, graph: Arc<G>, config: TrustConfig) -> Self {
        let extractor_config = ExtractorConfig {
            max_text_length: config.max_text_length,
            ..ExtractorConfig::default()
        };
        Self {
            extractor: Extractor::from_shared(Arc::clone(&llm), extractor_config),
            llm,
            embedder,
            graph,
            config,
        }
    }

    /// Replace the configuration of the internal extractor
    pub fn with_extractor_config(mut self, extractor_config: ExtractorConfig) -> Self {
        self.extractor = Extractor::from_shared(Arc::clone(&self.llm), extractor_config);
        self
    }

    /// Swap the model and embedding services, keeping graph and configuration
    ///
    /// Lets scoring use clients whose request timeout fits the budget while
    /// other stages keep their own.
    pub fn with_services(self, llm: Arc<L>, embedder: Arc<E>) -> Self {
        let extractor_config = self.extractor.config().clone();
        Self {
            extractor: Extractor::from_shared(Arc::clone(&llm), extractor_config),
            llm,
            embedder,
            graph: self.graph,
            config: self.config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &TrustConfig {
        &self.config
    }

    /// Assess an answer against its passages and graph entities
    pub async fn assess(
        &self,
        question: &str,
        answer: &str,
        passages: &[String],
        graph_entities: &[String],
    ) -> TrustAssessment {
        let request = AssessmentRequest::new(question, answer)
            .with_passages(passages.iter().cloned())
            .with_graph_entities(graph_entities.iter().cloned());
        self.assess_request(request).await
    }

    /// Assess a prepared request; never fails
    pub async fn assess_request(&self, request: AssessmentRequest) -> TrustAssessment {
        let start = Instant::now();
        let tracker = StateTracker::new();
        let scheme = self.config.scheme;

        let outcome = timeout(self.config.budget(), self.run(request, &tracker)).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(mut assessment)) => {
                tracker.advance(AssessmentState::Done);
                assessment.processing_time_ms = elapsed_ms;
                info!(
                    "Assessment ({}) scored {:.3} ({}) in {} ms",
                    scheme, assessment.overall_score, assessment.quality_level, elapsed_ms
                );
                assessment
            }
            Ok(Err(e)) => {
                tracker.advance(AssessmentState::Errored);
                error!("Assessment failed: {}", e);
                TrustAssessment::errored(scheme.as_str(), e, elapsed_ms)
            }
            Err(_) => {
                let stalled_in = tracker.current();
                tracker.advance(AssessmentState::TimedOut);
                let e = TrustError::Timeout {
                    budget_ms: self.config.budget_ms,
                };
                warn!("{} (stalled in {:?})", e, stalled_in);
                TrustAssessment::timed_out(scheme.as_str(), self.config.budget_ms, elapsed_ms)
            }
        }
    }

    async fn run(
        &self,
        request: AssessmentRequest,
        tracker: &StateTracker,
    ) -> Result<TrustAssessment, TrustError> {
        let input = Arc::new(self.resolve_entities(request).await);
        tracker.advance(AssessmentState::EntitiesResolved);

        let scheme = self.config.scheme;
        let scorers = scheme.scorers(&self.config, &self.llm, &self.embedder, &self.graph);
        tracker.advance(AssessmentState::DimensionsComputing);
        let mut scores = self.compute(scorers, &input).await?;

        scheme.derive(&mut scores, &self.config);
        let verdict = scheme.combine(&scores, &self.config);
        tracker.advance(AssessmentState::Combined);

        Ok(TrustAssessment {
            overall_score: verdict.overall_score,
            quality_level: verdict.quality_level,
            risk_level: verdict.risk_level,
            dimension_scores: scores,
            warnings: verdict.warnings,
            diagnosis: verdict.diagnosis,
            entity_analysis: entity_analysis(&input),
            processing_time_ms: 0,
            scheme: scheme.as_str().to_string(),
        })
    }

    async fn resolve_entities(&self, request: AssessmentRequest) -> ScoringInput {
        let AssessmentRequest {
            question,
            answer,
            passages,
            graph_entities,
            question_entities,
        } = request;

        let context_text = passages
            .iter()
            .take(self.config.context_passages)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");

        let question_side = async {
            match question_entities {
                Some(entities) => entities,
                None => self.extractor.extract_set(&question, SourceRole::Question).await,
            }
        };
        let (question_entities, answer_entities, context_entities) = tokio::join!(
            question_side,
            self.extractor.extract_set(&answer, SourceRole::Answer),
            self.extractor.extract_set(&context_text, SourceRole::Passage),
        );
        debug!(
            "Resolved entities: {} question, {} answer, {} context",
            question_entities.len(),
            answer_entities.len(),
            context_entities.len()
        );

        ScoringInput {
            question,
            answer,
            passages,
            context_text,
            graph_entities: graph_entity_keys(&graph_entities),
            question_entities,
            answer_entities,
            context_entities,
        }
    }

    async fn compute(
        &self,
        scorers: Vec<Arc<dyn DimensionScorer>>,
        input: &Arc<ScoringInput>,
    ) -> Result<BTreeMap<String, DimensionScore>, TrustError> {
        let workers = Arc::new(Semaphore::new(self.config.parallel_workers));
        let mut tasks = JoinSet::new();

        for scorer in scorers {
            let permit = Arc::clone(&workers)
                .acquire_owned()
                .await
                .map_err(|e| TrustError::Internal(format!("Worker pool closed: {}", e)))?;
            let input = Arc::clone(input);
            tasks.spawn_blocking(move || {
                let _permit = permit;
                scorer.score(&input)
            });
        }

        let mut scores = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let score = joined
                .map_err(|e| TrustError::Internal(format!("Dimension scorer failed: {}", e)))?;
            debug!("Dimension {} = {:.3}", score.name, score.value);
            scores.insert(score.name.clone(), score);
        }
        Ok(scores)
    }
}

fn entity_analysis(input: &ScoringInput) -> EntityAnalysis {
    EntityAnalysis {
        question_entities: input.question_entities.names(),
        answer_entities: input.answer_entities.names(),
        context_entities: input.context_entities.names(),
        missing_entities: input
            .question_entities
            .difference(&input.answer_entities)
            .map(|e| e.name().to_string())
            .collect(),
        unverified_entities: input.unverified_answer_entities(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        use AssessmentState::*;
        let path = [Idle, EntitiesResolved, DimensionsComputing, Combined, Done];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
        assert!(!Idle.can_transition_to(Combined));
        assert!(!Done.can_transition_to(Idle));
    }

    #[test]
    fn test_terminal_transitions() {
        use AssessmentState::*;
        assert!(DimensionsComputing.can_transition_to(TimedOut));
        assert!(EntitiesResolved.can_transition_to(TimedOut));
        assert!(!Combined.can_transition_to(TimedOut));
        assert!(Combined.can_transition_to(Errored));
        assert!(!TimedOut.can_transition_to(Errored));
        assert!(Done.is_terminal() && TimedOut.is_terminal() && Errored.is_terminal());
    }

    #[test]
    fn test_tracker_ignores_invalid_transition() {
        let tracker = StateTracker::new();
        tracker.advance(AssessmentState::Combined);
        assert_eq!(tracker.current(), AssessmentState::Idle);
        tracker.advance(AssessmentState::EntitiesResolved);
        assert_eq!(tracker.current(), AssessmentState::EntitiesResolved);
    }

    #[test]
    fn test_request_builder() {
        let request = AssessmentRequest::new("q", "a")
            .with_passages(["p1", "p2"])
            .with_graph_entities(vec!["g".to_string()]);
        assert_eq!(request.passages.len(), 2);
        assert_eq!(request.graph_entities, vec!["g".to_string()]);
        assert!(request.question_entities.is_none());
    }
}
