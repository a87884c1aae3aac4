//! Command implementations.

pub mod ask;
pub mod assess;
pub mod config;

pub use self::ask::execute_ask;
pub use self::assess::execute_assess;
pub use self::config::execute_config;

use crate::error::Result;
use policylens_engine::{EngineError, GraphRagEngine, PolicyLensConfig};
use policylens_llm::{OllamaEmbeddingModel, OllamaProvider};
use policylens_retrieval::{Corpus, InMemoryGraph, InMemoryVectorIndex};
use std::path::Path;
use std::sync::Arc;

/// Pipeline backed by Ollama and the in-memory corpus backends.
pub type OllamaEngine = GraphRagEngine<
    OllamaProvider,
    OllamaEmbeddingModel,
    InMemoryVectorIndex<Arc<OllamaEmbeddingModel>>,
    InMemoryGraph,
>;

/// Load a corpus and index it with the configured embedding model.
pub async fn build_engine(config: PolicyLensConfig, corpus_path: &Path) -> Result<OllamaEngine> {
    let corpus = Corpus::load(corpus_path)?;

    // Scoring clients must give up before the trust budget runs out
    let scoring = config.llm.bounded_by(config.trust.budget());

    // Embedding calls block
    let engine = tokio::task::spawn_blocking(move || {
        GraphRagEngine::from_corpus(
            Arc::new(OllamaProvider::from_config(&config.llm)),
            Arc::new(OllamaEmbeddingModel::from_config(&config.llm)),
            &corpus,
            config,
        )
        .map(|engine| {
            engine.with_scoring_services(
                Arc::new(OllamaProvider::from_config(&scoring)),
                Arc::new(OllamaEmbeddingModel::from_config(&scoring)),
            )
        })
    })
    .await
    .map_err(|e| EngineError::ServiceUnavailable(format!("Indexing task failed: {}", e)))??;

    Ok(engine)
}
