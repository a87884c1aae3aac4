//! Assess command implementation.

use crate::cli::AssessArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use policylens_engine::{validate_question, PolicyLensConfig};
use policylens_llm::{OllamaEmbeddingModel, OllamaProvider};
use policylens_retrieval::{Corpus, InMemoryGraph};
use policylens_trust::TrustEngine;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Execute the assess command.
pub async fn execute_assess(args: AssessArgs, config: PolicyLensConfig, formatter: &Formatter) -> Result<()> {
    let question = validate_question(&args.question)?;
    if args.answer.trim().is_empty() {
        return Err(CliError::InvalidInput("Answer must not be empty".to_string()));
    }

    let mut passages = args.passages;
    if let Some(path) = &args.passages_file {
        passages.extend(read_passages(path)?);
    }

    let graph = match &args.corpus {
        Some(path) => Corpus::load(path)?
            .build_graph(config.retrieval.graph_top_k, config.retrieval.path_limit),
        None => InMemoryGraph::default(),
    };

    let scoring = config.llm.bounded_by(config.trust.budget());
    let engine = TrustEngine::new(
        Arc::new(OllamaProvider::from_config(&scoring)),
        Arc::new(OllamaEmbeddingModel::from_config(&scoring)),
        Arc::new(graph),
        config.trust,
    );

    let assessment = engine
        .assess(&question, &args.answer, &passages, &args.graph_entities)
        .await;
    println!("{}", formatter.format_assessment(&assessment)?);
    Ok(())
}

/// Read a JSON array of passage strings.
pub fn read_passages(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    let passages: Vec<String> = serde_json::from_str(&contents)?;
    Ok(passages)
}
