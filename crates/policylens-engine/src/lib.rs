//! PolicyLens Engine
//!
//! Answers policy questions end to end and scores the answers.
//!
//! # Pipeline
//!
//! 1. Validate and clean the question
//! 2. Extract question entities
//! 3. Retrieve passages and the graph neighborhood of those entities
//! 4. Fuse both channels into one context
//! 5. Synthesize the answer and attribute its sources
//! 6. Optionally score the answer with the trust engine
//!
//! # Example
//!
//! ```no_run
//! use policylens_engine::{GraphRagEngine, PolicyLensConfig};
//! use policylens_llm::{OllamaEmbeddingModel, OllamaProvider};
//! use policylens_retrieval::Corpus;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PolicyLensConfig::load("policylens.toml")?;
//! let corpus = Corpus::load("corpus.json")?;
//! let engine = GraphRagEngine::from_corpus(
//!     Arc::new(OllamaProvider::from_config(&config.llm)),
//!     Arc::new(OllamaEmbeddingModel::from_config(&config.llm)),
//!     &corpus,
//!     config,
//! )?;
//!
//! let assessed = engine.answer_with_assessment("试验区由哪个机构管理？").await?;
//! println!("{} ({})", assessed.response.answer, assessed.assessment.quality_level);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod pipeline;
mod question;
mod sources;

pub use config::PolicyLensConfig;
pub use error::EngineError;
pub use pipeline::{AnswerResponse, AssessedAnswer, GraphRagEngine};
pub use question::{validate_question, MAX_QUESTION_CHARS};
pub use sources::{build_sources, Source, MAX_DOCUMENT_SOURCES, PREVIEW_CHARS};
