//! PolicyLens Synthesizer
//!
//! Turns a question and its composite context into a natural-language answer
//! with a single model call.
//!
//! This is the only pipeline stage that surfaces a model failure to the
//! caller: without a generated answer there is nothing to return.
//!
//! # Examples
//!
//! ```no_run
//! use policylens_synthesizer::{AnswerSynthesizer, SynthesizerConfig};
//! use policylens_domain::CompositeContext;
//! use policylens_llm::MockProvider;
//!
//! # async fn example() {
//! let synthesizer = AnswerSynthesizer::new(
//!     MockProvider::new("The zone is managed by its administrative committee."),
//!     SynthesizerConfig::default(),
//! );
//! let context = CompositeContext::new("Question: who manages the zone?", Default::default());
//! let answer = synthesizer.synthesize("Who manages the zone?", &context).await;
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod prompt;
mod synthesizer;

pub use config::SynthesizerConfig;
pub use error::SynthesisError;
pub use prompt::build_answer_prompt;
pub use synthesizer::AnswerSynthesizer;
