//! PolicyLens Extractor
//!
//! Turns free text into typed policy-domain entities using an LLM.
//!
//! # Overview
//!
//! The same extractor serves three roles: the user's question, the generated
//! answer, and the retrieved passages. Each role gets its own prompt focus.
//!
//! ```text
//! Text → PromptBuilder → LLM → parser → filter (length, confidence, cap) → Entities
//! ```
//!
//! Two entry points:
//!
//! - [`Extractor::try_extract`] returns a typed error, keeping parse failures explicit
//! - [`Extractor::extract`] never fails; it degrades to an empty list (or the
//!   question placeholder) and logs the cause
//!
//! # Example Usage
//!
//! ```no_run
//! use policylens_extractor::{Extractor, ExtractorConfig};
//! use policylens_domain::SourceRole;
//! use policylens_llm::MockProvider;
//!
//! # async fn example() {
//! let llm = MockProvider::new(r#"["华侨经济文化合作试验区"]"#);
//! let extractor = Extractor::new(llm, ExtractorConfig::default());
//!
//! let entities = extractor
//!     .extract("华侨经济文化合作试验区的管理机构是什么？", SourceRole::Question)
//!     .await;
//! println!("{} entities", entities.len());
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod types;

#[cfg(test)]
mod tests;

pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use parser::parse_entity_response;
pub use prompt::PromptBuilder;
pub use types::{EntityCandidate, ExtractionReport};
