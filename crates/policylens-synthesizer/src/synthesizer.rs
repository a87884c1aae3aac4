//! Core Answer Synthesizer implementation

use crate::config::SynthesizerConfig;
use crate::error::SynthesisError;
use crate::prompt::build_answer_prompt;
use policylens_domain::{CompositeContext, LlmProvider};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Turns a question and its composite context into an answer
pub struct AnswerSynthesizer<L>
where
    L: LlmProvider,
{
    llm_provider: Arc<L>,
    config: SynthesizerConfig,
}

impl<L> Clone for AnswerSynthesizer<L>
where
    L: LlmProvider,
{
    fn clone(&self) -> Self {
        Self {
            llm_provider: Arc::clone(&self.llm_provider),
            config: self.config.clone(),
        }
    }
}

impl<L> AnswerSynthesizer<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a new synthesizer
    pub fn new(llm_provider: L, config: SynthesizerConfig) -> Self {
        Self::from_shared(Arc::new(llm_provider), config)
    }

    /// Create a synthesizer over a provider shared with other components
    pub fn from_shared(llm_provider: Arc<L>, config: SynthesizerConfig) -> Self {
        Self {
            llm_provider,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Generate an answer
    ///
    /// Makes at most one model call. A context too short to be useful, or one
    /// built from two empty retrieval channels, gets the configured
    /// no-context answer without calling the model.
    ///
    /// # Errors
    ///
    /// - [`SynthesisError::Validation`] for an empty question
    /// - [`SynthesisError::ServiceUnavailable`] when the model call fails or times out
    pub async fn synthesize(
        &self,
        question: &str,
        context: &CompositeContext,
    ) -> Result<String, SynthesisError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SynthesisError::Validation(
                "question must not be empty".to_string(),
            ));
        }

        if context.text().trim().chars().count() < self.config.min_context_chars {
            info!("Context too short ({} chars), returning no-context answer", context.char_len());
            return Ok(self.config.no_context_answer.clone());
        }
        if !context.has_evidence() {
            info!("Neither retrieval channel found anything, returning no-context answer");
            return Ok(self.config.no_context_answer.clone());
        }

        let prompt = build_answer_prompt(question, context.text());
        debug!("Answer prompt length: {} chars", prompt.chars().count());

        let response = timeout(self.config.synthesis_timeout(), self.call_llm(prompt))
            .await
            .map_err(|_| {
                SynthesisError::ServiceUnavailable(format!(
                    "answer generation timed out after {}s",
                    self.config.synthesis_timeout_secs
                ))
            })??;

        let answer = response.trim();
        if answer.is_empty() {
            warn!("Model returned an empty answer, using fallback");
            return Ok(self.config.empty_answer.clone());
        }

        debug!("Answer length: {} chars", answer.chars().count());
        Ok(answer.to_string())
    }

    async fn call_llm(&self, prompt: String) -> Result<String, SynthesisError> {
        let llm = Arc::clone(&self.llm_provider);
        let options = self.config.generation_options();

        tokio::task::spawn_blocking(move || {
            llm.generate(&prompt, &options)
                .map_err(|e| SynthesisError::ServiceUnavailable(e.to_string()))
        })
        .await
        .map_err(|e| SynthesisError::ServiceUnavailable(format!("Task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policylens_llm::MockProvider;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn context(text: &str) -> CompositeContext {
        CompositeContext::new(text, BTreeMap::new())
    }

    fn rich_context() -> CompositeContext {
        context(
            "Question: 试验区由谁管理？\nKey entities: 试验区\n\n=== Relevant documents ===\n\
             Document 1 (similarity: 0.900):\n试验区管委会负责试验区的开发建设和管理。",
        )
    }

    #[tokio::test]
    async fn test_answer_is_trimmed() {
        let llm = MockProvider::new("  试验区由试验区管委会负责管理。\n");
        let synthesizer = AnswerSynthesizer::new(llm.clone(), SynthesizerConfig::default());

        let answer = synthesizer.synthesize("试验区由谁管理？", &rich_context()).await.unwrap();
        assert_eq!(answer, "试验区由试验区管委会负责管理。");
        assert_eq!(llm.call_count(), 1);
        assert!(llm.prompts()[0].contains("试验区管委会负责试验区的开发建设和管理"));
    }

    #[tokio::test]
    async fn test_empty_answer_fallback() {
        let synthesizer = AnswerSynthesizer::new(MockProvider::new("   "), SynthesizerConfig::default());
        let answer = synthesizer.synthesize("问题是什么？", &rich_context()).await.unwrap();
        assert_eq!(answer, SynthesizerConfig::default().empty_answer);
    }

    #[tokio::test]
    async fn test_short_or_empty_context_skips_model() {
        let llm = MockProvider::new("should not be used");
        let synthesizer = AnswerSynthesizer::new(llm.clone(), SynthesizerConfig::default());
        let expected = SynthesizerConfig::default().no_context_answer;

        assert_eq!(synthesizer.synthesize("问题", &context("短")).await.unwrap(), expected);
        let no_evidence = context("Question: 问题\nKey entities: none\n\nNothing.").without_evidence();
        assert_eq!(synthesizer.synthesize("问题", &no_evidence).await.unwrap(), expected);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_question_rejected() {
        let synthesizer = AnswerSynthesizer::new(MockProvider::default(), SynthesizerConfig::default());
        let result = synthesizer.synthesize("  ", &rich_context()).await;
        assert!(matches!(result, Err(SynthesisError::Validation(_))));
    }

    #[tokio::test]
    async fn test_model_failure_surfaces() {
        let mut llm = MockProvider::default();
        llm.add_error("Context:");
        let synthesizer = AnswerSynthesizer::new(llm, SynthesizerConfig::default());
        let result = synthesizer.synthesize("问题", &rich_context()).await;
        assert!(matches!(result, Err(SynthesisError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_unavailable() {
        let llm = MockProvider::new("late").with_delay(Duration::from_millis(1500));
        let config = SynthesizerConfig {
            synthesis_timeout_secs: 1,
            ..SynthesizerConfig::default()
        };
        let synthesizer = AnswerSynthesizer::new(llm, config);
        let result = synthesizer.synthesize("问题", &rich_context()).await;
        assert!(matches!(result, Err(SynthesisError::ServiceUnavailable(_))));
    }
}
