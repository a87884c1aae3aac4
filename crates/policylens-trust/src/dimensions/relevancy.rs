//! Relevancy: embedding similarity of question and answer

use super::{names, truncate_chars, DimensionScorer, ScoringInput};
use policylens_domain::{DimensionScore, EmbeddingModel};
use policylens_llm::cosine_similarity;
use std::fmt::Display;
use std::sync::Arc;
use tracing::warn;

/// Cosine similarity of question and answer embeddings, floored at 0
pub struct RelevancyScorer<E> {
    embedder: Arc<E>,
    threshold: f64,
    max_text_length: usize,
}

impl<E> RelevancyScorer<E>
where
    E: EmbeddingModel,
    E::Error: Display,
{
    /// Scorer embedding at most `max_text_length` characters of each text
    pub fn new(embedder: Arc<E>, threshold: f64, max_text_length: usize) -> Self {
        Self {
            embedder,
            threshold,
            max_text_length,
        }
    }

    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        match self.embedder.embed(truncate_chars(text, self.max_text_length)) {
            Ok(vector) if vector.len() == self.embedder.dimension() => Some(vector),
            Ok(vector) => {
                warn!(
                    "Embedding has dimension {}, expected {}",
                    vector.len(),
                    self.embedder.dimension()
                );
                None
            }
            Err(e) => {
                warn!("Embedding failed: {}", e);
                None
            }
        }
    }
}

impl<E> DimensionScorer for RelevancyScorer<E>
where
    E: EmbeddingModel + Send + Sync,
    E::Error: Display,
{
    fn name(&self) -> &'static str {
        names::RELEVANCY
    }

    fn score(&self, input: &ScoringInput) -> DimensionScore {
        let (Some(question), Some(answer)) = (self.embed(&input.question), self.embed(&input.answer))
        else {
            return DimensionScore::new(names::RELEVANCY, 0.5)
                .with_note("Could not compute semantic similarity");
        };

        let similarity = f64::from(cosine_similarity(&question, &answer)).max(0.0);
        let mut score = DimensionScore::new(names::RELEVANCY, similarity);
        if similarity < self.threshold {
            score = score
                .with_note("The answer has low relevance to the question")
                .with_note("Suggestion: make sure the answer addresses the core of the question");
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policylens_llm::MockEmbeddingModel;

    fn input(question: &str, answer: &str) -> ScoringInput {
        ScoringInput {
            question: question.to_string(),
            answer: answer.to_string(),
            ..ScoringInput::default()
        }
    }

    #[test]
    fn test_identical_texts_are_fully_relevant() {
        let scorer = RelevancyScorer::new(Arc::new(MockEmbeddingModel::new(64)), 0.7, 1000);
        let score = scorer.score(&input("same text", "same text"));
        assert!((score.value - 1.0).abs() < 1e-5);
        assert!(score.diagnosis.is_empty());
    }

    #[test]
    fn test_unavailable_embedder_falls_back() {
        let scorer = RelevancyScorer::new(Arc::new(MockEmbeddingModel::unavailable(64)), 0.7, 1000);
        let score = scorer.score(&input("question", "answer"));
        assert_eq!(score.value, 0.5);
        assert_eq!(score.diagnosis, vec!["Could not compute semantic similarity".to_string()]);
    }

    #[test]
    fn test_empty_answer_falls_back() {
        let scorer = RelevancyScorer::new(Arc::new(MockEmbeddingModel::new(64)), 0.7, 1000);
        assert_eq!(scorer.score(&input("question", "  ")).value, 0.5);
    }
}
