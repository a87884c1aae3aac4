//! Faithfulness and the hallucination rate derived from it
//!
//! Faithfulness blends a model self-judgment with a graph check: the judge
//! rates how well the context supports the answer, then every answer entity
//! the graph does not know costs a tenth of its share.

use super::{names, truncate_chars, DimensionScorer, ScoringInput};
use policylens_domain::{clamp_unit, DimensionScore, GenerationOptions, LlmProvider};
use regex::Regex;
use std::fmt::Display;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

/// Score used when the judge cannot be asked or cannot be understood
const NEUTRAL_JUDGE_SCORE: f64 = 0.5;

/// Penalty per unit of unmatched-entity ratio
const UNMATCHED_PENALTY: f64 = 0.1;

/// Ratio above which unverified entities are listed in the diagnosis
const UNMATCHED_NOTE_RATIO: f64 = 0.2;

/// Metric key of the raw judge score
pub const LLM_SCORE: &str = "llm_score";

/// Metric key of the unmatched-entity ratio
pub const UNMATCHED_RATIO: &str = "unmatched_ratio";

static JUDGE_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-1]\.?\d*)").expect("judge score pattern is a valid regex"));

/// Take the first 0-1 number in a judge reply, clamped
///
/// # Examples
///
/// ```
/// use policylens_trust::dimensions::parse_judge_score;
///
/// assert_eq!(parse_judge_score("Score: 0.85"), Some(0.85));
/// assert_eq!(parse_judge_score("1.7"), Some(1.0));
/// assert_eq!(parse_judge_score("no idea"), None);
/// ```
pub fn parse_judge_score(reply: &str) -> Option<f64> {
    JUDGE_SCORE
        .find(reply)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(clamp_unit)
}

fn judge_prompt(context: &str, answer: &str) -> String {
    format!(
        "Rate how faithful the answer is to the context on a scale from 0 to 1 \
         (0 = contradicts or is unrelated to the context, 1 = fully supported).\n\n\
         Context: {context}\n\n\
         Answer: {answer}\n\n\
         Consider:\n\
         - whether the answer is based on the context\n\
         - whether it contradicts the context\n\
         - whether it adds facts the context does not contain\n\n\
         Output only a number between 0 and 1, for example: 0.8"
    )
}

/// Model-judged support of the answer, penalized by unverified entities
pub struct FaithfulnessScorer<L> {
    llm: Arc<L>,
    threshold: f64,
    judge_chars: usize,
}

impl<L> FaithfulnessScorer<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Scorer asking `llm` for the judgment, showing it `judge_chars` of each text
    pub fn new(llm: Arc<L>, threshold: f64, judge_chars: usize) -> Self {
        Self {
            llm,
            threshold,
            judge_chars,
        }
    }

    fn judge(&self, context: &str, answer: &str) -> f64 {
        if context.trim().is_empty() {
            debug!("Empty context, faithfulness judge not called");
            return NEUTRAL_JUDGE_SCORE;
        }

        let prompt = judge_prompt(
            truncate_chars(context, self.judge_chars),
            truncate_chars(answer, self.judge_chars),
        );
        match self
            .llm
            .generate(&prompt, &GenerationOptions::with_temperature(0.2))
        {
            Ok(reply) => parse_judge_score(reply.trim()).unwrap_or_else(|| {
                warn!("Faithfulness judge reply has no score: {}", reply.trim());
                NEUTRAL_JUDGE_SCORE
            }),
            Err(e) => {
                warn!("Faithfulness judge failed: {}", e);
                NEUTRAL_JUDGE_SCORE
            }
        }
    }
}

impl<L> DimensionScorer for FaithfulnessScorer<L>
where
    L: LlmProvider + Send + Sync,
    L::Error: Display,
{
    fn name(&self) -> &'static str {
        names::FAITHFULNESS
    }

    fn score(&self, input: &ScoringInput) -> DimensionScore {
        let llm_score = self.judge(&input.context_text, &input.answer);
        let unmatched = input.unmatched_ratio();
        let value = (llm_score - UNMATCHED_PENALTY * unmatched).max(0.0);

        let mut score = DimensionScore::new(names::FAITHFULNESS, value)
            .with_metric(LLM_SCORE, llm_score)
            .with_metric(UNMATCHED_RATIO, unmatched);
        if unmatched > UNMATCHED_NOTE_RATIO {
            score = score.with_note(format!(
                "Contains unverified entities: [{}]",
                input.unverified_answer_entities().join(", ")
            ));
        }
        if value < self.threshold {
            score = score.with_note("Low faithfulness, the answer may contain incorrect information");
        }
        score
    }
}

/// Hallucination rate from a faithfulness score
///
/// `min(1, (1 - faithfulness) + 0.5 * unmatched_ratio)`. Flagged above
/// `threshold`, and as high risk above 0.5.
pub fn hallucination_from(faithfulness: &DimensionScore, threshold: f64) -> DimensionScore {
    let unmatched = faithfulness.metric(UNMATCHED_RATIO).unwrap_or(0.0);
    let base = 1.0 - faithfulness.value;
    let entity = 0.5 * unmatched;
    let value = (base + entity).min(1.0);

    let mut score = DimensionScore::new(names::HALLUCINATION, value)
        .with_metric("base_hallucination", base)
        .with_metric("entity_hallucination", entity);
    if value > threshold {
        score = score.with_note("Potential hallucinated content detected");
    }
    if value > 0.5 {
        score = score.with_note("High risk: the answer may contain false information, consider regenerating");
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_judge_score() {
        assert_eq!(parse_judge_score("0.8"), Some(0.8));
        assert_eq!(parse_judge_score("I'd say 1"), Some(1.0));
        assert_eq!(parse_judge_score("1."), Some(1.0));
        assert_eq!(parse_judge_score("rating 7/10"), Some(1.0));
        assert_eq!(parse_judge_score("seven"), None);
        assert_eq!(parse_judge_score(""), None);
    }

    #[test]
    fn test_hallucination_from_faithfulness() {
        let faithfulness = DimensionScore::new(names::FAITHFULNESS, 0.75).with_metric(UNMATCHED_RATIO, 0.5);
        let score = hallucination_from(&faithfulness, 0.2);
        assert!((score.value - 0.5).abs() < 1e-9);
        assert_eq!(score.diagnosis.len(), 1);

        let worst = DimensionScore::new(names::FAITHFULNESS, 0.0).with_metric(UNMATCHED_RATIO, 1.0);
        assert_eq!(hallucination_from(&worst, 0.2).value, 1.0);
    }

    #[test]
    fn test_judge_prompt_contents() {
        let prompt = judge_prompt("ctx", "ans");
        assert!(prompt.starts_with("Rate how faithful"));
        assert!(prompt.contains("Context: ctx"));
        assert!(prompt.contains("Answer: ans"));
    }
}
