//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use policylens_domain::{QualityLevel, RiskLevel, TrustAssessment};
use policylens_engine::{AnswerResponse, AssessedAnswer, Source};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format an answer.
    pub fn format_answer(&self, response: &AnswerResponse) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(response)?),
            OutputFormat::Text => Ok(self.answer_text(response)),
        }
    }

    /// Format an answer with its assessment.
    pub fn format_assessed(&self, assessed: &AssessedAnswer) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(assessed)?),
            OutputFormat::Text => Ok(format!(
                "{}\n\n{}",
                self.answer_text(&assessed.response),
                self.assessment_text(&assessed.assessment)
            )),
        }
    }

    /// Format a trust assessment.
    pub fn format_assessment(&self, assessment: &TrustAssessment) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(assessment)?),
            OutputFormat::Text => Ok(self.assessment_text(assessment)),
        }
    }

    fn answer_text(&self, response: &AnswerResponse) -> String {
        let mut out = String::new();
        out.push_str(&self.colorize("Answer:", "cyan"));
        out.push('\n');
        out.push_str(&response.answer);
        out.push('\n');

        if !response.sources.is_empty() {
            out.push('\n');
            out.push_str(&self.colorize("Sources:", "cyan"));
            out.push('\n');
            for (i, source) in response.sources.iter().enumerate() {
                match source {
                    Source::Document {
                        title,
                        relevance,
                        content_preview,
                    } => {
                        out.push_str(&format!("  [{}] {} (relevance {:.3})\n", i + 1, title, relevance));
                        out.push_str(&format!("      {}\n", content_preview));
                    }
                    Source::Graph { entities, relations } => {
                        out.push_str(&format!("  [{}] Knowledge graph: {}", i + 1, entities.join(", ")));
                        if !relations.is_empty() {
                            out.push_str(&format!(" ({})", relations.join(", ")));
                        }
                        out.push('\n');
                    }
                }
            }
        }

        out.push('\n');
        if !response.question_entities.is_empty() {
            out.push_str(&format!(
                "Question entities: {}\n",
                response.question_entities.join(", ")
            ));
        }
        out.push_str(&format!(
            "Graph enhanced: {} | {} ms",
            if response.graph_enhanced { "yes" } else { "no" },
            response.processing_time_ms
        ));
        out
    }

    fn assessment_text(&self, assessment: &TrustAssessment) -> String {
        let mut out = String::new();
        let headline = format!(
            "Trust: {:.3} ({}, risk {})",
            assessment.overall_score, assessment.quality_level, assessment.risk_level
        );
        out.push_str(&self.colorize(&headline, quality_color(assessment.quality_level)));
        out.push('\n');

        if !assessment.dimension_scores.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Dimension", "Score", "Notes"]);
            for (name, score) in &assessment.dimension_scores {
                let notes = score.diagnosis.first().cloned().unwrap_or_default();
                builder.push_record([name.clone(), format!("{:.3}", score.value), notes]);
            }
            let mut table = builder.build();
            table
                .with(Style::rounded())
                .with(Modify::new(Rows::first()).with(Alignment::center()));
            out.push_str(&table.to_string());
            out.push('\n');
        }

        for warning in &assessment.warnings {
            out.push_str(&self.warning(warning));
            out.push('\n');
        }

        let risk = format!("Risk: {}", assessment.risk_level);
        out.push_str(&self.colorize(&risk, risk_color(assessment.risk_level)));
        out.push('\n');
        out.push_str(&assessment.diagnosis);
        out
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn quality_color(level: QualityLevel) -> &'static str {
    match level {
        QualityLevel::Excellent | QualityLevel::Good => "green",
        QualityLevel::Fair => "yellow",
        _ => "red",
    }
}

fn risk_color(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "green",
        RiskLevel::Medium => "yellow",
        RiskLevel::High => "red",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policylens_domain::DimensionScore;

    fn response() -> AnswerResponse {
        AnswerResponse {
            request_id: "0192f3c4-0000-7000-8000-000000000000".to_string(),
            question: "试验区由谁管理？".to_string(),
            answer: "试验区管委会负责试验区的管理。".to_string(),
            sources: vec![
                Source::Document {
                    title: "汕头华侨经济文化合作试验区条例".to_string(),
                    relevance: 0.91,
                    content_preview: "试验区管委会负责...".to_string(),
                },
                Source::Graph {
                    entities: vec!["试验区管委会".to_string()],
                    relations: vec!["MANAGES".to_string()],
                },
            ],
            question_entities: vec!["试验区管委会".to_string()],
            graph_enhanced: true,
            processing_time_ms: 420,
        }
    }

    fn assessment() -> TrustAssessment {
        let mut assessment = TrustAssessment::timed_out("entity_aware", 5000, 5001);
        assessment.overall_score = 0.55;
        assessment.quality_level = QualityLevel::Poor;
        assessment.dimension_scores.insert(
            "faithfulness".to_string(),
            DimensionScore::new("faithfulness", 0.4).with_note("Low faithfulness"),
        );
        assessment.warnings = vec!["Faithfulness is low".to_string()];
        assessment
    }

    #[test]
    fn test_answer_text() {
        let formatter = Formatter::new(OutputFormat::Text, false);
        let output = formatter.format_answer(&response()).unwrap();
        assert!(output.starts_with("Answer:\n试验区管委会负责试验区的管理。"));
        assert!(output.contains("[1] 汕头华侨经济文化合作试验区条例 (relevance 0.910)"));
        assert!(output.contains("[2] Knowledge graph: 试验区管委会 (MANAGES)"));
        assert!(output.contains("Graph enhanced: yes | 420 ms"));
    }

    #[test]
    fn test_answer_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_answer(&response()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["sources"][1]["type"], "graph_entity");
        assert_eq!(value["graph_enhanced"], true);
    }

    #[test]
    fn test_assessment_text_lists_dimensions_and_warnings() {
        let formatter = Formatter::new(OutputFormat::Text, false);
        let output = formatter.format_assessment(&assessment()).unwrap();
        assert!(output.starts_with("Trust: 0.550 (poor, risk high)"));
        assert!(output.contains("faithfulness"));
        assert!(output.contains("0.400"));
        assert!(output.contains("⚠ Faithfulness is low"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Text, false);
        assert_eq!(formatter.success("saved"), "✓ saved");
    }
}
