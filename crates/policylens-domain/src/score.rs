//! Score and assessment types
//!
//! A [`TrustAssessment`] is the final verdict on one answer: an overall score,
//! discrete quality and risk levels, and the per-dimension scores it was
//! combined from.

use std::collections::BTreeMap;
use std::fmt;

use crate::clamp_unit;

/// Score of one trust dimension
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DimensionScore {
    /// Dimension name (`entity_coverage`, `faithfulness`, ...)
    pub name: String,

    /// Value in [0, 1]
    pub value: f64,

    /// Human-readable notes explaining the value
    pub diagnosis: Vec<String>,

    /// Intermediate measurements other dimensions may derive from
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "BTreeMap::is_empty"))]
    pub metrics: BTreeMap<String, f64>,
}

impl DimensionScore {
    /// Create a score; the value is clamped to [0, 1]
    ///
    /// # Examples
    ///
    /// ```
    /// use policylens_domain::DimensionScore;
    ///
    /// let score = DimensionScore::new("entity_coverage", 1.4);
    /// assert_eq!(score.value, 1.0);
    /// ```
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: clamp_unit(value),
            diagnosis: Vec::new(),
            metrics: BTreeMap::new(),
        }
    }

    /// Add a diagnosis line
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.diagnosis.push(note.into());
        self
    }

    /// Record an intermediate measurement
    pub fn with_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }

    /// Look up an intermediate measurement
    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }
}

/// Discrete quality verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum QualityLevel {
    /// Overall score at or above the excellent cut point
    Excellent,
    /// Overall score at or above the good cut point
    Good,
    /// Overall score at or above the fair cut point
    Fair,
    /// Below every cut point
    Poor,
    /// Scoring exceeded its wall-clock budget
    Timeout,
    /// Scoring failed unrecoverably
    Error,
}

impl QualityLevel {
    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Timeout => "timeout",
            Self::Error => "error",
        }
    }

    /// Whether this level marks a terminal failure
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::Timeout | Self::Error)
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk that an answer contains unsupported content
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RiskLevel {
    /// Little unsupported content
    Low,
    /// Some unsupported content
    Medium,
    /// Mostly unsupported, or scoring failed
    High,
}

impl RiskLevel {
    /// Map a hallucination rate onto a risk level
    ///
    /// # Examples
    ///
    /// ```
    /// use policylens_domain::RiskLevel;
    ///
    /// assert_eq!(RiskLevel::from_hallucination_rate(0.1), RiskLevel::Low);
    /// assert_eq!(RiskLevel::from_hallucination_rate(0.2), RiskLevel::Medium);
    /// assert_eq!(RiskLevel::from_hallucination_rate(0.5), RiskLevel::High);
    /// ```
    pub fn from_hallucination_rate(rate: f64) -> Self {
        if rate < 0.2 {
            Self::Low
        } else if rate < 0.5 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Map an overall trust score onto a risk level
    pub fn from_overall_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Low
        } else if score >= 0.5 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which entities were found where, and which are missing or unverified
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityAnalysis {
    /// Entity names from the question
    pub question_entities: Vec<String>,
    /// Entity names from the answer
    pub answer_entities: Vec<String>,
    /// Entity names from the retrieved passages
    pub context_entities: Vec<String>,
    /// Question entities the answer never mentions
    pub missing_entities: Vec<String>,
    /// Answer entities absent from the graph entity set
    pub unverified_entities: Vec<String>,
}

/// Final verdict on one answer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrustAssessment {
    /// Weighted combination of dimension values, clamped to [0, 1]
    pub overall_score: f64,

    /// Step function of the overall score, or a terminal failure level
    pub quality_level: QualityLevel,

    /// Risk of unsupported content
    pub risk_level: RiskLevel,

    /// Scores keyed by dimension name
    pub dimension_scores: BTreeMap<String, DimensionScore>,

    /// One line per deficient dimension
    pub warnings: Vec<String>,

    /// Overall verdict followed by up to five dimension messages
    pub diagnosis: String,

    /// Entity bookkeeping behind the scores
    pub entity_analysis: EntityAnalysis,

    /// Wall-clock time spent scoring
    pub processing_time_ms: u64,

    /// Dimension scheme that produced the scores
    pub scheme: String,
}

impl TrustAssessment {
    /// Terminal assessment for a scoring run that ran out of time
    pub fn timed_out(scheme: impl Into<String>, budget_ms: u64, elapsed_ms: u64) -> Self {
        Self::terminal(
            QualityLevel::Timeout,
            scheme.into(),
            format!("Assessment timed out after {elapsed_ms} ms (budget {budget_ms} ms)"),
            elapsed_ms,
        )
    }

    /// Terminal assessment for a scoring run that failed
    pub fn errored(scheme: impl Into<String>, reason: impl fmt::Display, elapsed_ms: u64) -> Self {
        Self::terminal(
            QualityLevel::Error,
            scheme.into(),
            format!("Assessment failed: {reason}"),
            elapsed_ms,
        )
    }

    fn terminal(level: QualityLevel, scheme: String, diagnosis: String, elapsed_ms: u64) -> Self {
        Self {
            overall_score: 0.0,
            quality_level: level,
            risk_level: RiskLevel::High,
            dimension_scores: BTreeMap::new(),
            warnings: vec![diagnosis.clone()],
            diagnosis,
            entity_analysis: EntityAnalysis::default(),
            processing_time_ms: elapsed_ms,
            scheme,
        }
    }

    /// Value of a dimension, if it was computed
    pub fn dimension(&self, name: &str) -> Option<f64> {
        self.dimension_scores.get(name).map(|s| s.value)
    }
}
