//! Scored analysis contract shared by the provider, the quality gate, the
//! voter and the analytics.

use serde::{Deserialize, Serialize};

/// Summary text used by [`ScoredAnalysis::fallback`].
pub const FALLBACK_SUMMARY: &str =
    "Analysis failed: no provider response passed quality validation. Manual review required.";

/// The six fixed scoring axes of an interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    ProblemIntensity,
    SolutionFit,
    CurrentBehavior,
    PainPoint,
    EarlyAdopter,
    WillingnessToPay,
}

impl Dimension {
    /// All dimensions in canonical order.
    pub const ALL: [Dimension; 6] = [
        Dimension::ProblemIntensity,
        Dimension::SolutionFit,
        Dimension::CurrentBehavior,
        Dimension::PainPoint,
        Dimension::EarlyAdopter,
        Dimension::WillingnessToPay,
    ];

    /// Wire name of the dimension (`problemIntensity`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProblemIntensity => "problemIntensity",
            Self::SolutionFit => "solutionFit",
            Self::CurrentBehavior => "currentBehavior",
            Self::PainPoint => "painPoint",
            Self::EarlyAdopter => "earlyAdopter",
            Self::WillingnessToPay => "willingnessToPay",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-dimension scores on a 0–100 scale.
///
/// A struct rather than a map so that all six keys always exist; keys missing
/// from a decoded payload default to `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DimensionScores {
    pub problem_intensity: f64,
    pub solution_fit: f64,
    pub current_behavior: f64,
    pub pain_point: f64,
    pub early_adopter: f64,
    pub willingness_to_pay: f64,
}

impl DimensionScores {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::ProblemIntensity => self.problem_intensity,
            Dimension::SolutionFit => self.solution_fit,
            Dimension::CurrentBehavior => self.current_behavior,
            Dimension::PainPoint => self.pain_point,
            Dimension::EarlyAdopter => self.early_adopter,
            Dimension::WillingnessToPay => self.willingness_to_pay,
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: f64) {
        let slot = match dimension {
            Dimension::ProblemIntensity => &mut self.problem_intensity,
            Dimension::SolutionFit => &mut self.solution_fit,
            Dimension::CurrentBehavior => &mut self.current_behavior,
            Dimension::PainPoint => &mut self.pain_point,
            Dimension::EarlyAdopter => &mut self.early_adopter,
            Dimension::WillingnessToPay => &mut self.willingness_to_pay,
        };
        *slot = value;
    }

    /// Iterate `(dimension, score)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.iter().map(move |d| (*d, self.get(*d)))
    }
}

/// Provider-reported quality of the evidence behind an analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceQuality {
    #[default]
    Weak,
    Moderate,
    Strong,
}

impl EvidenceQuality {
    /// Lenient decode used at the provider boundary; unknown values are `Weak`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "strong" | "fuerte" => Self::Strong,
            "moderate" | "medium" | "moderada" | "media" => Self::Moderate,
            _ => Self::Weak,
        }
    }
}

/// One named step of the provider's reasoning chain. Audit only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub step: String,
    pub content: String,
}

/// Logical inconsistency detected in the respondent's answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contradiction {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl Contradiction {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            severity: None,
        }
    }
}

/// Numeric part of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    /// Composite viability score; valid range 0–100.
    pub total_score: i64,
    /// Provider self-reported certainty; valid range 0.0–1.0.
    pub confidence: f64,
    pub dimension_scores: DimensionScores,
}

/// Provider's self-check of the analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub contradictions: Vec<Contradiction>,
    pub evidence_quality: EvidenceQuality,
    pub bias_indicators: Vec<String>,
}

/// A single, immutable scored assessment of one interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredAnalysis {
    pub reasoning: Vec<ReasoningStep>,
    pub scores: Scores,
    pub validation: Validation,
    pub summary: String,
    pub key_insights: Vec<String>,
}

impl ScoredAnalysis {
    /// The fixed degraded result returned when no attempt was accepted.
    pub fn fallback() -> Self {
        Self {
            reasoning: Vec::new(),
            scores: Scores {
                total_score: 0,
                confidence: 0.0,
                dimension_scores: DimensionScores::default(),
            },
            validation: Validation {
                contradictions: Vec::new(),
                evidence_quality: EvidenceQuality::Weak,
                bias_indicators: Vec::new(),
            },
            summary: FALLBACK_SUMMARY.to_string(),
            key_insights: Vec::new(),
        }
    }

    /// Whether callers should treat this as a degraded result.
    pub fn is_fallback(&self) -> bool {
        self.scores.confidence == 0.0 || self.scores.total_score == 0
    }

    pub fn total_score(&self) -> i64 {
        self.scores.total_score
    }

    pub fn confidence(&self) -> f64 {
        self.scores.confidence
    }

    pub fn evidence_quality(&self) -> EvidenceQuality {
        self.validation.evidence_quality
    }

    /// Combined character length of all reasoning step contents.
    pub fn reasoning_len(&self) -> usize {
        self.reasoning
            .iter()
            .map(|s| s.content.chars().count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_degraded_and_in_range() {
        let fb = ScoredAnalysis::fallback();
        assert!(fb.is_fallback());
        assert_eq!(fb.total_score(), 0);
        assert_eq!(fb.confidence(), 0.0);
        assert_eq!(fb.evidence_quality(), EvidenceQuality::Weak);
        assert!(fb.scores.dimension_scores.iter().all(|(_, v)| v == 0.0));
    }

    #[test]
    fn dimension_scores_default_fill_missing_keys() {
        let scores: DimensionScores =
            serde_json::from_str(r#"{"problemIntensity": 80, "painPoint": 40}"#).unwrap();
        assert_eq!(scores.get(Dimension::ProblemIntensity), 80.0);
        assert_eq!(scores.get(Dimension::PainPoint), 40.0);
        assert_eq!(scores.get(Dimension::WillingnessToPay), 0.0);
        assert_eq!(scores.iter().count(), 6);
    }

    #[test]
    fn dimension_scores_serialize_all_six_keys() {
        let json = serde_json::to_value(DimensionScores::default()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 6);
        for d in Dimension::ALL {
            assert!(obj.contains_key(d.as_str()), "missing {d}");
        }
    }

    #[test]
    fn evidence_quality_lenient_parse() {
        assert_eq!(EvidenceQuality::parse_lenient("STRONG"), EvidenceQuality::Strong);
        assert_eq!(EvidenceQuality::parse_lenient("moderate"), EvidenceQuality::Moderate);
        assert_eq!(EvidenceQuality::parse_lenient("???"), EvidenceQuality::Weak);
    }

    #[test]
    fn set_then_get_dimension() {
        let mut s = DimensionScores::default();
        s.set(Dimension::EarlyAdopter, 62.5);
        assert_eq!(s.early_adopter, 62.5);
    }
}
