//! Quality gate for individual provider analyses.
//!
//! A pure accept/reject predicate over one [`ScoredAnalysis`], evaluated
//! independently of any other candidate. Checks run in a fixed order and the
//! first failing check is reported.

use serde::{Deserialize, Serialize};

use crate::domain::{Dimension, ScoredAnalysis};

/// Summary fragments that mean the provider itself reported a failure.
/// Matched case-insensitively.
pub const FAILURE_MARKERS: &[&str] = &[
    "analysis failed",
    "failed to analyze",
    "unable to analyze",
    "could not analyze",
    "internal error",
    "[error]",
    "error al analizar",
    "no se pudo analizar",
    "análisis falló",
];

/// Thresholds applied by the gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub min_confidence: f64,
    pub min_summary_chars: usize,
    pub max_contradictions: usize,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self::standard()
    }
}

impl QualityThresholds {
    pub fn standard() -> Self {
        Self {
            min_confidence: 0.3,
            min_summary_chars: 20,
            max_contradictions: 3,
        }
    }
}

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    LowConfidence { confidence: f64, minimum: f64 },
    ConfidenceOutOfRange { confidence: f64 },
    SummaryTooShort { chars: usize, minimum: usize },
    FailureMarker { marker: String },
    TotalScoreOutOfRange { total_score: i64 },
    DimensionOutOfRange { dimension: Dimension, value: f64 },
    TooManyContradictions { count: usize, maximum: usize },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LowConfidence {
                confidence,
                minimum,
            } => write!(f, "confidence {confidence} below {minimum}"),
            Self::ConfidenceOutOfRange { confidence } => {
                write!(f, "confidence {confidence} outside [0, 1]")
            }
            Self::SummaryTooShort { chars, minimum } => {
                write!(f, "summary has {chars} chars, need {minimum}")
            }
            Self::FailureMarker { marker } => write!(f, "summary contains failure marker {marker:?}"),
            Self::TotalScoreOutOfRange { total_score } => {
                write!(f, "totalScore {total_score} outside [0, 100]")
            }
            Self::DimensionOutOfRange { dimension, value } => {
                write!(f, "{dimension} score {value} outside [0, 100]")
            }
            Self::TooManyContradictions { count, maximum } => {
                write!(f, "{count} contradictions exceed {maximum}")
            }
        }
    }
}

/// Outcome of the quality gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum QualityVerdict {
    Accepted,
    Rejected { rejection: Rejection },
}

impl QualityVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Accepted => None,
            Self::Rejected { rejection } => Some(rejection),
        }
    }
}

fn reject(rejection: Rejection) -> QualityVerdict {
    QualityVerdict::Rejected { rejection }
}

/// Evaluate a candidate against explicit thresholds.
pub fn validate_with(thresholds: &QualityThresholds, candidate: &ScoredAnalysis) -> QualityVerdict {
    let confidence = candidate.confidence();
    if !(0.0..=1.0).contains(&confidence) {
        return reject(Rejection::ConfidenceOutOfRange { confidence });
    }
    if confidence < thresholds.min_confidence {
        return reject(Rejection::LowConfidence {
            confidence,
            minimum: thresholds.min_confidence,
        });
    }

    let summary = candidate.summary.trim();
    let chars = summary.chars().count();
    if chars < thresholds.min_summary_chars {
        return reject(Rejection::SummaryTooShort {
            chars,
            minimum: thresholds.min_summary_chars,
        });
    }
    let lowered = summary.to_lowercase();
    if let Some(marker) = FAILURE_MARKERS.iter().find(|m| lowered.contains(*m)) {
        return reject(Rejection::FailureMarker {
            marker: (*marker).to_string(),
        });
    }

    let total_score = candidate.total_score();
    if !(0..=100).contains(&total_score) {
        return reject(Rejection::TotalScoreOutOfRange { total_score });
    }
    if let Some((dimension, value)) = candidate
        .scores
        .dimension_scores
        .iter()
        .find(|(_, v)| !(0.0..=100.0).contains(v))
    {
        return reject(Rejection::DimensionOutOfRange { dimension, value });
    }

    let count = candidate.validation.contradictions.len();
    if count > thresholds.max_contradictions {
        return reject(Rejection::TooManyContradictions {
            count,
            maximum: thresholds.max_contradictions,
        });
    }

    QualityVerdict::Accepted
}

/// Evaluate a candidate against the standard thresholds.
pub fn validate(candidate: &ScoredAnalysis) -> QualityVerdict {
    validate_with(&QualityThresholds::standard(), candidate)
}

/// Boolean form of [`validate`].
pub fn is_acceptable(candidate: &ScoredAnalysis) -> bool {
    validate(candidate).is_accepted()
}
