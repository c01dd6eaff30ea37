//! Parse boundary for raw provider output.
//!
//! Model output is decoded into a lenient raw shape first, then converted
//! into a typed [`ScoredAnalysis`]. Missing optional fields are default-filled;
//! a missing `scores` block, missing `totalScore`/`confidence`, or non-finite
//! numbers are rejected. Out-of-range values are kept as-is so the quality
//! gate can reject them.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::error::{ProviderError, ProviderResult};
use crate::domain::{
    Contradiction, DimensionScores, EvidenceQuality, ReasoningStep, ScoredAnalysis, Scores,
    Validation,
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawReasoning {
    Steps(Vec<RawStep>),
    Named(BTreeMap<String, String>),
}

#[derive(Debug, Deserialize)]
struct RawStep {
    #[serde(default, alias = "name")]
    step: String,
    #[serde(default, alias = "text")]
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawContradiction {
    Text(String),
    Detailed {
        #[serde(alias = "text", alias = "contradiction")]
        description: String,
        #[serde(default)]
        severity: Option<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDimensionScores {
    #[serde(alias = "problem_intensity")]
    problem_intensity: Option<f64>,
    #[serde(alias = "solution_fit")]
    solution_fit: Option<f64>,
    #[serde(alias = "current_behavior")]
    current_behavior: Option<f64>,
    #[serde(alias = "pain_point")]
    pain_point: Option<f64>,
    #[serde(alias = "early_adopter")]
    early_adopter: Option<f64>,
    #[serde(alias = "willingness_to_pay")]
    willingness_to_pay: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScores {
    #[serde(alias = "total_score")]
    total_score: Option<f64>,
    confidence: Option<f64>,
    #[serde(default, alias = "dimension_scores")]
    dimension_scores: Option<RawDimensionScores>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawValidation {
    #[serde(default)]
    contradictions: Vec<RawContradiction>,
    #[serde(default, alias = "evidence_quality")]
    evidence_quality: Option<String>,
    #[serde(default, alias = "bias_indicators")]
    bias_indicators: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScoredAnalysis {
    #[serde(default)]
    reasoning: Option<RawReasoning>,
    scores: Option<RawScores>,
    #[serde(default)]
    validation: Option<RawValidation>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default, alias = "key_insights")]
    key_insights: Vec<String>,
}

/// Remove a surrounding markdown code fence (```json ... ```), if present.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn finite(field: &str, value: f64) -> ProviderResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ProviderError::MalformedPayload(format!(
            "{field} is not a finite number"
        )))
    }
}

fn dimension_scores(raw: Option<RawDimensionScores>) -> ProviderResult<DimensionScores> {
    let raw = raw.unwrap_or_default();
    Ok(DimensionScores {
        problem_intensity: finite("problemIntensity", raw.problem_intensity.unwrap_or(0.0))?,
        solution_fit: finite("solutionFit", raw.solution_fit.unwrap_or(0.0))?,
        current_behavior: finite("currentBehavior", raw.current_behavior.unwrap_or(0.0))?,
        pain_point: finite("painPoint", raw.pain_point.unwrap_or(0.0))?,
        early_adopter: finite("earlyAdopter", raw.early_adopter.unwrap_or(0.0))?,
        willingness_to_pay: finite("willingnessToPay", raw.willingness_to_pay.unwrap_or(0.0))?,
    })
}

/// Decode one raw provider response into a typed [`ScoredAnalysis`].
pub fn parse_provider_payload(response: &str) -> ProviderResult<ScoredAnalysis> {
    let body = strip_code_fence(response);
    let raw: RawScoredAnalysis = serde_json::from_str(body)?;

    let scores = raw
        .scores
        .ok_or_else(|| ProviderError::MalformedPayload("missing scores block".to_string()))?;
    let total = scores
        .total_score
        .ok_or_else(|| ProviderError::MalformedPayload("missing scores.totalScore".to_string()))?;
    let confidence = scores
        .confidence
        .ok_or_else(|| ProviderError::MalformedPayload("missing scores.confidence".to_string()))?;
    let total = finite("totalScore", total)?;
    let confidence = finite("confidence", confidence)?;

    let reasoning = match raw.reasoning {
        None => Vec::new(),
        Some(RawReasoning::Steps(steps)) => steps
            .into_iter()
            .map(|s| ReasoningStep {
                step: s.step,
                content: s.content,
            })
            .collect(),
        Some(RawReasoning::Named(named)) => named
            .into_iter()
            .map(|(step, content)| ReasoningStep { step, content })
            .collect(),
    };

    let validation = raw.validation.unwrap_or_default();
    let contradictions = validation
        .contradictions
        .into_iter()
        .map(|c| match c {
            RawContradiction::Text(description) => Contradiction::new(description),
            RawContradiction::Detailed {
                description,
                severity,
            } => Contradiction {
                description,
                severity,
            },
        })
        .collect();

    Ok(ScoredAnalysis {
        reasoning,
        scores: Scores {
            total_score: total.round() as i64,
            confidence,
            dimension_scores: dimension_scores(scores.dimension_scores)?,
        },
        validation: Validation {
            contradictions,
            evidence_quality: validation
                .evidence_quality
                .as_deref()
                .map(EvidenceQuality::parse_lenient)
                .unwrap_or_default(),
            bias_indicators: validation.bias_indicators,
        },
        summary: raw.summary.unwrap_or_default(),
        key_insights: raw.key_insights,
    })
}
