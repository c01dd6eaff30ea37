//! Per-interview response-bias heuristics.
//!
//! Every heuristic is evaluated; an interview may trigger none, one or all.

use serde::{Deserialize, Serialize};

use crate::domain::Interview;

/// Absolute/perfection language suggesting socially desirable answers.
pub const ABSOLUTE_MARKERS: &[&str] = &[
    "always",
    "never",
    "every day",
    "everyday",
    "100%",
    "perfect",
    "siempre",
    "nunca",
    "jamás",
    "todos los días",
    "todo el tiempo",
    "perfecto",
];

const SCALE_MIN: f64 = 1.0;
const SCALE_MAX: f64 = 10.0;
const AGREEMENT_FLOOR: f64 = 8.0;
const SHORT_ANSWER_CHARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasType {
    Acquiescence,
    Extremity,
    SocialDesirability,
    Fatigue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bias {
    #[serde(rename = "type")]
    pub bias_type: BiasType,
    /// Heuristic confidence in 0–1.
    pub confidence: f64,
    pub evidence: Vec<String>,
    pub description: String,
}

fn acquiescence(scored: &[(&str, f64)]) -> Option<Bias> {
    if scored.len() <= 3 || scored.iter().any(|(_, v)| *v < AGREEMENT_FLOOR) {
        return None;
    }
    Some(Bias {
        bias_type: BiasType::Acquiescence,
        confidence: 0.7,
        evidence: scored.iter().map(|(q, v)| format!("{q}={v}")).collect(),
        description: format!(
            "all {} scored answers are {AGREEMENT_FLOOR} or higher; respondent may agree with everything",
            scored.len()
        ),
    })
}

fn extremity(scored: &[(&str, f64)]) -> Option<Bias> {
    if scored.len() <= 3 || scored.iter().any(|(_, v)| *v != SCALE_MIN && *v != SCALE_MAX) {
        return None;
    }
    Some(Bias {
        bias_type: BiasType::Extremity,
        confidence: 0.6,
        evidence: scored.iter().map(|(q, v)| format!("{q}={v}")).collect(),
        description: format!(
            "all {} scored answers sit at the scale ends ({SCALE_MIN} or {SCALE_MAX})",
            scored.len()
        ),
    })
}

fn social_desirability(free_text: &[(&str, &str)]) -> Option<Bias> {
    let evidence: Vec<String> = free_text
        .iter()
        .filter_map(|(q, text)| {
            let lowered = text.to_lowercase();
            ABSOLUTE_MARKERS
                .iter()
                .find(|m| lowered.contains(*m))
                .map(|m| format!("{q}: \"{m}\""))
        })
        .collect();
    if evidence.len() < 2 {
        return None;
    }
    Some(Bias {
        bias_type: BiasType::SocialDesirability,
        confidence: (0.3 + 0.15 * evidence.len() as f64).min(0.9),
        description: format!(
            "{} answers use absolute language; responses may be idealized",
            evidence.len()
        ),
        evidence,
    })
}

fn fatigue(total_answers: usize, free_text: &[(&str, &str)]) -> Option<Bias> {
    if total_answers <= 5 || free_text.is_empty() {
        return None;
    }
    let short: Vec<&str> = free_text
        .iter()
        .filter(|(_, text)| text.trim().chars().count() < SHORT_ANSWER_CHARS)
        .map(|(q, _)| *q)
        .collect();
    if short.len() * 2 <= free_text.len() {
        return None;
    }
    let ratio = short.len() as f64 / free_text.len() as f64;
    Some(Bias {
        bias_type: BiasType::Fatigue,
        confidence: ratio.clamp(0.0, 1.0),
        description: format!(
            "{} of {} open answers are shorter than {SHORT_ANSWER_CHARS} characters",
            short.len(),
            free_text.len()
        ),
        evidence: short.into_iter().map(str::to_string).collect(),
    })
}

/// Run every bias heuristic over one interview.
pub fn detect_biases(interview: &Interview) -> Vec<Bias> {
    let scored: Vec<(&str, f64)> = interview.scored_answers().collect();
    let free_text: Vec<(&str, &str)> = interview
        .free_text_answers()
        .map(|(q, a)| (q, a.value.as_str()))
        .collect();

    [
        acquiescence(&scored),
        extremity(&scored),
        social_desirability(&free_text),
        fatigue(interview.answers.len(), &free_text),
    ]
    .into_iter()
    .flatten()
    .collect()
}
