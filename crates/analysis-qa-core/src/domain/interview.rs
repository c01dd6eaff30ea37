//! Interviews, answers and the request handed to an analysis provider.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::{DimensionScores, ScoredAnalysis};

/// Question identifier. Orders digit runs numerically, so `q2` sorts before
/// `q10` and answers iterate in questionnaire order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuestionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for QuestionId {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.0, &other.0).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for QuestionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare alternating digit and non-digit runs; digit runs by numeric value.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        match (a.chars().next(), b.chars().next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let (run_a, rest_a) = split_run(a, x.is_ascii_digit());
                let (run_b, rest_b) = split_run(b, y.is_ascii_digit());
                let ord = if x.is_ascii_digit() && y.is_ascii_digit() {
                    let na = run_a.trim_start_matches('0');
                    let nb = run_b.trim_start_matches('0');
                    na.len().cmp(&nb.len()).then_with(|| na.cmp(nb))
                } else {
                    run_a.cmp(run_b)
                };
                if ord != Ordering::Equal {
                    return ord;
                }
                a = rest_a;
                b = rest_b;
            }
        }
    }
}

fn split_run(s: &str, digits: bool) -> (&str, &str) {
    let end = s
        .find(|c: char| c.is_ascii_digit() != digits)
        .unwrap_or(s.len());
    s.split_at(end)
}

/// A coded answer may arrive as a JSON number; it is kept as its text.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAnswerValue {
    Text(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match RawAnswerValue::deserialize(deserializer)? {
        RawAnswerValue::Text(text) => text,
        RawAnswerValue::Number(number) => number.to_string(),
    })
}

/// One respondent answer: the raw (free-text or coded) value plus an optional
/// interviewer observation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
}

impl Answer {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            observation: None,
        }
    }

    pub fn with_observation(mut self, observation: impl Into<String>) -> Self {
        self.observation = Some(observation.into());
        self
    }

    /// The value as a finite number, if it parses as one.
    ///
    /// `"NaN"` and `"inf"` parse as `f64` but are treated as free text.
    pub fn numeric_value(&self) -> Option<f64> {
        self.value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    /// True when the answer carries free text rather than a number.
    pub fn is_free_text(&self) -> bool {
        self.numeric_value().is_none()
    }
}

/// Product/project description the interview validates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_market: Option<String>,
    #[serde(default)]
    pub hypotheses: Vec<String>,
}

/// Who was interviewed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespondentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respondent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Final analysis fields copied onto an interview once orchestration is done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewAnalysis {
    pub total_score: i64,
    pub dimension_scores: DimensionScores,
    pub summary: String,
    pub key_insights: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}

/// Whether an interview has received its analysis yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Pending,
    Complete,
}

/// A single respondent session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    pub id: String,
    #[serde(default)]
    pub respondent: RespondentMetadata,
    /// Question id → answer, in [`QuestionId`] order.
    #[serde(default)]
    pub answers: BTreeMap<QuestionId, Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<InterviewAnalysis>,
}

impl Interview {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            respondent: RespondentMetadata::default(),
            answers: BTreeMap::new(),
            analysis: None,
        }
    }

    /// Builder-style answer insertion.
    pub fn with_answer(mut self, question_id: impl Into<QuestionId>, value: impl Into<String>) -> Self {
        self.answers.insert(question_id.into(), Answer::new(value));
        self
    }

    pub fn state(&self) -> AnalysisState {
        if self.analysis.is_some() {
            AnalysisState::Complete
        } else {
            AnalysisState::Pending
        }
    }

    /// Copy the final analysis fields onto the interview in one step.
    pub fn apply_analysis(&mut self, analysis: &ScoredAnalysis) {
        self.analysis = Some(InterviewAnalysis {
            total_score: analysis.scores.total_score,
            dimension_scores: analysis.scores.dimension_scores,
            summary: analysis.summary.clone(),
            key_insights: analysis.key_insights.clone(),
            analyzed_at: Utc::now(),
        });
    }

    /// Numeric answers, keyed by question id.
    pub fn scored_answers(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.answers
            .iter()
            .filter_map(|(q, a)| a.numeric_value().map(|v| (q.as_str(), v)))
    }

    /// Non-numeric answers, keyed by question id. Empty answers count as free text.
    pub fn free_text_answers(&self) -> impl Iterator<Item = (&str, &Answer)> + '_ {
        self.answers
            .iter()
            .filter(|(_, a)| a.is_free_text())
            .map(|(q, a)| (q.as_str(), a))
    }
}

/// Everything a provider needs to analyze one interview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub interview_id: String,
    pub project: ProjectContext,
    pub answers: BTreeMap<QuestionId, Answer>,
    pub respondent: RespondentMetadata,
}

impl AnalysisRequest {
    pub fn for_interview(interview: &Interview, project: ProjectContext) -> Self {
        Self {
            interview_id: interview.id.clone(),
            project,
            answers: interview.answers.clone(),
            respondent: interview.respondent.clone(),
        }
    }
}
