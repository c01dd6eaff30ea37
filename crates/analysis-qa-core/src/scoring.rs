//! Heuristic dimension scoring from raw answers, independent of any provider.
//!
//! Answers are normalized to 0–100 with a first-match-wins ladder, then
//! averaged per dimension. Which questions feed which dimension is decided by
//! caller-supplied question metadata (see [`KeywordDimensionMapper`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Answer, Dimension, DimensionScores, Interview};

/// Score given to answers nothing else matches.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Keyword ladder for non-numeric answers, checked in order.
/// "poco probable" precedes "probable" so the 25 rung is reachable.
const KEYWORD_LADDER: &[(&[&str], f64)] = &[
    (&["muy probable", "definitivamente"], 100.0),
    (&["poco probable"], 25.0),
    (&["probable"], 75.0),
    (&["indiferente", "tal vez"], 50.0),
];

/// Answer scale declared by a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerScale {
    /// Infer from the value: integral ≤ 5 → 1–5 scale, ≤ 10 → 1–10 scale.
    #[default]
    Unspecified,
    OneToFive,
    OneToTen,
    Boolean,
    FreeText,
}

/// What the aggregator knows about one question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionMetadata {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub scale: AnswerScale,
    /// Dimensions this question contributes to. Empty means none.
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

impl QuestionMetadata {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: AnswerScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_dimensions(mut self, dimensions: impl IntoIterator<Item = Dimension>) -> Self {
        self.dimensions = dimensions.into_iter().collect();
        self
    }
}

fn numeric_score(value: f64, scale: AnswerScale) -> f64 {
    let scaled = match scale {
        AnswerScale::OneToFive => value * 20.0,
        AnswerScale::OneToTen => value * 10.0,
        _ if value <= 5.0 && value.fract() == 0.0 => value * 20.0,
        _ if value <= 10.0 => value * 10.0,
        _ => value,
    };
    scaled.clamp(0.0, 100.0)
}

fn text_score(raw: &str) -> f64 {
    let lowered = raw.trim().to_lowercase();
    match lowered.as_str() {
        "sí" | "si" | "yes" => return 100.0,
        "no" => return 0.0,
        _ => {}
    }
    KEYWORD_LADDER
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, score)| *score)
        .unwrap_or(NEUTRAL_SCORE)
}

/// Normalize a raw answer value to 0–100 under the question's declared scale.
pub fn normalize_value(raw: &str, scale: AnswerScale) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => numeric_score(v, scale),
        _ => text_score(raw),
    }
}

/// Normalize one answer to 0–100.
pub fn normalize(answer: &Answer, question: &QuestionMetadata) -> f64 {
    normalize_value(&answer.value, question.scale)
}

/// Mean normalized score per dimension for one interview.
///
/// Answers to questions missing from `catalog` are ignored; a dimension with
/// no contributing answers scores `0.0`.
pub fn aggregate_dimension_scores(
    interview: &Interview,
    catalog: &BTreeMap<String, QuestionMetadata>,
) -> DimensionScores {
    let mut sums: BTreeMap<Dimension, (f64, usize)> = BTreeMap::new();
    for (question_id, answer) in &interview.answers {
        let Some(question) = catalog.get(question_id.as_str()) else {
            continue;
        };
        let score = normalize(answer, question);
        for dimension in &question.dimensions {
            let entry = sums.entry(*dimension).or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }
    }

    let mut scores = DimensionScores::default();
    for (dimension, (sum, count)) in sums {
        if count > 0 {
            scores.set(dimension, sum / count as f64);
        }
    }
    scores
}

/// Keywords that route a question to a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub dimension: Dimension,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(dimension: Dimension, keywords: &[&str]) -> Self {
        Self {
            dimension,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Built-in Spanish/English keyword rules.
pub fn default_keyword_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(
            Dimension::ProblemIntensity,
            &["problema", "problem", "frustra", "dificultad", "difficult"],
        ),
        KeywordRule::new(
            Dimension::SolutionFit,
            &["solución", "solucion", "solution", "útil", "useful", "resolver"],
        ),
        KeywordRule::new(
            Dimension::CurrentBehavior,
            &["actualmente", "currently", "hoy en día", "today", "how do you"],
        ),
        KeywordRule::new(
            Dimension::PainPoint,
            &["dolor", "pain", "molest", "annoy", "peor", "worst"],
        ),
        KeywordRule::new(
            Dimension::EarlyAdopter,
            &["probar", "beta", "early", "primero", "first to try"],
        ),
        KeywordRule::new(
            Dimension::WillingnessToPay,
            &["pagar", "pay", "precio", "price", "presupuesto", "budget"],
        ),
    ]
}

/// Assigns dimensions to questions by case-insensitive keyword containment
/// on the question text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordDimensionMapper {
    rules: Vec<KeywordRule>,
}

impl Default for KeywordDimensionMapper {
    fn default() -> Self {
        Self::new(default_keyword_rules())
    }
}

impl KeywordDimensionMapper {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| KeywordRule {
                dimension: r.dimension,
                keywords: r.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self { rules }
    }

    /// Every dimension whose rule matches `text`, in rule order.
    pub fn dimensions_for(&self, text: &str) -> Vec<Dimension> {
        let lowered = text.to_lowercase();
        let mut found: Vec<Dimension> = Vec::new();
        for rule in &self.rules {
            if !found.contains(&rule.dimension)
                && rule.keywords.iter().any(|k| lowered.contains(k.as_str()))
            {
                found.push(rule.dimension);
            }
        }
        found
    }

    /// Build a catalog keyed by question id. Questions that already list
    /// dimensions keep them; the rest are mapped from their text.
    pub fn catalog(
        &self,
        questions: impl IntoIterator<Item = QuestionMetadata>,
    ) -> BTreeMap<String, QuestionMetadata> {
        questions
            .into_iter()
            .map(|mut q| {
                if q.dimensions.is_empty() {
                    q.dimensions = self.dimensions_for(&q.text);
                }
                (q.id.clone(), q)
            })
            .collect()
    }
}
