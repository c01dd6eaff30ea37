//! Batch outlier and straight-lining detection across interviews.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::{Interview, QaError, Result};

/// Batches smaller than this are not scanned.
pub const MIN_INTERVIEWS: usize = 5;

/// |z| at or above this many standard deviations is an outlier.
///
/// Inclusive: with population statistics the largest reachable |z| in a batch
/// of `n` values is `sqrt(n - 1)`, exactly 2.0 for the minimum batch of 5.
pub const OUTLIER_Z: f64 = 2.0;

/// An interview needs more than this many scored answers for the
/// straight-lining check.
pub const PATTERN_MIN_EXCLUSIVE: usize = 3;

/// Metric name used for the applied analysis total score.
pub const TOTAL_SCORE_METRIC: &str = "totalScore";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    /// Value far from the batch mean of its metric.
    Outlier,
    /// Every scored answer identical (suspicious consistency).
    Pattern,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub interview_id: String,
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,
    pub metric: String,
    pub value: f64,
    pub deviation_in_std_devs: f64,
    pub message: String,
}

/// Numeric metrics of one interview: every numeric answer keyed by question
/// id, plus [`TOTAL_SCORE_METRIC`] once an analysis has been applied.
pub fn interview_metrics(interview: &Interview) -> BTreeMap<String, f64> {
    let mut metrics: BTreeMap<String, f64> = interview
        .scored_answers()
        .map(|(q, v)| (q.to_string(), v))
        .collect();
    if let Some(analysis) = &interview.analysis {
        metrics.insert(TOTAL_SCORE_METRIC.to_string(), analysis.total_score as f64);
    }
    metrics
}

/// Population mean and standard deviation.
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

fn outliers(interviews: &[Interview]) -> Vec<Anomaly> {
    let mut by_metric: BTreeMap<String, Vec<(&str, f64)>> = BTreeMap::new();
    for interview in interviews {
        for (metric, value) in interview_metrics(interview) {
            by_metric
                .entry(metric)
                .or_default()
                .push((interview.id.as_str(), value));
        }
    }

    let mut found = Vec::new();
    for (metric, samples) in by_metric {
        let values: Vec<f64> = samples.iter().map(|(_, v)| *v).collect();
        let (mean, std_dev) = mean_std(&values);
        if std_dev == 0.0 {
            continue;
        }
        for (interview_id, value) in samples {
            let z = (value - mean) / std_dev;
            if z.abs() >= OUTLIER_Z {
                found.push(Anomaly {
                    interview_id: interview_id.to_string(),
                    anomaly_type: AnomalyType::Outlier,
                    metric: metric.clone(),
                    value,
                    deviation_in_std_devs: z.abs(),
                    message: format!(
                        "{metric} = {value} is {:.2} std devs from the mean {mean:.2}",
                        z.abs()
                    ),
                });
            }
        }
    }
    found
}

fn straight_lined(interview: &Interview) -> Option<Anomaly> {
    let values: Vec<f64> = interview.scored_answers().map(|(_, v)| v).collect();
    let first = *values.first()?;
    if values.len() <= PATTERN_MIN_EXCLUSIVE || values.iter().any(|v| *v != first) {
        return None;
    }
    Some(Anomaly {
        interview_id: interview.id.clone(),
        anomaly_type: AnomalyType::Pattern,
        metric: "scoredAnswers".to_string(),
        value: first,
        deviation_in_std_devs: 0.0,
        message: format!(
            "suspicious consistency: all {} scored answers are {first}",
            values.len()
        ),
    })
}

/// Scan a completed batch of interviews.
///
/// Fewer than [`MIN_INTERVIEWS`] interviews yields an empty result. Duplicate
/// interview ids are a caller bug and fail loudly.
pub fn detect_anomalies(interviews: &[Interview]) -> Result<Vec<Anomaly>> {
    let mut seen = HashSet::new();
    if let Some(dup) = interviews.iter().find(|i| !seen.insert(i.id.as_str())) {
        return Err(QaError::DuplicateInterviewId(dup.id.clone()));
    }
    if interviews.len() < MIN_INTERVIEWS {
        return Ok(Vec::new());
    }

    let mut anomalies = outliers(interviews);
    anomalies.extend(interviews.iter().filter_map(straight_lined));
    Ok(anomalies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_std_is_population() {
        let (mean, std) = mean_std(&[10.0, 10.0, 10.0, 10.0, 50.0]);
        assert_eq!(mean, 18.0);
        assert_eq!(std, 16.0);
    }

    #[test]
    fn straight_lining_needs_more_than_three_answers() {
        let three = Interview::new("a")
            .with_answer("q1", "7")
            .with_answer("q2", "7")
            .with_answer("q3", "7");
        assert!(straight_lined(&three).is_none());

        let four = three.with_answer("q4", "7");
        let anomaly = straight_lined(&four).unwrap();
        assert_eq!(anomaly.anomaly_type, AnomalyType::Pattern);
        assert_eq!(anomaly.value, 7.0);
    }

    #[test]
    fn metrics_include_applied_total_score() {
        let mut interview = Interview::new("a").with_answer("q1", "3");
        let mut analysis = crate::domain::ScoredAnalysis::fallback();
        analysis.scores.total_score = 77;
        interview.apply_analysis(&analysis);
        let metrics = interview_metrics(&interview);
        assert_eq!(metrics[TOTAL_SCORE_METRIC], 77.0);
        assert_eq!(metrics["q1"], 3.0);
    }
}
