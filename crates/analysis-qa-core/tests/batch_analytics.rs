//! Batch analytics and heuristic scoring over realistic interview sets.

use std::collections::BTreeMap;

use analysis_qa_core::scoring::default_keyword_rules;
use analysis_qa_core::{
    aggregate_dimension_scores, detect_anomalies, detect_biases, AnalysisState, AnomalyType,
    AnswerScale, BiasType, Dimension, Interview, KeywordDimensionMapper, QaError,
    QuestionMetadata, ScoredAnalysis,
};

fn interview(id: &str, answers: &[(&str, &str)]) -> Interview {
    answers
        .iter()
        .fold(Interview::new(id), |iv, (q, v)| iv.with_answer(*q, *v))
}

fn with_total(mut iv: Interview, total: i64) -> Interview {
    let mut analysis = ScoredAnalysis::fallback();
    analysis.scores.total_score = total;
    iv.apply_analysis(&analysis);
    iv
}

// ---------------------------------------------------------------------------
// Anomalies
// ---------------------------------------------------------------------------

#[test]
fn value_exactly_two_std_devs_out_is_flagged() {
    let batch: Vec<Interview> = [("a", "10"), ("b", "10"), ("c", "10"), ("d", "10"), ("e", "50")]
        .iter()
        .map(|(id, v)| interview(id, &[("q1", v)]))
        .collect();

    let anomalies = detect_anomalies(&batch).unwrap();

    assert_eq!(anomalies.len(), 1);
    let a = &anomalies[0];
    assert_eq!(a.interview_id, "e");
    assert_eq!(a.anomaly_type, AnomalyType::Outlier);
    assert_eq!(a.metric, "q1");
    assert_eq!(a.value, 50.0);
    assert_eq!(a.deviation_in_std_devs, 2.0);
}

#[test]
fn four_interviews_are_not_analyzed() {
    let batch: Vec<Interview> = ["a", "b", "c", "d"]
        .iter()
        .map(|id| interview(id, &[("q1", "1"), ("q2", "1"), ("q3", "1"), ("q4", "1")]))
        .collect();
    assert!(detect_anomalies(&batch).unwrap().is_empty());
}

#[test]
fn identical_metric_across_batch_is_skipped() {
    let batch: Vec<Interview> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|id| interview(id, &[("q1", "6"), ("q2", "tal vez")]))
        .collect();
    assert!(detect_anomalies(&batch).unwrap().is_empty());
}

#[test]
fn straight_lined_interview_is_a_pattern() {
    let batch = vec![
        interview("a", &[("q1", "3"), ("q2", "4"), ("q3", "2"), ("q4", "5")]),
        interview("b", &[("q1", "4"), ("q2", "3"), ("q3", "3"), ("q4", "4")]),
        interview("c", &[("q1", "2"), ("q2", "4"), ("q3", "4"), ("q4", "3")]),
        interview("d", &[("q1", "3"), ("q2", "3"), ("q3", "2"), ("q4", "4")]),
        interview("e", &[("q1", "5"), ("q2", "5"), ("q3", "5"), ("q4", "5")]),
    ];

    let anomalies = detect_anomalies(&batch).unwrap();

    let patterns: Vec<&str> = anomalies
        .iter()
        .filter(|a| a.anomaly_type == AnomalyType::Pattern)
        .map(|a| a.interview_id.as_str())
        .collect();
    assert_eq!(patterns, vec!["e"]);
    assert!(anomalies
        .iter()
        .filter(|a| a.anomaly_type == AnomalyType::Outlier)
        .all(|a| a.deviation_in_std_devs >= 2.0));
}

#[test]
fn applied_total_score_is_a_metric() {
    let batch = vec![
        with_total(interview("a", &[("q1", "bien")]), 60),
        with_total(interview("b", &[("q1", "bien")]), 60),
        with_total(interview("c", &[("q1", "bien")]), 60),
        with_total(interview("d", &[("q1", "bien")]), 60),
        with_total(interview("e", &[("q1", "bien")]), 100),
    ];
    assert!(batch.iter().all(|i| i.state() == AnalysisState::Complete));

    let anomalies = detect_anomalies(&batch).unwrap();

    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].metric, "totalScore");
    assert_eq!(anomalies[0].interview_id, "e");
}

#[test]
fn duplicate_ids_fail_even_for_small_batches() {
    let batch = vec![interview("a", &[]), interview("a", &[])];
    let err = detect_anomalies(&batch).unwrap_err();
    assert!(matches!(err, QaError::DuplicateInterviewId(id) if id == "a"));
}

#[test]
fn anomaly_serializes_with_type_field() {
    let batch: Vec<Interview> = [("a", "10"), ("b", "10"), ("c", "10"), ("d", "10"), ("e", "50")]
        .iter()
        .map(|(id, v)| interview(id, &[("q1", v)]))
        .collect();
    let anomalies = detect_anomalies(&batch).unwrap();
    let json = serde_json::to_value(&anomalies[0]).unwrap();
    assert_eq!(json["type"], "outlier");
    assert_eq!(json["interviewId"], "e");
    assert_eq!(json["deviationInStdDevs"], 2.0);
}

// ---------------------------------------------------------------------------
// Biases
// ---------------------------------------------------------------------------

#[test]
fn all_tens_trigger_acquiescence_and_extremity() {
    let iv = interview(
        "iv",
        &[("q1", "10"), ("q2", "10"), ("q3", "10"), ("q4", "10")],
    );
    let biases = detect_biases(&iv);
    let types: Vec<BiasType> = biases.iter().map(|b| b.bias_type).collect();

    assert_eq!(types, vec![BiasType::Acquiescence, BiasType::Extremity]);
    assert_eq!(biases[0].confidence, 0.7);
    assert_eq!(biases[1].confidence, 0.6);
}

#[test]
fn social_desirability_confidence_is_capped() {
    let iv = interview(
        "iv",
        &[
            ("q1", "Siempre uso la app"),
            ("q2", "Nunca falla"),
            ("q3", "Es perfecto"),
            ("q4", "Lo reviso todos los días"),
            ("q5", "Always on time"),
            ("q6", "It is 100% reliable"),
        ],
    );
    let bias = detect_biases(&iv)
        .into_iter()
        .find(|b| b.bias_type == BiasType::SocialDesirability)
        .unwrap();
    assert_eq!(bias.evidence.len(), 6);
    assert_eq!(bias.confidence, 0.9);
}

#[test]
fn balanced_interview_has_no_biases() {
    let iv = interview(
        "iv",
        &[
            ("q1", "7"),
            ("q2", "4"),
            ("q3", "Uso hojas de cálculo y me toma mucho tiempo"),
            ("q4", "Pagaría si se integra con mi banco"),
            ("q5", "3"),
            ("q6", "Lo probaría en la próxima temporada"),
        ],
    );
    assert!(detect_biases(&iv).is_empty());
}

// ---------------------------------------------------------------------------
// Dimension scoring
// ---------------------------------------------------------------------------

#[test]
fn catalog_maps_questions_and_scores_dimensions() {
    let mapper = KeywordDimensionMapper::new(default_keyword_rules());
    let catalog: BTreeMap<String, QuestionMetadata> = mapper.catalog([
        QuestionMetadata::new("q_pay", "¿Cuánto pagarías por esta solución?")
            .with_scale(AnswerScale::OneToFive),
        QuestionMetadata::new("q_problem", "¿Qué tan frustrante es el problema?")
            .with_scale(AnswerScale::OneToTen),
        QuestionMetadata::new("q_try", "¿Te gustaría probar la beta?"),
        QuestionMetadata::new("q_other", "¿Cómo te llamas?"),
    ]);

    assert_eq!(
        catalog["q_pay"].dimensions,
        vec![Dimension::SolutionFit, Dimension::WillingnessToPay]
    );
    assert!(catalog["q_other"].dimensions.is_empty());

    let iv = interview(
        "iv",
        &[
            ("q_pay", "4"),
            ("q_problem", "9"),
            ("q_try", "muy probable"),
            ("q_other", "Ana"),
            ("q_unknown", "5"),
        ],
    );
    let scores = aggregate_dimension_scores(&iv, &catalog);

    assert_eq!(scores.get(Dimension::WillingnessToPay), 80.0);
    assert_eq!(scores.get(Dimension::SolutionFit), 80.0);
    assert_eq!(scores.get(Dimension::ProblemIntensity), 90.0);
    assert_eq!(scores.get(Dimension::EarlyAdopter), 100.0);
    assert_eq!(scores.get(Dimension::PainPoint), 0.0);
    assert_eq!(scores.get(Dimension::CurrentBehavior), 0.0);
}

#[test]
fn dimension_mean_over_multiple_questions() {
    let catalog: BTreeMap<String, QuestionMetadata> = [
        QuestionMetadata::new("q1", "").with_dimensions([Dimension::PainPoint]),
        QuestionMetadata::new("q2", "").with_dimensions([Dimension::PainPoint]),
        QuestionMetadata::new("q3", "").with_dimensions([Dimension::PainPoint]),
    ]
    .into_iter()
    .map(|q| (q.id.clone(), q))
    .collect();

    let iv = interview("iv", &[("q1", "sí"), ("q2", "no"), ("q3", "poco probable")]);
    let scores = aggregate_dimension_scores(&iv, &catalog);

    let expected = (100.0 + 0.0 + 25.0) / 3.0;
    assert!((scores.get(Dimension::PainPoint) - expected).abs() < 1e-9);
}
