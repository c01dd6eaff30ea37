//! End-to-end recovery over recorded raw provider output: parse boundary,
//! quality gate, voting and report persistence.

use std::sync::Arc;

use analysis_qa_core::provider::replay::RecordedResponse;
use analysis_qa_core::{
    read_recovery_report, write_recovery_report, AttemptOutcome, CancellationToken,
    EvidenceQuality, QaError, RecoveryOrchestrator, RecoveryPolicy, Rejection, ReplayProvider,
    Resolution,
};

const WEAK_PAYLOAD: &str = r#"```json
{
  "reasoning": {"step1": "Respondent describes the problem", "step2": "No budget mentioned"},
  "scores": {
    "totalScore": 58.4,
    "confidence": 0.6,
    "dimensionScores": {"problemIntensity": 70, "willingnessToPay": 20}
  },
  "validation": {"contradictions": [], "evidenceQuality": "weak"},
  "summary": "Clear pain around invoicing, no sign of willingness to pay.",
  "keyInsights": ["invoicing is manual"]
}
```"#;

const STRONG_PAYLOAD: &str = r#"{
  "reasoning": [{"step": "problem", "content": "Spends six hours a week reconciling invoices by hand."}],
  "scores": {"totalScore": 81, "confidence": 0.75},
  "validation": {"contradictions": ["says budget is tight but pays for two tools"], "evidenceQuality": "STRONG"},
  "summary": "Strong early adopter; already pays for partial solutions.",
  "keyInsights": ["pays for two tools", "six hours weekly"]
}"#;

const FAILED_PAYLOAD: &str = r#"{
  "scores": {"totalScore": 0, "confidence": 0.9},
  "summary": "Analysis failed: the model could not read the transcript."
}"#;

fn request() -> analysis_qa_core::AnalysisRequest {
    analysis_qa_core::AnalysisRequest {
        interview_id: "iv-replay".to_string(),
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn recorded_payloads_vote_for_the_stronger_analysis() {
    let provider = Arc::new(ReplayProvider::from_payloads([WEAK_PAYLOAD, STRONG_PAYLOAD]));
    let orch = RecoveryOrchestrator::new(provider.clone(), RecoveryPolicy::default()).unwrap();

    let report = orch
        .recover_with_report(&CancellationToken::new(), &request())
        .await;

    assert_eq!(provider.remaining(), 0);
    assert!(report.early_exit);
    assert_eq!(report.provider, "replay");
    assert_eq!(report.analysis.total_score(), 81);
    assert_eq!(report.analysis.evidence_quality(), EvidenceQuality::Strong);
    match &report.resolution {
        Resolution::Voted { ballot } => {
            assert_eq!(ballot.scores.len(), 2);
            assert_eq!(ballot.winner_index, 1);
        }
        other => panic!("expected vote, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn malformed_and_failed_payloads_are_not_candidates() {
    let provider = Arc::new(ReplayProvider::new(vec![
        RecordedResponse::Payload {
            body: "the model returned prose instead of json".into(),
        },
        RecordedResponse::Payload {
            body: FAILED_PAYLOAD.into(),
        },
        RecordedResponse::Payload {
            body: WEAK_PAYLOAD.into(),
        },
    ]));
    let orch = RecoveryOrchestrator::new(provider, RecoveryPolicy::default()).unwrap();

    let report = orch
        .recover_with_report(&CancellationToken::new(), &request())
        .await;

    assert!(matches!(
        &report.attempts[0].outcome,
        AttemptOutcome::ProviderFailed { kind, .. } if kind == "malformed_payload"
    ));
    assert!(matches!(
        &report.attempts[1].outcome,
        AttemptOutcome::Rejected {
            rejection: Rejection::FailureMarker { .. }
        }
    ));
    assert_eq!(report.resolution, Resolution::SingleCandidate);
    // Parse boundary rounds the fractional total.
    assert_eq!(report.analysis.total_score(), 58);
}

#[tokio::test(start_paused = true)]
async fn upstream_errors_exhaust_into_fallback() {
    let provider = Arc::new(ReplayProvider::new(vec![
        RecordedResponse::Status {
            code: 429,
            message: "rate limited".into(),
        },
        RecordedResponse::Transport {
            message: "connection reset".into(),
        },
    ]));
    let orch = RecoveryOrchestrator::new(provider, RecoveryPolicy::default()).unwrap();

    let report = orch
        .recover_with_report(&CancellationToken::new(), &request())
        .await;

    let kinds: Vec<&str> = report
        .attempts
        .iter()
        .map(|a| match &a.outcome {
            AttemptOutcome::ProviderFailed { kind, .. } => kind.as_str(),
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["status", "transport", "unavailable"]);
    assert_eq!(report.resolution, Resolution::Fallback);
    assert!(report.analysis.is_fallback());
}

#[tokio::test(start_paused = true)]
async fn report_survives_disk_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(ReplayProvider::from_payloads([STRONG_PAYLOAD]));
    let orch = RecoveryOrchestrator::new(provider, RecoveryPolicy::default()).unwrap();
    let report = orch
        .recover_with_report(&CancellationToken::new(), &request())
        .await;

    let path = write_recovery_report(&report, dir.path()).unwrap();
    assert!(path.ends_with("recovery.json"));
    assert!(path.starts_with(dir.path().join(report.run_id.to_string())));

    let loaded = read_recovery_report(&report.run_id, dir.path()).unwrap();
    assert_eq!(loaded, report);
}

#[tokio::test(start_paused = true)]
async fn tampered_report_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(ReplayProvider::from_payloads([STRONG_PAYLOAD]));
    let orch = RecoveryOrchestrator::new(provider, RecoveryPolicy::default()).unwrap();
    let report = orch
        .recover_with_report(&CancellationToken::new(), &request())
        .await;

    let path = write_recovery_report(&report, dir.path()).unwrap();
    let original = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, original.replace("\"iv-replay\"", "\"iv-forged\"")).unwrap();

    let err = read_recovery_report(&report.run_id, dir.path()).unwrap_err();
    assert!(matches!(err, QaError::DigestMismatch { .. }));
}

#[test]
fn missing_report_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_recovery_report(&uuid_like(), dir.path()).unwrap_err();
    assert!(matches!(err, QaError::Io(_)));
}

fn uuid_like() -> uuid::Uuid {
    uuid::Uuid::nil()
}
