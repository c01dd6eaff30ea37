//! Observability tests for recovery run tracing.
//!
//! These check that the default `TracingObserver` emits the structured
//! `event = "..."` records operators alert on.

use std::sync::Arc;

use analysis_qa_core::fakes::{ScriptStep, ScriptedProvider};
use analysis_qa_core::{
    recovery_span, CancellationToken, EvidenceQuality, ProviderError, RecoveryObserver,
    RecoveryOrchestrator, RecoveryPolicy, Rejection, Resolution, ScoredAnalysis,
    TracingObserver,
};
use tracing_test::traced_test;
use uuid::Uuid;

fn accepted() -> ScoredAnalysis {
    let mut a = ScoredAnalysis::fallback();
    a.scores.total_score = 70;
    a.scores.confidence = 0.9;
    a.validation.evidence_quality = EvidenceQuality::Strong;
    a.summary = "Respondent already pays for a workaround.".to_string();
    a
}

async fn run(provider: ScriptedProvider) {
    let orch = RecoveryOrchestrator::new(Arc::new(provider), RecoveryPolicy::default()).unwrap();
    let request = analysis_qa_core::AnalysisRequest {
        interview_id: "iv-obs".to_string(),
        ..Default::default()
    };
    orch.recover(&CancellationToken::new(), &request).await;
}

#[traced_test]
#[tokio::test(start_paused = true)]
async fn voted_run_logs_attempts_and_early_exit() {
    run(ScriptedProvider::always(accepted())).await;

    assert!(logs_contain("recovery.started"));
    assert!(logs_contain("recovery.attempt_started"));
    assert!(logs_contain("recovery.early_exit"));
    assert!(logs_contain("recovery.voted"));
    assert!(logs_contain("iv-obs"));
    assert!(!logs_contain("recovery.exhausted"));
}

#[traced_test]
#[tokio::test(start_paused = true)]
async fn exhausted_run_logs_failures_and_fallback() {
    run(ScriptedProvider::always_failing()).await;

    assert!(logs_contain("recovery.provider_failed"));
    assert!(logs_contain("recovery.backoff"));
    assert!(logs_contain("recovery.exhausted"));
    assert!(logs_contain("ERROR"));
}

#[traced_test]
#[tokio::test(start_paused = true)]
async fn single_candidate_is_a_warning() {
    let mut weak = accepted();
    weak.scores.confidence = 0.05;
    run(ScriptedProvider::new(vec![
        ScriptStep::Respond(accepted()),
        ScriptStep::Respond(weak),
        ScriptStep::Fail(ProviderError::Unavailable("maintenance".into())),
    ]))
    .await;

    assert!(logs_contain("recovery.candidate_rejected"));
    assert!(logs_contain("recovery.single_candidate"));
    assert!(logs_contain("WARN"));
}

#[traced_test]
#[tokio::test]
async fn cancelled_run_is_logged() {
    let orch = RecoveryOrchestrator::new(
        Arc::new(ScriptedProvider::always(accepted())),
        RecoveryPolicy::default(),
    )
    .unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    orch.recover(&cancel, &Default::default()).await;

    assert!(logs_contain("recovery.cancelled"));
}

#[traced_test]
#[test]
fn tracing_observer_direct_calls() {
    let obs = TracingObserver;
    let run_id = Uuid::new_v4();
    let span = recovery_span(&run_id, "iv-direct");
    let _guard = span.enter();

    obs.candidate_rejected(
        &run_id,
        1,
        &Rejection::SummaryTooShort {
            chars: 3,
            minimum: 20,
        },
    );
    obs.resolved(&run_id, &Resolution::Fallback, 42);

    assert!(logs_contain("summary has 3 chars"));
    assert!(logs_contain(&run_id.to_string()));
}
