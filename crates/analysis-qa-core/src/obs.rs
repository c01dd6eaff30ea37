//! Observability hooks for recovery runs.
//!
//! The orchestrator reports lifecycle events through an injected
//! [`RecoveryObserver`] instead of a global logger. [`TracingObserver`] is the
//! production implementation; it emits structured `tracing` events with an
//! `event` field (`recovery.attempt_started`, `recovery.exhausted`, ...).
//!
//! Severity follows the error taxonomy: provider failures and rejections are
//! `info`, a single unconfirmed candidate is `warn`, exhaustion is `error`.

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::provider::ProviderError;
use crate::quality_gate::Rejection;
use crate::recovery::Resolution;

/// Run-scoped span for one recovery. Attach it with
/// [`tracing::Instrument`] so it stays correct across await points.
pub fn recovery_span(run_id: &Uuid, interview_id: &str) -> tracing::Span {
    tracing::info_span!(
        "analysis_qa.recover",
        run_id = %run_id,
        interview_id = %interview_id
    )
}

/// Receives orchestration lifecycle callbacks. Implementations must be cheap
/// and must not block.
pub trait RecoveryObserver: Send + Sync {
    fn run_started(&self, run_id: &Uuid, interview_id: &str, max_attempts: u32);
    fn attempt_started(&self, run_id: &Uuid, attempt: u32);
    fn provider_failed(&self, run_id: &Uuid, attempt: u32, error: &ProviderError);
    fn candidate_rejected(&self, run_id: &Uuid, attempt: u32, rejection: &Rejection);
    fn candidate_accepted(&self, run_id: &Uuid, attempt: u32, accepted: usize);
    fn early_exit(&self, run_id: &Uuid, attempt: u32, accepted: usize);
    fn backoff(&self, run_id: &Uuid, attempt: u32, delay_ms: u64);
    fn cancelled(&self, run_id: &Uuid, attempt: u32);
    fn resolved(&self, run_id: &Uuid, resolution: &Resolution, elapsed_ms: u64);
}

/// Observer that forwards every callback to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RecoveryObserver for TracingObserver {
    fn run_started(&self, run_id: &Uuid, interview_id: &str, max_attempts: u32) {
        info!(
            event = "recovery.started",
            run_id = %run_id,
            interview_id = %interview_id,
            max_attempts = max_attempts,
        );
    }

    fn attempt_started(&self, run_id: &Uuid, attempt: u32) {
        info!(event = "recovery.attempt_started", run_id = %run_id, attempt = attempt);
    }

    fn provider_failed(&self, run_id: &Uuid, attempt: u32, error: &ProviderError) {
        info!(
            event = "recovery.provider_failed",
            run_id = %run_id,
            attempt = attempt,
            kind = error.kind(),
            error = %error,
        );
    }

    fn candidate_rejected(&self, run_id: &Uuid, attempt: u32, rejection: &Rejection) {
        info!(
            event = "recovery.candidate_rejected",
            run_id = %run_id,
            attempt = attempt,
            reason = %rejection,
        );
    }

    fn candidate_accepted(&self, run_id: &Uuid, attempt: u32, accepted: usize) {
        info!(
            event = "recovery.candidate_accepted",
            run_id = %run_id,
            attempt = attempt,
            accepted = accepted,
        );
    }

    fn early_exit(&self, run_id: &Uuid, attempt: u32, accepted: usize) {
        info!(
            event = "recovery.early_exit",
            run_id = %run_id,
            attempt = attempt,
            accepted = accepted,
        );
    }

    fn backoff(&self, run_id: &Uuid, attempt: u32, delay_ms: u64) {
        tracing::debug!(
            event = "recovery.backoff",
            run_id = %run_id,
            attempt = attempt,
            delay_ms = delay_ms,
        );
    }

    fn cancelled(&self, run_id: &Uuid, attempt: u32) {
        warn!(event = "recovery.cancelled", run_id = %run_id, attempt = attempt);
    }

    fn resolved(&self, run_id: &Uuid, resolution: &Resolution, elapsed_ms: u64) {
        match resolution {
            Resolution::Voted { ballot } => info!(
                event = "recovery.voted",
                run_id = %run_id,
                candidates = ballot.scores.len(),
                winner_index = ballot.winner_index,
                elapsed_ms = elapsed_ms,
            ),
            Resolution::SingleCandidate => warn!(
                event = "recovery.single_candidate",
                run_id = %run_id,
                elapsed_ms = elapsed_ms,
                "only one candidate accepted; result has no independent confirmation"
            ),
            Resolution::Fallback => error!(
                event = "recovery.exhausted",
                run_id = %run_id,
                elapsed_ms = elapsed_ms,
                "no candidate accepted; returning fallback analysis"
            ),
        }
    }
}
