//! Bounded retry loop around an [`AnalysisProvider`].
//!
//! Attempts run sequentially. Each one is bounded by the policy's attempt
//! timeout, passed through the quality gate, and followed by a linear backoff
//! unless enough candidates were accepted to vote. The loop suspends only at
//! the provider call and the backoff sleep; both race the caller's
//! [`CancellationToken`].
//!
//! `recover` never fails: exhaustion and cancellation without candidates
//! resolve to [`ScoredAnalysis::fallback`].

use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::policy::RecoveryPolicy;
use super::report::{AttemptOutcome, AttemptRecord, RecoveryReport, Resolution};
use crate::domain::{AnalysisRequest, Result, ScoredAnalysis};
use crate::metrics::RecoveryMetrics;
use crate::obs::{recovery_span, RecoveryObserver, TracingObserver};
use crate::provider::{AnalysisProvider, ProviderError};
use crate::quality_gate::{validate_with, QualityVerdict};
use crate::voting::tally;

/// Drives one provider through the retry, gate and vote pipeline.
///
/// Holds only immutable configuration and shared capabilities, so one
/// orchestrator can serve concurrent runs for different interviews.
pub struct RecoveryOrchestrator {
    provider: Arc<dyn AnalysisProvider>,
    observer: Arc<dyn RecoveryObserver>,
    metrics: Arc<RecoveryMetrics>,
    policy: RecoveryPolicy,
}

impl std::fmt::Debug for RecoveryOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryOrchestrator")
            .field("provider", &self.provider.name())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RecoveryOrchestrator {
    /// Build an orchestrator with the tracing observer. Fails on an invalid policy.
    pub fn new(provider: Arc<dyn AnalysisProvider>, policy: RecoveryPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            provider,
            observer: Arc::new(TracingObserver),
            metrics: Arc::new(RecoveryMetrics::new()),
            policy,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn RecoveryObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<RecoveryMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn policy(&self) -> &RecoveryPolicy {
        &self.policy
    }

    pub fn metrics(&self) -> &Arc<RecoveryMetrics> {
        &self.metrics
    }

    /// Produce exactly one analysis for `request`.
    pub async fn recover(
        &self,
        cancel: &CancellationToken,
        request: &AnalysisRequest,
    ) -> ScoredAnalysis {
        self.recover_with_report(cancel, request).await.analysis
    }

    /// Like [`recover`](Self::recover), returning the full audit record.
    pub async fn recover_with_report(
        &self,
        cancel: &CancellationToken,
        request: &AnalysisRequest,
    ) -> RecoveryReport {
        let run_id = Uuid::new_v4();
        let span = recovery_span(&run_id, &request.interview_id);
        self.run(run_id, cancel, request).instrument(span).await
    }

    async fn run(
        &self,
        run_id: Uuid,
        cancel: &CancellationToken,
        request: &AnalysisRequest,
    ) -> RecoveryReport {
        let started_at = Utc::now();
        let clock = Instant::now();
        let max_attempts = self.policy.max_attempts;

        self.metrics.inc_runs();
        self.observer
            .run_started(&run_id, &request.interview_id, max_attempts);

        let mut candidates: Vec<ScoredAnalysis> = Vec::new();
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut early_exit = false;
        let mut cancelled = false;

        for index in 0..max_attempts {
            let attempt = index + 1;
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            self.observer.attempt_started(&run_id, attempt);
            self.metrics.inc_provider_calls();
            let attempt_clock = Instant::now();

            let outcome = match self.call_provider(cancel, request).await {
                None => {
                    attempts.push(AttemptRecord {
                        attempt,
                        outcome: AttemptOutcome::Cancelled,
                        elapsed_ms: elapsed_ms(attempt_clock),
                    });
                    cancelled = true;
                    break;
                }
                Some(Err(err)) => {
                    self.observer.provider_failed(&run_id, attempt, &err);
                    match err {
                        ProviderError::Timeout { timeout_ms } => {
                            self.metrics.inc_timeouts();
                            AttemptOutcome::TimedOut { timeout_ms }
                        }
                        other => {
                            self.metrics.inc_provider_failures();
                            AttemptOutcome::ProviderFailed {
                                kind: other.kind().to_string(),
                                error: other.to_string(),
                            }
                        }
                    }
                }
                Some(Ok(candidate)) => match validate_with(&self.policy.quality, &candidate) {
                    QualityVerdict::Accepted => {
                        let outcome = AttemptOutcome::Accepted {
                            total_score: candidate.total_score(),
                            confidence: candidate.confidence(),
                        };
                        candidates.push(candidate);
                        self.metrics.inc_accepted();
                        self.observer
                            .candidate_accepted(&run_id, attempt, candidates.len());
                        outcome
                    }
                    QualityVerdict::Rejected { rejection } => {
                        self.metrics.inc_rejections();
                        self.observer
                            .candidate_rejected(&run_id, attempt, &rejection);
                        AttemptOutcome::Rejected { rejection }
                    }
                },
            };

            attempts.push(AttemptRecord {
                attempt,
                outcome,
                elapsed_ms: elapsed_ms(attempt_clock),
            });

            if candidates.len() >= self.policy.early_exit_count {
                early_exit = true;
                self.metrics.inc_early_exits();
                self.observer.early_exit(&run_id, attempt, candidates.len());
                break;
            }

            if attempt < max_attempts {
                let delay = self.policy.backoff_delay(index);
                self.observer
                    .backoff(&run_id, attempt, delay.as_millis() as u64);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        if cancelled {
            self.metrics.inc_cancellations();
            self.observer.cancelled(&run_id, attempts.len() as u32);
        }

        let accepted_candidates = candidates.len();
        let (analysis, resolution) = self.resolve(candidates);
        let elapsed = elapsed_ms(clock);
        self.observer.resolved(&run_id, &resolution, elapsed);

        RecoveryReport {
            run_id,
            interview_id: request.interview_id.clone(),
            provider: self.provider.name().to_string(),
            policy: self.policy.clone(),
            attempts,
            accepted_candidates,
            early_exit,
            cancelled,
            resolution,
            analysis,
            started_at,
            finished_at: Utc::now(),
            elapsed_ms: elapsed,
        }
    }

    /// One provider call bounded by the attempt timeout. `None` means the
    /// caller cancelled while the call was in flight.
    async fn call_provider(
        &self,
        cancel: &CancellationToken,
        request: &AnalysisRequest,
    ) -> Option<std::result::Result<ScoredAnalysis, ProviderError>> {
        let timeout = self.policy.attempt_timeout();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = tokio::time::timeout(timeout, self.provider.analyze(request)) => {
                Some(result.unwrap_or_else(|_elapsed| {
                    Err(ProviderError::Timeout {
                        timeout_ms: self.policy.attempt_timeout_ms,
                    })
                }))
            }
        }
    }

    fn resolve(&self, mut candidates: Vec<ScoredAnalysis>) -> (ScoredAnalysis, Resolution) {
        if candidates.len() == 1 {
            self.metrics.inc_single_candidate();
            if let Some(only) = candidates.pop() {
                return (only, Resolution::SingleCandidate);
            }
        }
        match tally(&candidates) {
            Some(ballot) => {
                let winner = candidates.swap_remove(ballot.winner_index);
                (winner, Resolution::Voted { ballot })
            }
            None => {
                self.metrics.inc_fallbacks();
                (ScoredAnalysis::fallback(), Resolution::Fallback)
            }
        }
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
