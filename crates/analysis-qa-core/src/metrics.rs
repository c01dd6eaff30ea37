//! Atomic counters for one orchestrator instance.
//!
//! Counters are owned by the orchestrator (shared via `Arc`) rather than held
//! in a process-wide static, so concurrent orchestrators and tests never see
//! each other's numbers. Call [`RecoveryMetrics::flush`] to emit the current
//! values as a single `tracing::info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Lightweight atomic counters: no allocations, no locking.
#[derive(Debug, Default)]
pub struct RecoveryMetrics {
    runs: AtomicU64,
    provider_calls: AtomicU64,
    provider_failures: AtomicU64,
    timeouts: AtomicU64,
    rejections: AtomicU64,
    accepted: AtomicU64,
    early_exits: AtomicU64,
    single_candidate: AtomicU64,
    fallbacks: AtomicU64,
    cancellations: AtomicU64,
}

/// Point-in-time copy of [`RecoveryMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub runs: u64,
    pub provider_calls: u64,
    pub provider_failures: u64,
    pub timeouts: u64,
    pub rejections: u64,
    pub accepted: u64,
    pub early_exits: u64,
    pub single_candidate: u64,
    pub fallbacks: u64,
    pub cancellations: u64,
}

fn bump(counter: &AtomicU64, metric: &'static str) {
    counter.fetch_add(1, Ordering::Relaxed);
    tracing::trace!(metric, "counter incremented");
}

impl RecoveryMetrics {
    pub const fn new() -> Self {
        Self {
            runs: AtomicU64::new(0),
            provider_calls: AtomicU64::new(0),
            provider_failures: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            early_exits: AtomicU64::new(0),
            single_candidate: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
            cancellations: AtomicU64::new(0),
        }
    }

    pub fn inc_runs(&self) {
        bump(&self.runs, "runs");
    }

    pub fn inc_provider_calls(&self) {
        bump(&self.provider_calls, "provider_calls");
    }

    /// Provider errors, excluding timeouts.
    pub fn inc_provider_failures(&self) {
        bump(&self.provider_failures, "provider_failures");
    }

    pub fn inc_timeouts(&self) {
        bump(&self.timeouts, "timeouts");
    }

    pub fn inc_rejections(&self) {
        bump(&self.rejections, "rejections");
    }

    pub fn inc_accepted(&self) {
        bump(&self.accepted, "accepted");
    }

    pub fn inc_early_exits(&self) {
        bump(&self.early_exits, "early_exits");
    }

    pub fn inc_single_candidate(&self) {
        bump(&self.single_candidate, "single_candidate");
    }

    pub fn inc_fallbacks(&self) {
        bump(&self.fallbacks, "fallbacks");
    }

    pub fn inc_cancellations(&self) {
        bump(&self.cancellations, "cancellations");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs: self.runs.load(Ordering::Relaxed),
            provider_calls: self.provider_calls.load(Ordering::Relaxed),
            provider_failures: self.provider_failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            early_exits: self.early_exits.load(Ordering::Relaxed),
            single_candidate: self.single_candidate.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
        }
    }

    /// Emit all current counter values as a single `info!` event.
    ///
    /// Call at natural boundaries (end of a batch, shutdown) rather than on
    /// every increment.
    pub fn flush(&self) {
        let s = self.snapshot();
        tracing::info!(
            metric = "flush",
            runs = s.runs,
            provider_calls = s.provider_calls,
            provider_failures = s.provider_failures,
            timeouts = s.timeouts,
            rejections = s.rejections,
            accepted = s.accepted,
            early_exits = s.early_exits,
            single_candidate = s.single_candidate,
            fallbacks = s.fallbacks,
            cancellations = s.cancellations,
        );
    }
}
