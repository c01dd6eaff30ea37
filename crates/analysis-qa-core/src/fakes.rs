//! In-memory fakes for the provider and observer seams (testing and demos).
//!
//! - `ScriptedProvider`: returns a scripted sequence of responses and counts calls
//! - `RecordingObserver`: records every orchestration callback

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AnalysisRequest, ScoredAnalysis};
use crate::obs::RecoveryObserver;
use crate::provider::{AnalysisProvider, ProviderError, ProviderResult};
use crate::quality_gate::Rejection;
use crate::recovery::Resolution;

// ---------------------------------------------------------------------------
// ScriptedProvider
// ---------------------------------------------------------------------------

/// One scripted provider behaviour.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Respond(ScoredAnalysis),
    Fail(ProviderError),
    /// Never completes; only the orchestrator's timeout or cancellation ends it.
    Hang,
}

/// Provider that plays back [`ScriptStep`]s in order, then repeats `otherwise`.
#[derive(Debug)]
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<ScriptStep>>,
    otherwise: ScriptStep,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    /// Play `steps`, then fail with `Unavailable` forever.
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            otherwise: ScriptStep::Fail(ProviderError::Unavailable("script exhausted".into())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Respond with `analysis` on every call.
    pub fn always(analysis: ScoredAnalysis) -> Self {
        Self {
            otherwise: ScriptStep::Respond(analysis),
            ..Self::new(Vec::new())
        }
    }

    /// Fail with a transport error on every call.
    pub fn always_failing() -> Self {
        Self {
            otherwise: ScriptStep::Fail(ProviderError::Transport("connection reset".into())),
            ..Self::new(Vec::new())
        }
    }

    /// Never answer.
    pub fn hanging() -> Self {
        Self {
            otherwise: ScriptStep::Hang,
            ..Self::new(Vec::new())
        }
    }

    /// Number of `analyze` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> ScriptStep {
        let mut steps = self.steps.lock().unwrap();
        steps.pop_front().unwrap_or_else(|| self.otherwise.clone())
    }
}

#[async_trait]
impl AnalysisProvider for ScriptedProvider {
    async fn analyze(&self, _request: &AnalysisRequest) -> ProviderResult<ScoredAnalysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_step() {
            ScriptStep::Respond(analysis) => Ok(analysis),
            ScriptStep::Fail(err) => Err(err),
            ScriptStep::Hang => std::future::pending().await,
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ---------------------------------------------------------------------------
// RecordingObserver
// ---------------------------------------------------------------------------

/// A recorded observer callback.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    RunStarted { max_attempts: u32 },
    AttemptStarted { attempt: u32 },
    ProviderFailed { attempt: u32, kind: String },
    CandidateRejected { attempt: u32, rejection: Rejection },
    CandidateAccepted { attempt: u32, accepted: usize },
    EarlyExit { attempt: u32, accepted: usize },
    Backoff { attempt: u32, delay_ms: u64 },
    Cancelled { attempt: u32 },
    Resolved { resolution: Resolution },
}

/// Observer that keeps every callback in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Backoff delays in the order they were scheduled.
    pub fn backoff_delays(&self) -> Vec<u64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ObservedEvent::Backoff { delay_ms, .. } => Some(delay_ms),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ObservedEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl RecoveryObserver for RecordingObserver {
    fn run_started(&self, _run_id: &Uuid, _interview_id: &str, max_attempts: u32) {
        self.push(ObservedEvent::RunStarted { max_attempts });
    }

    fn attempt_started(&self, _run_id: &Uuid, attempt: u32) {
        self.push(ObservedEvent::AttemptStarted { attempt });
    }

    fn provider_failed(&self, _run_id: &Uuid, attempt: u32, error: &ProviderError) {
        self.push(ObservedEvent::ProviderFailed {
            attempt,
            kind: error.kind().to_string(),
        });
    }

    fn candidate_rejected(&self, _run_id: &Uuid, attempt: u32, rejection: &Rejection) {
        self.push(ObservedEvent::CandidateRejected {
            attempt,
            rejection: rejection.clone(),
        });
    }

    fn candidate_accepted(&self, _run_id: &Uuid, attempt: u32, accepted: usize) {
        self.push(ObservedEvent::CandidateAccepted { attempt, accepted });
    }

    fn early_exit(&self, _run_id: &Uuid, attempt: u32, accepted: usize) {
        self.push(ObservedEvent::EarlyExit { attempt, accepted });
    }

    fn backoff(&self, _run_id: &Uuid, attempt: u32, delay_ms: u64) {
        self.push(ObservedEvent::Backoff { attempt, delay_ms });
    }

    fn cancelled(&self, _run_id: &Uuid, attempt: u32) {
        self.push(ObservedEvent::Cancelled { attempt });
    }

    fn resolved(&self, _run_id: &Uuid, resolution: &Resolution, _elapsed_ms: u64) {
        self.push(ObservedEvent::Resolved {
            resolution: resolution.clone(),
        });
    }
}
