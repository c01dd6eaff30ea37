//! Analysis QA Core Library
//!
//! Turns a slow, unreliable LLM interview analysis call into one validated,
//! bounded-latency assessment (retry, quality gate, self-consistency voting),
//! and provides batch analytics over stored interviews.

pub mod analytics;
pub mod config;
pub mod domain;
pub mod fakes;
pub mod metrics;
pub mod obs;
pub mod provider;
pub mod quality_gate;
pub mod recovery;
pub mod scoring;
pub mod telemetry;
pub mod voting;

pub use domain::{
    AnalysisRequest, AnalysisState, Answer, Contradiction, Dimension, DimensionScores,
    EvidenceQuality, Interview, InterviewAnalysis, ProjectContext, QaError, QuestionId,
    ReasoningStep, RespondentMetadata, Result, ScoredAnalysis, Scores, Validation,
};

pub use analytics::{detect_anomalies, detect_biases, Anomaly, AnomalyType, Bias, BiasType};
pub use config::QaConfig;
pub use metrics::{MetricsSnapshot, RecoveryMetrics};
pub use obs::{recovery_span, RecoveryObserver, TracingObserver};
pub use provider::{
    parse_provider_payload, AnalysisProvider, ProviderError, ProviderResult, ReplayProvider,
};
pub use quality_gate::{
    is_acceptable, validate, validate_with, QualityThresholds, QualityVerdict, Rejection,
};
pub use recovery::{
    read_recovery_report, write_recovery_report, AttemptOutcome, AttemptRecord,
    RecoveryOrchestrator, RecoveryPolicy, RecoveryReport, Resolution,
};
pub use scoring::{
    aggregate_dimension_scores, normalize, normalize_value, AnswerScale, KeywordDimensionMapper,
    KeywordRule, QuestionMetadata,
};
pub use telemetry::init_tracing;
pub use voting::{select_best, tally, voting_score, Ballot};

pub use tokio_util::sync::CancellationToken;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
