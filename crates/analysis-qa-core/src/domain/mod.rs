//! Domain models for the analysis QA engine.
//!
//! - `ScoredAnalysis`: one provider assessment of an interview
//! - `Interview` / `Answer`: the respondent session being assessed
//! - `AnalysisRequest`: what a provider receives

pub mod analysis;
pub mod error;
pub mod interview;

pub use analysis::{
    Contradiction, Dimension, DimensionScores, EvidenceQuality, ReasoningStep, ScoredAnalysis,
    Scores, Validation, FALLBACK_SUMMARY,
};
pub use error::{QaError, Result};
pub use interview::{
    AnalysisRequest, AnalysisState, Answer, Interview, InterviewAnalysis, ProjectContext,
    QuestionId, RespondentMetadata,
};
