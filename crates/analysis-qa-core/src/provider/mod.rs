//! Analysis providers: the single-shot capability the orchestrator retries.
//!
//! The engine never talks to a model directly. Callers inject an
//! [`AnalysisProvider`]; in production it wraps the LLM service, in tests a
//! scripted fake (see [`crate::fakes`]).
//!
//! # Modules
//!
//! - [`error`]: `ProviderError` / `ProviderResult`
//! - [`payload`]: raw model output → typed `ScoredAnalysis`
//! - [`replay`]: `ReplayProvider` over recorded raw payloads

pub mod error;
pub mod payload;
pub mod replay;

use async_trait::async_trait;

use crate::domain::{AnalysisRequest, ScoredAnalysis};

pub use error::{ProviderError, ProviderResult};
pub use payload::{parse_provider_payload, strip_code_fence};
pub use replay::ReplayProvider;

/// One-shot interview analysis.
///
/// Implementations may be slow or fail; the orchestrator bounds each call with
/// its own timeout by dropping the returned future, so implementations must be
/// cancel-safe.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Analyze one interview and return a single scored assessment.
    async fn analyze(&self, request: &AnalysisRequest) -> ProviderResult<ScoredAnalysis>;

    /// Name used in logs and reports.
    fn name(&self) -> &str {
        "provider"
    }
}
