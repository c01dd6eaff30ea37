//! Error types for analysis providers.

/// A single failed provider attempt.
///
/// Every variant is transient from the orchestrator's point of view: it
/// consumes one attempt and triggers backoff.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("malformed provider payload: {0}")]
    MalformedPayload(String),

    #[error("provider call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Short machine-readable tag for logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::Timeout { .. } => "timeout",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedPayload(err.to_string())
    }
}

/// Result type for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
