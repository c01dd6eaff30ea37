//! Domain-level error taxonomy.
//!
//! Provider failures have their own type ([`crate::provider::ProviderError`])
//! because the orchestrator absorbs them; everything here is surfaced to
//! callers.

/// Analysis QA errors.
#[derive(Debug, thiserror::Error)]
pub enum QaError {
    #[error("invalid recovery policy: {0}")]
    InvalidPolicy(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("duplicate interview id in batch: {0}")]
    DuplicateInterviewId(String),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for analysis QA operations.
pub type Result<T> = std::result::Result<T, QaError>;
