//! Retry budget, backoff and timeout configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{QaError, Result};
use crate::quality_gate::QualityThresholds;

/// Bounded recovery policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryPolicy {
    /// Total provider calls allowed per run, whatever the failure reason.
    pub max_attempts: u32,
    /// Linear backoff unit: attempt `i` (0-based) waits `base_delay_ms * (i + 1)`.
    pub base_delay_ms: u64,
    /// Stop calling the provider once this many candidates were accepted.
    pub early_exit_count: usize,
    /// Wall-clock limit for a single provider call.
    pub attempt_timeout_ms: u64,
    pub quality: QualityThresholds,
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            early_exit_count: 2,
            attempt_timeout_ms: 30_000,
            quality: QualityThresholds::standard(),
        }
    }
}

impl RecoveryPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(QaError::InvalidPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.early_exit_count == 0 {
            return Err(QaError::InvalidPolicy(
                "early_exit_count must be at least 1".to_string(),
            ));
        }
        if self.early_exit_count > self.max_attempts as usize {
            return Err(QaError::InvalidPolicy(format!(
                "early_exit_count {} exceeds max_attempts {}",
                self.early_exit_count, self.max_attempts
            )));
        }
        if self.attempt_timeout_ms == 0 {
            return Err(QaError::InvalidPolicy(
                "attempt_timeout_ms must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.quality.min_confidence) {
            return Err(QaError::InvalidPolicy(
                "quality.min_confidence must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    /// Delay after the attempt with 0-based `attempt_index`.
    pub fn backoff_delay(&self, attempt_index: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(u64::from(attempt_index) + 1))
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}
