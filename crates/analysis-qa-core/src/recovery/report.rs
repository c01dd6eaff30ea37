//! Auditable record of one recovery run.
//!
//! Reports can be persisted as `<dir>/<run_id>/recovery.json` next to a
//! `recovery.digest` file holding the SHA-256 of the JSON bytes; reading
//! verifies the digest.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::policy::RecoveryPolicy;
use crate::domain::{QaError, Result, ScoredAnalysis};
use crate::quality_gate::Rejection;
use crate::voting::Ballot;

/// What happened on one provider attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Accepted { total_score: i64, confidence: f64 },
    Rejected { rejection: Rejection },
    ProviderFailed { kind: String, error: String },
    TimedOut { timeout_ms: u64 },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// 1-based attempt number.
    pub attempt: u32,
    pub outcome: AttemptOutcome,
    pub elapsed_ms: u64,
}

/// How the final analysis was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Two or more candidates; the voter picked one.
    Voted { ballot: Ballot },
    /// Exactly one accepted candidate, returned without confirmation.
    SingleCandidate,
    /// No accepted candidate; the fixed fallback was returned.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryReport {
    pub run_id: Uuid,
    pub interview_id: String,
    pub provider: String,
    pub policy: RecoveryPolicy,
    pub attempts: Vec<AttemptRecord>,
    pub accepted_candidates: usize,
    pub early_exit: bool,
    pub cancelled: bool,
    pub resolution: Resolution,
    pub analysis: ScoredAnalysis,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl RecoveryReport {
    /// Number of provider calls issued, including a call interrupted by cancellation.
    pub fn provider_calls(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self.resolution, Resolution::Voted { .. })
    }
}

/// SHA-256 hex digest of `data`.
pub fn content_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Persist `<dir>/<run_id>/recovery.json` and `<dir>/<run_id>/recovery.digest`.
pub fn write_recovery_report(report: &RecoveryReport, dir: &Path) -> Result<PathBuf> {
    let run_dir = dir.join(report.run_id.to_string());
    std::fs::create_dir_all(&run_dir)?;

    let path = run_dir.join("recovery.json");
    let digest_path = run_dir.join("recovery.digest");
    let json = serde_json::to_vec_pretty(report)?;

    std::fs::write(&path, &json)?;
    std::fs::write(&digest_path, content_digest(&json).as_bytes())?;

    Ok(path)
}

/// Read `<dir>/<run_id>/recovery.json`, verifying it against its digest.
pub fn read_recovery_report(run_id: &Uuid, dir: &Path) -> Result<RecoveryReport> {
    let run_dir = dir.join(run_id.to_string());
    let json = std::fs::read(run_dir.join("recovery.json"))?;
    let expected = std::fs::read_to_string(run_dir.join("recovery.digest"))?;
    let actual = content_digest(&json);
    if expected.trim() != actual {
        return Err(QaError::DigestMismatch {
            expected: expected.trim().to_string(),
            actual,
        });
    }
    Ok(serde_json::from_slice(&json)?)
}
