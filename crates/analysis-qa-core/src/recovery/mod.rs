//! Recovery: turns N unreliable provider calls into one trustworthy analysis.
//!
//! # Modules
//!
//! - [`policy`]: `RecoveryPolicy` (attempt budget, backoff, timeout, gate thresholds)
//! - [`orchestrator`]: `RecoveryOrchestrator::recover()` retry/gate/vote loop
//! - [`report`]: `RecoveryReport` audit record, digest-verified persistence

pub mod orchestrator;
pub mod policy;
pub mod report;

pub use orchestrator::RecoveryOrchestrator;
pub use policy::RecoveryPolicy;
pub use report::{
    content_digest, read_recovery_report, write_recovery_report, AttemptOutcome, AttemptRecord,
    RecoveryReport, Resolution,
};
