//! Batch analytics over stored interviews.
//!
//! Pure functions over immutable snapshots; no I/O and no shared state, so
//! they can run alongside in-flight orchestration for other interviews.

pub mod anomaly;
pub mod bias;

pub use anomaly::{detect_anomalies, interview_metrics, Anomaly, AnomalyType};
pub use bias::{detect_biases, Bias, BiasType};
