//! Error taxonomy for the outcome engine.
//!
//! Data-sufficiency outcomes (no recordings, totals below the inclusion
//! floor) are never errors; they surface as a withheld [`crate::Evaluation`].

use crate::definition::MetricKindName;

/// Outcome engine errors.
#[derive(Debug, thiserror::Error)]
pub enum OutcomeError {
    /// The metric's configuration violates a definition invariant.
    #[error("invalid metric definition for {metric_id}: {reason}")]
    InvalidDefinition { metric_id: String, reason: String },

    /// An aggregator was invoked with a definition of the wrong kind.
    #[error("metric {metric_id} has kind {actual}, expected {expected}")]
    KindMismatch {
        metric_id: String,
        expected: MetricKindName,
        actual: MetricKindName,
    },

    #[error("invalid reporting policy: {0}")]
    InvalidPolicy(String),

    #[error("failed to load reporting policy: {0}")]
    PolicyLoad(String),
}

/// Result type for outcome engine operations.
pub type Result<T> = std::result::Result<T, OutcomeError>;
