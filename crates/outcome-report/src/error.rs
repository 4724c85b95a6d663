//! Error types for program report assembly.

use outcome_engine::OutcomeError;
use outcome_sources::SourceError;
use thiserror::Error;

/// Errors that abort a whole program report.
///
/// A single metric's configuration error does not: it is recorded on the
/// report and the remaining metrics are still evaluated.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A collaborator failed to supply data.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Engine failure outside per-metric evaluation (e.g. invalid policy).
    #[error("engine error: {0}")]
    Engine(#[from] OutcomeError),

    /// An evaluation task panicked or was cancelled.
    #[error("evaluation task join error: {0}")]
    Join(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid log settings: {0}")]
    LogSettings(String),
}

/// Convenience result alias.
pub type ReportResult<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_wraps_metric_id() {
        let err: ReportError = SourceError::UnknownMetric("wellbeing".to_string()).into();
        assert!(err.to_string().contains("wellbeing"));
        assert!(err.to_string().starts_with("source error"));
    }

    #[test]
    fn test_engine_error_display() {
        let err: ReportError = OutcomeError::InvalidPolicy("floor".to_string()).into();
        assert!(err.to_string().contains("invalid reporting policy"));
    }
}
