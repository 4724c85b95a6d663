//! Error types for outcome data sources

use thiserror::Error;

/// Errors raised by metric, recording, and enrollment sources.
#[derive(Error, Debug)]
pub enum SourceError {
    /// No definition exists for the requested metric
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Reporting period ends before it starts
    #[error("Invalid reporting period: {start} is after {end}")]
    InvalidPeriod {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// Backing store could not be reached or queried
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}
