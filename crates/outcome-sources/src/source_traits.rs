//! Source trait definitions for outcome reporting
//!
//! These traits define the collaborators the engine is fed from:
//! - `MetricDefinitionSource`: validated metric configuration by id
//! - `RawValueSource`: access- and consent-filtered recordings for a period
//! - `EnrollmentSource`: enrolled-participant counts per program
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::NaiveDate;
use outcome_engine::{MetricDefinition, RawRecording};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Result type for source operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

// ---------------------------------------------------------------------------
// ReportingPeriod
// ---------------------------------------------------------------------------

/// Inclusive date range a report covers.
///
/// Fields are private so `start <= end` always holds, including after
/// deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PeriodBounds")]
pub struct ReportingPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct PeriodBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<PeriodBounds> for ReportingPeriod {
    type Error = SourceError;

    fn try_from(bounds: PeriodBounds) -> SourceResult<Self> {
        Self::new(bounds.start, bounds.end)
    }
}

impl ReportingPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> SourceResult<Self> {
        if start > end {
            return Err(SourceError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Supplies metric configuration.
///
/// Implementations should return definitions that already satisfy the
/// definition invariants; the engine still re-validates and refuses to
/// compute a malformed metric.
#[async_trait]
pub trait MetricDefinitionSource: Send + Sync {
    /// Fetch a definition. Returns `SourceError::UnknownMetric` if absent.
    async fn get_metric_definition(&self, metric_id: &str) -> SourceResult<MetricDefinition>;
}

/// Supplies raw recordings.
///
/// Guarantees:
/// - Rows are already filtered for the caller's access rights and consent.
/// - Only rows for `metric_ids` with `effective_date` inside `period` are
///   returned. Zero rows is a valid answer.
#[async_trait]
pub trait RawValueSource: Send + Sync {
    async fn get_raw_recordings(
        &self,
        program_id: &str,
        metric_ids: &[String],
        period: &ReportingPeriod,
    ) -> SourceResult<Vec<RawRecording>>;
}

/// Supplies enrollment counts.
#[async_trait]
pub trait EnrollmentSource: Send + Sync {
    /// Participants enrolled in `program_id` at any point in `period`.
    /// A program with no enrollment yields 0.
    async fn get_enrolled_count(
        &self,
        program_id: &str,
        period: &ReportingPeriod,
    ) -> SourceResult<u64>;
}
