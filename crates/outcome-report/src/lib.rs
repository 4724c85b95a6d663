//! Outcome Report: program-level outcome summaries over pluggable sources.
//!
//! Provides:
//! - [`ReportRequest`] / [`StreamPair`]: what a report covers
//! - [`ProgramReporter`]: fetches through the source traits and evaluates
//!   every metric concurrently
//! - [`ProgramOutcomeReport`]: the assembled, privacy-gated result
//! - [`init_tracing`] / [`LogSettings`]: log output for the host process,
//!   configured by `OUTCOMES_LOG_FORMAT` and `OUTCOMES_LOG`
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use outcome_report::{init_tracing, LogSettings, ProgramReporter, ReportRequest, StreamPair};
//!
//! init_tracing(&LogSettings::from_env()?)?;
//! let reporter = ProgramReporter::new(catalog, store, registry).with_policy(policy)?;
//! let report = reporter
//!     .build(&ReportRequest::new("youth-housing", period).with_metric("wellbeing"))
//!     .await?;
//! ```

pub mod error;
pub mod report;
pub mod reporter;
pub mod request;
pub mod telemetry;

pub use error::{ReportError, ReportResult};
pub use report::{
    IgnoredRecords, MetricConfigError, MetricTrend, ProgramOutcomeReport, StreamComparison,
};
pub use reporter::ProgramReporter;
pub use request::{ReportRequest, StreamPair};
pub use telemetry::{init_tracing, LogFormat, LogSettings};
