//! Outcome Sources: collaborator interfaces for outcome reporting
//!
//! The engine consumes already-fetched data. This crate defines where that
//! data comes from, so hosts can plug in their case-record store, metric
//! configuration, and enrollment registry.
//!
//! ## Key Components
//!
//! - `MetricDefinitionSource`, `RawValueSource`, `EnrollmentSource`: async
//!   collaborator traits
//! - `ReportingPeriod`: validated inclusive date range
//! - `fakes`: in-memory implementations

mod error;
pub mod fakes;
pub mod source_traits;

pub use error::SourceError;
pub use source_traits::{
    EnrollmentSource, MetricDefinitionSource, RawValueSource, ReportingPeriod, SourceResult,
};
