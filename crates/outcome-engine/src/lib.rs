//! Outcome Engine
//!
//! Program-level outcome summaries from longitudinal per-participant metric
//! recordings: band distributions, monthly trends, achievement rates,
//! two-streams comparisons, and data completeness.
//!
//! Every aggregator is a pure function of its inputs and an explicit
//! [`ReportingPolicy`]. Results never disclose a group below the suppression
//! floor, and metric-level results below the inclusion floor are withheld
//! entirely.

pub mod achievement;
pub mod classify;
pub mod completeness;
pub mod definition;
pub mod distribution;
pub mod error;
pub mod evaluation;
pub mod obs;
pub mod period;
pub mod policy;
pub mod recording;
pub mod reduce;
pub mod streams;
pub mod trend;

pub use achievement::{aggregate_achievement, AchievementResult};
pub use classify::{classify, Band};
pub use completeness::{
    compute_completeness, count_participants_with_data, CompletenessLevel, CompletenessResult,
};
pub use definition::{AchievementConfig, MetricDefinition, MetricKind, MetricKindName, ScaleConfig};
pub use distribution::{aggregate_distribution, BandCounts, BandPercentages, DistributionResult};
pub use error::{OutcomeError, Result};
pub use evaluation::{Evaluation, GroupCount, Outcome, WithheldReason};
pub use obs::ReportSpan;
pub use period::{MonthKey, PeriodKey};
pub use policy::{ReportingPolicy, ThresholdInclusivity, TrendNewness};
pub use recording::{RawRecording, RecordedValue};
pub use reduce::{median, ReducedValue, Reducer};
pub use streams::{compare_streams, StreamRate, TwoStreamsResult};
pub use trend::{compute_trend, TrendPoint};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
