//! The assembled program outcome report.

use chrono::{DateTime, Utc};
use outcome_engine::{
    AchievementResult, CompletenessResult, DistributionResult, TrendPoint, TwoStreamsResult,
};
use outcome_sources::ReportingPeriod;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ReportResult;

/// Monthly series for one scale metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTrend {
    pub metric_id: String,
    pub points: Vec<TrendPoint>,
}

/// Two-streams comparison for one configured pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamComparison {
    pub label: String,
    pub self_report_metric: String,
    pub observer_metric: String,
    pub result: TwoStreamsResult,
}

/// Recordings skipped for one metric because their value did not fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredRecords {
    pub metric_id: String,
    pub count: u64,
}

/// A metric that was not computed because its definition is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricConfigError {
    pub metric_id: String,
    pub message: String,
}

/// Outcome summary of one program over one period.
///
/// Metrics withheld for privacy or lack of data are absent from
/// `distributions`, `achievements`, and `trends`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramOutcomeReport {
    pub report_id: Uuid,
    pub program_id: String,
    pub period: ReportingPeriod,
    pub generated_at: DateTime<Utc>,
    pub distributions: Vec<DistributionResult>,
    pub achievements: Vec<AchievementResult>,
    pub trends: Vec<MetricTrend>,
    pub two_streams: Vec<StreamComparison>,
    pub completeness: CompletenessResult,
    pub ignored_records: Vec<IgnoredRecords>,
    pub configuration_errors: Vec<MetricConfigError>,
}

/// The computed portion of a report, without per-invocation identity.
#[derive(Serialize)]
struct ComputedResults<'a> {
    program_id: &'a str,
    period: &'a ReportingPeriod,
    distributions: &'a [DistributionResult],
    achievements: &'a [AchievementResult],
    trends: &'a [MetricTrend],
    two_streams: &'a [StreamComparison],
    completeness: &'a CompletenessResult,
    ignored_records: &'a [IgnoredRecords],
    configuration_errors: &'a [MetricConfigError],
}

impl ProgramOutcomeReport {
    pub fn distribution(&self, metric_id: &str) -> Option<&DistributionResult> {
        self.distributions.iter().find(|d| d.metric_id == metric_id)
    }

    pub fn achievement(&self, metric_id: &str) -> Option<&AchievementResult> {
        self.achievements.iter().find(|a| a.metric_id == metric_id)
    }

    pub fn trend(&self, metric_id: &str) -> Option<&[TrendPoint]> {
        self.trends
            .iter()
            .find(|t| t.metric_id == metric_id)
            .map(|t| t.points.as_slice())
    }

    pub fn stream_comparison(&self, label: &str) -> Option<&TwoStreamsResult> {
        self.two_streams
            .iter()
            .find(|s| s.label == label)
            .map(|s| &s.result)
    }

    /// SHA-256 (hex) of the canonical JSON of the computed results.
    ///
    /// Excludes `report_id` and `generated_at`, so two builds over identical
    /// inputs yield the same digest.
    pub fn results_digest(&self) -> ReportResult<String> {
        let computed = ComputedResults {
            program_id: &self.program_id,
            period: &self.period,
            distributions: &self.distributions,
            achievements: &self.achievements,
            trends: &self.trends,
            two_streams: &self.two_streams,
            completeness: &self.completeness,
            ignored_records: &self.ignored_records,
            configuration_errors: &self.configuration_errors,
        };
        let bytes = serde_json::to_vec(&computed)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}
