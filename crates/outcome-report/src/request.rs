//! What a caller asks a report to cover.

use outcome_sources::ReportingPeriod;
use serde::{Deserialize, Serialize};

/// Two metrics describing the same population from different sources.
///
/// Scale metrics contribute their High-band share; achievement metrics their
/// achieved share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamPair {
    pub label: String,
    pub self_report_metric: String,
    pub observer_metric: String,
}

impl StreamPair {
    pub fn new(
        label: impl Into<String>,
        self_report_metric: impl Into<String>,
        observer_metric: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            self_report_metric: self_report_metric.into(),
            observer_metric: observer_metric.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub program_id: String,
    pub period: ReportingPeriod,
    pub metric_ids: Vec<String>,
    #[serde(default)]
    pub stream_pairs: Vec<StreamPair>,
}

impl ReportRequest {
    pub fn new(program_id: impl Into<String>, period: ReportingPeriod) -> Self {
        Self {
            program_id: program_id.into(),
            period,
            metric_ids: Vec::new(),
            stream_pairs: Vec::new(),
        }
    }

    pub fn with_metric(mut self, metric_id: impl Into<String>) -> Self {
        self.metric_ids.push(metric_id.into());
        self
    }

    pub fn with_stream_pair(mut self, pair: StreamPair) -> Self {
        self.stream_pairs.push(pair);
        self
    }

    /// Requested metrics followed by any stream-pair metrics not already
    /// listed, first occurrence wins.
    pub fn evaluated_metric_ids(&self) -> Vec<String> {
        let pair_ids = self
            .stream_pairs
            .iter()
            .flat_map(|p| [&p.self_report_metric, &p.observer_metric]);
        let mut ids: Vec<String> = Vec::new();
        for id in self.metric_ids.iter().chain(pair_ids) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }
}
