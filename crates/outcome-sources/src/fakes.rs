//! In-memory fakes for source traits (testing and embedding)
//!
//! Provides `MemoryMetricCatalog`, `MemoryRecordingStore`, and
//! `MemoryEnrollmentRegistry` that satisfy the trait contracts without any
//! external dependencies.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use outcome_engine::{MetricDefinition, RawRecording};

use crate::error::SourceError;
use crate::source_traits::*;

// ---------------------------------------------------------------------------
// MemoryMetricCatalog
// ---------------------------------------------------------------------------

/// Metric definitions keyed by id.
#[derive(Debug, Default)]
pub struct MemoryMetricCatalog {
    definitions: Mutex<HashMap<String, MetricDefinition>>,
}

impl MemoryMetricCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a definition.
    pub fn insert(&self, definition: MetricDefinition) {
        let mut definitions = self.definitions.lock().unwrap();
        definitions.insert(definition.id.clone(), definition);
    }
}

#[async_trait]
impl MetricDefinitionSource for MemoryMetricCatalog {
    async fn get_metric_definition(&self, metric_id: &str) -> SourceResult<MetricDefinition> {
        let definitions = self.definitions.lock().unwrap();
        definitions
            .get(metric_id)
            .cloned()
            .ok_or_else(|| SourceError::UnknownMetric(metric_id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// MemoryRecordingStore
// ---------------------------------------------------------------------------

/// Recordings tagged with the program they were captured under.
#[derive(Debug, Default)]
pub struct MemoryRecordingStore {
    rows: Mutex<Vec<(String, RawRecording)>>,
}

impl MemoryRecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, program_id: &str, recording: RawRecording) {
        let mut rows = self.rows.lock().unwrap();
        rows.push((program_id.to_string(), recording));
    }

    pub fn extend(&self, program_id: &str, recordings: impl IntoIterator<Item = RawRecording>) {
        let mut rows = self.rows.lock().unwrap();
        rows.extend(
            recordings
                .into_iter()
                .map(|r| (program_id.to_string(), r)),
        );
    }
}

#[async_trait]
impl RawValueSource for MemoryRecordingStore {
    async fn get_raw_recordings(
        &self,
        program_id: &str,
        metric_ids: &[String],
        period: &ReportingPeriod,
    ) -> SourceResult<Vec<RawRecording>> {
        let wanted: HashSet<&str> = metric_ids.iter().map(String::as_str).collect();
        let rows = self.rows.lock().unwrap();
        let matched: Vec<RawRecording> = rows
            .iter()
            .filter(|(program, r)| {
                program == program_id
                    && wanted.contains(r.metric_id.as_str())
                    && period.contains(r.effective_date)
            })
            .map(|(_, r)| r.clone())
            .collect();
        tracing::trace!(
            program_id = %program_id,
            rows = matched.len(),
            "memory recording store query"
        );
        Ok(matched)
    }
}

// ---------------------------------------------------------------------------
// MemoryEnrollmentRegistry
// ---------------------------------------------------------------------------

/// Enrollment counts per program. Periods are ignored.
#[derive(Debug, Default)]
pub struct MemoryEnrollmentRegistry {
    enrolled: Mutex<HashMap<String, u64>>,
}

impl MemoryEnrollmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, program_id: &str, count: u64) {
        let mut enrolled = self.enrolled.lock().unwrap();
        enrolled.insert(program_id.to_string(), count);
    }
}

#[async_trait]
impl EnrollmentSource for MemoryEnrollmentRegistry {
    async fn get_enrolled_count(
        &self,
        program_id: &str,
        _period: &ReportingPeriod,
    ) -> SourceResult<u64> {
        let enrolled = self.enrolled.lock().unwrap();
        Ok(enrolled.get(program_id).copied().unwrap_or(0))
    }
}
