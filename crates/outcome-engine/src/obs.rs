//! Structured observability hooks for outcome evaluation.
//!
//! This module provides:
//! - A program-scoped tracing span via the `ReportSpan` RAII guard
//! - Emission functions for per-metric and per-report events
//!
//! Withheld metrics are logged with a reason only; a respondent total below
//! the inclusion floor never appears in a log field.
//!
//! Where these events go is up to the host subscriber; `outcome-report`
//! installs one from `OUTCOMES_LOG` and `OUTCOMES_LOG_FORMAT`.

use tracing::{debug, info, warn};

use crate::definition::MetricKindName;
use crate::evaluation::WithheldReason;

/// RAII guard that enters a program-scoped span for the duration of a report.
///
/// # Example
///
/// ```ignore
/// let _span = ReportSpan::enter("youth-housing");
/// // every event emitted while the guard lives carries program_id
/// ```
pub struct ReportSpan {
    _span: tracing::span::EnteredSpan,
}

impl ReportSpan {
    pub fn enter(program_id: &str) -> Self {
        let span = tracing::info_span!("outcomes.report", program_id = %program_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a metric cleared the inclusion floor and was reported.
pub fn emit_metric_evaluated(metric_id: &str, kind: MetricKindName, respondents: u64) {
    debug!(
        event = "metric.evaluated",
        metric_id = %metric_id,
        kind = %kind,
        respondents = respondents,
    );
}

/// Emit event: a metric was withheld from output.
pub fn emit_metric_withheld(metric_id: &str, reason: WithheldReason) {
    debug!(event = "metric.withheld", metric_id = %metric_id, reason = %reason);
}

/// Emit event: recordings skipped because their value did not fit the metric.
pub fn emit_records_ignored(metric_id: &str, count: u64) {
    warn!(event = "metric.records_ignored", metric_id = %metric_id, count = count);
}

/// Emit event: a metric definition failed validation.
pub fn emit_definition_rejected(metric_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "metric.definition_rejected", metric_id = %metric_id, error = %error);
}

/// Emit event: a program report was assembled.
pub fn emit_report_built(program_id: &str, metrics: usize, withheld: usize) {
    info!(
        event = "report.built",
        program_id = %program_id,
        metrics = metrics,
        withheld = withheld,
    );
}
