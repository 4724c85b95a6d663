//! Monthly trend of a scale metric's band shares.
//!
//! Each calendar month is reduced, classified, and gated independently. Months
//! that miss the inclusion floor are dropped, so the series is sparse.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::definition::{MetricDefinition, MetricKindName};
use crate::distribution::{BandTally, DistributionResult};
use crate::error::Result;
use crate::evaluation::{Evaluation, Outcome, WithheldReason};
use crate::obs;
use crate::period::{MonthKey, PeriodKey};
use crate::policy::{ReportingPolicy, TrendNewness};
use crate::recording::RawRecording;
use crate::reduce::Reducer;

/// One reportable month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: MonthKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_pct: Option<f64>,
    pub total: u64,
}

/// Compute the chronologically ordered monthly series for one scale metric.
///
/// Recordings are bucketed by the month of their `effective_date`. The
/// evaluation is withheld when no month clears the inclusion floor.
///
/// Under the default [`TrendNewness::PerMonth`], a participant needs two
/// recordings inside a month to be banded for it, so a program that records
/// once a month gets an empty series here even when its window distribution
/// is reported. [`TrendNewness::Window`] counts recordings across the whole
/// window instead.
pub fn compute_trend(
    definition: &MetricDefinition,
    recordings: &[RawRecording],
    policy: &ReportingPolicy,
) -> Result<Evaluation<Vec<TrendPoint>>> {
    policy.validate()?;
    definition.validate()?;
    let config = definition.as_scale()?;

    let mut months: BTreeMap<MonthKey, Reducer<'_>> = BTreeMap::new();
    let mut window_recordings: HashMap<&str, usize> = HashMap::new();
    let mut ignored_records = 0u64;
    for recording in recordings.iter().filter(|r| r.metric_id == definition.id) {
        let Some(v) = recording.value.as_scale_value() else {
            ignored_records += 1;
            continue;
        };
        *window_recordings
            .entry(recording.participant_id.as_str())
            .or_default() += 1;
        months
            .entry(MonthKey::of(recording.effective_date))
            .or_insert_with(|| Reducer::new(&definition.id))
            .push(recording, v);
    }
    if ignored_records > 0 {
        obs::emit_records_ignored(&definition.id, ignored_records);
    }

    let had_data = !months.is_empty();
    let points: Vec<TrendPoint> = months
        .into_iter()
        .filter_map(|(month, reducer)| {
            let mut reduced = reducer.finish(PeriodKey::Month(month));
            if policy.trend_newness == TrendNewness::Window {
                for r in &mut reduced {
                    let seen = window_recordings.get(r.participant_id.as_str());
                    r.is_new = seen.copied().unwrap_or_default() < 2;
                }
            }
            let tally = BandTally::from_reduced(&reduced, config, policy);
            let result =
                DistributionResult::from_tally(&definition.id, tally, config, policy).ok()?;
            Some(TrendPoint {
                period: month,
                low_pct: result.percentages.low_pct,
                high_pct: result.percentages.high_pct,
                total: result.total,
            })
        })
        .collect();

    let outcome = if points.is_empty() {
        let reason = if had_data {
            WithheldReason::BelowInclusionFloor
        } else {
            WithheldReason::NoData
        };
        obs::emit_metric_withheld(&definition.id, reason);
        Outcome::Withheld(reason)
    } else {
        let respondents = points.iter().map(|p| p.total).max().unwrap_or_default();
        obs::emit_metric_evaluated(&definition.id, MetricKindName::Scale, respondents);
        Outcome::Reported(points)
    };

    Ok(Evaluation {
        metric_id: definition.id.clone(),
        outcome,
        ignored_records,
    })
}
