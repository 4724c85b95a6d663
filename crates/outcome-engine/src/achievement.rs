//! Achieved/total rates for categorical achievement metrics.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::definition::{MetricDefinition, MetricKindName};
use crate::error::Result;
use crate::evaluation::{Evaluation, Outcome, WithheldReason};
use crate::obs;
use crate::policy::ReportingPolicy;
use crate::recording::RawRecording;

/// Achievement rate of one metric.
///
/// Counts are disclosed in full once `total` clears the inclusion floor; a
/// binary split has no small band left to hide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementResult {
    pub metric_id: String,
    pub achieved_count: u64,
    pub total: u64,
    /// `achieved_count / total`, 0.0–1.0.
    pub achieved_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meets_target: Option<bool>,
    pub included_for_privacy: bool,
}

/// Rate of participants whose latest interpretable recording is a success
/// value.
///
/// A participant's latest recording is taken across all targets; same-day
/// ties go to the later row.
pub fn aggregate_achievement(
    definition: &MetricDefinition,
    recordings: &[RawRecording],
    policy: &ReportingPolicy,
) -> Result<Evaluation<AchievementResult>> {
    policy.validate()?;
    definition.validate()?;
    let config = definition.as_achievement()?;

    let mut latest: HashMap<&str, (NaiveDate, &str)> = HashMap::new();
    let mut ignored_records = 0u64;
    for recording in recordings.iter().filter(|r| r.metric_id == definition.id) {
        let Some(value) = recording.value.as_achievement_value(config) else {
            ignored_records += 1;
            continue;
        };
        latest
            .entry(recording.participant_id.as_str())
            .and_modify(|current| {
                if recording.effective_date >= current.0 {
                    *current = (recording.effective_date, value);
                }
            })
            .or_insert((recording.effective_date, value));
    }
    if ignored_records > 0 {
        obs::emit_records_ignored(&definition.id, ignored_records);
    }

    let total = latest.len() as u64;
    let achieved_count = latest
        .values()
        .filter(|(_, value)| config.is_success(value))
        .count() as u64;

    let outcome = if total == 0 {
        Outcome::Withheld(WithheldReason::NoData)
    } else if !policy.is_reportable(total) {
        Outcome::Withheld(WithheldReason::BelowInclusionFloor)
    } else {
        let achieved_pct = achieved_count as f64 / total as f64;
        Outcome::Reported(AchievementResult {
            metric_id: definition.id.clone(),
            achieved_count,
            total,
            achieved_pct,
            target_rate: config.target_rate,
            meets_target: config.target_rate.map(|target| achieved_pct >= target),
            included_for_privacy: true,
        })
    };
    match &outcome {
        Outcome::Reported(r) => {
            obs::emit_metric_evaluated(&definition.id, MetricKindName::Achievement, r.total)
        }
        Outcome::Withheld(reason) => obs::emit_metric_withheld(&definition.id, *reason),
    }

    Ok(Evaluation {
        metric_id: definition.id.clone(),
        outcome,
        ignored_records,
    })
}
