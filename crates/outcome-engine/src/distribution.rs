//! Band distribution of a scale metric across a program's participants.

use serde::{Deserialize, Serialize};

use crate::classify::{classify, Band};
use crate::definition::{MetricDefinition, MetricKindName, ScaleConfig};
use crate::error::Result;
use crate::evaluation::{Evaluation, GroupCount, Outcome, WithheldReason};
use crate::obs;
use crate::period::PeriodKey;
use crate::policy::ReportingPolicy;
use crate::recording::RawRecording;
use crate::reduce::{ReducedValue, Reducer};

/// Raw per-band tallies. Internal to aggregation; never emitted directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandTally {
    pub low: u64,
    pub mid: u64,
    pub high: u64,
    /// Participants excluded from banding for having a single recording.
    pub new_participants: u64,
}

impl BandTally {
    /// Classify each non-new reduced value and tally it.
    pub fn from_reduced(
        reduced: &[ReducedValue],
        config: &ScaleConfig,
        policy: &ReportingPolicy,
    ) -> Self {
        let mut tally = Self::default();
        for r in reduced {
            if r.is_new {
                tally.new_participants += 1;
                continue;
            }
            match classify(r.value, config, policy.threshold_inclusivity) {
                Band::Low => tally.low += 1,
                Band::Mid => tally.mid += 1,
                Band::High => tally.high += 1,
            }
        }
        tally
    }

    pub fn total(&self) -> u64 {
        self.low + self.mid + self.high
    }

    /// Nothing was reduced at all, new participants included.
    pub fn is_empty(&self) -> bool {
        self.total() == 0 && self.new_participants == 0
    }
}

/// Per-band counts after suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCounts {
    pub low: GroupCount,
    pub mid: GroupCount,
    pub high: GroupCount,
}

impl BandCounts {
    pub fn get(&self, band: Band) -> GroupCount {
        match band {
            Band::Low => self.low,
            Band::Mid => self.mid,
            Band::High => self.high,
        }
    }
}

/// Per-band shares (0.0–1.0) of `total`. A share is absent whenever its
/// count is suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPercentages {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_pct: Option<f64>,
}

impl BandPercentages {
    pub fn get(&self, band: Band) -> Option<f64> {
        match band {
            Band::Low => self.low_pct,
            Band::Mid => self.mid_pct,
            Band::High => self.high_pct,
        }
    }
}

/// Suppression-gated distribution of one scale metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionResult {
    pub metric_id: String,
    pub counts: BandCounts,
    /// Banded respondents. Never suppressed once the metric is reported.
    pub total: u64,
    pub percentages: BandPercentages,
    /// Participants with a single recording, excluded from the bands.
    pub new_participant_count: GroupCount,
    /// Always `true` on an emitted result: results below the inclusion floor
    /// are never constructed.
    pub included_for_privacy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_high_band_pct: Option<f64>,
    /// Whether the High share meets the target; absent without a target or
    /// when the High band is suppressed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meets_target: Option<bool>,
}

impl DistributionResult {
    /// Apply the inclusion floor and band suppression to a tally.
    ///
    /// Returns the withheld reason when the tally may not be reported.
    pub fn from_tally(
        metric_id: &str,
        tally: BandTally,
        config: &ScaleConfig,
        policy: &ReportingPolicy,
    ) -> std::result::Result<Self, WithheldReason> {
        if tally.is_empty() {
            return Err(WithheldReason::NoData);
        }
        let total = tally.total();
        if !policy.is_reportable(total) {
            return Err(WithheldReason::BelowInclusionFloor);
        }

        let counts = BandCounts {
            low: GroupCount::gate(tally.low, policy),
            mid: GroupCount::gate(tally.mid, policy),
            high: GroupCount::gate(tally.high, policy),
        };
        let share = |count: GroupCount| count.exact().map(|n| n as f64 / total as f64);
        let percentages = BandPercentages {
            low_pct: share(counts.low),
            mid_pct: share(counts.mid),
            high_pct: share(counts.high),
        };
        let meets_target = match (config.target_high_band_pct, percentages.high_pct) {
            (Some(target), Some(high)) => Some(high >= target),
            _ => None,
        };

        Ok(Self {
            metric_id: metric_id.to_string(),
            counts,
            total,
            percentages,
            new_participant_count: GroupCount::gate(tally.new_participants, policy),
            included_for_privacy: true,
            target_high_band_pct: config.target_high_band_pct,
            meets_target,
        })
    }
}

/// Reduce, classify, and aggregate one scale metric over the whole window.
///
/// `recordings` may contain other metrics; only rows whose `metric_id`
/// matches the definition are considered. Rows whose value is not a finite
/// number are skipped and counted. An invalid `policy` is rejected before
/// any count is produced.
pub fn aggregate_distribution(
    definition: &MetricDefinition,
    recordings: &[RawRecording],
    policy: &ReportingPolicy,
) -> Result<Evaluation<DistributionResult>> {
    policy.validate()?;
    definition.validate()?;
    let config = definition.as_scale()?;

    let mut reducer = Reducer::new(&definition.id);
    let mut ignored_records = 0u64;
    for recording in recordings.iter().filter(|r| r.metric_id == definition.id) {
        match recording.value.as_scale_value() {
            Some(v) => reducer.push(recording, v),
            None => ignored_records += 1,
        }
    }
    if ignored_records > 0 {
        obs::emit_records_ignored(&definition.id, ignored_records);
    }

    let reduced = reducer.finish(PeriodKey::Window);
    let tally = BandTally::from_reduced(&reduced, config, policy);
    let outcome = match DistributionResult::from_tally(&definition.id, tally, config, policy) {
        Ok(result) => {
            obs::emit_metric_evaluated(&definition.id, MetricKindName::Scale, result.total);
            Outcome::Reported(result)
        }
        Err(reason) => {
            obs::emit_metric_withheld(&definition.id, reason);
            Outcome::Withheld(reason)
        }
    };

    Ok(Evaluation {
        metric_id: definition.id.clone(),
        outcome,
        ignored_records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AchievementConfig;
    use crate::error::OutcomeError;
    use chrono::NaiveDate;

    fn wellbeing() -> MetricDefinition {
        MetricDefinition::scale("wellbeing", ScaleConfig::new(2.0, 4.0, true))
    }

    fn tally(low: u64, mid: u64, high: u64) -> BandTally {
        BandTally {
            low,
            mid,
            high,
            new_participants: 0,
        }
    }

    /// Two recordings per participant so nobody is new.
    fn participants(values: &[f64]) -> Vec<RawRecording> {
        let early = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let late = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        values
            .iter()
            .enumerate()
            .flat_map(|(i, v)| {
                let p = format!("p{i:02}");
                [
                    RawRecording::new(p.clone(), "goal", "wellbeing", 3.0, early),
                    RawRecording::new(p, "goal", "wellbeing", *v, late),
                ]
            })
            .collect()
    }

    #[test]
    fn test_small_bands_suppressed_total_kept() {
        let config = ScaleConfig::new(2.0, 4.0, true);
        let policy = ReportingPolicy::default();
        let result =
            DistributionResult::from_tally("m", tally(9, 0, 1), &config, &policy).unwrap();

        assert_eq!(result.total, 10);
        assert_eq!(result.counts.low, GroupCount::Exact(9));
        assert_eq!(result.percentages.low_pct, Some(0.9));
        assert!(result.counts.mid.is_suppressed());
        assert!(result.counts.high.is_suppressed());
        assert_eq!(result.percentages.mid_pct, None);
        assert_eq!(result.percentages.high_pct, None);
        assert!(result.included_for_privacy);
    }

    #[test]
    fn test_total_below_inclusion_floor_is_withheld() {
        let config = ScaleConfig::new(2.0, 4.0, true);
        let policy = ReportingPolicy::default();
        let reason =
            DistributionResult::from_tally("m", tally(3, 3, 3), &config, &policy).unwrap_err();
        assert_eq!(reason, WithheldReason::BelowInclusionFloor);
    }

    #[test]
    fn test_meets_target_uses_high_share() {
        let config = ScaleConfig::new(2.0, 4.0, true).with_target_high_band_pct(0.5);
        let policy = ReportingPolicy::default();
        let result =
            DistributionResult::from_tally("m", tally(5, 0, 6), &config, &policy).unwrap();
        assert_eq!(result.meets_target, Some(true));

        let result =
            DistributionResult::from_tally("m", tally(8, 0, 3), &config, &policy).unwrap();
        assert_eq!(result.meets_target, None);
    }

    #[test]
    fn test_aggregate_distribution_end_to_end() {
        let values = [1.0, 1.0, 1.0, 1.0, 1.0, 5.0, 5.0, 5.0, 5.0, 5.0, 3.0];
        let rows = participants(&values);
        let policy = ReportingPolicy::default();
        let eval = aggregate_distribution(&wellbeing(), &rows, &policy).unwrap();
        let result = eval.result().unwrap();
        assert_eq!(result.total, 11);
        assert_eq!(result.counts.low, GroupCount::Exact(5));
        assert_eq!(result.counts.high, GroupCount::Exact(5));
        assert!(result.counts.mid.is_suppressed());
        assert_eq!(result.new_participant_count, GroupCount::Suppressed);
    }

    #[test]
    fn test_new_participants_excluded_from_total() {
        let mut rows = participants(&[5.0; 10]);
        rows.push(RawRecording::new(
            "newcomer",
            "goal",
            "wellbeing",
            1.0,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        ));
        let policy = ReportingPolicy::default();
        let eval = aggregate_distribution(&wellbeing(), &rows, &policy).unwrap();
        let result = eval.result().unwrap();
        assert_eq!(result.total, 10);
        assert_eq!(result.counts.low, GroupCount::Suppressed);
    }

    #[test]
    fn test_uninterpretable_values_are_skipped_and_counted() {
        let mut rows = participants(&[5.0; 10]);
        rows[3].value = "refused".into();
        rows.push(RawRecording::new(
            "p00",
            "goal",
            "other-metric",
            "garbage",
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        ));
        let policy = ReportingPolicy::default();
        let eval = aggregate_distribution(&wellbeing(), &rows, &policy).unwrap();
        assert_eq!(eval.ignored_records, 1);
        // p01 lost one of its two rows and became new.
        assert!(eval.result().is_none());
        assert_eq!(eval.withheld_reason(), Some(WithheldReason::BelowInclusionFloor));
    }

    #[test]
    fn test_no_recordings_is_no_data() {
        let eval = aggregate_distribution(&wellbeing(), &[], &ReportingPolicy::default()).unwrap();
        assert_eq!(eval.withheld_reason(), Some(WithheldReason::NoData));
        assert_eq!(eval.ignored_records, 0);
    }

    #[test]
    fn test_achievement_definition_rejected() {
        let def = MetricDefinition::achievement(
            "housing",
            AchievementConfig::new(["Housed", "Unhoused"], ["Housed"]),
        );
        let err = aggregate_distribution(&def, &[], &ReportingPolicy::default()).unwrap_err();
        assert!(matches!(err, OutcomeError::KindMismatch { .. }));
    }

    #[test]
    fn test_malformed_definition_is_configuration_error() {
        let def = MetricDefinition::scale("wellbeing", ScaleConfig::new(4.0, 2.0, true));
        let err =
            aggregate_distribution(&def, &participants(&[5.0; 12]), &ReportingPolicy::default())
                .unwrap_err();
        assert!(matches!(err, OutcomeError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_zero_suppression_floor_rejected_before_counting() {
        let policy = ReportingPolicy {
            suppression_floor: 0,
            ..ReportingPolicy::default()
        };
        let rows = participants(&[1.0, 1.0, 1.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0]);
        let err = aggregate_distribution(&wellbeing(), &rows, &policy).unwrap_err();
        assert!(matches!(err, OutcomeError::InvalidPolicy(_)));
    }
}
