//! Data completeness: how many enrolled participants have any recorded value.
//!
//! Operates on counts only, so it is always reported.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::policy::ReportingPolicy;
use crate::recording::RawRecording;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletenessLevel {
    Full,
    Partial,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletenessResult {
    pub enrolled_count: u64,
    pub with_data_count: u64,
    /// `with_data_count / enrolled_count`, 0.0 when nobody is enrolled.
    pub completeness_pct: f64,
    pub level: CompletenessLevel,
}

/// Classify coverage of `enrolled_count` by `with_data_count`.
///
/// Cutoffs are inclusive at their lower edge: exactly `completeness_full`
/// is `Full`.
pub fn compute_completeness(
    enrolled_count: u64,
    with_data_count: u64,
    policy: &ReportingPolicy,
) -> CompletenessResult {
    let completeness_pct = if enrolled_count == 0 {
        0.0
    } else {
        with_data_count as f64 / enrolled_count as f64
    };
    if with_data_count > enrolled_count {
        tracing::warn!(
            event = "completeness.over_enrolled",
            enrolled_count = enrolled_count,
            with_data_count = with_data_count,
        );
    }

    let level = if enrolled_count == 0 {
        CompletenessLevel::Low
    } else if completeness_pct >= policy.completeness_full {
        CompletenessLevel::Full
    } else if completeness_pct >= policy.completeness_partial {
        CompletenessLevel::Partial
    } else {
        CompletenessLevel::Low
    };

    CompletenessResult {
        enrolled_count,
        with_data_count,
        completeness_pct,
        level,
    }
}

/// Distinct participants with at least one recording of any metric.
///
/// Single-recording ("new") participants count: having data does not depend
/// on band eligibility.
pub fn count_participants_with_data(recordings: &[RawRecording]) -> u64 {
    recordings
        .iter()
        .map(|r| r.participant_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_partial_coverage() {
        let result = compute_completeness(57, 34, &ReportingPolicy::default());
        assert!((result.completeness_pct - 0.596).abs() < 0.001);
        assert_eq!(result.level, CompletenessLevel::Partial);
    }

    #[test]
    fn test_full_boundary_is_inclusive() {
        let result = compute_completeness(10, 8, &ReportingPolicy::default());
        assert_eq!(result.completeness_pct, 0.80);
        assert_eq!(result.level, CompletenessLevel::Full);
    }

    #[test]
    fn test_partial_boundary_is_inclusive() {
        let result = compute_completeness(10, 5, &ReportingPolicy::default());
        assert_eq!(result.level, CompletenessLevel::Partial);
        let result = compute_completeness(10, 4, &ReportingPolicy::default());
        assert_eq!(result.level, CompletenessLevel::Low);
    }

    #[test]
    fn test_no_enrollment_defaults_to_low() {
        let result = compute_completeness(0, 0, &ReportingPolicy::default());
        assert_eq!(result.completeness_pct, 0.0);
        assert_eq!(result.level, CompletenessLevel::Low);
    }

    #[test]
    fn test_small_programs_still_reported() {
        let result = compute_completeness(3, 1, &ReportingPolicy::default());
        assert_eq!(result.with_data_count, 1);
        assert_eq!(result.level, CompletenessLevel::Low);
    }

    #[test]
    fn test_participants_with_data_counts_distinct_ids() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = vec![
            RawRecording::new("p1", "g1", "wellbeing", 3.0, d),
            RawRecording::new("p1", "g2", "housing", "Housed", d),
            RawRecording::new("p2", "g1", "wellbeing", 1.0, d),
        ];
        assert_eq!(count_participants_with_data(&rows), 2);
    }
}
