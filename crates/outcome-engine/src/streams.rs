//! Comparison of two independently aggregated percentages describing the
//! same population, e.g. participant self-report against staff observation.

use serde::{Deserialize, Serialize};

use crate::achievement::AchievementResult;
use crate::distribution::DistributionResult;
use crate::policy::ReportingPolicy;

/// One stream's share and the respondent count it was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamRate {
    /// Share in 0.0–1.0.
    pub percentage: f64,
    pub respondents: u64,
}

impl StreamRate {
    pub fn new(percentage: f64, respondents: u64) -> Self {
        Self {
            percentage,
            respondents,
        }
    }

    /// High-band share of a distribution. `None` when the High band is
    /// suppressed.
    pub fn from_high_band(result: &DistributionResult) -> Option<Self> {
        if !result.included_for_privacy {
            return None;
        }
        result
            .percentages
            .high_pct
            .map(|pct| Self::new(pct, result.total))
    }

    pub fn from_achievement(result: &AchievementResult) -> Option<Self> {
        result
            .included_for_privacy
            .then(|| Self::new(result.achieved_pct, result.total))
    }
}

/// Outcome of a two-streams comparison.
///
/// When either stream is insufficient nothing numeric is exposed: the
/// percentages and the gap are all absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoStreamsResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_report_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observer_pct: Option<f64>,
    /// `self_report_pct - observer_pct`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
    pub has_sufficient_data: bool,
}

impl TwoStreamsResult {
    fn insufficient() -> Self {
        Self {
            self_report_pct: None,
            observer_pct: None,
            gap: None,
            has_sufficient_data: false,
        }
    }
}

/// Compare two streams. A missing stream, or one whose respondents fall
/// below the inclusion floor, makes the comparison insufficient.
pub fn compare_streams(
    self_report: Option<StreamRate>,
    observer: Option<StreamRate>,
    policy: &ReportingPolicy,
) -> TwoStreamsResult {
    let sufficient = |s: &StreamRate| policy.is_reportable(s.respondents);
    match (self_report, observer) {
        (Some(a), Some(b)) if sufficient(&a) && sufficient(&b) => TwoStreamsResult {
            self_report_pct: Some(a.percentage),
            observer_pct: Some(b.percentage),
            gap: Some(a.percentage - b.percentage),
            has_sufficient_data: true,
        },
        _ => TwoStreamsResult::insufficient(),
    }
}
