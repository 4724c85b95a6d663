//! Per-metric evaluation envelope and disclosure-safe counts.

use serde::{Deserialize, Serialize};

use crate::policy::ReportingPolicy;

/// A group size that is either disclosed exactly or suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupCount {
    Exact(u64),
    /// Below the suppression floor; the exact value is never exposed.
    Suppressed,
}

impl GroupCount {
    /// Disclose `count` only if it clears the policy's suppression floor.
    pub fn gate(count: u64, policy: &ReportingPolicy) -> Self {
        if policy.is_disclosable(count) {
            Self::Exact(count)
        } else {
            Self::Suppressed
        }
    }

    pub fn exact(&self) -> Option<u64> {
        match self {
            Self::Exact(n) => Some(*n),
            Self::Suppressed => None,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

/// Why a metric produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithheldReason {
    /// No interpretable recordings in the window.
    NoData,
    /// Respondents exist but fall short of the inclusion floor.
    BelowInclusionFloor,
}

impl std::fmt::Display for WithheldReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoData => write!(f, "no_data"),
            Self::BelowInclusionFloor => write!(f, "below_inclusion_floor"),
        }
    }
}

/// Either a reportable result or the reason it was withheld.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    Reported(T),
    Withheld(WithheldReason),
}

/// Result of running one aggregator over one metric.
///
/// A withheld metric carries no result at all, but the number of recordings
/// skipped as uninterpretable is still reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation<T> {
    pub metric_id: String,
    pub outcome: Outcome<T>,
    /// Recordings skipped because their value did not fit the metric kind.
    pub ignored_records: u64,
}

impl<T> Evaluation<T> {
    pub fn result(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Reported(r) => Some(r),
            Outcome::Withheld(_) => None,
        }
    }

    pub fn into_result(self) -> Option<T> {
        match self.outcome {
            Outcome::Reported(r) => Some(r),
            Outcome::Withheld(_) => None,
        }
    }

    pub fn withheld_reason(&self) -> Option<WithheldReason> {
        match &self.outcome {
            Outcome::Reported(_) => None,
            Outcome::Withheld(reason) => Some(*reason),
        }
    }

    pub fn is_reported(&self) -> bool {
        matches!(self.outcome, Outcome::Reported(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_count_gate() {
        let policy = ReportingPolicy::default();
        assert_eq!(GroupCount::gate(5, &policy), GroupCount::Exact(5));
        assert_eq!(GroupCount::gate(4, &policy), GroupCount::Suppressed);
        assert_eq!(GroupCount::gate(0, &policy), GroupCount::Suppressed);
    }

    #[test]
    fn test_suppressed_count_serializes_without_value() {
        let json = serde_json::to_string(&GroupCount::Suppressed).unwrap();
        assert_eq!(json, "\"suppressed\"");
        let json = serde_json::to_string(&GroupCount::Exact(9)).unwrap();
        assert_eq!(json, "{\"exact\":9}");
    }

    #[test]
    fn test_withheld_evaluation_has_no_result() {
        let eval: Evaluation<u64> = Evaluation {
            metric_id: "m".to_string(),
            outcome: Outcome::Withheld(WithheldReason::BelowInclusionFloor),
            ignored_records: 2,
        };
        assert!(eval.result().is_none());
        assert!(!eval.is_reported());
        assert_eq!(eval.withheld_reason(), Some(WithheldReason::BelowInclusionFloor));
    }
}
