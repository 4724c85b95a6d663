//! Reporting policy: privacy floors, completeness cutoffs, and threshold
//! inclusivity, passed explicitly to every aggregator.
//!
//! Load from TOML with [`ReportingPolicy::load`] or layer environment
//! overrides on the defaults with [`ReportingPolicy::from_env`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OutcomeError, Result};

/// Which band a value lying exactly on a threshold belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdInclusivity {
    /// A value on a threshold falls into the outer band (Low or High).
    #[default]
    OuterBands,
    /// A value on a threshold falls into Mid.
    MiddleBand,
}

/// Which recordings count when deciding whether a participant is new in a
/// trend month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendNewness {
    /// Only recordings inside the month. A participant recorded once per
    /// month is new in every month.
    #[default]
    PerMonth,
    /// Recordings across the whole reporting window.
    Window,
}

/// Privacy and sufficiency policy for outcome aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingPolicy {
    /// Smallest group size that may be disclosed as an exact count.
    pub suppression_floor: u64,
    /// Smallest respondent total for which a metric is reported at all.
    pub inclusion_floor: u64,
    /// Completeness at or above this fraction is `Full`.
    pub completeness_full: f64,
    /// Completeness at or above this fraction (and below `completeness_full`)
    /// is `Partial`.
    pub completeness_partial: f64,
    pub threshold_inclusivity: ThresholdInclusivity,
    pub trend_newness: TrendNewness,
}

impl Default for ReportingPolicy {
    fn default() -> Self {
        Self {
            suppression_floor: 5,
            inclusion_floor: 10,
            completeness_full: 0.80,
            completeness_partial: 0.50,
            threshold_inclusivity: ThresholdInclusivity::OuterBands,
            trend_newness: TrendNewness::PerMonth,
        }
    }
}

impl ReportingPolicy {
    pub fn with_threshold_inclusivity(mut self, inclusivity: ThresholdInclusivity) -> Self {
        self.threshold_inclusivity = inclusivity;
        self
    }

    pub fn with_trend_newness(mut self, newness: TrendNewness) -> Self {
        self.trend_newness = newness;
        self
    }

    /// Whether a respondent total clears the inclusion floor.
    pub fn is_reportable(&self, total: u64) -> bool {
        total >= self.inclusion_floor
    }

    /// Whether a single group count may be disclosed exactly.
    pub fn is_disclosable(&self, count: u64) -> bool {
        count >= self.suppression_floor
    }

    pub fn validate(&self) -> Result<()> {
        if self.suppression_floor == 0 {
            return Err(OutcomeError::InvalidPolicy(
                "suppression_floor must be at least 1".to_string(),
            ));
        }
        if self.inclusion_floor < self.suppression_floor {
            return Err(OutcomeError::InvalidPolicy(format!(
                "inclusion_floor ({}) must not be below suppression_floor ({})",
                self.inclusion_floor, self.suppression_floor
            )));
        }
        let cutoffs_ordered = 0.0 <= self.completeness_partial
            && self.completeness_partial <= self.completeness_full
            && self.completeness_full <= 1.0;
        if !cutoffs_ordered {
            return Err(OutcomeError::InvalidPolicy(format!(
                "completeness cutoffs must satisfy 0 <= partial ({}) <= full ({}) <= 1",
                self.completeness_partial, self.completeness_full
            )));
        }
        Ok(())
    }

    /// Parse a policy from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let policy: Self = toml::from_str(s).map_err(|e| OutcomeError::PolicyLoad(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Read and parse a TOML policy file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| OutcomeError::PolicyLoad(format!("{}: {e}", path.display())))?;
        let policy = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "reporting policy loaded");
        Ok(policy)
    }

    /// Defaults overridden by environment variables.
    ///
    /// Reads:
    /// - OUTCOMES_SUPPRESSION_FLOOR (optional, default: 5)
    /// - OUTCOMES_INCLUSION_FLOOR (optional, default: 10)
    /// - OUTCOMES_COMPLETENESS_FULL (optional, default: 0.80)
    /// - OUTCOMES_COMPLETENESS_PARTIAL (optional, default: 0.50)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut policy = Self::default();
        if let Some(v) = lookup("OUTCOMES_SUPPRESSION_FLOOR") {
            policy.suppression_floor = parse_var("OUTCOMES_SUPPRESSION_FLOOR", &v)?;
        }
        if let Some(v) = lookup("OUTCOMES_INCLUSION_FLOOR") {
            policy.inclusion_floor = parse_var("OUTCOMES_INCLUSION_FLOOR", &v)?;
        }
        if let Some(v) = lookup("OUTCOMES_COMPLETENESS_FULL") {
            policy.completeness_full = parse_var("OUTCOMES_COMPLETENESS_FULL", &v)?;
        }
        if let Some(v) = lookup("OUTCOMES_COMPLETENESS_PARTIAL") {
            policy.completeness_partial = parse_var("OUTCOMES_COMPLETENESS_PARTIAL", &v)?;
        }
        policy.validate()?;
        Ok(policy)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| OutcomeError::PolicyLoad(format!("{key} has unparseable value '{value}'")))
}
