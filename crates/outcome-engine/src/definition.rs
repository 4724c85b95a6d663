//! Metric definitions: the per-call configuration supplied by the metric
//! definition source.
//!
//! A metric is either a numeric [`ScaleConfig`] with direction and two
//! thresholds, or a categorical [`AchievementConfig`] with a fixed vocabulary.
//! Kind-specific fields live only on their own variant.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{OutcomeError, Result};

/// Configuration of a numeric, ordered outcome measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleConfig {
    /// `true` when larger values indicate a better outcome.
    pub higher_is_better: bool,
    /// Lower band boundary. Must be strictly below `threshold_high`.
    pub threshold_low: f64,
    /// Upper band boundary.
    pub threshold_high: f64,
    /// Desired share (0.0–1.0) of participants in the High band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_high_band_pct: Option<f64>,
}

impl ScaleConfig {
    pub fn new(threshold_low: f64, threshold_high: f64, higher_is_better: bool) -> Self {
        Self {
            higher_is_better,
            threshold_low,
            threshold_high,
            target_high_band_pct: None,
        }
    }

    pub fn with_target_high_band_pct(mut self, target: f64) -> Self {
        self.target_high_band_pct = Some(target);
        self
    }
}

/// Configuration of a categorical outcome measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementConfig {
    /// Every value a recording may carry.
    pub options: BTreeSet<String>,
    /// The subset of `options` that counts as achieved.
    pub success_values: BTreeSet<String>,
    /// Desired achieved share (0.0–1.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_rate: Option<f64>,
}

impl AchievementConfig {
    pub fn new<O, S>(options: O, success_values: S) -> Self
    where
        O: IntoIterator,
        O::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            success_values: success_values.into_iter().map(Into::into).collect(),
            target_rate: None,
        }
    }

    pub fn with_target_rate(mut self, target: f64) -> Self {
        self.target_rate = Some(target);
        self
    }

    /// Whether `value` counts as achieved.
    pub fn is_success(&self, value: &str) -> bool {
        self.success_values.contains(value)
    }
}

/// Kind-specific metric payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricKind {
    Scale(ScaleConfig),
    Achievement(AchievementConfig),
}

/// Payload-free metric kind, used in errors and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKindName {
    Scale,
    Achievement,
}

impl fmt::Display for MetricKindName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scale => write!(f, "scale"),
            Self::Achievement => write!(f, "achievement"),
        }
    }
}

/// A metric as configured by the agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub id: String,
    #[serde(flatten)]
    pub kind: MetricKind,
}

impl MetricDefinition {
    pub fn scale(id: impl Into<String>, config: ScaleConfig) -> Self {
        Self {
            id: id.into(),
            kind: MetricKind::Scale(config),
        }
    }

    pub fn achievement(id: impl Into<String>, config: AchievementConfig) -> Self {
        Self {
            id: id.into(),
            kind: MetricKind::Achievement(config),
        }
    }

    pub fn kind_name(&self) -> MetricKindName {
        match self.kind {
            MetricKind::Scale(_) => MetricKindName::Scale,
            MetricKind::Achievement(_) => MetricKindName::Achievement,
        }
    }

    /// Borrow the scale payload, failing with [`OutcomeError::KindMismatch`]
    /// for achievement metrics.
    pub fn as_scale(&self) -> Result<&ScaleConfig> {
        match &self.kind {
            MetricKind::Scale(config) => Ok(config),
            MetricKind::Achievement(_) => Err(self.mismatch(MetricKindName::Scale)),
        }
    }

    /// Borrow the achievement payload, failing with
    /// [`OutcomeError::KindMismatch`] for scale metrics.
    pub fn as_achievement(&self) -> Result<&AchievementConfig> {
        match &self.kind {
            MetricKind::Achievement(config) => Ok(config),
            MetricKind::Scale(_) => Err(self.mismatch(MetricKindName::Achievement)),
        }
    }

    fn mismatch(&self, expected: MetricKindName) -> OutcomeError {
        OutcomeError::KindMismatch {
            metric_id: self.id.clone(),
            expected,
            actual: self.kind_name(),
        }
    }

    /// Check the definition invariants.
    ///
    /// The engine never corrects a malformed definition; callers receive
    /// [`OutcomeError::InvalidDefinition`] and the metric is not computed.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(self.invalid("metric id must not be empty"));
        }
        match &self.kind {
            MetricKind::Scale(config) => {
                if !config.threshold_low.is_finite() || !config.threshold_high.is_finite() {
                    return Err(self.invalid("thresholds must be finite numbers"));
                }
                if config.threshold_low >= config.threshold_high {
                    return Err(self.invalid(format!(
                        "threshold_low ({}) must be below threshold_high ({})",
                        config.threshold_low, config.threshold_high
                    )));
                }
                self.check_fraction("target_high_band_pct", config.target_high_band_pct)
            }
            MetricKind::Achievement(config) => {
                if config.options.is_empty() {
                    return Err(self.invalid("achievement options must not be empty"));
                }
                if let Some(stray) = config
                    .success_values
                    .iter()
                    .find(|v| !config.options.contains(*v))
                {
                    return Err(self.invalid(format!(
                        "success value '{stray}' is not one of the achievement options"
                    )));
                }
                self.check_fraction("target_rate", config.target_rate)
            }
        }
    }

    fn check_fraction(&self, field: &str, value: Option<f64>) -> Result<()> {
        match value {
            Some(v) if !(0.0..=1.0).contains(&v) => Err(self.invalid(format!(
                "{field} must be a fraction between 0 and 1, got {v}"
            ))),
            _ => Ok(()),
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> OutcomeError {
        OutcomeError::InvalidDefinition {
            metric_id: self.id.clone(),
            reason: reason.into(),
        }
    }
}
