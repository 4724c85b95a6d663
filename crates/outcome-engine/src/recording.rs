//! Raw per-participant metric recordings as handed to the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::definition::AchievementConfig;

/// A value as captured at data entry.
///
/// Historical entries may carry numbers as text, so both shapes are accepted
/// and interpreted against the metric's kind at aggregation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordedValue {
    Number(f64),
    Text(String),
}

impl RecordedValue {
    /// Interpret as a scale value. Non-finite or non-numeric values yield
    /// `None`.
    pub fn as_scale_value(&self) -> Option<f64> {
        let v = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }

    /// Interpret as one of the metric's achievement options.
    pub fn as_achievement_value<'a>(&'a self, config: &AchievementConfig) -> Option<&'a str> {
        match self {
            Self::Text(s) => {
                let s = s.trim();
                config.options.contains(s).then_some(s)
            }
            Self::Number(_) => None,
        }
    }
}

impl From<f64> for RecordedValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for RecordedValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RecordedValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// One recording of one metric, for one participant, against one target.
///
/// Owned by the case-record subsystem; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecording {
    pub participant_id: String,
    /// The goal or plan target the recording was captured against.
    pub target_id: String,
    pub metric_id: String,
    pub value: RecordedValue,
    pub effective_date: NaiveDate,
}

impl RawRecording {
    pub fn new(
        participant_id: impl Into<String>,
        target_id: impl Into<String>,
        metric_id: impl Into<String>,
        value: impl Into<RecordedValue>,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            participant_id: participant_id.into(),
            target_id: target_id.into(),
            metric_id: metric_id.into(),
            value: value.into(),
            effective_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_value_accepts_numeric_text() {
        assert_eq!(RecordedValue::from(" 3.5 ").as_scale_value(), Some(3.5));
        assert_eq!(RecordedValue::from(4.0).as_scale_value(), Some(4.0));
    }

    #[test]
    fn test_scale_value_rejects_garbage() {
        assert_eq!(RecordedValue::from("n/a").as_scale_value(), None);
        assert_eq!(RecordedValue::from(f64::INFINITY).as_scale_value(), None);
        assert_eq!(RecordedValue::from("NaN").as_scale_value(), None);
    }

    #[test]
    fn test_achievement_value_must_be_in_vocabulary() {
        let config = AchievementConfig::new(["Housed", "Unhoused"], ["Housed"]);
        assert_eq!(
            RecordedValue::from("Housed ").as_achievement_value(&config),
            Some("Housed")
        );
        assert_eq!(RecordedValue::from("housed").as_achievement_value(&config), None);
        assert_eq!(RecordedValue::from(1.0).as_achievement_value(&config), None);
    }

    #[test]
    fn test_untagged_value_deserializes_both_shapes() {
        let n: RecordedValue = serde_json::from_str("3").unwrap();
        assert_eq!(n, RecordedValue::Number(3.0));
        let t: RecordedValue = serde_json::from_str("\"Housed\"").unwrap();
        assert_eq!(t, RecordedValue::Text("Housed".to_string()));
    }
}
