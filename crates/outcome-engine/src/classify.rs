//! Band classification of reduced scale values.

use serde::{Deserialize, Serialize};

use crate::definition::ScaleConfig;
use crate::policy::ThresholdInclusivity;

/// Ordered outcome band. `High` is always the favourable end, regardless of
/// the metric's direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Low,
    Mid,
    High,
}

/// Classify `value` against the metric's thresholds.
///
/// With `higher_is_better` the low-threshold side is `Low`; otherwise the
/// comparison is mirrored and the low-threshold side is `High`.
pub fn classify(value: f64, config: &ScaleConfig, inclusivity: ThresholdInclusivity) -> Band {
    let (below_low, above_high) = match inclusivity {
        ThresholdInclusivity::OuterBands => {
            (value <= config.threshold_low, value >= config.threshold_high)
        }
        ThresholdInclusivity::MiddleBand => {
            (value < config.threshold_low, value > config.threshold_high)
        }
    };

    match (below_low, above_high, config.higher_is_better) {
        (true, _, true) => Band::Low,
        (true, _, false) => Band::High,
        (_, true, true) => Band::High,
        (_, true, false) => Band::Low,
        _ => Band::Mid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTER: ThresholdInclusivity = ThresholdInclusivity::OuterBands;

    #[test]
    fn test_higher_is_better() {
        let config = ScaleConfig::new(2.0, 4.0, true);
        assert_eq!(classify(1.0, &config, OUTER), Band::Low);
        assert_eq!(classify(3.0, &config, OUTER), Band::Mid);
        assert_eq!(classify(5.0, &config, OUTER), Band::High);
    }

    #[test]
    fn test_direction_flip_mirrors_bands() {
        let config = ScaleConfig::new(2.0, 4.0, false);
        assert_eq!(classify(1.0, &config, OUTER), Band::High);
        assert_eq!(classify(3.0, &config, OUTER), Band::Mid);
        assert_eq!(classify(5.0, &config, OUTER), Band::Low);
    }

    #[test]
    fn test_boundaries_belong_to_outer_bands() {
        let up = ScaleConfig::new(2.0, 4.0, true);
        assert_eq!(classify(2.0, &up, OUTER), Band::Low);
        assert_eq!(classify(4.0, &up, OUTER), Band::High);

        let down = ScaleConfig::new(2.0, 4.0, false);
        assert_eq!(classify(2.0, &down, OUTER), Band::High);
        assert_eq!(classify(4.0, &down, OUTER), Band::Low);
    }

    #[test]
    fn test_middle_band_inclusivity() {
        let config = ScaleConfig::new(2.0, 4.0, true);
        let middle = ThresholdInclusivity::MiddleBand;
        assert_eq!(classify(2.0, &config, middle), Band::Mid);
        assert_eq!(classify(4.0, &config, middle), Band::Mid);
        assert_eq!(classify(1.99, &config, middle), Band::Low);
        assert_eq!(classify(4.01, &config, middle), Band::High);
    }

    #[test]
    fn test_band_order() {
        assert!(Band::Low < Band::Mid && Band::Mid < Band::High);
    }
}
