//! Latency thresholds and the colour classifications derived from them.

use serde::Serialize;

/// Default warning threshold in milliseconds.
pub const DEFAULT_WARN_MS: f64 = 30.0;
/// Distance between the warning and critical threshold when the critical
/// value has to be corrected.
pub const CRIT_OFFSET_MS: f64 = 30.0;
/// Default critical threshold in milliseconds.
pub const DEFAULT_CRIT_MS: f64 = DEFAULT_WARN_MS + CRIT_OFFSET_MS;

/// Latency thresholds used to classify samples.
///
/// Always satisfies `crit > warn > 0`. Construct through [`Thresholds::new`],
/// which corrects invalid input instead of rejecting it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    warn: f64,
    crit: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warn: DEFAULT_WARN_MS,
            crit: DEFAULT_CRIT_MS,
        }
    }
}

impl Thresholds {
    /// Build thresholds, falling back to defaults for invalid values.
    ///
    /// A `warn` that is not a positive finite number becomes 30 ms. A `crit`
    /// that is not finite or not strictly above the (corrected) `warn`
    /// becomes `warn + 30`.
    pub fn new(warn: f64, crit: f64) -> Self {
        let warn = if warn.is_finite() && warn > 0.0 {
            warn
        } else {
            DEFAULT_WARN_MS
        };
        let crit = if crit.is_finite() && crit > warn {
            crit
        } else {
            warn + CRIT_OFFSET_MS
        };
        Self { warn, crit }
    }

    pub fn warn(&self) -> f64 {
        self.warn
    }

    pub fn crit(&self) -> f64 {
        self.crit
    }

    /// Classify a latency value against these thresholds.
    pub fn classify(&self, value: f64) -> Level {
        classify(value, self.warn, self.crit)
    }
}

/// Colour classification of a latency value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Normal,
    Warn,
    Crit,
}

/// Classify `value` as critical at or above `crit`, warning at or above
/// `warn`, normal otherwise. Used for both the last/average readouts and
/// every history cell.
pub fn classify(value: f64, warn: f64, crit: f64) -> Level {
    if value >= crit {
        Level::Crit
    } else if value >= warn {
        Level::Warn
    } else {
        Level::Normal
    }
}

/// Coarse band for a 0-100 score, used to colour the score bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Bad,
    Poor,
    Fair,
    Good,
}

/// Band for a quality score: 80+ good, 60+ fair, 40+ poor.
pub fn quality_band(quality: f64) -> ScoreBand {
    band(quality, [80.0, 60.0, 40.0])
}

/// Band for a stability score: 90+ good, 70+ fair, 50+ poor.
pub fn stability_band(stability: f64) -> ScoreBand {
    band(stability, [90.0, 70.0, 50.0])
}

fn band(score: f64, [good, fair, poor]: [f64; 3]) -> ScoreBand {
    if score >= good {
        ScoreBand::Good
    } else if score >= fair {
        ScoreBand::Fair
    } else if score >= poor {
        ScoreBand::Poor
    } else {
        ScoreBand::Bad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = Thresholds::default();
        assert_eq!(t.warn(), 30.0);
        assert_eq!(t.crit(), 60.0);
    }

    #[test]
    fn test_invalid_warn_falls_back() {
        assert_eq!(Thresholds::new(0.0, 60.0).warn(), 30.0);
        assert_eq!(Thresholds::new(-5.0, 60.0).warn(), 30.0);
        assert_eq!(Thresholds::new(f64::NAN, 60.0).warn(), 30.0);
    }

    #[test]
    fn test_crit_forced_above_warn() {
        let t = Thresholds::new(50.0, 40.0);
        assert_eq!(t.warn(), 50.0);
        assert_eq!(t.crit(), 80.0);

        let t = Thresholds::new(50.0, 50.0);
        assert_eq!(t.crit(), 80.0);

        // Default crit does not survive a larger warn
        let t = Thresholds::new(80.0, DEFAULT_CRIT_MS);
        assert_eq!(t.crit(), 110.0);
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(29.9, 30.0, 60.0), Level::Normal);
        assert_eq!(classify(30.0, 30.0, 60.0), Level::Warn);
        assert_eq!(classify(59.9, 30.0, 60.0), Level::Warn);
        assert_eq!(classify(60.0, 30.0, 60.0), Level::Crit);
        assert_eq!(Thresholds::default().classify(0.0), Level::Normal);
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(quality_band(100.0), ScoreBand::Good);
        assert_eq!(quality_band(80.0), ScoreBand::Good);
        assert_eq!(quality_band(79.9), ScoreBand::Fair);
        assert_eq!(quality_band(40.0), ScoreBand::Poor);
        assert_eq!(quality_band(0.0), ScoreBand::Bad);

        assert_eq!(stability_band(90.0), ScoreBand::Good);
        assert_eq!(stability_band(70.0), ScoreBand::Fair);
        assert_eq!(stability_band(50.0), ScoreBand::Poor);
        assert_eq!(stability_band(49.0), ScoreBand::Bad);
    }
}
